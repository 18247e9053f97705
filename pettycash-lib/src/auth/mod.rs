use crate::user::UserId;
use actix_web::dev::ServiceRequest;
use actix_web::{web, Error, HttpMessage, Scope};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use actix_web_httpauth::extractors::{bearer, AuthenticationError};
use actix_web_httpauth::headers::www_authenticate::bearer::Bearer;
use session::{SessionError, SessionKeys};
use tracing::{debug, error};
use tracing_actix_web::RootSpan;

pub mod handlers;
pub mod password;
pub mod session;

pub fn auth_service(signups_enabled: bool) -> Scope {
    let scope = web::scope("/auth").service(handlers::get_token);
    if signups_enabled {
        scope.service(handlers::signup)
    } else {
        scope
    }
}

/// Checks the bearer token against [SessionKeys]. On success the cashier id is stored in the
/// request extensions and recorded on the [RootSpan].
pub async fn credentials_validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(keys) = req.app_data::<SessionKeys>() else {
        error!("SessionKeys missing from app data");
        return Err((
            actix_web::error::ErrorInternalServerError("Authentication unavailable"),
            req,
        ));
    };
    match keys.verify(credentials.token()) {
        Ok(cashier) => {
            if let Some(root_span) = req.extensions().get::<RootSpan>() {
                root_span.record("user_id", &cashier.as_str());
            }
            req.extensions_mut().insert::<UserId>(cashier);
            Ok(req)
        }
        Err(e) => {
            debug!(error = %e, "Rejected session token");
            let description = match e {
                SessionError::Expired => "Session expired",
                _ => "Invalid session token",
            };
            let challenge = Bearer::build()
                .error(bearer::Error::InvalidToken)
                .error_description(description)
                .finish();
            Err((AuthenticationError::new(challenge).into(), req))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::credentials_validator;
    use crate::auth::session::SessionKeys;
    use crate::user::UserId;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use actix_web::{http, test, web, App, Responder};
    use actix_web_httpauth::middleware::HttpAuthentication;
    use chrono::Duration;
    use rstest::fixture;
    use rstest::rstest;

    macro_rules! build_service {
        ($keys:expr) => {{
            let bearer_auth_middleware = HttpAuthentication::bearer(credentials_validator);
            let app = App::new()
                .app_data($keys)
                .route("/", web::get().to(return_user))
                .wrap(bearer_auth_middleware);
            test::init_service(app).await
        }};
    }

    // Rejections surface as service errors rather than responses.
    macro_rules! status_of {
        ($service:ident, $request:ident) => {
            match test::try_call_service(&$service, $request).await {
                Ok(response) => response.status(),
                Err(e) => e.as_response_error().status_code(),
            }
        };
    }

    #[fixture]
    fn keys() -> SessionKeys {
        SessionKeys::from_secret(&rand::random::<[u8; 32]>())
    }

    fn bearer(token: &str) -> (http::header::HeaderName, String) {
        (http::header::AUTHORIZATION, format!("Bearer {}", token))
    }

    #[rstest]
    #[actix_rt::test]
    async fn session_cashier_reaches_handler(keys: SessionKeys) {
        let cashier: UserId = "cashier-1".into();
        let token = keys.issue(cashier.clone()).unwrap();

        let service = build_service!(keys);

        let request = TestRequest::get().uri("/").insert_header(bearer(&token)).to_request();
        let response = test::call_service(&service, request).await;
        assert!(
            response.status().is_success(),
            "Response status is {}",
            response.status()
        );

        let body = test::read_body(response).await;
        assert_eq!(cashier.as_bytes(), &body)
    }

    #[rstest]
    #[actix_rt::test]
    async fn expired_session_is_unauthorized(keys: SessionKeys) {
        let token = keys
            .clone()
            .with_lifetime(Duration::hours(-1))
            .issue("cashier-1".into())
            .unwrap();

        let service = build_service!(keys);

        let request = TestRequest::get().uri("/").insert_header(bearer(&token)).to_request();
        assert_eq!(status_of!(service, request), StatusCode::UNAUTHORIZED)
    }

    #[rstest]
    #[actix_rt::test]
    async fn token_from_other_server_is_unauthorized(keys: SessionKeys) {
        let other = SessionKeys::from_secret(&rand::random::<[u8; 32]>());
        let token = other.issue("cashier-1".into()).unwrap();

        let service = build_service!(keys);

        let request = TestRequest::get().uri("/").insert_header(bearer(&token)).to_request();
        assert_eq!(status_of!(service, request), StatusCode::UNAUTHORIZED)
    }

    #[rstest]
    #[actix_rt::test]
    async fn garbage_token(keys: SessionKeys) {
        let service = build_service!(keys);

        let request = TestRequest::get().uri("/").insert_header(bearer("not-a-token")).to_request();
        assert_eq!(status_of!(service, request), StatusCode::UNAUTHORIZED)
    }

    #[rstest]
    #[actix_rt::test]
    async fn no_token(keys: SessionKeys) {
        let service = build_service!(keys);

        let request = TestRequest::get().uri("/").to_request();
        assert_eq!(status_of!(service, request), StatusCode::UNAUTHORIZED)
    }

    async fn return_user(user_id: web::ReqData<UserId>) -> impl Responder {
        user_id.into_inner()
    }
}
