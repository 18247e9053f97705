#[macro_use]
extern crate tracing;

use std::error::Error;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Condition;
use actix_web::{App, HttpServer};
use anyhow::{anyhow, Context};
use chrono::Duration;
use rand::Rng;
use rustls::{Certificate, PrivateKey, ServerConfig};
use rustls_pemfile::{certs, pkcs8_private_keys};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;

use pettycash_lib::auth::session::SessionKeys;
use pettycash_lib::config::Config;
use pettycash_lib::AppSettings;
use pettycash_repo::receipt_store::{FsReceiptStore, ReceiptStore};

const SERVICE_NAME: &str = "pettycash-server";

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = registry::Registry::default()
        .with(LevelFilter::INFO)
        .with(tracing_subscriber::fmt::Layer::default());
    let tracing_guard = tracing::subscriber::set_default(subscriber);
    info!("tracing initialized");

    let config = match get_config_file() {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            info!("No config file found, reading config from environment");
            Config::from_env()?
        }
    };

    let telemetry_layer = config
        .telemetry
        .as_ref()
        .map(|telemetry| pettycash_lib::tracing::create_opentelemetry_layer(telemetry, SERVICE_NAME))
        .transpose()?;

    let subscriber = registry::Registry::default()
        .with(LevelFilter::INFO)
        .with(tracing_subscriber::fmt::Layer::default())
        .with(telemetry_layer);
    tracing::subscriber::set_global_default(subscriber).context("Unable to set up subscriber")?;
    drop(tracing_guard);

    let (user_repo, transaction_repo, category_repo) =
        pettycash_repo::sqlx_repo::create_repos(config.database_url.clone(), 10).await?;

    let receipts_dir = config.receipts_dir.clone().unwrap_or_else(get_state_dir);
    info!(receipts_dir = %receipts_dir.display(), "Storing receipts");
    let receipt_store: Arc<dyn ReceiptStore> = Arc::new(FsReceiptStore::new(receipts_dir));

    let secret = get_secret()?;
    let session_keys =
        SessionKeys::from_secret(&secret).with_lifetime(Duration::days(config.session_days));
    let settings = AppSettings::from(&config);
    let cors_allowed_origins = config.cors_allowed_origins.clone();

    let mut server = HttpServer::new(move || {
        let cors = cors_allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);
        App::new()
            .wrap(Condition::new(!cors_allowed_origins.is_empty(), cors))
            .wrap(pettycash_lib::tracing::create_middleware())
            .configure(pettycash_lib::app_config_func(
                session_keys.clone(),
                user_repo.clone(),
                transaction_repo.clone(),
                category_repo.clone(),
                receipt_store.clone(),
                settings.clone(),
            ))
    });
    server = match config.ssl {
        None => {
            warn!("Using http");
            server.bind("0.0.0.0:8000")?
        }
        Some(ssl_config) => {
            info!("Using https");

            let config = ServerConfig::builder()
                .with_safe_defaults()
                .with_no_client_auth();

            let mut cert_file = BufReader::new(
                File::open(ssl_config.certificate_chain_file)
                    .context("Error opening certificate chain file")?,
            );
            let mut key_file = BufReader::new(
                File::open(ssl_config.private_key_file)
                    .context("Error opening private key file")?,
            );

            let cert_chain = certs(&mut cert_file)
                .context("Unable to read certificate chain file")?
                .into_iter()
                .map(Certificate)
                .collect();
            let mut keys: Vec<PrivateKey> = pkcs8_private_keys(&mut key_file)
                .context("Unable to read private key file")?
                .into_iter()
                .map(PrivateKey)
                .collect();

            if keys.is_empty() {
                error!("No private key found in file");
                return Err(anyhow!("No private key found in file").into());
            }

            let config = config.with_single_cert(cert_chain, keys.remove(0))?;

            server.bind_rustls("0.0.0.0:8000", config)?
        }
    };
    server.run().await?;

    Ok(())
}

fn get_config_file() -> Option<PathBuf> {
    let config_current_dir = PathBuf::from("config.toml");
    if config_current_dir.exists() {
        return Some(config_current_dir);
    }
    if let Ok(config_env) = std::env::var("CONFIGURATION_DIRECTORY") {
        let config_path = PathBuf::from(config_env).join("config.toml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    None
}

fn get_state_dir() -> PathBuf {
    if let Ok(state_env) = std::env::var("STATE_DIRECTORY") {
        return PathBuf::from(state_env);
    }

    PathBuf::from("data")
}

/// Gets the secret from file. If the file does not exist it will generate a new secret and save it
/// to the file
fn get_secret() -> Result<Vec<u8>, Box<dyn Error>> {
    let state_dir = get_state_dir();
    let secret_file = state_dir.join("secret");
    if secret_file.exists() {
        Ok(fs::read(secret_file)?)
    } else {
        let mut rng = rand::thread_rng();
        let mut secret: [u8; 128] = [0; 128];
        rng.fill(&mut secret);

        fs::create_dir_all(state_dir)?;
        fs::write(secret_file, secret)?;

        Ok(secret.to_vec())
    }
}
