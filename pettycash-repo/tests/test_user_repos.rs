mod utils;

use pettycash_repo::transaction_repo::{Filter, TransactionType};
use pettycash_repo::user_repo::{User, UserRepoError};
use rstest::rstest;
use utils::generator::NewTransactionGenerator;
use utils::test_user::TestUser;
use utils::RepoType;
use uuid::Uuid;

fn new_user() -> User {
    User::new(
        "test-user-".to_owned() + &Uuid::new_v4().to_string(),
        "not a real hash".to_owned(),
    )
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_create_and_get_user(#[case] repo_type: RepoType) {
    let Some((user_repo, _, _)) = utils::build_repos(repo_type).await else {
        return;
    };

    let user = new_user();
    user_repo.create_user(user.clone()).await.unwrap();

    let inserted_user = user_repo.get_user(&user.id).await.unwrap();
    assert_eq!(user, inserted_user);

    user_repo.delete_user(&user.id).await.unwrap();
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_create_existing_user(#[case] repo_type: RepoType) {
    let Some((user_repo, _, _)) = utils::build_repos(repo_type).await else {
        return;
    };

    let user = new_user();
    user_repo.create_user(user.clone()).await.unwrap();

    let create_result = user_repo.create_user(user.clone()).await;
    assert!(matches!(create_result, Err(UserRepoError::UserAlreadyExists(id)) if id == user.id));

    user_repo.delete_user(&user.id).await.unwrap();
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_missing_user(#[case] repo_type: RepoType) {
    let Some((user_repo, _, _)) = utils::build_repos(repo_type).await else {
        return;
    };

    assert!(matches!(
        user_repo.get_user("invalid user").await,
        Err(UserRepoError::UserNotFound(_))
    ));
    assert!(matches!(
        user_repo.delete_user("invalid user").await,
        Err(UserRepoError::UserNotFound(_))
    ));
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_delete_user_removes_their_data(#[case] repo_type: RepoType) {
    let Some((user_repo, transaction_repo, category_repo)) = utils::build_repos(repo_type).await
    else {
        return;
    };
    let user = TestUser::new(&user_repo).await;
    let category = user
        .create_category(&category_repo, "Sales Revenue", TransactionType::Income)
        .await;
    let mut generator = NewTransactionGenerator::new(category.id, TransactionType::Income);
    for new_transaction in generator.generate_many(3) {
        transaction_repo
            .create_new_transaction(&user.id, new_transaction)
            .await
            .unwrap();
    }

    user.delete().await;

    assert!(category_repo
        .get_all_categories(&user.id)
        .await
        .unwrap()
        .is_empty());
    assert!(transaction_repo
        .get_all_transactions(&user.id, Filter::NONE, None)
        .await
        .unwrap()
        .is_empty());
}
