#![allow(dead_code, unused_macros)]

use std::sync::Arc;

use finance_lib::user::UserId;
use rstest::*;
use serde_json::{json, Value};
use tracing::info;
use tracing::Level;
use uuid::Uuid;

use finance_repo::transaction_repo::TransactionRepo;
use finance_repo::user_repo::User;
use finance_repo::user_repo::UserRepo;
use finance_repo::HealthCheck;

pub type Repos = (
    Arc<dyn UserRepo>,
    Arc<dyn TransactionRepo>,
    Arc<dyn HealthCheck>,
);

macro_rules! build_app {
    ($repos:expr, $signups_enabled:expr) => {{
        let (user_repo, transaction_repo, health_check) = $repos;
        let transaction_service =
            finance_lib::transaction::service::TransactionService::new(
                user_repo.clone(),
                transaction_repo,
            );
        let app = actix_web::App::new()
            .app_data(actix_web::web::Data::new(transaction_service))
            .app_data(actix_web::web::Data::new(user_repo))
            .app_data(actix_web::web::Data::new(health_check))
            .app_data(
                actix_web::web::JsonConfig::default()
                    .error_handler(finance_lib::error::json_error_handler),
            )
            .app_data(
                actix_web::web::PathConfig::default()
                    .error_handler(finance_lib::error::path_error_handler),
            )
            .wrap(finance_lib::tracing::create_middleware())
            .wrap(actix_web::middleware::NormalizePath::new(
                actix_web::middleware::TrailingSlash::Always,
            ))
            .service(finance_lib::api_service($signups_enabled));
        tracing::info!("Built app");
        actix_web::test::init_service(app).await
    }};
    ($repos:expr) => {
        build_app!($repos, false)
    };
}

macro_rules! create_transaction {
    (&$service:ident, $user_id:expr, $payload:expr) => {{
        let request = actix_web::test::TestRequest::post()
            .uri(&format!("/api/transactions/{}/", $user_id))
            .set_json(&$payload)
            .to_request();
        let response = actix_web::test::call_service(&$service, request).await;
        assert!(
            response.status().is_success(),
            "Got {} response when creating transaction",
            response.status()
        );
        actix_web::test::read_body_json(response).await
    }};
}

pub struct TestUser {
    pub user_id: UserId,
    repo: Arc<dyn UserRepo>,
}

impl TestUser {
    pub async fn new(user_repo: &Arc<dyn UserRepo>) -> TestUser {
        let user_id = new_user_id();
        let user = User::new(
            user_id.clone(),
            finance_lib::auth::password::encode_password("pass").unwrap(),
        );
        user_repo.create_user(user).await.unwrap();
        info!(%user_id, "Created user");
        TestUser {
            user_id,
            repo: user_repo.clone(),
        }
    }

    pub async fn delete(&self) {
        self.repo.delete_user(&self.user_id).await.unwrap()
    }
}

pub fn new_user_id() -> UserId {
    format!("test-{}", Uuid::new_v4().simple())
}

pub fn payload(date: &str, kind: &str, category: &str, amount: f64) -> Value {
    json!({
        "date": date,
        "type": kind,
        "category": category,
        "place": "Corner shop",
        "amount": amount,
        "description": "test transaction",
    })
}

#[fixture]
#[once]
pub fn tracing_setup() -> () {
    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(Level::DEBUG)
        .init();
    info!("tracing initialized");
}

#[fixture]
pub fn repos() -> Repos {
    finance_repo::mem_repo::create_repos()
}
