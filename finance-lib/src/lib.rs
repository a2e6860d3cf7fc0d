use actix_web::{web, Scope};

pub mod auth;
pub mod config;
pub mod error;
pub mod health;
pub mod tracing;
pub mod transaction;
pub mod user;

/// Every route of the API, mounted under `/api`
pub fn api_service(signups_enabled: bool) -> Scope {
    web::scope("/api")
        .service(transaction::transaction_service())
        .service(auth::auth_service(signups_enabled))
        .service(health::health_check)
}
