use crate::auth::password;
use crate::error::HandlerError;
use crate::user::UserId;
use actix_web::{post, web, HttpResponse, Responder};
use finance_repo::transaction_table::TransactionTable;
use finance_repo::user_repo::{User, UserRepo};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Serialize, Deserialize)]
pub struct UserCredentials {
    pub id: UserId,
    pub password: String,
}

#[post("/signup/")]
pub async fn signup(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    credentials: web::Json<UserCredentials>,
) -> Result<impl Responder, HandlerError> {
    let credentials = credentials.into_inner();

    // users must be able to own a transaction table
    TransactionTable::resolve(&credentials.id)?;

    let password_hash = password::encode_password(&credentials.password)?;
    user_repo
        .create_user(User::new(credentials.id.clone(), password_hash))
        .await?;

    info!(user_id = %credentials.id, "Signed up user");
    Ok(HttpResponse::Ok().finish())
}
