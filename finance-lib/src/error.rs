use crate::transaction::service::ServiceError;
use actix_web::body::BoxBody;
use actix_web::error::{InternalError, JsonPayloadError, PathError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use finance_repo::transaction_table::InvalidUserId;
use finance_repo::user_repo::UserRepoError;
use serde_json::json;
use std::fmt::{Debug, Display};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    User(#[from] UserRepoError),
    #[error(transparent)]
    InvalidUserId(#[from] InvalidUserId),
    #[error("Unable to hash password")]
    PasswordHash(#[from] argon2::Error),
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::Service(e) => match e {
                ServiceError::UserNotFound(_)
                | ServiceError::NoTransactions(_)
                | ServiceError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::InvalidTransactionType(_) | ServiceError::InvalidUserId(_) => {
                    StatusCode::BAD_REQUEST
                }
                ServiceError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            HandlerError::User(e) => match e {
                UserRepoError::UserNotFound(_) => StatusCode::NOT_FOUND,
                UserRepoError::UserAlreadyExists(_) => StatusCode::CONFLICT,
                UserRepoError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            HandlerError::InvalidUserId(_) => StatusCode::BAD_REQUEST,
            HandlerError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let status = self.status_code();
        let detail = if status.is_server_error() {
            error!(error = ?self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(json!({ "detail": detail }))
    }
}

/// Answers undecodable JSON bodies with a 400 carrying the decoder's message
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    error!(path = req.path(), %err, "Invalid JSON payload");
    bad_request("Unable to parse JSON payload", err)
}

pub fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
    error!(path = req.path(), %err, "Invalid path parameters");
    bad_request("Unable to parse path", err)
}

fn bad_request<E>(message: &str, err: E) -> actix_web::Error
where
    E: Debug + Display + 'static,
{
    let body = json!({ "error": message, "detail": err.to_string() });
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}
