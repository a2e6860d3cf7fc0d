use crate::error::HandlerError;
use crate::transaction::service::TransactionService;
use crate::transaction::{TransactionPatch, TransactionPayload};
use crate::user::UserId;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde_json::json;
use tracing_actix_web::RootSpan;

fn record_user(root_span: &RootSpan, user_id: &str) {
    root_span.record("user_id", user_id);
}

#[post("/{user_id}/")]
pub async fn create_transaction(
    service: web::Data<TransactionService>,
    user_id: web::Path<UserId>,
    payload: web::Json<TransactionPayload>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    record_user(&root_span, &user_id);

    let transaction = service.create(&user_id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[get("/{user_id}/")]
pub async fn get_all_transactions(
    service: web::Data<TransactionService>,
    user_id: web::Path<UserId>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    record_user(&root_span, &user_id);

    let transactions = service.list(&user_id).await?;
    Ok(HttpResponse::Ok().json(transactions))
}

#[get("/{user_id}/{transaction_id}/")]
pub async fn get_transaction(
    service: web::Data<TransactionService>,
    params: web::Path<(UserId, i32)>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let (user_id, transaction_id) = params.into_inner();
    record_user(&root_span, &user_id);

    let transaction = service.get(&user_id, transaction_id).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[get("/{user_id}/{start_date}/{end_date}/")]
pub async fn get_transactions_by_period(
    service: web::Data<TransactionService>,
    params: web::Path<(UserId, NaiveDate, NaiveDate)>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let (user_id, start_date, end_date) = params.into_inner();
    record_user(&root_span, &user_id);

    let transactions = service
        .list_by_period(&user_id, start_date, end_date)
        .await?;
    Ok(HttpResponse::Ok().json(transactions))
}

#[get("/{user_id}/{start_date}/{end_date}/stats/")]
pub async fn get_stats_by_period(
    service: web::Data<TransactionService>,
    params: web::Path<(UserId, NaiveDate, NaiveDate)>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let (user_id, start_date, end_date) = params.into_inner();
    record_user(&root_span, &user_id);

    let totals = service
        .stats_by_period(&user_id, start_date, end_date)
        .await?;
    Ok(HttpResponse::Ok().json(totals))
}

#[put("/{user_id}/{transaction_id}/")]
pub async fn update_transaction(
    service: web::Data<TransactionService>,
    params: web::Path<(UserId, i32)>,
    patch: web::Json<TransactionPatch>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let (user_id, transaction_id) = params.into_inner();
    record_user(&root_span, &user_id);

    let transaction = service
        .update(&user_id, transaction_id, patch.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[delete("/{user_id}/{transaction_id}/")]
pub async fn delete_transaction(
    service: web::Data<TransactionService>,
    params: web::Path<(UserId, i32)>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let (user_id, transaction_id) = params.into_inner();
    record_user(&root_span, &user_id);

    service.delete(&user_id, transaction_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Transaction deleted successfully" })))
}
