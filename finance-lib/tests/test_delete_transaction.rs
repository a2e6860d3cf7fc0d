use actix_web::http::StatusCode;
use actix_web::test;
use actix_web::test::{read_body_json, TestRequest};
use rstest::rstest;
use serde_json::{json, Value};
use tracing::instrument;

use finance_repo::transaction_repo::Transaction;
use utils::{payload, repos, tracing_setup, Repos, TestUser};

#[macro_use]
mod utils;

#[instrument(skip(repos))]
#[rstest]
#[actix_rt::test]
async fn test_delete_transaction(_tracing_setup: &(), repos: Repos) {
    let test_user = TestUser::new(&repos.0).await;
    let service = build_app!(repos);

    let transaction: Transaction = create_transaction!(
        &service,
        test_user.user_id,
        payload("2024-01-05", "expense", "food", 12.5)
    );
    let uri = format!(
        "/api/transactions/{}/{}/",
        test_user.user_id, transaction.id
    );

    let request = TestRequest::delete().uri(&uri).to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_body_json(response).await;
    assert_eq!(body, json!({ "message": "Transaction deleted successfully" }));

    let request = TestRequest::get().uri(&uri).to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let request = TestRequest::put()
        .uri(&uri)
        .set_json(json!({ "amount": 1 }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let request = TestRequest::delete().uri(&uri).to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // the table outlives its rows
    let request = TestRequest::get()
        .uri(&format!("/api/transactions/{}/", test_user.user_id))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let transactions: Vec<Transaction> = read_body_json(response).await;
    assert!(transactions.is_empty());

    test_user.delete().await
}

#[instrument(skip(repos))]
#[rstest]
#[actix_rt::test]
async fn test_ids_are_not_reused(_tracing_setup: &(), repos: Repos) {
    let test_user = TestUser::new(&repos.0).await;
    let service = build_app!(repos);

    let first: Transaction = create_transaction!(
        &service,
        test_user.user_id,
        payload("2024-01-05", "expense", "food", 12.5)
    );
    let second: Transaction = create_transaction!(
        &service,
        test_user.user_id,
        payload("2024-01-06", "expense", "food", 2.5)
    );

    let request = TestRequest::delete()
        .uri(&format!(
            "/api/transactions/{}/{}/",
            test_user.user_id, second.id
        ))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let third: Transaction = create_transaction!(
        &service,
        test_user.user_id,
        payload("2024-01-07", "income", "refund", 2.5)
    );
    assert!(third.id > second.id);
    assert_ne!(third.id, first.id);

    test_user.delete().await
}

#[instrument(skip(repos))]
#[rstest]
#[actix_rt::test]
async fn test_delete_without_transactions(_tracing_setup: &(), repos: Repos) {
    let test_user = TestUser::new(&repos.0).await;
    let service = build_app!(repos);

    let request = TestRequest::delete()
        .uri(&format!("/api/transactions/{}/{}/", test_user.user_id, 1))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_user.delete().await
}
