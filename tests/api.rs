//! HTTP tests for the author, budget and stats endpoints

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use budget_stats::api::{app_router, AppState};
use budget_stats::{
    AuthorRecordResponse, BudgetRecord, BudgetService, BudgetType, Config, SqliteRepository,
    YearStats,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn create_app() -> Router {
    let config = Config::from_lookup(|_| None).unwrap();
    let repo = SqliteRepository::open_in_memory().unwrap();
    let state = AppState::new(BudgetService::new(Arc::new(repo)));
    app_router(state, &config)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap()
}

async fn add_record(app: &Router, record: BudgetRecord) {
    let (status, body) = post(app, "/budget/add", serde_json::to_value(&record).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse::<BudgetRecord>(&body), record);
}

/// Author ids start at 1 on a fresh database
async fn add_author(app: &Router, fio: &str) -> AuthorRecordResponse {
    let (status, body) = post(app, "/author/add", json!({ "fio": fio })).await;
    assert_eq!(status, StatusCode::OK);
    let response: AuthorRecordResponse = parse(&body);
    assert_eq!(response.fio, fio);
    response
}

async fn stats(app: &Router, uri: &str) -> YearStats {
    let (status, body) = get(app, uri).await;
    assert_eq!(status, StatusCode::OK);
    parse(&body)
}

#[tokio::test]
async fn test_health_check() {
    let app = create_app();
    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse::<Value>(&body)["status"], "ok");
}

#[tokio::test]
async fn test_budget_pagination() {
    let app = create_app();
    for amount in [10, 5, 20, 30, 40] {
        add_record(&app, BudgetRecord::new(2020, 5, amount, BudgetType::Income)).await;
    }
    add_record(&app, BudgetRecord::new(2030, 1, 1, BudgetType::Expense)).await;

    let response = stats(&app, "/budget/year/2020/stats?limit=3&offset=1").await;

    assert_eq!(response.total, 5);
    assert_eq!(response.items.len(), 3);
    assert_eq!(response.total_by_type.get("Income"), Some(&105));
}

#[tokio::test]
async fn test_stats_sort_order() {
    let app = create_app();
    for (month, amount) in [(5, 100), (1, 5), (5, 50), (1, 30), (5, 400)] {
        add_record(&app, BudgetRecord::new(2020, month, amount, BudgetType::Income)).await;
    }

    let response = stats(&app, "/budget/year/2020/stats?limit=100&offset=0").await;
    let amounts: Vec<i64> = response.items.iter().map(|i| i.amount).collect();

    assert_eq!(amounts, vec![30, 5, 400, 100, 50]);
}

#[tokio::test]
async fn test_budget_with_author() {
    let app = create_app();
    add_author(&app, "Me You").await;
    add_record(&app, BudgetRecord::new(2020, 1, 100, BudgetType::Income)).await;
    add_record(&app, BudgetRecord::new(2020, 4, 50, BudgetType::Income).with_author(1)).await;

    let (status, body) = get(&app, "/budget/year/2020/stats?limit=10&offset=0").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = parse(&body);

    assert!(json["items"][0]["author"].is_null());
    assert_eq!(json["items"][1]["author"]["fio"], "Me You");
}

#[tokio::test]
async fn test_budget_with_wrong_author() {
    let app = create_app();
    let (status, body) = post(
        &app,
        "/budget/add",
        json!({ "year": 2020, "month": 4, "amount": 5, "type": "Income", "author": 4 }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(parse::<Value>(&body)["code"], 422);
}

#[tokio::test]
async fn test_stats_filter() {
    let app = create_app();
    add_author(&app, "Me You").await;
    add_author(&app, "Not You").await;
    add_record(&app, BudgetRecord::new(2020, 5, 100, BudgetType::Income)).await;
    add_record(&app, BudgetRecord::new(2020, 4, 50, BudgetType::Income).with_author(1)).await;
    add_record(&app, BudgetRecord::new(2020, 5, 25, BudgetType::Income).with_author(2)).await;

    let response = stats(&app, "/budget/year/2020/stats?limit=100&offset=0&fioFilter=Me").await;

    assert_eq!(response.items.len(), 1);
    assert_eq!(response.items[0].amount, 50);
    // Totals describe the whole year, not the filtered page
    assert_eq!(response.total, 3);
    assert_eq!(response.total_by_type.get("Income"), Some(&175));
}

#[tokio::test]
async fn test_stats_empty_filter_drops_entries_without_author() {
    let app = create_app();
    add_author(&app, "Me You").await;
    add_record(&app, BudgetRecord::new(2020, 1, 100, BudgetType::Income)).await;
    add_record(&app, BudgetRecord::new(2020, 2, 50, BudgetType::Expense).with_author(1)).await;
    add_record(&app, BudgetRecord::new(2020, 3, 70, BudgetType::Expense)).await;

    let response = stats(&app, "/budget/year/2020/stats?limit=10&offset=0&fioFilter=").await;

    // An empty filter matches every author
    assert_eq!(response.items.len(), 1);
    assert_eq!(response.items[0].amount, 50);
    assert_eq!(response.items[0].author.as_ref().unwrap().fio, "Me You");
    assert_eq!(response.total, 3);
    assert_eq!(response.total_by_type.get("Income"), Some(&100));
    assert_eq!(response.total_by_type.get("Expense"), Some(&120));
}

#[tokio::test]
async fn test_stats_type_sum_overflow() {
    let app = create_app();
    add_record(&app, BudgetRecord::new(2020, 1, i64::MAX, BudgetType::Income)).await;
    add_record(&app, BudgetRecord::new(2020, 2, 1, BudgetType::Income)).await;

    let (status, body) = get(&app, "/budget/year/2020/stats?limit=10&offset=0").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: Value = parse(&body);
    assert_eq!(error["code"], 422);
    assert_eq!(error["message"], "Income total overflows a 64-bit amount");
}

#[tokio::test]
async fn test_invalid_month_values() {
    let app = create_app();
    for month in [-5, 15] {
        let (status, _) = post(
            &app,
            "/budget/add",
            json!({ "year": 2020, "month": month, "amount": 5, "type": "Income" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "month {}", month);
    }

    let response = stats(&app, "/budget/year/2020/stats?limit=10&offset=0").await;
    assert_eq!(response.total, 0);
}

#[tokio::test]
async fn test_malformed_requests_are_bad_request() {
    let app = create_app();

    let (status, _) = post(
        &app,
        "/budget/add",
        json!({ "year": 2020, "month": 1, "amount": 5, "type": "Transfer" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/budget/year/twenty/stats?limit=10&offset=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/budget/year/2020/stats?offset=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/budget/year/2020/stats?limit=-1&offset=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&app, "/author/add", json!({ "fio": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_author_creation_time_is_iso8601() {
    let app = create_app();
    let response = add_author(&app, "Иванов Иван").await;

    assert!(chrono::DateTime::parse_from_rfc3339(&response.creation_time).is_ok());
}

#[tokio::test]
async fn test_unknown_year_is_empty() {
    let app = create_app();
    add_record(&app, BudgetRecord::new(2020, 1, 1, BudgetType::Income)).await;

    let (status, body) = get(&app, "/budget/year/1999/stats?limit=10&offset=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        parse::<Value>(&body),
        json!({ "total": 0, "totalByType": {}, "items": [] })
    );
}
