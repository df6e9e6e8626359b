// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Holdings API tests over the in-process store.

use axum::http::StatusCode;
use serde_json::{json, Value};

mod common;
use common::{request, send};

async fn create(app: &axum::Router, token: &str, body: Value) -> String {
    let (status, created) = send(app, request("POST", "/holdings/", Some(token), Some(body))).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", created);
    created["_id"].as_str().unwrap().to_string()
}

fn holding(ticker: &str, total_cost: f64, account: &str) -> Value {
    json!({
        "ticker": ticker,
        "quantity": 10,
        "totalCost": total_cost,
        "account": account,
    })
}

#[tokio::test]
async fn test_create_then_get() {
    let (app, state) = common::create_test_app();
    let token = common::test_token(&state);

    let (status, created) = send(
        &app,
        request(
            "POST",
            "/holdings/",
            Some(&token),
            Some(holding("AAPL", 1500.5, "Brokerage")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["_id"].as_str().unwrap();
    assert_eq!(
        created["message"],
        format!("Successfully added holdings for ticker AAPL with ID {}", id)
    );

    let (status, fetched) = send(
        &app,
        request("GET", &format!("/holdings/id/{}", id), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        fetched,
        json!({
            "_id": id,
            "ticker": "AAPL",
            "quantity": 10.0,
            "totalCost": 1500.5,
            "account": "Brokerage",
        })
    );
}

#[tokio::test]
async fn test_list_includes_rounded_summary() {
    let (app, state) = common::create_test_app();
    let token = common::test_token(&state);

    create(&app, &token, holding("AAPL", 10.005, "Roth IRA")).await;
    create(&app, &token, holding("MSFT", 10.005, "Brokerage")).await;

    let (status, body) = send(&app, request("GET", "/holdings/", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["found"], 2);
    assert_eq!(body["summary"]["totalCost"], 20.01);
    assert_eq!(body["holdings"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_collection_path_without_trailing_slash() {
    let (app, state) = common::create_test_app();
    let token = common::test_token(&state);

    let (status, _) = send(
        &app,
        request("POST", "/holdings", Some(&token), Some(holding("VTI", 1.005, "Roth IRA"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, request("GET", "/holdings", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["found"], 1);
    assert_eq!(body["summary"]["totalCost"], 1.01);

    let (status, _) = send(&app, request("GET", "/holdings", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let (app, state) = common::create_test_app();
    let token = common::test_token(&state);

    let cases = [
        (json!([1, 2, 3]), "Invalid input data"),
        (
            json!({"_id": "65f0c0ffee0000000000beef", "ticker": "AAPL", "quantity": 1, "totalCost": 1, "account": "a"}),
            "ID should not be provided for a new holding",
        ),
        (
            json!({"ticker": "AAPL", "quantity": 1, "totalCost": 1, "account": "a", "notes": "x"}),
            "Unknown field: notes",
        ),
        (
            json!({"ticker": "AAPL", "quantity": 1, "account": "a"}),
            "Missing field: totalCost",
        ),
        (
            json!({"ticker": "AAPL", "quantity": "ten", "totalCost": 1, "account": "a"}),
            "Invalid value for field quantity: expected a number",
        ),
        (
            json!({"ticker": "", "quantity": 1, "totalCost": 1, "account": "a"}),
            "Invalid value for field ticker: must not be empty",
        ),
    ];

    for (body, message) in cases {
        let (status, response) =
            send(&app, request("POST", "/holdings/", Some(&token), Some(body))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "expected 400 for {}", message);
        assert_eq!(response["error"], message);
    }

    let (_, body) = send(&app, request("GET", "/holdings/", Some(&token), None)).await;
    assert_eq!(body["summary"]["found"], 0);
}

#[tokio::test]
async fn test_create_with_unparsable_body() {
    let (app, state) = common::create_test_app();
    let token = common::test_token(&state);

    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/holdings/")
        .header(axum::http::header::AUTHORIZATION, format!("Bearer {}", token))
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input data");
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let (app, state) = common::create_test_app();
    let token = common::test_token(&state);

    for id in ["65f0c0ffee0000000000beef", "not-an-object-id"] {
        let (status, body) = send(
            &app,
            request("GET", &format!("/holdings/id/{}", id), Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], format!("Holding ID: {} not found", id));

        let (status, _) = send(
            &app,
            request("DELETE", &format!("/holdings/id/{}", id), Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_replace_holding() {
    let (app, state) = common::create_test_app();
    let token = common::test_token(&state);
    let id = create(&app, &token, holding("AAPL", 100.0, "Brokerage")).await;
    let uri = format!("/holdings/id/{}", id);

    // A matching _id in the body is accepted.
    let mut body = holding("AAPL", 250.0, "Roth IRA");
    body["_id"] = json!(id);
    let (status, response) = send(&app, request("PUT", &uri, Some(&token), Some(body))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["message"], "Holdings for AAPL updated successfully!");

    let (_, fetched) = send(&app, request("GET", &uri, Some(&token), None)).await;
    assert_eq!(fetched["totalCost"], 250.0);
    assert_eq!(fetched["account"], "Roth IRA");

    // A different _id is refused and nothing changes.
    let mut body = holding("AAPL", 1.0, "Other");
    body["_id"] = json!("65f0c0ffee0000000000beef");
    let (status, _) = send(&app, request("PUT", &uri, Some(&token), Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, fetched) = send(&app, request("GET", &uri, Some(&token), None)).await;
    assert_eq!(fetched["totalCost"], 250.0);
}

#[tokio::test]
async fn test_replace_missing_holding_is_not_found() {
    let (app, state) = common::create_test_app();
    let token = common::test_token(&state);

    let (status, _) = send(
        &app,
        request(
            "PUT",
            "/holdings/id/65f0c0ffee0000000000beef",
            Some(&token),
            Some(holding("AAPL", 1.0, "a")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_holding() {
    let (app, state) = common::create_test_app();
    let token = common::test_token(&state);
    let id = create(&app, &token, holding("TSLA", 700.0, "Brokerage")).await;
    let uri = format!("/holdings/id/{}", id);

    let (status, body) = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Holdings for TSLA deleted successfully!");

    let (status, _) = send(&app, request("GET", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_filter_by_ticker_is_exact() {
    let (app, state) = common::create_test_app();
    let token = common::test_token(&state);
    create(&app, &token, holding("AAPL", 1.0, "Brokerage")).await;
    create(&app, &token, holding("AAPL", 2.0, "Roth IRA")).await;
    create(&app, &token, holding("AAP", 3.0, "Brokerage")).await;

    let (status, body) = send(&app, request("GET", "/holdings/ticker/AAPL", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(&app, request("GET", "/holdings/ticker/aapl", Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No holdings found for the given ticker");
}

#[tokio::test]
async fn test_filter_by_account_pattern() {
    let (app, state) = common::create_test_app();
    let token = common::test_token(&state);
    create(&app, &token, holding("AAPL", 12.5, "Roth IRA")).await;
    create(&app, &token, holding("MSFT", 5.25, "Traditional IRA")).await;
    create(&app, &token, holding("VTI", 99.0, "Brokerage")).await;

    let (status, body) = send(&app, request("GET", "/holdings/account/ira", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["found"], 2);
    assert_eq!(body["summary"]["totalCost"], 17.75);

    let (status, body) = send(&app, request("GET", "/holdings/account/401k", Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        "No holdings found for the given account pattern"
    );
}

#[tokio::test]
async fn test_invalid_account_pattern_is_server_error() {
    let (app, state) = common::create_test_app();
    let token = common::test_token(&state);
    create(&app, &token, holding("AAPL", 1.0, "Brokerage")).await;

    let (status, body) = send(&app, request("GET", "/holdings/account/(", Some(&token), None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to retrieve holdings");
}
