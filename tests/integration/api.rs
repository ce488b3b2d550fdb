//! API round-trip tests driving the router with `tower::ServiceExt`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use rust_decimal_macros::dec;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

use stakebook::api::{build_router, AppState, SharedState};
use stakebook::storage;

fn temp_dir() -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("stakebook_it_{}", uuid::Uuid::new_v4()));
    storage::init(&p).unwrap();
    p
}

fn state_with(dir: &PathBuf) -> SharedState {
    Arc::new(AppState::new(dir.clone(), dec!(100)))
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(state: &SharedState, req: Request<Body>) -> (StatusCode, Value) {
    let resp = build_router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn register_alice(state: &SharedState) {
    let (status, _) = send(
        state,
        post("/api/register", r#"{"username":"alice","password":"pw"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn full_bet_lifecycle_over_http() {
    let dir = temp_dir();
    let state = state_with(&dir);
    register_alice(&state).await;

    // Place a bet
    let (status, bet) = send(
        &state,
        post(
            "/api/users/alice/bets",
            r#"{"placed_at":"2026-03-14","category":"Football","description":"A vs B","bet_kind":"Home W","stake":40.0,"odds":2.0}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = bet["id"].as_u64().unwrap();

    // Reservation shows in available balance, not in raw balance
    let (_, balance) = send(&state, get("/api/users/alice/balance")).await;
    assert_eq!(balance["balance"].as_f64().unwrap(), 100.0);
    assert_eq!(balance["available_balance"].as_f64().unwrap(), 60.0);

    // Resolve as a win
    let (status, resolved) = send(
        &state,
        post(
            &format!("/api/users/alice/bets/{id}/resolve"),
            r#"{"outcome":"win"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "Win");
    assert_eq!(resolved["profit_loss"].as_f64().unwrap(), 40.0);

    // The stake was reserved, never deducted: the win adds 40 profit
    let (_, balance) = send(&state, get("/api/users/alice/balance")).await;
    assert_eq!(balance["balance"].as_f64().unwrap(), 140.0);

    // Resolving again conflicts and changes nothing
    let (status, _) = send(
        &state,
        post(
            &format!("/api/users/alice/bets/{id}/resolve"),
            r#"{"outcome":"loss"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Delete the settled bet: record gone, accounting stays
    let (status, _) = send(&state, delete(&format!("/api/users/alice/bets/{id}"))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, bets) = send(&state, get("/api/users/alice/bets")).await;
    assert_eq!(bets.as_array().unwrap().len(), 0);
    let (_, balance) = send(&state, get("/api/users/alice/balance")).await;
    assert_eq!(balance["balance"].as_f64().unwrap(), 140.0);
}

#[tokio::test]
async fn parlay_over_http() {
    let dir = temp_dir();
    let state = state_with(&dir);
    register_alice(&state).await;

    let (status, bet) = send(
        &state,
        post(
            "/api/users/alice/parlays",
            r#"{
                "stake": 10.0,
                "legs": [
                    {"category":"NBA","description":"Lakers vs Celtics","selection":"Money Line","odds":2.0},
                    {"category":"NHL","description":"Rangers vs Bruins","selection":"Puck Line","odds":1.5}
                ]
            }"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(bet["category"], "Parlay");
    assert_eq!(bet["bet_kind"], "2-Pick Parlay");
    assert_eq!(bet["odds"].as_f64().unwrap(), 3.0);

    // A parlay with a blank leg is rejected atomically
    let (status, body) = send(
        &state,
        post(
            "/api/users/alice/parlays",
            r#"{
                "stake": 10.0,
                "legs": [
                    {"category":"NBA","description":"Lakers vs Celtics","selection":"Money Line","odds":2.0},
                    {"category":"NHL","description":"","selection":"Puck Line","odds":1.5}
                ]
            }"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("leg"));

    let (_, bets) = send(&state, get("/api/users/alice/bets")).await;
    assert_eq!(bets.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn cash_operations_over_http() {
    let dir = temp_dir();
    let state = state_with(&dir);
    register_alice(&state).await;

    let (status, tx) = send(
        &state,
        post(
            "/api/users/alice/deposit",
            r#"{"amount":50.0,"note":"top-up"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tx["kind"], "Deposit");
    assert_eq!(tx["balance_after"].as_f64().unwrap(), 150.0);

    // Overdrawn withdrawal fails and leaves the balance alone
    let (status, _) = send(
        &state,
        post("/api/users/alice/withdraw", r#"{"amount":200.0}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, balance) = send(&state, get("/api/users/alice/balance")).await;
    assert_eq!(balance["balance"].as_f64().unwrap(), 150.0);

    // Withdrawing the exact balance reaches zero
    let (status, _) = send(
        &state,
        post("/api/users/alice/withdraw", r#"{"amount":150.0}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, balance) = send(&state, get("/api/users/alice/balance")).await;
    assert_eq!(balance["balance"].as_f64().unwrap(), 0.0);

    // Starting balance + deposit + withdrawal = 3 transactions
    let (_, txs) = send(&state, get("/api/users/alice/transactions")).await;
    assert_eq!(txs.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn report_over_http() {
    let dir = temp_dir();
    let state = state_with(&dir);
    register_alice(&state).await;

    let (_, a) = send(
        &state,
        post(
            "/api/users/alice/bets",
            r#"{"category":"Football","description":"A vs B","bet_kind":"Home W","stake":10.0,"odds":1.5}"#,
        ),
    )
    .await;
    let (_, b) = send(
        &state,
        post(
            "/api/users/alice/bets",
            r#"{"category":"Football","description":"C vs D","bet_kind":"Away W","stake":10.0,"odds":2.0}"#,
        ),
    )
    .await;

    for (bet, outcome) in [(&a, "win"), (&b, "loss")] {
        let id = bet["id"].as_u64().unwrap();
        send(
            &state,
            post(
                &format!("/api/users/alice/bets/{id}/resolve"),
                &format!(r#"{{"outcome":"{outcome}"}}"#),
            ),
        )
        .await;
    }

    let (status, report) = send(&state, get("/api/users/alice/report")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["summary"]["total_bets"].as_u64().unwrap(), 2);
    assert_eq!(report["summary"]["total_stake"].as_f64().unwrap(), 20.0);
    assert_eq!(report["summary"]["total_profit"].as_f64().unwrap(), -5.0);
    assert_eq!(report["summary"]["roi"].as_f64().unwrap(), -25.0);

    let categories = report["by_category"].as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["category"], "Football");
    assert_eq!(categories[0]["win_rate"].as_f64().unwrap(), 50.0);
}

#[tokio::test]
async fn state_survives_restart() {
    let dir = temp_dir();
    let state = state_with(&dir);
    register_alice(&state).await;

    send(
        &state,
        post(
            "/api/users/alice/bets",
            r#"{"category":"Football","description":"A vs B","bet_kind":"Home W","stake":40.0,"odds":2.0}"#,
        ),
    )
    .await;

    // A fresh AppState over the same directory acts as a restart
    let reopened: SharedState = Arc::new(AppState::new(dir.clone(), dec!(0)));
    let (status, balance) = send(&reopened, get("/api/users/alice/balance")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance["balance"].as_f64().unwrap(), 100.0);
    assert_eq!(balance["available_balance"].as_f64().unwrap(), 60.0);

    let (_, bets) = send(&reopened, get("/api/users/alice/bets?pending=true")).await;
    assert_eq!(bets.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn csv_export_over_http() {
    let dir = temp_dir();
    let state = state_with(&dir);
    register_alice(&state).await;

    send(
        &state,
        post(
            "/api/users/alice/bets",
            r#"{"placed_at":"2026-03-14","category":"Football","description":"A vs B","bet_kind":"Home W","stake":40.0,"odds":2.0}"#,
        ),
    )
    .await;

    let (status, resp) = send(&state, post("/api/users/alice/export", "{}")).await;
    assert_eq!(status, StatusCode::OK);

    let path = resp["path"].as_str().unwrap();
    let csv = std::fs::read_to_string(path).unwrap();
    assert!(csv.starts_with("Date,Sport,Match,Bet Type,Stake,Odds,Result,Profit/Loss"));
    assert!(csv.contains("2026-03-14,Football,A vs B,Home W,40"));
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let dir = temp_dir();
    let state = state_with(&dir);
    register_alice(&state).await;

    let (status, _) = send(
        &state,
        post("/api/login", r#"{"username":"alice","password":"pw"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &state,
        post("/api/login", r#"{"username":"alice","password":"nope"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &state,
        post("/api/login", r#"{"username":"ghost","password":"pw"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let dir = temp_dir();
    let state = state_with(&dir);
    register_alice(&state).await;

    let (status, body) = send(
        &state,
        post("/api/register", r#"{"username":"alice","password":"pw2"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("alice"));
}
