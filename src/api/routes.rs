//! API route handlers.
//!
//! All endpoints speak JSON. State is shared via `Arc<AppState>`; each
//! user's ledger sits behind its own `Mutex`, so the check → mutate →
//! save sequence of every operation is serialized per user.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use crate::auth;
use crate::ledger::{reporting, UserLedger};
use crate::storage::{self, UserRecord};
use crate::types::{Bet, BetSlip, LedgerError, Outcome, ParlayLeg, Transaction};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct AppState {
    data_dir: PathBuf,
    starting_balance: Decimal,
    users: RwLock<HashMap<String, Arc<Mutex<UserRecord>>>>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(data_dir: PathBuf, starting_balance: Decimal) -> Self {
        Self {
            data_dir,
            starting_balance,
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch a user's record handle, loading it from disk on first use.
    /// The username is validated before it ever reaches a file path.
    async fn user(&self, username: &str) -> Result<Arc<Mutex<UserRecord>>, ApiError> {
        auth::validate_username(username)?;

        if let Some(entry) = self.users.read().await.get(username) {
            return Ok(entry.clone());
        }

        let record = storage::load_user(&self.data_dir, username)
            .map_err(|e| LedgerError::Storage(e.to_string()))?
            .ok_or_else(|| LedgerError::UnknownUser(username.to_string()))?;

        let mut users = self.users.write().await;
        // A concurrent request may have loaded it first.
        let entry = users
            .entry(username.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(record)))
            .clone();
        Ok(entry)
    }

    async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        auth::validate_username(username)?;
        auth::validate_password(password)?;

        let mut users = self.users.write().await;
        if users.contains_key(username) || storage::user_exists(&self.data_dir, username) {
            return Err(LedgerError::UserExists(username.to_string()).into());
        }

        let mut record = UserRecord {
            username: username.to_string(),
            password_hash: auth::hash_password(username, password),
            ledger: UserLedger::new(username),
        };
        if self.starting_balance > Decimal::ZERO {
            record
                .ledger
                .deposit(self.starting_balance, Some("starting balance".to_string()))?;
        }

        storage::save_user(&self.data_dir, &record)
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        users.insert(username.to_string(), Arc::new(Mutex::new(record)));

        info!(user = username, "User registered");
        Ok(())
    }

    /// Run one ledger operation for a user and persist the result.
    /// A failed save is reported, but the in-memory mutation is kept so
    /// the next successful save will carry it.
    async fn with_user<T>(
        &self,
        username: &str,
        op: impl FnOnce(&mut UserLedger) -> Result<T, LedgerError>,
    ) -> Result<T, ApiError> {
        let entry = self.user(username).await?;
        let mut record = entry.lock().await;
        let out = op(&mut record.ledger)?;

        if let Err(e) = storage::save_user(&self.data_dir, &record) {
            error!(user = username, error = %e, "Save failed; in-memory state retained");
            return Err(LedgerError::Storage(e.to_string()).into());
        }
        Ok(out)
    }

    /// Read-only access to a user's ledger.
    async fn read_user<T>(
        &self,
        username: &str,
        op: impl FnOnce(&UserLedger) -> T,
    ) -> Result<T, ApiError> {
        let entry = self.user(username).await?;
        let record = entry.lock().await;
        Ok(op(&record.ledger))
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Wraps `LedgerError` for axum, mapping each variant to a status code.
#[derive(Debug)]
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
            LedgerError::NotFound(_) | LedgerError::UnknownUser(_) => StatusCode::NOT_FOUND,
            LedgerError::InvalidState { .. } | LedgerError::UserExists(_) => StatusCode::CONFLICT,
            LedgerError::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::AuthFailed => StatusCode::UNAUTHORIZED,
            LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorBody {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
pub struct PlaceBetRequest {
    /// Defaults to today when omitted.
    pub placed_at: Option<NaiveDate>,
    pub category: String,
    pub description: String,
    pub bet_kind: String,
    pub stake: Decimal,
    pub odds: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct PlaceParlayRequest {
    pub placed_at: Option<NaiveDate>,
    pub stake: Decimal,
    pub legs: Vec<ParlayLeg>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub outcome: Outcome,
}

#[derive(Debug, Deserialize)]
pub struct CashRequest {
    pub amount: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: Decimal,
    pub available_balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub summary: reporting::Summary,
    pub by_category: Vec<reporting::CategoryStats>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub path: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    #[serde(default)]
    pub pending: bool,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// POST /api/register
pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<OkResponse>), ApiError> {
    state.register(&req.username, &req.password).await?;
    Ok((StatusCode::CREATED, Json(OkResponse { ok: true })))
}

/// POST /api/login
pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let entry = match state.user(&req.username).await {
        Ok(entry) => entry,
        // Don't leak which usernames exist
        Err(_) => return Err(LedgerError::AuthFailed.into()),
    };
    let record = entry.lock().await;
    if auth::verify_password(&record.password_hash, &req.username, &req.password) {
        Ok(Json(OkResponse { ok: true }))
    } else {
        Err(LedgerError::AuthFailed.into())
    }
}

/// POST /api/users/:username/bets
pub async fn place_bet(
    State(state): State<SharedState>,
    Path(username): Path<String>,
    Json(req): Json<PlaceBetRequest>,
) -> Result<(StatusCode, Json<Bet>), ApiError> {
    let slip = BetSlip {
        placed_at: req.placed_at.unwrap_or_else(|| Utc::now().date_naive()),
        category: req.category,
        description: req.description,
        bet_kind: req.bet_kind,
        stake: req.stake,
        odds: req.odds,
    };
    let bet = state.with_user(&username, |l| l.place_bet(slip)).await?;
    Ok((StatusCode::CREATED, Json(bet)))
}

/// POST /api/users/:username/parlays
pub async fn place_parlay(
    State(state): State<SharedState>,
    Path(username): Path<String>,
    Json(req): Json<PlaceParlayRequest>,
) -> Result<(StatusCode, Json<Bet>), ApiError> {
    let placed_at = req.placed_at.unwrap_or_else(|| Utc::now().date_naive());
    let bet = state
        .with_user(&username, |l| l.place_parlay(&req.legs, req.stake, placed_at))
        .await?;
    Ok((StatusCode::CREATED, Json(bet)))
}

/// POST /api/users/:username/bets/:id/resolve
pub async fn resolve_bet(
    State(state): State<SharedState>,
    Path((username, id)): Path<(String, u64)>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<Bet>, ApiError> {
    let bet = state
        .with_user(&username, |l| l.resolve_bet(id, req.outcome))
        .await?;
    Ok(Json(bet))
}

/// DELETE /api/users/:username/bets/:id
pub async fn delete_bet(
    State(state): State<SharedState>,
    Path((username, id)): Path<(String, u64)>,
) -> Result<Json<Bet>, ApiError> {
    let bet = state.with_user(&username, |l| l.delete_bet(id)).await?;
    Ok(Json(bet))
}

/// GET /api/users/:username/bets[?pending=true]
pub async fn list_bets(
    State(state): State<SharedState>,
    Path(username): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Bet>>, ApiError> {
    let bets = state
        .read_user(&username, |l| {
            if params.pending {
                l.bets().list_pending().cloned().collect()
            } else {
                l.bets().list_all()
            }
        })
        .await?;
    Ok(Json(bets))
}

/// POST /api/users/:username/deposit
pub async fn deposit(
    State(state): State<SharedState>,
    Path(username): Path<String>,
    Json(req): Json<CashRequest>,
) -> Result<Json<Transaction>, ApiError> {
    let tx = state
        .with_user(&username, |l| l.deposit(req.amount, req.note))
        .await?;
    Ok(Json(tx))
}

/// POST /api/users/:username/withdraw
pub async fn withdraw(
    State(state): State<SharedState>,
    Path(username): Path<String>,
    Json(req): Json<CashRequest>,
) -> Result<Json<Transaction>, ApiError> {
    let tx = state
        .with_user(&username, |l| l.withdraw(req.amount, req.note))
        .await?;
    Ok(Json(tx))
}

/// GET /api/users/:username/balance
pub async fn balance(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let resp = state
        .read_user(&username, |l| BalanceResponse {
            balance: l.bankroll().balance(),
            available_balance: l.available_balance(),
        })
        .await?;
    Ok(Json(resp))
}

/// GET /api/users/:username/transactions
pub async fn transactions(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let txs = state
        .read_user(&username, |l| l.bankroll().transactions().to_vec())
        .await?;
    Ok(Json(txs))
}

/// GET /api/users/:username/report
pub async fn report(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Result<Json<ReportResponse>, ApiError> {
    let resp = state
        .read_user(&username, |l| ReportResponse {
            summary: reporting::summarize(l.bets()),
            by_category: reporting::by_category(l.bets()),
        })
        .await?;
    Ok(Json(resp))
}

/// POST /api/users/:username/export
pub async fn export(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Result<Json<ExportResponse>, ApiError> {
    let entry = state.user(&username).await?;
    let record = entry.lock().await;
    let path = storage::export_csv(&state.data_dir, &record.ledger)
        .map_err(|e| LedgerError::Storage(e.to_string()))?;
    Ok(Json(ExportResponse {
        path: path.display().to_string(),
    }))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
