// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tablebook_api::{
    ApiError, CreateTableRequest, CreateTableResponse, DeleteReservationResponse,
    ListReservationsResponse, ListTablesResponse, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse, ReservationDetailResponse, SaveReservationRequest, SaveReservationResponse,
    UpdateProfileRequest, UpdateProfileResponse, WhoAmIResponse,
};
use tablebook_persistence::SqliteStore;
use time::{OffsetDateTime, PrimitiveDateTime};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::session::{MaybeSessionUser, SessionUser};

/// TableBook Server - HTTP server for restaurant table reservations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses an
    /// in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

/// Application state shared across handlers.
///
/// The store is wrapped in a Mutex to serialize access to the single
/// `SQLite` connection.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    store: Arc<Mutex<SqliteStore>>,
}

/// Response body for plain-message endpoints (e.g. logout).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageResponse {
    /// A human-readable outcome.
    message: String,
}

/// Error response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Query parameters for deleting a reservation.
#[derive(Debug, Deserialize)]
struct DeleteQuery {
    /// The caller's answer to the confirmation prompt.
    confirm: Option<bool>,
}

/// Handler for POST `/auth/register`.
async fn handle_register(
    AxumState(state): AxumState<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, HttpError> {
    info!(username = %req.username, "Handling register request");
    let mut store = state.store.lock().await;
    let response: RegisterResponse = tablebook_api::register(&mut store, &req)?;
    Ok(Json(response))
}

/// Handler for POST `/auth/login`.
async fn handle_login(
    AxumState(state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    info!(username = %req.username, "Handling login request");
    let mut store = state.store.lock().await;
    let response: LoginResponse = tablebook_api::login(&mut store, &req)?;
    Ok(Json(response))
}

/// Handler for POST `/auth/logout`.
async fn handle_logout(
    AxumState(state): AxumState<AppState>,
    user: SessionUser,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut store = state.store.lock().await;
    tablebook_api::logout(&mut store, &user.token)?;
    Ok(Json(MessageResponse {
        message: String::from("Logged out"),
    }))
}

/// Handler for GET `/auth/whoami`.
async fn handle_whoami(user: SessionUser) -> Json<WhoAmIResponse> {
    Json(tablebook_api::whoami(&user.account))
}

/// Handler for PUT `/auth/profile`.
async fn handle_update_profile(
    AxumState(state): AxumState<AppState>,
    user: SessionUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, HttpError> {
    let mut store = state.store.lock().await;
    let response: UpdateProfileResponse =
        tablebook_api::update_profile(&mut store, user.identity.id, &req)?;
    Ok(Json(response))
}

/// Handler for GET `/tables`.
async fn handle_list_tables(
    AxumState(state): AxumState<AppState>,
) -> Result<Json<ListTablesResponse>, HttpError> {
    let mut store = state.store.lock().await;
    let response: ListTablesResponse = tablebook_api::list_tables(&mut store)?;
    Ok(Json(response))
}

/// Handler for POST `/tables`.
async fn handle_create_table(
    AxumState(state): AxumState<AppState>,
    user: SessionUser,
    Json(req): Json<CreateTableRequest>,
) -> Result<Json<CreateTableResponse>, HttpError> {
    let mut store = state.store.lock().await;
    let response: CreateTableResponse =
        tablebook_api::create_table(&mut store, &user.identity, &req)?;
    Ok(Json(response))
}

/// Handler for GET `/reservations`.
async fn handle_list_reservations(
    AxumState(state): AxumState<AppState>,
    user: SessionUser,
) -> Result<Json<ListReservationsResponse>, HttpError> {
    let mut store = state.store.lock().await;
    let response: ListReservationsResponse =
        tablebook_api::list_reservations(&mut store, &user.identity)?;
    Ok(Json(response))
}

/// Handler for GET `/reservations/{id}`.
///
/// Anonymous callers may view; `id == 0` (the new-reservation form)
/// requires a session.
async fn handle_reservation_detail(
    AxumState(state): AxumState<AppState>,
    MaybeSessionUser(user): MaybeSessionUser,
    Path(reservation_id): Path<i64>,
) -> Result<Json<ReservationDetailResponse>, HttpError> {
    let mut store = state.store.lock().await;
    let identity = user.as_ref().map(|u| &u.identity);
    let response: ReservationDetailResponse =
        tablebook_api::reservation_detail(&mut store, identity, reservation_id)?;
    Ok(Json(response))
}

/// Handler for POST `/reservations` (create when `reservation_id == 0`,
/// update otherwise).
async fn handle_save_reservation(
    AxumState(state): AxumState<AppState>,
    MaybeSessionUser(user): MaybeSessionUser,
    Json(req): Json<SaveReservationRequest>,
) -> Result<Json<SaveReservationResponse>, HttpError> {
    let mut store = state.store.lock().await;
    let identity = user.as_ref().map(|u| &u.identity);
    let response: SaveReservationResponse =
        tablebook_api::save_reservation(&mut store, identity, &req)?;
    Ok(Json(response))
}

/// Handler for DELETE `/reservations/{id}`.
async fn handle_delete_reservation(
    AxumState(state): AxumState<AppState>,
    user: SessionUser,
    Path(reservation_id): Path<i64>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeleteReservationResponse>, HttpError> {
    let mut store = state.store.lock().await;
    let response: DeleteReservationResponse = tablebook_api::delete_reservation(
        &mut store,
        Some(&user.identity),
        reservation_id,
        query.confirm.unwrap_or(false),
    )?;
    Ok(Json(response))
}

/// Builds the application router.
fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(handle_register))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/whoami", get(handle_whoami))
        .route("/auth/profile", put(handle_update_profile))
        .route("/tables", get(handle_list_tables).post(handle_create_table))
        .route(
            "/reservations",
            get(handle_list_reservations).post(handle_save_reservation),
        )
        .route(
            "/reservations/{id}",
            get(handle_reservation_detail).delete(handle_delete_reservation),
        )
        .with_state(state)
}

/// The current instant, as stored (UTC, no offset).
fn now_utc() -> PrimitiveDateTime {
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Args = Args::parse();

    let mut store: SqliteStore = match &args.database {
        Some(path) => SqliteStore::open(FsPath::new(path))?,
        None => {
            info!("No database path provided; using an in-memory database");
            SqliteStore::open_in_memory()?
        }
    };
    store.purge_expired_sessions(now_utc())?;

    let state: AppState = AppState {
        store: Arc::new(Mutex::new(store)),
    };
    let app: Router = build_router(state);

    let addr: String = format!("0.0.0.0:{}", args.port);
    let listener: tokio::net::TcpListener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "tablebook-server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tablebook_domain::DATE_FORMAT;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let mut store: SqliteStore = SqliteStore::open_in_memory().unwrap();
        store.insert_table("Window 1", 2).unwrap();
        store.insert_table("Booth 4", 6).unwrap();
        build_router(AppState {
            store: Arc::new(Mutex::new(store)),
        })
    }

    async fn request(
        app: &Router,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request: Request<Body> = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status: StatusCode = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn register(app: &Router, username: &str, role: &str) {
        let (status, _body) = request(
            app,
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "Sup3rSecret!",
                "confirm_password": "Sup3rSecret!",
                "role": role,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    async fn login(app: &Router, username: &str) -> String {
        let (status, body) = request(
            app,
            "POST",
            "/auth/login",
            None,
            Some(json!({"username": username, "password": "Sup3rSecret!"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    fn tomorrow() -> String {
        OffsetDateTime::now_utc()
            .date()
            .next_day()
            .unwrap()
            .format(DATE_FORMAT)
            .unwrap()
    }

    fn save_body(reservation_id: i64, table_id: i64) -> Value {
        json!({
            "reservation_id": reservation_id,
            "table_id": table_id,
            "date": tomorrow(),
            "start_time": "18:00",
            "end_time": "20:00",
            "status": "Pending",
        })
    }

    #[tokio::test]
    async fn test_register_login_reserve_and_delete_flow() {
        let app: Router = test_app();
        register(&app, "alice", "Customer").await;
        let token: String = login(&app, "alice").await;

        let (status, body) = request(
            &app,
            "POST",
            "/reservations",
            Some(&token),
            Some(save_body(0, 1)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Reservation created");

        let (status, body) = request(&app, "GET", "/reservations", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let id: i64 = body["reservations"][0]["reservation_id"].as_i64().unwrap();

        let (status, body) = request(
            &app,
            "GET",
            &format!("/reservations/{id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_existing"], true);
        assert_eq!(body["draft"]["status"], "Pending");
        assert_eq!(body["permissions"]["can_manage"], true);
        assert_eq!(body["gates"]["can_delete"], true);

        let (status, body) = request(
            &app,
            "DELETE",
            &format!("/reservations/{id}?confirm=true"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], true);

        let (status, _body) = request(
            &app,
            "GET",
            &format!("/reservations/{id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_anonymous_creation_is_unauthorized() {
        let app: Router = test_app();

        let (status, _body) =
            request(&app, "POST", "/reservations", None, Some(save_body(0, 1))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected() {
        let app: Router = test_app();

        let (status, _body) =
            request(&app, "GET", "/auth/whoami", Some("bogus-token"), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_anonymous_viewing_is_allowed() {
        let app: Router = test_app();
        register(&app, "alice", "Customer").await;
        let token: String = login(&app, "alice").await;
        request(
            &app,
            "POST",
            "/reservations",
            Some(&token),
            Some(save_body(0, 1)),
        )
        .await;

        let (status, body) = request(&app, "GET", "/reservations/1", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["permissions"]["can_manage"], false);
        assert_eq!(body["gates"]["can_save"], false);
    }

    #[tokio::test]
    async fn test_double_booking_returns_conflict() {
        let app: Router = test_app();
        register(&app, "alice", "Customer").await;
        register(&app, "bob", "Customer").await;
        let alice: String = login(&app, "alice").await;
        let bob: String = login(&app, "bob").await;

        let (status, _body) = request(
            &app,
            "POST",
            "/reservations",
            Some(&alice),
            Some(save_body(0, 1)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _body) = request(
            &app,
            "POST",
            "/reservations",
            Some(&bob),
            Some(save_body(0, 1)),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_foreign_customer_cannot_edit() {
        let app: Router = test_app();
        register(&app, "alice", "Customer").await;
        register(&app, "bob", "Customer").await;
        let alice: String = login(&app, "alice").await;
        let bob: String = login(&app, "bob").await;
        request(
            &app,
            "POST",
            "/reservations",
            Some(&alice),
            Some(save_body(0, 1)),
        )
        .await;

        let (status, _body) = request(
            &app,
            "POST",
            "/reservations",
            Some(&bob),
            Some(save_body(1, 1)),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_validation_failure_returns_unprocessable() {
        let app: Router = test_app();
        register(&app, "alice", "Customer").await;
        let token: String = login(&app, "alice").await;
        let mut body: Value = save_body(0, 1);
        body["start_time"] = json!("20:00");
        body["end_time"] = json!("18:00");

        let (status, body) =
            request(&app, "POST", "/reservations", Some(&token), Some(body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_table_creation_requires_staff() {
        let app: Router = test_app();
        register(&app, "alice", "Customer").await;
        register(&app, "stan", "Staff").await;
        let alice: String = login(&app, "alice").await;
        let stan: String = login(&app, "stan").await;
        let body: Value = json!({"name": "Patio 1", "capacity": 4});

        let (status, _body) =
            request(&app, "POST", "/tables", Some(&alice), Some(body.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _body) = request(&app, "POST", "/tables", Some(&stan), Some(body)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = request(&app, "GET", "/tables", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tables"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_declined_confirmation_leaves_reservation() {
        let app: Router = test_app();
        register(&app, "alice", "Customer").await;
        let token: String = login(&app, "alice").await;
        request(
            &app,
            "POST",
            "/reservations",
            Some(&token),
            Some(save_body(0, 1)),
        )
        .await;

        let (status, body) =
            request(&app, "DELETE", "/reservations/1", Some(&token), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], false);

        let (status, _body) = request(&app, "GET", "/reservations/1", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_logout_invalidates_the_session() {
        let app: Router = test_app();
        register(&app, "alice", "Customer").await;
        let token: String = login(&app, "alice").await;

        let (status, _body) = request(&app, "POST", "/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _body) = request(&app, "GET", "/auth/whoami", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_update_round_trip() {
        let app: Router = test_app();
        register(&app, "alice", "Customer").await;
        let token: String = login(&app, "alice").await;

        let (status, body) = request(
            &app,
            "PUT",
            "/auth/profile",
            Some(&token),
            Some(json!({
                "username": "alice-v2",
                "email": "Alice.V2@Example.com",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice-v2");
        assert_eq!(body["email"], "alice.v2@example.com");

        let (status, body) = request(&app, "GET", "/auth/whoami", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice-v2");
    }
}
