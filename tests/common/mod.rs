//! In-process fake of the loan backend for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use loan_console::api::ApiClient;
use loan_console::auth::Session;
use loan_console::config::Config;

pub const TOKEN: &str = "test-token";
pub const SUPER_ADMIN: &str = "admin@loanapp.com";

type Reply = (StatusCode, Json<Value>);

#[derive(Default)]
pub struct FakeState {
    pub loans: Mutex<Vec<Value>>,
    pub history: Mutex<HashMap<String, Vec<Value>>>,
    pub admins: Mutex<Vec<Value>>,
    pub requests: AtomicUsize,
    pub last_query: Mutex<HashMap<String, String>>,
    /// JSON body of the most recent write
    pub last_body: Mutex<Option<Value>>,
    /// (field name, file name, size) of every multipart part received
    pub uploads: Mutex<Vec<(String, String, usize)>>,
}

impl FakeState {
    pub fn with_loans(loans: Vec<Value>) -> Arc<Self> {
        let state = Self::default();
        *state.loans.lock().unwrap() = loans;
        *state.admins.lock().unwrap() = vec![
            admin_json("A0", "Root", SUPER_ADMIN, "approved"),
            admin_json("A1", "Kiran", "kiran@loanapp.com", "approved"),
            admin_json("A2", "Meera", "meera@loanapp.com", "pending"),
        ];
        Arc::new(state)
    }

    /// Replace the stored history of `id`, kept in the given order
    pub fn seed_history(&self, id: &str, entries: Vec<Value>) {
        self.history.lock().unwrap().insert(id.to_string(), entries);
    }

    pub fn loan(&self, id: &str) -> Option<Value> {
        self.loans.lock().unwrap().iter().find(|l| l["_id"] == id).cloned()
    }

    pub fn admin(&self, id: &str) -> Option<Value> {
        self.admins.lock().unwrap().iter().find(|a| a["_id"] == id).cloned()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn status_of(&self, id: &str) -> Option<String> {
        self.loans
            .lock()
            .unwrap()
            .iter()
            .find(|l| l["_id"] == id)
            .and_then(|l| l["status"].as_str().map(str::to_string))
    }
}

pub fn loan_json(id: &str, name: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "status": status,
        "personal_details": { "full_name": name, "email": format!("{}@example.com", id) },
        "financial_details": { "loan_amount": "500000", "annual_income": 1200000, "cibil_score": 720 },
        "asset_details": { "residential_assets_value": 2500000, "bank_asset_value": 300000 },
        "applicationDate": "2024-03-05T10:00:00Z"
    })
}

pub fn admin_json(id: &str, name: &str, email: &str, status: &str) -> Value {
    let active = status == "approved";
    let role = if email == SUPER_ADMIN { "superadmin" } else { "admin" };
    json!({
        "_id": id,
        "name": name,
        "email": email,
        "status": status,
        "isActive": active,
        "role": role
    })
}

pub fn history_json(status: &str, reason: &str, changed_at: &str) -> Value {
    json!({ "status": status, "reason": reason, "adminName": "Kiran", "changedAt": changed_at })
}

fn error(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "success": false, "message": message })))
}

fn authorize(state: &FakeState, headers: &HeaderMap) -> Result<(), Reply> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let expected = format!("Bearer {}", TOKEN);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(error(StatusCode::UNAUTHORIZED, "Invalid or expired token")),
    }
}

async fn list_loans(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    *state.last_query.lock().unwrap() = params.clone();

    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = params.get("limit").and_then(|p| p.parse().ok()).unwrap_or(10);
    let visible: Vec<Value> = state
        .loans
        .lock()
        .unwrap()
        .iter()
        .filter(|l| params.get("status").map_or(true, |s| l["status"] == s.as_str()))
        .filter(|l| {
            params.get("search").map_or(true, |s| {
                l["personal_details"]["full_name"]
                    .as_str()
                    .unwrap_or("")
                    .to_lowercase()
                    .contains(&s.to_lowercase())
            })
        })
        .cloned()
        .collect();

    let total = visible.len();
    let total_pages = (total + limit - 1) / limit;
    let rows: Vec<Value> = visible.into_iter().skip((page - 1) * limit).take(limit).collect();

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "loans": rows,
            "pagination": {
                "currentPage": page,
                "totalPages": total_pages,
                "totalLoans": total,
                "hasNext": page < total_pages,
                "hasPrev": page > 1
            },
            "isSuperAdmin": false
        })),
    )
}

async fn get_loan(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    match state.loans.lock().unwrap().iter().find(|l| l["_id"] == id.as_str()) {
        Some(loan) => (StatusCode::OK, Json(json!({ "success": true, "loan": loan }))),
        None => error(StatusCode::NOT_FOUND, "Loan application not found"),
    }
}

async fn update_status(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    let reason = body["reason"].as_str().unwrap_or("").trim().to_string();
    if reason.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Reason is required for status change");
    }

    let mut loans = state.loans.lock().unwrap();
    let Some(loan) = loans.iter_mut().find(|l| l["_id"] == id.as_str()) else {
        return error(StatusCode::NOT_FOUND, "Loan application not found");
    };
    loan["status"] = body["status"].clone();
    let updated = loan.clone();

    state.history.lock().unwrap().entry(id).or_default().insert(
        0,
        json!({
            "status": body["status"],
            "reason": reason,
            "adminName": "Kiran",
            "changedAt": body["timestamp"]
        }),
    );

    (StatusCode::OK, Json(json!({ "success": true, "loan": updated })))
}

async fn status_history(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    let history = state.history.lock().unwrap().get(&id).cloned().unwrap_or_default();
    (StatusCode::OK, Json(json!({ "success": true, "history": history })))
}

async fn login(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Reply {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if body["password"] != "secret" {
        return error(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    (
        StatusCode::OK,
        Json(json!({
            "token": TOKEN,
            "user": { "_id": "u1", "name": "Kiran", "email": body["email"] }
        })),
    )
}

// ============================================================================
// Assignment, re-evaluation and dashboard endpoints
// ============================================================================

async fn assign(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    *state.last_body.lock().unwrap() = Some(body.clone());

    let assigned = match body["adminId"].as_str() {
        Some(admin_id) => match state.admin(admin_id) {
            Some(admin) => json!({ "_id": admin_id, "name": admin["name"] }),
            None => return error(StatusCode::NOT_FOUND, "Admin not found"),
        },
        None => Value::Null,
    };

    let mut loans = state.loans.lock().unwrap();
    let Some(loan) = loans.iter_mut().find(|l| l["_id"] == id.as_str()) else {
        return error(StatusCode::NOT_FOUND, "Loan application not found");
    };
    loan["assignedAdmin"] = assigned;
    (StatusCode::OK, Json(json!({ "success": true, "message": "Loan assignment updated" })))
}

async fn reevaluate(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    let mut loans = state.loans.lock().unwrap();
    let Some(loan) = loans.iter_mut().find(|l| l["_id"] == id.as_str()) else {
        return error(StatusCode::NOT_FOUND, "Loan application not found");
    };
    loan["eligibility_details"] = json!({
        "ml_prediction": "Eligible",
        "confidence_score": 0.91,
        "model_version": "v2"
    });
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Loan re-evaluated",
            "ml_prediction": { "eligibility_status": "Eligible", "confidence": "0.91" }
        })),
    )
}

async fn assignment_admins(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    let admins: Vec<Value> = state
        .admins
        .lock()
        .unwrap()
        .iter()
        .filter(|a| a["status"] == "approved")
        .cloned()
        .collect();
    (StatusCode::OK, Json(json!({ "success": true, "admins": admins })))
}

async fn statistics(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    let loans = state.loans.lock().unwrap();
    let count = |s: &str| loans.iter().filter(|l| l["status"] == s).count();
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "total_loans": loans.len(),
                "pending": count("Pending"),
                "approved": count("Approved"),
                "rejected": count("Rejected"),
                "not_eligible": count("Not Eligible"),
                "under_review": count("Under Review"),
                "total_amount": (loans.len() * 500_000).to_string()
            }
        })),
    )
}

async fn analytics(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "approvalRate": 50,
                "averageLoanAmount": "500000",
                "monthlyTrends": [{ "month": "2024-03", "count": 4 }]
            }
        })),
    )
}

// ============================================================================
// Admin roster endpoints
// ============================================================================

async fn roster(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    let admins = state.admins.lock().unwrap().clone();
    (StatusCode::OK, Json(json!({ "success": true, "data": admins })))
}

async fn update_admin_status(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    *state.last_body.lock().unwrap() = Some(body.clone());
    let mut admins = state.admins.lock().unwrap();
    let Some(admin) = admins.iter_mut().find(|a| a["_id"] == id.as_str()) else {
        return error(StatusCode::NOT_FOUND, "Admin not found");
    };
    admin["status"] = body["status"].clone();
    (StatusCode::OK, Json(json!({ "success": true, "admin": admin.clone() })))
}

async fn delete_admin(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    let mut admins = state.admins.lock().unwrap();
    let before = admins.len();
    admins.retain(|a| a["_id"] != id.as_str());
    if admins.len() == before {
        return error(StatusCode::NOT_FOUND, "Admin not found");
    }
    (StatusCode::OK, Json(json!({ "success": true, "message": "Admin deleted" })))
}

// ============================================================================
// Applicant and account endpoints
// ============================================================================

async fn register(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Reply {
    state.requests.fetch_add(1, Ordering::SeqCst);
    *state.last_body.lock().unwrap() = Some(body.clone());
    if body["email"].as_str().unwrap_or("").is_empty() {
        return error(StatusCode::BAD_REQUEST, "Email is required");
    }
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "User registered successfully" })),
    )
}

fn profile_json(name: &Value, phone: &Value) -> Value {
    json!({
        "_id": "u1",
        "name": name,
        "email": "kiran@loanapp.com",
        "role": "admin",
        "phone": phone
    })
}

async fn get_profile(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    (
        StatusCode::OK,
        Json(json!({ "success": true, "user": profile_json(&json!("Kiran"), &Value::Null) })),
    )
}

async fn update_profile(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    *state.last_body.lock().unwrap() = Some(body.clone());
    let name = if body["name"].is_null() { json!("Kiran") } else { body["name"].clone() };
    (
        StatusCode::OK,
        Json(json!({ "success": true, "user": profile_json(&name, &body["phone"]) })),
    )
}

async fn user_loan(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    match state.loan(&id) {
        Some(loan) => (StatusCode::OK, Json(json!({ "success": true, "loan": loan }))),
        None => error(StatusCode::NOT_FOUND, "Loan application not found"),
    }
}

async fn apply(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    *state.last_body.lock().unwrap() = Some(body.clone());

    let mut loans = state.loans.lock().unwrap();
    let mut loan = body.clone();
    loan["_id"] = json!(format!("N{}", loans.len() + 1));
    loan["status"] = json!("Pending");
    loans.push(loan.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Loan application submitted", "loan": loan })),
    )
}

async fn upload(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    let mut stored = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().unwrap_or("").to_string();
        let Ok(bytes) = field.bytes().await else {
            return error(StatusCode::BAD_REQUEST, "Unreadable upload");
        };
        state
            .uploads
            .lock()
            .unwrap()
            .push((name.clone(), file_name.clone(), bytes.len()));
        if name == "file" {
            stored = Some(file_name);
        }
    }
    match stored {
        Some(file_name) => (
            StatusCode::OK,
            Json(json!({ "success": true, "fileUrl": format!("/uploads/{}", file_name) })),
        ),
        None => error(StatusCode::BAD_REQUEST, "No file uploaded"),
    }
}

pub fn router(state: Arc<FakeState>) -> Router {
    Router::new()
        .route("/api/loans/admin/all", get(list_loans))
        .route("/api/loans/admin/statistics", get(statistics))
        .route("/api/loans/admin/analytics", get(analytics))
        .route("/api/loans/admin/assignment/admins", get(assignment_admins))
        .route("/api/loans/admin/:id", get(get_loan))
        .route("/api/loans/admin/:id/status", put(update_status))
        .route("/api/loans/admin/:id/status-history", get(status_history))
        .route("/api/loans/admin/:id/assign", put(assign))
        .route("/api/loans/admin/:id/reevaluate", put(reevaluate))
        .route("/admin/all", get(roster))
        .route("/admin/update-status/:id", put(update_admin_status))
        .route("/admin/delete/:id", delete(delete_admin))
        .route("/api/users/login", post(login))
        .route("/api/users/register", post(register))
        .route("/api/auth/profile", get(get_profile).put(update_profile))
        .route("/api/loans/user/:id", get(user_loan))
        .route("/api/loans/apply", post(apply))
        .route("/api/upload", post(upload))
        .with_state(state)
}

/// Serve the fake backend on an ephemeral port and return its base URL
pub async fn spawn(state: Arc<FakeState>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn config(base_url: &str) -> Config {
    Config {
        api_base_url: base_url.to_string(),
        ..Config::default()
    }
}

pub fn admin_session(email: &str) -> Arc<Session> {
    Arc::new(Session::establish(
        Some(TOKEN.to_string()),
        Some(email.to_string()),
        SUPER_ADMIN,
    ))
}

pub fn client(base_url: &str, session: Arc<Session>) -> ApiClient {
    ApiClient::new(&config(base_url), session)
}
