#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use burnout_review::api::HttpBurnoutApi;

/// Mutable state behind the fake prediction backend.
#[derive(Default)]
pub struct Backend {
    pub employees: Vec<Value>,
    pub departments: Vec<Value>,
    pub pending: Vec<Value>,
    pub details: HashMap<i64, Value>,
    pub history: HashMap<i64, Vec<Value>>,
    pub dashboard_queries: Vec<HashMap<String, String>>,
    pub submissions: Vec<(i64, Value)>,
    pub created_logs: Vec<Value>,
    pub seed_requests: Vec<Value>,
    pub dashboard_status: Option<u16>,
    pub dashboard_delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<Backend>>,
}

impl FakeBackend {
    pub fn state(&self) -> MutexGuard<'_, Backend> {
        self.inner.lock().expect("backend mutex poisoned")
    }

    /// Serves the backend on an ephemeral port and returns a client for it.
    pub async fn spawn(&self) -> HttpBurnoutApi {
        let app = Router::new()
            .route("/dashboard", get(dashboard))
            .route("/departments", get(departments))
            .route("/reviews/pending", get(pending_reviews))
            .route("/reviews/:id", get(review_detail))
            .route("/reviews/:id/submit", post(submit_review))
            .route("/daily-logs/", post(create_log))
            .route("/daily-logs/generate-random", post(generate_random))
            .route("/daily-logs/:id/subsequent", get(subsequent_logs))
            .route("/predictions/train", post(train))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("listener address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend runs");
        });

        HttpBurnoutApi::with_client(reqwest::Client::new(), format!("http://{addr}/"))
    }
}

pub fn employee(id: i64, name: &str, department: &str, status: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "role": "Engineer",
        "department": department,
        "risk_score": 50 + id,
        "status": status,
        "trend": "stable",
        "has_feedback": false,
        "hire_date": "2021-03-01"
    })
}

pub fn prediction(id: i64, daily_log_id: i64) -> Value {
    json!({
        "id": id,
        "daily_log_id": daily_log_id,
        "burnout_risk": "HIGH",
        "burnout_rate": 0.82,
        "confidence_score": 0.87,
        "confidence_percentage": "87.0%",
        "created_at": "2024-01-15T10:30:00"
    })
}

pub fn log_row(id: i64, hours_worked: f64) -> Value {
    json!({
        "id": id,
        "employee_id": 3,
        "log_date": "2024-01-15T00:00:00",
        "hours_worked": hours_worked,
        "hours_slept": 5.5,
        "daily_personal_time": 1.0,
        "motivation_level": 3,
        "stress_level": 8,
        "workload_intensity": 9,
        "overtime_hours_today": 1.5,
        "burnout_risk": "HIGH"
    })
}

/// Adds a pending review `id` whose detail points at `log_id` and whose
/// history has `history_rows` entries.
pub fn add_review(backend: &mut Backend, id: i64, log_id: i64, history_rows: i64) {
    backend.pending.push(prediction(id, log_id));
    backend.details.insert(
        id,
        json!({
            "prediction": prediction(id, log_id),
            "log_data": log_row(log_id, 9.5),
            "confidence_score": 0.87,
            "ai_prediction_type": "HIGH"
        }),
    );
    let mut rows = vec![log_row(log_id, 9.5)];
    rows.extend((1..history_rows).map(|offset| log_row(log_id + offset, 8.0)));
    backend.history.insert(log_id, rows);
}

fn matches(row: &Value, key: &str, filter: Option<&String>) -> bool {
    match filter {
        None => true,
        Some(filter) => row[key]
            .as_str()
            .is_some_and(|value| value.eq_ignore_ascii_case(filter)),
    }
}

async fn dashboard(
    State(backend): State<FakeBackend>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let delay = {
        let mut state = backend.state();
        state.dashboard_queries.push(params.clone());
        if let Some(status) = state.dashboard_status {
            return Err(StatusCode::from_u16(status).expect("valid status"));
        }
        state.dashboard_delay
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let page_size: usize = params
        .get("page_size")
        .and_then(|p| p.parse().ok())
        .unwrap_or(10);

    let state = backend.state();
    let matching: Vec<Value> = state
        .employees
        .iter()
        .filter(|row| {
            matches(row, "department", params.get("department"))
                && matches(row, "status", params.get("status"))
                && matches(row, "trend", params.get("trend"))
        })
        .cloned()
        .collect();
    let total = matching.len();
    let employees: Vec<Value> = matching
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    Ok(Json(json!({
        "summary": {
            "critical_count": 1,
            "monitor_count": 2,
            "stable_count": 3,
            "average_risk_percent": 57
        },
        "employees": employees,
        "total": total,
        "page": page,
        "page_size": page_size,
        "total_pages": total.div_ceil(page_size)
    })))
}

async fn departments(State(backend): State<FakeBackend>) -> Json<Value> {
    Json(Value::Array(backend.state().departments.clone()))
}

async fn pending_reviews(State(backend): State<FakeBackend>) -> Json<Value> {
    Json(Value::Array(backend.state().pending.clone()))
}

async fn review_detail(
    State(backend): State<FakeBackend>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    backend
        .state()
        .details
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Review not found"})),
        ))
}

async fn subsequent_logs(
    State(backend): State<FakeBackend>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, StatusCode> {
    backend
        .state()
        .history
        .get(&id)
        .cloned()
        .map(|rows| Json(Value::Array(rows)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn submit_review(
    State(backend): State<FakeBackend>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut state = backend.state();
    state.submissions.push((id, body));
    let position = state
        .pending
        .iter()
        .position(|review| review["id"] == id)
        .ok_or((
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Prediction is not pending review"})),
        ))?;
    Ok(Json(state.pending.remove(position)))
}

async fn create_log(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> Json<Value> {
    let mut state = backend.state();
    state.created_logs.push(body.clone());
    let mut created = body;
    created["id"] = json!(100 + state.created_logs.len());
    created["burnout_risk"] = json!("LOW");
    Json(created)
}

async fn generate_random(
    State(backend): State<FakeBackend>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let batch_size = body["batch_size"].clone();
    backend.state().seed_requests.push(body);
    Json(json!({ "message": "generated", "count": batch_size }))
}

async fn train() -> Json<Value> {
    Json(json!({ "accuracy": 0.91, "f1_score": 0.88, "samples": 480 }))
}
