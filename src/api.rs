// 🌐 HTTP API - shared-state registry behind axum
//
// One `Arc<RwLock<Registry>>` serializes every mutation: POST handlers take
// the write lock, GET handlers the read lock, so reads run concurrently with
// each other but never alongside an insert. Inserts append to the data files
// under the write lock, so they run on the blocking pool.

use crate::entities::{RawCourse, RawEvaluation, RawStudent};
use crate::errors::{self, Conflict, RegistryError};
use crate::grading::{self, StudentStats};
use crate::query::{self, QueryRows};
use crate::ranking::{self, CourseRow, StudentRow};
use crate::registry::{AddOutcome, Registry};
use crate::report;
use crate::transcript::{self, Transcript};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    registry: Arc<RwLock<Registry>>,
    report_limit: usize,
}

impl AppState {
    pub fn new(registry: Registry, report_limit: usize) -> Self {
        AppState {
            registry: Arc::new(RwLock::new(registry)),
            report_limit,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Registry>, ApiError> {
        self.registry.read().map_err(|_| ApiError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Registry>, ApiError> {
        self.registry.write().map_err(|_| ApiError::Poisoned)
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Registry(RegistryError),
    Conflict(Conflict),
    NotFound(&'static str),
    Poisoned,
    TaskFailed,
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        ApiError::Registry(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Registry(RegistryError::Validation(_))
            | ApiError::Registry(RegistryError::Query(_))
            | ApiError::Registry(RegistryError::InvalidLimit)
            | ApiError::Registry(RegistryError::FieldCount(_)) => StatusCode::BAD_REQUEST,
            ApiError::Registry(RegistryError::NotLoaded) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Registry(_) | ApiError::Poisoned | ApiError::TaskFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Registry(e) => e.to_string(),
            ApiError::Conflict(c) => c.to_string(),
            ApiError::NotFound(what) => format!("no {} found", what),
            ApiError::Poisoned => "registry lock poisoned".to_string(),
            ApiError::TaskFailed => "registry task failed".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.message(), "request failed");
        }
        (status, Json(ApiResponse::failure(self.message()))).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub level: &'static str,
    #[serde(flatten)]
    pub stats: StudentStats,
}

#[derive(Debug, Serialize)]
pub struct CourseView {
    pub code: String,
    pub title: String,
    pub credits: u8,
    pub level: &'static str,
}

#[derive(Debug, Serialize)]
pub struct QueryView {
    pub count: usize,
    pub rows: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct CriteriaParams {
    #[serde(default)]
    pub criteria: String,
}

#[derive(Debug, Deserialize)]
pub struct TopParams {
    pub n: Option<String>,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> ApiResult<&'static str> {
    let registry = state.read()?;
    ok(if registry.is_loaded() { "OK" } else { "NOT LOADED" })
}

/// GET /api/students/:id
pub async fn get_student(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StudentView> {
    let registry = state.read()?;
    let student = registry
        .lookup_student(&id)?
        .ok_or(ApiError::NotFound("student"))?;
    let stats = grading::compute_student_stats(&registry, student.id())?;

    ok(StudentView {
        id: student.id().to_string(),
        name: student.name().to_string(),
        surname: student.surname().to_string(),
        email: student.email().map(str::to_string),
        level: student.level().label(),
        stats,
    })
}

/// GET /api/courses/:code
pub async fn get_course(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<CourseView> {
    let registry = state.read()?;
    let course = registry
        .lookup_course(&code)?
        .ok_or(ApiError::NotFound("course"))?;

    ok(CourseView {
        code: course.code().to_string(),
        title: course.title().to_string(),
        credits: course.credits(),
        level: course.level().label(),
    })
}

/// GET /api/query/:entity?criteria=...
pub async fn run_query(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(params): Query<CriteriaParams>,
) -> ApiResult<QueryView> {
    let registry = state.read()?;
    let rows = query::run_query(&registry, &entity, &params.criteria)?;

    let raw = match &rows {
        QueryRows::Students(v) => serde_json::to_value(v.iter().map(|s| s.to_raw()).collect::<Vec<_>>()),
        QueryRows::Courses(v) => serde_json::to_value(v.iter().map(|c| c.to_raw()).collect::<Vec<_>>()),
        QueryRows::Grades(v) => serde_json::to_value(v.iter().map(|e| e.to_raw()).collect::<Vec<_>>()),
    }
    .map_err(RegistryError::from)?;

    ok(QueryView {
        count: rows.count(),
        rows: raw,
    })
}

fn requested_limit(params: &TopParams, cap: usize) -> Result<usize, ApiError> {
    let raw = params.n.as_deref().unwrap_or("10");
    Ok(report::parse_limit(raw, cap)?.n)
}

/// GET /api/top/students?n=
pub async fn top_students(State(state): State<AppState>, Query(params): Query<TopParams>) -> ApiResult<Vec<StudentRow>> {
    let n = requested_limit(&params, state.report_limit)?;
    let registry = state.read()?;
    ok(ranking::top_students(&registry, n)?)
}

/// GET /api/top/courses?n=
pub async fn top_courses(State(state): State<AppState>, Query(params): Query<TopParams>) -> ApiResult<Vec<CourseRow>> {
    let n = requested_limit(&params, state.report_limit)?;
    let registry = state.read()?;
    ok(ranking::top_courses(&registry, n)?)
}

/// GET /api/transcript/:id
pub async fn get_transcript(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Transcript> {
    let registry = state.read()?;
    match transcript::transcript(&registry, &id)? {
        Some(t) => ok(t),
        None => Err(ApiError::NotFound("student")),
    }
}

fn added(outcome: AddOutcome) -> ApiResult<&'static str> {
    match outcome {
        AddOutcome::Added => ok("1 record added"),
        AddOutcome::Rejected(conflict) => Err(ApiError::Conflict(conflict)),
    }
}

/// Run one insert under the write lock on the blocking pool.
async fn mutate<F>(state: AppState, insert: F) -> ApiResult<&'static str>
where
    F: FnOnce(&mut Registry) -> errors::Result<AddOutcome> + Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || -> Result<AddOutcome, ApiError> {
        let mut registry = state.write()?;
        Ok(insert(&mut registry)?)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "insert task failed");
        ApiError::TaskFailed
    })??;

    added(outcome)
}

/// POST /api/students
pub async fn add_student(State(state): State<AppState>, Json(raw): Json<RawStudent>) -> ApiResult<&'static str> {
    mutate(state, move |registry| registry.insert_student(&raw)).await
}

/// POST /api/courses
pub async fn add_course(State(state): State<AppState>, Json(raw): Json<RawCourse>) -> ApiResult<&'static str> {
    mutate(state, move |registry| registry.insert_course(&raw)).await
}

/// POST /api/grades
pub async fn add_grade(State(state): State<AppState>, Json(raw): Json<RawEvaluation>) -> ApiResult<&'static str> {
    mutate(state, move |registry| registry.insert_evaluation(&raw)).await
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/students", post(add_student))
        .route("/students/:id", get(get_student))
        .route("/courses", post(add_course))
        .route("/courses/:code", get(get_course))
        .route("/grades", post(add_grade))
        .route("/query/:entity", get(run_query))
        .route("/top/students", get(top_students))
        .route("/top/courses", get(top_courses))
        .route("/transcript/:id", get(get_transcript))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
