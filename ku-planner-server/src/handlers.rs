use std::{path::PathBuf, sync::Arc};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use ku_planner_core::{Error, prelude::*};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Message returned for any catalog read or parse failure
const CATALOG_ERROR_MESSAGE: &str = "Error retrieving courses data";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub catalog_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: Arc::new(catalog_path.into()),
        }
    }

    /// The catalog is re-read on every request so edits to the file show up immediately
    async fn load_catalog(&self) -> Result<Catalog, AppError> {
        Ok(FileSource::new(self.catalog_path.as_path()).load().await?)
    }
}

/// Health check body
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Error body returned for every failed request
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Schedule sent by a client for layout or export
#[derive(Deserialize)]
struct ScheduleRequest {
    entries: Vec<ScheduleEntry>,
}

impl ScheduleRequest {
    /// Every entry must pass the same checks as an interactive add
    fn into_store(self) -> Result<ScheduleStore, AppError> {
        let mut store = ScheduleStore::new();
        for entry in self.entries {
            store.add(entry)?;
        }
        Ok(store)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportQuery {
    format: Option<String>, // "html" (default) or "ics"
    week_start: Option<NaiveDate>,
    weeks: Option<u32>,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/courses", get(get_courses_handler))
        .route("/courses/search", get(search_courses_handler))
        .route("/schedule/grid", post(grid_handler))
        .route("/schedule/export", post(export_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Service description
async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "KU Planner",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Course catalog and weekly schedule planner",
        "endpoints": {
            "health": "/health",
            "courses": "/courses",
            "search": "/courses/search",
            "grid": "/schedule/grid",
            "export": "/schedule/export"
        }
    }))
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Catalog records, optionally narrowed by faculty and/or course code
async fn get_courses_handler(
    Query(filter): Query<CourseFilter>,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseRecord>>, AppError> {
    let catalog = state.load_catalog().await?;
    let courses = catalog.list_courses(&filter);
    tracing::debug!("{} of {} courses match {:?}", courses.len(), catalog.len(), filter);
    Ok(Json(courses))
}

/// Free-text search over course code and name
async fn search_courses_handler(
    Query(params): Query<SearchQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseRecord>>, AppError> {
    let catalog = state.load_catalog().await?;
    Ok(Json(catalog.search(&params.q)))
}

/// Resolved grid rows for a posted schedule
async fn grid_handler(Json(request): Json<ScheduleRequest>) -> Result<Response, AppError> {
    let store = request.into_store()?;
    let grid = GridView::build(&store);
    let rows = serde_json::to_value(grid.rows()).map_err(|e| Error::Internal(e.to_string()))?;
    Ok(Json(rows).into_response())
}

/// Posted schedule as a downloadable HTML table or calendar file
async fn export_handler(
    Query(params): Query<ExportQuery>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Response, AppError> {
    let store = request.into_store()?;

    let exporter: Box<dyn Exporter + Send> = match params.format.as_deref() {
        Some("ics") => {
            let mut options = IcsOptions {
                weeks: params.weeks.or(IcsOptions::default().weeks),
                ..IcsOptions::default()
            };
            if let Some(week_start) = params.week_start {
                options.week_start = week_start;
            }
            Box::new(IcsExporter::new(options))
        }
        None | Some("html") => Box::new(HtmlTableExporter::default()),
        Some(other) => {
            return Err(AppError(Error::Config(format!(
                "Unsupported export format '{other}'"
            ))));
        }
    };

    let body = exporter.render(&store)?;
    let disposition = format!("attachment; filename=\"{}\"", exporter.file_name());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, exporter.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Core errors mapped onto HTTP statuses
#[derive(Debug)]
struct AppError(Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, message) = if self.0.is_data_error() {
            tracing::error!("Error processing request: {}", self.0);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "catalog unavailable",
                CATALOG_ERROR_MESSAGE.to_string(),
            )
        } else if self.0.is_user_error() {
            (StatusCode::BAD_REQUEST, "invalid schedule", self.0.to_string())
        } else {
            match &self.0 {
                Error::Config(_) => (StatusCode::BAD_REQUEST, "bad request", self.0.to_string()),
                _ => {
                    tracing::error!("Internal error: {}", self.0);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error",
                        self.0.to_string(),
                    )
                }
            }
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use axum::{body::Body, http::Request};
    use tempfile::NamedTempFile;
    use tower::ServiceExt;

    use super::*;

    const CATALOG: &str = r#"[
        {"courseCode":"CS101","courseName":"Intro to Programming","credits":"3","foundation":"","group":"1","day":"M","time":"09:00-10:30","instructor":"A","faculty":"Eng"},
        {"courseCode":"MA101","courseName":"Calculus I","credits":"3","foundation":"","group":"1","day":"Tu","time":"10:30-12:00","instructor":"B","faculty":"Sci"}
    ]"#;

    fn catalog_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec(), disposition)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        let (status, body, _) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn courses_filters_by_faculty() {
        let file = catalog_file(CATALOG);
        let app = || create_app(AppState::new(file.path()));

        let (status, body) = get_json(app(), "/courses?faculty=Eng").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["courseCode"], "CS101");

        let (_, body) = get_json(app(), "/courses?faculty=Art").await;
        assert_eq!(body, serde_json::json!([]));

        let (_, body) = get_json(app(), "/courses").await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, body) = get_json(app(), "/courses?faculty=Sci&courseCode=CS101").await;
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn unreadable_or_malformed_catalog_is_500() {
        let app = create_app(AppState::new("/no/such/ku_courses.json"));
        let (status, body) = get_json(app, "/courses").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], CATALOG_ERROR_MESSAGE);

        let file = catalog_file("{ not json");
        let app = create_app(AppState::new(file.path()));
        let (status, body) = get_json(app, "/courses").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], CATALOG_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn search_matches_names_case_insensitively() {
        let file = catalog_file(CATALOG);
        let app = create_app(AppState::new(file.path()));
        let (status, body) = get_json(app, "/courses/search?q=calc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["courseCode"], "MA101");
    }

    #[tokio::test]
    async fn grid_lays_out_posted_entries() {
        let app = create_app(AppState::new("unused.json"));
        let request = post_json(
            "/schedule/grid",
            serde_json::json!({"entries": [
                {"day": "MON", "startHour": 9, "endHour": 10.5, "courseCode": "CS101", "courseName": "Intro"}
            ]}),
        );

        let (status, body, _) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        let rows: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 7);
        assert_eq!(rows[0]["cells"][0]["span"], 3);
        assert_eq!(rows[0]["cells"][0]["booking"]["courseCode"], "CS101");
    }

    #[tokio::test]
    async fn invalid_entry_is_400() {
        let app = create_app(AppState::new("unused.json"));
        let request = post_json(
            "/schedule/grid",
            serde_json::json!({"entries": [
                {"day": "MON", "startHour": 11, "endHour": 10, "courseCode": "CS101", "courseName": "Intro"}
            ]}),
        );

        let (status, body, _) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], ADD_REJECTED_MESSAGE);
    }

    #[tokio::test]
    async fn export_sets_attachment_name() {
        let entries = serde_json::json!({"entries": [
            {"day": "WED", "startHour": 13, "endHour": 16, "courseCode": "CS201", "courseName": "Data Structures"}
        ]});

        let app = create_app(AppState::new("unused.json"));
        let (status, body, disposition) =
            send(app, post_json("/schedule/export", entries.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            disposition.as_deref(),
            Some("attachment; filename=\"schedule-table.html\"")
        );
        assert!(String::from_utf8(body).unwrap().contains("colspan=\"6\""));

        let app = create_app(AppState::new("unused.json"));
        let (status, body, disposition) = send(
            app,
            post_json(
                "/schedule/export?format=ics&weekStart=2024-06-10&weeks=4",
                entries.clone(),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            disposition.as_deref(),
            Some("attachment; filename=\"schedule.ics\"")
        );
        let ics = String::from_utf8(body).unwrap();
        assert!(ics.contains("DTSTART:20240612T130000"));
        assert!(ics.contains("COUNT=4"));

        let app = create_app(AppState::new("unused.json"));
        let (status, _, _) = send(
            app,
            post_json("/schedule/export?format=ics&weeks=0", entries.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let app = create_app(AppState::new("unused.json"));
        let (status, _, _) = send(app, post_json("/schedule/export?format=png", entries)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
