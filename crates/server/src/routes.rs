//! API route definitions

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use didyoumean::errors::SearchError;
use didyoumean::search::{SearchEngine, SearchRequest, SearchResult};
use didyoumean::storage::IssueStore;

/// Header carrying the authenticated login, set by the fronting proxy
pub const REMOTE_USER_HEADER: &str = "x-remote-user";

/// Shared application state
pub type AppState<S> = Arc<SearchEngine<S>>;

/// Create API routes
pub fn create_routes<S: IssueStore + 'static>(engine: Arc<SearchEngine<S>>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/search_issues", get(search_issues))
        .with_state(engine)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "didyoumean-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Suggest issues matching `query`
async fn search_issues<S: IssueStore + 'static>(
    State(engine): State<AppState<S>>,
    headers: HeaderMap,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResult>, StatusCode> {
    let login = headers
        .get(REMOTE_USER_HEADER)
        .and_then(|value| value.to_str().ok());
    let caller = engine.users().caller(login);

    engine
        .search(&request, &caller)
        .map(Json)
        .map_err(|e| {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!("Search failed for [{}]: {:?}", request.query, e);
            } else {
                tracing::debug!("Rejected search for [{}]: {}", request.query, e);
            }
            status
        })
}

fn status_for(error: &anyhow::Error) -> StatusCode {
    match error.downcast_ref::<SearchError>() {
        Some(SearchError::ProjectNotFound(_)) => StatusCode::NOT_FOUND,
        Some(SearchError::InvalidIssueId(_)) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};
    use axum_test::TestServer;
    use didyoumean::domain::{Issue, IssueStatus, Project, ProjectStatus, Tracker};
    use didyoumean::storage::{InMemoryStorage, Snapshot};
    use didyoumean::tokenizer::NoNounExtractor;

    fn create_test_app() -> TestServer {
        let storage = InMemoryStorage::from_snapshot(Snapshot {
            projects: vec![
                Project {
                    id: 1,
                    identifier: "web".to_string(),
                    name: "Web".to_string(),
                    parent_id: None,
                    status: ProjectStatus::Active,
                    is_public: true,
                },
                Project {
                    id: 2,
                    identifier: "internal".to_string(),
                    name: "Internal".to_string(),
                    parent_id: None,
                    status: ProjectStatus::Active,
                    is_public: false,
                },
            ],
            trackers: vec![Tracker {
                id: 1,
                name: "Bug".to_string(),
            }],
            statuses: vec![IssueStatus {
                id: 1,
                name: "New".to_string(),
                is_closed: false,
            }],
            issues: vec![
                Issue {
                    id: 1,
                    project_id: 1,
                    tracker_id: 1,
                    status_id: 1,
                    subject: "Login fails".to_string(),
                },
                Issue {
                    id: 2,
                    project_id: 2,
                    tracker_id: 1,
                    status_id: 1,
                    subject: "Login audit".to_string(),
                },
            ],
        });
        let config = toml_config("[[users]]\nlogin = \"alice\"\nprojects = [2]\n");
        let engine = SearchEngine::new(Arc::new(storage), Arc::new(NoNounExtractor), config);
        TestServer::new(create_routes(Arc::new(engine))).unwrap()
    }

    fn toml_config(content: &str) -> didyoumean::config::SearchConfig {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), content).unwrap();
        didyoumean::config::SearchConfig::load(dir.path()).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = create_test_app();
        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({
            "status": "ok",
            "service": "didyoumean-api",
            "version": env!("CARGO_PKG_VERSION")
        }));
    }

    #[tokio::test]
    async fn test_search_anonymous() {
        let server = create_test_app();
        let response = server.get("/search_issues?query=login").await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({
            "total": 1,
            "issues": [{
                "id": 1,
                "tracker_name": "Bug",
                "subject": "Login fails",
                "status_name": "New",
                "project_name": "Web"
            }]
        }));
    }

    #[tokio::test]
    async fn test_search_as_member() {
        let server = create_test_app();
        let response = server
            .get("/search_issues?query=login")
            .add_header(
                HeaderName::from_static(REMOTE_USER_HEADER),
                HeaderValue::from_static("alice"),
            )
            .await;
        response.assert_status_ok();
        let result: SearchResult = response.json();
        assert_eq!(result.total, 2);
        assert_eq!(result.issues[0].id, 2);
    }

    #[tokio::test]
    async fn test_missing_query_is_empty_result() {
        let server = create_test_app();
        let response = server.get("/search_issues").await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({"total": 0, "issues": []}));
    }

    #[tokio::test]
    async fn test_unknown_project_not_found() {
        let server = create_test_app();
        let response = server
            .get("/search_issues?query=login&project_id=nope")
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_issue_id_bad_request() {
        let server = create_test_app();
        let response = server
            .get("/search_issues?query=login&issue_id=abc")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_for_other_errors() {
        assert_eq!(
            status_for(&anyhow::anyhow!("store unavailable")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
