use std::collections::HashMap;

use crate::app::AppState;
use crate::error::{AppError, AppResult};
use crate::form::{FieldMap, SubmitEvent};
use crate::models::{HealthResponse, LoanSchemes};
use crate::session::{session_cookie, session_id};
use crate::submission::SubmissionOutcome;
use axum::{
    extract::{Form, State},
    http::{HeaderMap, HeaderValue, header::SET_COOKIE},
    response::{Html, IntoResponse, Json as ResponseJson, Response},
};
use tracing::{debug, info};

const FORM_PAGE: &str = include_str!("../static/index.html");

/// Health check handler
/// Returns the service status and health information
pub async fn health_check() -> AppResult<ResponseJson<HealthResponse>> {
    debug!("Health check endpoint called");

    let response = HealthResponse::ok();

    info!("Health check successful");
    Ok(ResponseJson(response))
}

/// Serves the evaluation form
pub async fn form_page() -> Html<&'static str> {
    Html(FORM_PAGE)
}

/// Runs one submission cycle for a posted form and returns the session's
/// result display as an HTML fragment.
///
/// Submissions are scoped to the browser session named by the session
/// cookie; a request without a live session gets a new one and a
/// `Set-Cookie`. When a newer submission from the same session overtook this
/// one, the fragment shows that session's current display instead of the
/// stale result.
pub async fn submit_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(fields): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    info!("Submit endpoint called with {} fields", fields.len());

    let session = state.sessions.checkout(session_id(&headers).as_deref());
    let form = FieldMap::new(fields);
    let mut event = SubmitEvent::new();
    let outcome = session.controller.submit(&mut event, &form).await?;

    let fragment = match outcome {
        SubmissionOutcome::Rendered(rendered) => rendered.to_html(),
        SubmissionOutcome::Superseded => {
            info!("Submission superseded by a newer one in the same session");
            session.controller.display().html()
        }
    };

    let mut response = Html(fragment).into_response();
    if session.issued {
        let cookie = HeaderValue::from_str(&session_cookie(&session.id)).map_err(|e| {
            AppError::InternalServerError(format!("invalid session cookie: {}", e))
        })?;
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    Ok(response)
}

/// Current content of the session's result display; empty without a session
pub async fn result_handler(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let html = session_id(&headers)
        .and_then(|id| state.sessions.get(&id))
        .map(|controller| controller.display().html())
        .unwrap_or_default();
    Html(html)
}

/// Loan schemes offered by the evaluator
pub async fn schemes_handler(State(state): State<AppState>) -> AppResult<ResponseJson<LoanSchemes>> {
    let schemes = state.sessions.client().schemes().await?;
    info!("Fetched {} loan categories", schemes.len());
    Ok(ResponseJson(schemes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EvaluationClient;
    use crate::config::Config;
    use crate::form::FieldId;
    use crate::session::Sessions;
    use axum::http::header::COOKIE;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state_for(server: &MockServer) -> AppState {
        let config = Config::default().with_evaluator_url(server.uri());
        let client = EvaluationClient::new(&config).unwrap();
        AppState::new(Sessions::new(client, config.session_idle()))
    }

    fn posted_fields(loan_type: &str) -> HashMap<String, String> {
        let mut fields: HashMap<String, String> = FieldId::ALL
            .iter()
            .filter(|f| !f.is_checkbox())
            .map(|f| (f.id().to_string(), "5".to_string()))
            .collect();
        fields.insert("loan-type".to_string(), loan_type.to_string());
        fields.insert("is-srilankan".to_string(), "on".to_string());
        fields
    }

    /// Evaluator answer for one loan type, delivered after `delay_ms`.
    async fn mount_evaluation(server: &MockServer, loan_type: &str, category: &str, delay_ms: u64) {
        Mock::given(method("POST"))
            .and(path("/evaluate"))
            .and(body_partial_json(json!({ "loanType": loan_type })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(delay_ms))
                    .set_body_json(json!({
                        "diagnosis": "Rejected",
                        "category": category,
                        "details": [format!("detail for {}", category)],
                    })),
            )
            .mount(server)
            .await;
    }

    async fn submit(state: &AppState, cookie: Option<&HeaderMap>, loan_type: &str) -> Response {
        let headers = cookie.cloned().unwrap_or_default();
        submit_handler(State(state.clone()), headers, Form(posted_fields(loan_type)))
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Request headers carrying the session cookie a response issued.
    fn cookie_from(response: &Response) -> HeaderMap {
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .expect("session cookie issued")
            .to_str()
            .unwrap();
        let pair = set_cookie.split(';').next().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(pair).unwrap());
        headers
    }

    #[tokio::test]
    async fn test_health_check() {
        let result = health_check().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_form_page_has_every_control() {
        let Html(page) = form_page().await;
        for field in FieldId::ALL {
            assert!(
                page.contains(&format!(r#"id="{}""#, field.id())),
                "missing control {}",
                field.id()
            );
        }
        assert!(page.contains(r#"id="result-display""#));
    }

    #[tokio::test]
    async fn test_form_page_renders_failed_submissions_as_error_view() {
        let Html(page) = form_page().await;
        assert!(page.contains("response.ok"));
        assert!(page.contains(".message"));
        assert!(page.contains("Connection Error: "));
        assert!(page.contains("submission === latest"));
    }

    #[tokio::test]
    async fn test_submit_renders_evaluation_and_issues_session() {
        let server = MockServer::start().await;
        mount_evaluation(&server, "Housing", "High Risk", 0).await;
        let state = state_for(&server);

        let response = submit(&state, None, "Housing").await;
        let cookie = cookie_from(&response);
        let fragment = body_text(response).await;

        assert!(fragment.contains("badge-rejected"));
        assert!(fragment.contains("<li>detail for High Risk</li>"));

        let Html(current) = result_handler(State(state.clone()), cookie).await;
        assert_eq!(current, fragment);

        let Html(anonymous) = result_handler(State(state), HeaderMap::new()).await;
        assert_eq!(anonymous, "");
    }

    #[tokio::test]
    async fn test_known_session_is_reused() {
        let server = MockServer::start().await;
        mount_evaluation(&server, "first", "First", 0).await;
        mount_evaluation(&server, "second", "Second", 0).await;
        let state = state_for(&server);

        let first = submit(&state, None, "first").await;
        let cookie = cookie_from(&first);
        let second = submit(&state, Some(&cookie), "second").await;

        assert!(second.headers().get(SET_COOKIE).is_none());
        assert_eq!(state.sessions.len(), 1);
        let Html(current) = result_handler(State(state), cookie).await;
        assert!(current.contains("Second"));
    }

    #[tokio::test]
    async fn test_concurrent_clients_only_see_their_own_result() {
        let server = MockServer::start().await;
        mount_evaluation(&server, "A", "UserA", 400).await;
        mount_evaluation(&server, "B", "UserB", 50).await;
        let state = state_for(&server);

        let (a, b) = tokio::join!(submit(&state, None, "A"), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            submit(&state, None, "B").await
        });
        let (a_cookie, b_cookie) = (cookie_from(&a), cookie_from(&b));
        let (a, b) = (body_text(a).await, body_text(b).await);

        assert!(a.contains("UserA"), "client A got: {a}");
        assert!(!a.contains("UserB"));
        assert!(b.contains("UserB"), "client B got: {b}");
        assert!(!b.contains("UserA"));

        let Html(a_display) = result_handler(State(state.clone()), a_cookie).await;
        let Html(b_display) = result_handler(State(state), b_cookie).await;
        assert_eq!(a_display, a);
        assert_eq!(b_display, b);
    }

    #[tokio::test]
    async fn test_fast_client_is_not_left_loading_by_slow_one() {
        let server = MockServer::start().await;
        mount_evaluation(&server, "C", "UserC", 50).await;
        mount_evaluation(&server, "D", "UserD", 400).await;
        let state = state_for(&server);

        let (c, d) = tokio::join!(submit(&state, None, "C"), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            submit(&state, None, "D").await
        });
        let (c, d) = (body_text(c).await, body_text(d).await);

        assert!(c.contains("UserC"), "client C got: {c}");
        assert!(!c.contains("loader"));
        assert!(d.contains("UserD"), "client D got: {d}");
    }

    #[tokio::test]
    async fn test_submit_with_missing_control_is_rejected() {
        let server = MockServer::start().await;
        let state = state_for(&server);
        let mut fields = posted_fields("Housing");
        fields.remove("income");

        let result = submit_handler(State(state), HeaderMap::new(), Form(fields)).await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_schemes_proxies_evaluator() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/schemes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Housing": ["Home Builder Loan"],
                "Education": [],
            })))
            .mount(&server)
            .await;

        let ResponseJson(schemes) = schemes_handler(State(state_for(&server))).await.unwrap();
        assert_eq!(schemes["Housing"], vec!["Home Builder Loan"]);
        assert!(schemes["Education"].is_empty());
    }

    #[tokio::test]
    async fn test_schemes_failure_is_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/schemes"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = schemes_handler(State(state_for(&server))).await;
        assert!(matches!(result, Err(AppError::BadGateway(_))));
    }
}
