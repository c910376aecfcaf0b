// Site Roster - Web Server
// Form-driven page for the gate desk plus a small JSON API

use anyhow::{Context, Result};
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        Form, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use site_roster::{RosterError, SiteConfig, SiteLedger, SiteReport};

/// Shared application state
#[derive(Clone)]
struct AppState {
    ledger: SiteLedger,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: String) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message),
        }
    }
}

// ============================================================================
// Request bodies
// ============================================================================

// Missing fields deserialize as empty so the roster's own checks report
// them as InvalidInput. `count` stays text for the same reason.
#[derive(Deserialize)]
#[serde(default)]
struct AddForm {
    affiliation: String,
    name: String,
    count: String,
    vehicle: String,
}

impl Default for AddForm {
    fn default() -> Self {
        AddForm {
            affiliation: String::new(),
            name: String::new(),
            count: "1".to_string(),
            vehicle: String::new(),
        }
    }
}

#[derive(Deserialize)]
struct RemoveForm {
    #[serde(default)]
    group_id: String,
}

#[derive(Deserialize)]
struct EntryRequest {
    #[serde(default)]
    affiliation: String,
    #[serde(default)]
    name: String,
    count: i64,
    #[serde(default)]
    vehicle: String,
}

#[derive(Serialize)]
struct EntryCreated {
    cohort_id: String,
}

#[derive(Deserialize)]
struct RemoveRequest {
    cohort_id: String,
}

#[derive(Serialize)]
struct RemoveResult {
    removed: usize,
}

fn parse_count(raw: &str) -> Result<i64, RosterError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| RosterError::invalid("count", format!("`{}` is not a whole number", raw)))
}

// ============================================================================
// Page Handlers
// ============================================================================

/// GET / - Roster page with the report text
async fn serve_index(State(state): State<AppState>) -> impl IntoResponse {
    Html(render_page(&state.ledger.get_report(), None))
}

fn page_error(state: &AppState, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Html(render_page(&state.ledger.get_report(), Some(message))),
    )
        .into_response()
}

fn api_error(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::err(message))).into_response()
}

/// POST /add - Check a batch in
async fn add_entry(
    State(state): State<AppState>,
    form: Result<Form<AddForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => return page_error(&state, &rejection.body_text()),
    };

    let result = parse_count(&form.count).and_then(|count| {
        state
            .ledger
            .add_entry(&form.affiliation, &form.name, count, &form.vehicle)
    });

    match result {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => page_error(&state, &e.to_string()),
    }
}

/// POST /remove - Check a cohort out
async fn remove_entry(
    State(state): State<AppState>,
    form: Result<Form<RemoveForm>, FormRejection>,
) -> Response {
    match form {
        Ok(Form(form)) => {
            state.ledger.remove_cohort(&form.group_id);
            Redirect::to("/").into_response()
        }
        Err(rejection) => page_error(&state, &rejection.body_text()),
    }
}

/// POST /clear - Reset the day
async fn clear_all(State(state): State<AppState>) -> Redirect {
    state.ledger.clear_all();
    Redirect::to("/")
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/report - Cohorts, totals and report text
async fn get_report(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.ledger.get_report()))
}

/// POST /api/entries - Check a batch in
async fn create_entry(
    State(state): State<AppState>,
    payload: Result<Json<EntryRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return api_error(rejection.body_text()),
    };

    match state
        .ledger
        .add_entry(&req.affiliation, &req.name, req.count, &req.vehicle)
    {
        Ok(cohort_id) => (
            StatusCode::CREATED,
            Json(ApiResponse::ok(EntryCreated { cohort_id })),
        )
            .into_response(),
        Err(e) => api_error(e.to_string()),
    }
}

/// POST /api/cohorts/remove - Check a cohort out (unknown ids remove nothing)
async fn remove_cohort(
    State(state): State<AppState>,
    payload: Result<Json<RemoveRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(req)) => {
            let removed = state.ledger.remove_cohort(&req.cohort_id);
            Json(ApiResponse::ok(RemoveResult { removed })).into_response()
        }
        Err(rejection) => api_error(rejection.body_text()),
    }
}

/// POST /api/clear - Reset the day
async fn clear_api(State(state): State<AppState>) -> impl IntoResponse {
    state.ledger.clear_all();
    Json(ApiResponse::ok("cleared"))
}

// ============================================================================
// HTML
// ============================================================================

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_page(report: &SiteReport, error: Option<&str>) -> String {
    let mut rows = String::new();
    for (key, cohort) in &report.cohorts {
        let vehicles = if cohort.vehicles.is_empty() {
            "-".to_string()
        } else {
            escape_html(&cohort.vehicles.join(", "))
        };
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}명</td><td>{}</td>\
             <td><form method=\"post\" action=\"/remove\">\
             <input type=\"hidden\" name=\"group_id\" value=\"{}\">\
             <button type=\"submit\">퇴영</button></form></td></tr>\n",
            escape_html(&key.affiliation),
            escape_html(&key.representative),
            cohort.count,
            vehicles,
            escape_html(&cohort.cohort_id),
        ));
    }
    if rows.is_empty() {
        rows.push_str("<tr><td colspan=\"5\">현재 공사 인원이 없습니다.</td></tr>\n");
    }

    let error_block = error
        .map(|msg| format!("<p class=\"error\">{}</p>\n", escape_html(msg)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>공사 인원 관리</title>
<style>
body {{ font-family: sans-serif; margin: 1rem; }}
table {{ border-collapse: collapse; width: 100%; }}
td, th {{ border: 1px solid #ccc; padding: 0.3rem; }}
textarea {{ width: 100%; height: 24rem; }}
.error {{ color: #b00; }}
</style>
</head>
<body>
<h1>공사 인원 입영 관리</h1>
{error_block}<form method="post" action="/add">
<input name="affiliation" placeholder="소속" required>
<input name="name" placeholder="대표명" required>
<input name="count" type="number" min="1" value="1" required>
<input name="vehicle" placeholder="차량번호 (없으면 비움)">
<button type="submit">입영</button>
</form>
<h2>현재 인원 ({on_site}명, 차량 {vehicles}대)</h2>
<table>
<tr><th>소속</th><th>대표명</th><th>인원</th><th>차량</th><th></th></tr>
{rows}</table>
<form method="post" action="/clear" onsubmit="return confirm('모든 기록을 초기화할까요?');">
<button type="submit">전체 초기화</button>
</form>
<h2>보고</h2>
<textarea readonly>{report_text}</textarea>
</body>
</html>
"#,
        error_block = error_block,
        on_site = report.totals.on_site,
        vehicles = report.totals.vehicles_on_site,
        rows = rows,
        report_text = escape_html(&report.text),
    )
}

// ============================================================================
// Main Server
// ============================================================================

fn app(ledger: SiteLedger) -> Router {
    let state = AppState { ledger };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/report", get(get_report))
        .route("/entries", post(create_entry))
        .route("/cohorts/remove", post(remove_cohort))
        .route("/clear", post(clear_api))
        .with_state(state.clone());

    Router::new()
        .route("/", get(serve_index))
        .route("/add", post(add_entry))
        .route("/remove", post(remove_entry))
        .route("/clear", post(clear_all))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=warn")),
        )
        .init();

    println!("--- 🏗️ 공사 인원 관리 시스템 서버 시작 ---");

    let config_path = std::env::var("SITE_ROSTER_CONFIG").ok();
    let mut config = SiteConfig::load(config_path.as_deref().map(Path::new))
        .context("Failed to load site config")?;
    if let Ok(addr) = std::env::var("SITE_ROSTER_ADDR") {
        config.bind_addr = addr;
    }

    let ledger = SiteLedger::new(&config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "listening");
    println!("1. 컴퓨터와 핸드폰을 같은 와이파이에 연결하세요.");
    println!(
        "2. 핸드폰 웹 브라우저를 열고 http://<이 컴퓨터의 IP>:{} 로 접속하세요.",
        listener.local_addr().map(|a| a.port()).unwrap_or_default()
    );
    println!("   (접속 주소 확인: 터미널에 'ipconfig' 또는 'ifconfig' 입력)");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app(ledger))
        .await
        .context("Server error")?;

    Ok(())
}
