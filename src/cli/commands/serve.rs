//! Local web app: an upload page plus a small JSON API over one study session.

use crate::agent::{shared_agent, Agent};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::StudyNotesError;
use crate::extract::{extract_text, PdfDocument};
use crate::orchestrator::{Orchestrator, Task};
use crate::session::StudySession;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

type AgentProvider = Box<dyn Fn() -> crate::error::Result<Arc<Agent>> + Send + Sync>;

/// Shared application state.
pub struct AppState {
    prompts: Prompts,
    session: Mutex<StudySession>,
    agent: AgentProvider,
}

impl AppState {
    /// State backed by the process-wide agent.
    pub fn new(settings: Settings, prompts: Prompts) -> Self {
        Self::with_agent_provider(prompts, move || shared_agent(&settings))
    }

    pub fn with_agent_provider<F>(prompts: Prompts, agent: F) -> Self
    where
        F: Fn() -> crate::error::Result<Arc<Agent>> + Send + Sync + 'static,
    {
        Self {
            prompts,
            session: Mutex::new(StudySession::new()),
            agent: Box::new(agent),
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>, max_upload_mb: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/documents", post(upload_documents))
        .route("/summary", post(summary))
        .route("/quiz", post(quiz))
        .route("/session", get(session))
        .layer(DefaultBodyLimit::max(max_upload_mb.saturating_mul(1024 * 1024)))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let credential_warning = startup_warning(&settings);
    let max_upload_mb = settings.server.max_upload_mb;
    let state = Arc::new(AppState::new(settings, prompts));
    let app = router(state, max_upload_mb);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Study Notes Summarizer & Quiz Generator");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Upload page", "GET  /");
    Output::kv("Health", "GET  /health");
    Output::kv("Upload PDFs", "POST /documents");
    Output::kv("Summary", "POST /summary");
    Output::kv("Quiz", "POST /quiz");
    Output::kv("Session", "GET  /session");
    println!();
    if let Some(warning) = credential_warning {
        Output::warning(&warning);
        Output::info("Run 'studynotes doctor' for detailed diagnostics.");
    }
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Describe a credential or endpoint problem the server can still start with.
fn startup_warning(settings: &Settings) -> Option<String> {
    preflight::check(Operation::Generate, settings)
        .err()
        .map(|e| format!("{}. Summary and quiz requests will fail until it is fixed.", e))
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Map a library error onto a status code and a message safe to show.
fn error_response(err: StudyNotesError) -> Response {
    let (status, message) = match &err {
        StudyNotesError::DocumentParse { .. } => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        StudyNotesError::InvalidInput(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        e if e.is_remote() => (
            StatusCode::BAD_GATEWAY,
            "The language model request failed. Please try again.".to_string(),
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    };
    warn!(status = %status, "Request failed: {}", err);
    (status, Json(ErrorResponse { error: message })).into_response()
}

// === Handlers ===

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn upload_documents(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut documents = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return e.into_response(),
        };
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload.pdf").to_string();
        match field.bytes().await {
            Ok(bytes) => documents.push(PdfDocument::new(name, bytes.to_vec())),
            Err(e) => return e.into_response(),
        }
    }

    info!(files = documents.len(), "Received upload");
    let files = documents.len();
    let extracted = tokio::task::spawn_blocking(move || extract_text(&documents))
        .await
        .map_err(|e| StudyNotesError::Agent(format!("Extraction task failed: {}", e)))
        .and_then(|result| result);
    let text = match extracted {
        Ok(text) => text,
        Err(e) => return error_response(e),
    };

    let status = state.session.lock().await.replace_text(files, text);
    Json(status).into_response()
}

async fn summary(State(state): State<Arc<AppState>>) -> Response {
    generate(&state, Task::Summary).await
}

async fn quiz(State(state): State<Arc<AppState>>) -> Response {
    generate(&state, Task::Quiz).await
}

async fn generate(state: &AppState, task: Task) -> Response {
    // Held across the model call so concurrent presses run one at a time.
    let mut session = state.session.lock().await;
    if !session.has_documents() {
        return error_response(StudyNotesError::InvalidInput(
            "Upload at least one PDF first".to_string(),
        ));
    }

    let agent = match (state.agent)() {
        Ok(agent) => agent,
        Err(e) => return error_response(e),
    };
    let orchestrator = Orchestrator::new(agent, state.prompts.clone());

    match session.generate(task, &orchestrator).await {
        Ok(result) => Json(result.clone()).into_response(),
        Err(e) => error_response(e),
    }
}

async fn session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.session.lock().await.snapshot())
}

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Study Notes Summarizer &amp; Quiz Generator</title></head>
<body>
<h1>Study Notes Summarizer &amp; Quiz Generator</h1>
<input id="files" type="file" accept="application/pdf" multiple>
<p id="status"></p>
<div id="actions" hidden>
  <button onclick="run('summary')">Generate Summary</button>
  <button onclick="run('quiz')">Generate Quiz</button>
</div>
<h2>Summary</h2><pre id="summary"></pre>
<h2>Quiz</h2><pre id="quiz"></pre>
<script>
const files = document.getElementById('files');
const status = document.getElementById('status');
files.addEventListener('change', async () => {
  const form = new FormData();
  for (const f of files.files) form.append('file', f);
  const res = await fetch('/documents', { method: 'POST', body: form });
  const body = await res.json();
  status.textContent = res.ok ? (body.message || '') : body.error;
  document.getElementById('actions').hidden = !(res.ok && body.files > 0);
});
async function run(task) {
  const out = document.getElementById(task);
  status.textContent = task === 'summary' ? 'Generating summary...' : 'Generating quiz...';
  const res = await fetch('/' + task, { method: 'POST' });
  const body = await res.json();
  status.textContent = res.ok ? '' : body.error;
  if (res.ok) out.textContent = body.output;
}
</script>
</body>
</html>
"#;
