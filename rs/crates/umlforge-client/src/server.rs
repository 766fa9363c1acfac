use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::Stream;
use serde::Serialize;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use umlforge_core::{parse_action, render_view, Action, DecodeOptions, ViewModel};
use umlforge_dom::Snapshot;
use umlforge_render_html::{render_page, PageOptions};

use crate::config::ClientConfig;
use crate::dispatcher::Dispatcher;
use crate::error::AppError;
use crate::generator::GeneratorClient;
use crate::session::Draft;
use crate::store::{Revision, Store};

const STUDIO_JS: &str = include_str!("../assets/studio.js");

const STUDIO_CSS: &str = "\
body{margin:0;font-family:system-ui,sans-serif}\
.studio{height:100vh;display:flex;flex-direction:column;align-items:center;justify-content:center}\
.prompt{margin:20px;padding:10px;width:300px;border-radius:5px;border:2px solid #ccc}\
.generate{padding:10px 20px;border-radius:5px;background-color:#4CAF50;color:#fff;\
border:none;cursor:pointer}\
.loading{margin:20px}\
.spinner{width:50px;height:50px;border:5px solid #f3f3f3;border-top:5px solid #3498db;\
border-radius:50%;animation:spin 1s linear infinite}\
@keyframes spin{0%{transform:rotate(0deg)}100%{transform:rotate(360deg)}}\
.result{margin-top:20px}\
.result img{max-width:100%;max-height:400px}\
.result textarea{width:300px;height:200px;padding:10px;border-radius:5px;border:2px solid #ccc}";

// ── Shared state ────────────────────────────────────────────────────

pub struct AppState {
    pub store: Store,
    pub draft: Draft,
    pub dispatcher: Dispatcher,
    pub generator: Arc<GeneratorClient>,
    pub decode: DecodeOptions,
}

impl AppState {
    pub fn new(cfg: &ClientConfig, generator: Arc<GeneratorClient>) -> Self {
        let store = Store::new();
        let dispatcher =
            Dispatcher::new(generator.clone(), store.clone(), CancellationToken::new());
        Self {
            store,
            draft: Draft::new(),
            dispatcher,
            generator,
            decode: cfg.decode.clone(),
        }
    }

    /// Render the current store and draft into a snapshot.
    pub fn snapshot(&self) -> Snapshot {
        let rev = self.store.current();
        let draft = self.draft.get();
        Snapshot::new(render_view(&ViewModel {
            store: &rev.state,
            draft: &draft,
            decode: &self.decode,
        }))
    }
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(page))
        .route("/sse", get(sse))
        .route("/actions/:name", post(action))
        .route("/api/state", get(api_state))
        .route("/health", get(health))
        .route("/studio.js", get(studio_js))
        .with_state(state)
}

// ── Handlers ────────────────────────────────────────────────────────

async fn page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_page(&PageOptions {
        root: state.snapshot().root,
        scripts: vec!["/studio.js".to_string()],
        inline_css: Some(STUDIO_CSS.to_string()),
        sse_url: Some("/sse".to_string()),
        mount_selector: Some("#app".to_string()),
        title: Some("UmlForge".to_string()),
    }))
}

async fn sse(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    tracing::debug!("sse client connected");

    // First item comes from the store stream, which yields its current value.
    let store_changes = WatchStream::new(state.store.subscribe()).map(|_| ());
    let draft_changes = WatchStream::from_changes(state.draft.subscribe()).map(|_| ());
    let shutdown = state.dispatcher.shutdown_token();

    let events = store_changes.merge(draft_changes).map(move |()| {
        let event = match state.snapshot().to_json() {
            Ok(json) => SseEvent::default().event("message").data(json),
            Err(e) => {
                tracing::warn!(error = %e, "snapshot serialization failed");
                SseEvent::default().comment("snapshot unavailable")
            }
        };
        Ok(event)
    });
    let events = futures_util::StreamExt::take_until(events, shutdown.cancelled_owned());

    Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

async fn action(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<Snapshot>, AppError> {
    if !body.is_empty() && serde_json::from_slice::<serde_json::Value>(&body).is_err() {
        return Err(AppError::BadRequest("body must be JSON".into()));
    }

    match parse_action(&name, &body) {
        Action::DraftInput(value) => state.draft.set(value),
        Action::Generate(description) => {
            if state.dispatcher.is_shut_down() {
                return Err(AppError::Unavailable("shutting down".into()));
            }
            let description = description.unwrap_or_else(|| state.draft.get());
            let handle = state.dispatcher.dispatch(description);
            tracing::debug!(request = handle.id, "generate dispatched");
        }
        Action::Unknown => {
            tracing::debug!(action = %name, "ignoring unknown action");
        }
    }

    Ok(Json(state.snapshot()))
}

async fn api_state(State(state): State<Arc<AppState>>) -> Json<Revision> {
    Json(state.store.current())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    generator: bool,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        generator: state.generator.health().await,
    })
}

async fn studio_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript")], STUDIO_JS)
}
