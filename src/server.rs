//! HTTP server for browsing the catalog.
//!
//! ```text
//! GET /                      index, ?q=&museum=&category=
//! GET /exhibits/{id}         exhibit card (404 unknown id, 400 non-numeric)
//! GET /photos/*              files from photos_dir
//! GET /static/{asset}        embedded stylesheet, manifest, icon
//! GET /sw.js                 service worker
//! GET /health                {"status": "ok", "version": ...}
//! ```
//!
//! Every page request rereads the workbook, so edits to the spreadsheet show
//! up on the next reload. Workbook reads run on the blocking pool.

use std::error::Error as StdError;
use std::path::Path;
use std::sync::Arc;

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::assets;
use crate::catalog::{self, CatalogError, ExhibitQuery, WorkbookSource};
use crate::config::Settings;
use crate::render::{self, Listing, Surface};
use crate::workbook::WorkbookError;

pub const LOAD_ERROR_TITLE: &str = "Не удалось загрузить данные";
const TASK_ERROR_MESSAGE: &str = "Внутренняя ошибка при чтении XLSX";

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    fn source(&self) -> WorkbookSource {
        WorkbookSource::new(&self.settings.xlsx_path)
    }
}

/// Errors a page handler can end with, each rendered as an HTML page.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("failed to load exhibits from {xlsx_path}")]
    Load {
        xlsx_path: String,
        #[source]
        source: WorkbookError,
    },
    #[error("exhibit {0} not found")]
    NotFound(i64),
    #[error("workbook read task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl PageError {
    fn load(source: WorkbookError, xlsx_path: &Path) -> Self {
        PageError::Load {
            xlsx_path: xlsx_path.display().to_string(),
            source,
        }
    }

    fn from_catalog(err: CatalogError, xlsx_path: &Path) -> Self {
        match err {
            CatalogError::Workbook(source) => Self::load(source, xlsx_path),
            CatalogError::NotFound(id) => PageError::NotFound(id),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, page) = match &self {
            PageError::Load { xlsx_path, source } => {
                tracing::error!(
                    stage = "web",
                    xlsx_path = %xlsx_path,
                    error = %error_chain(source),
                    "failed to load exhibits"
                );
                // Visitors see the top-level message only; causes stay in the log.
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    render::render_error(LOAD_ERROR_TITLE, &source.to_string(), xlsx_path, &Surface::Live),
                )
            }
            PageError::NotFound(id) => {
                tracing::debug!(stage = "web", exhibit_id = id, "exhibit not found");
                (StatusCode::NOT_FOUND, render::render_not_found(*id, &Surface::Live))
            }
            PageError::Task(err) => {
                tracing::error!(stage = "web", error = %err, "workbook read task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    render::render_error(LOAD_ERROR_TITLE, TASK_ERROR_MESSAGE, "", &Surface::Live),
                )
            }
        };
        (status, Html(page.into_string())).into_response()
    }
}

/// `err` and each of its sources, joined with `": "`.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

pub fn router(state: AppState) -> Router {
    let photos = ServeDir::new(&state.settings.photos_dir);

    Router::new()
        .route("/", get(index))
        .route("/exhibits/{exhibit_id}", get(card))
        .route("/static/{asset}", get(static_asset))
        .route("/sw.js", get(service_worker))
        .route("/health", get(health))
        .nest_service("/photos", photos)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(
    State(state): State<AppState>,
    Query(query): Query<ExhibitQuery>,
) -> Result<Html<String>, PageError> {
    let source = state.source();
    let photos_dir = state.settings.photos_dir.clone();
    let filters = query.clone();

    let listings = tokio::task::spawn_blocking(move || {
        catalog::list_exhibits(&source, &filters).map(|exhibits| {
            exhibits
                .into_iter()
                .map(|exhibit| Listing::resolve(exhibit, &photos_dir))
                .collect::<Vec<_>>()
        })
    })
    .await?
    .map_err(|err| PageError::load(err, &state.settings.xlsx_path))?;

    tracing::debug!(stage = "web", count = listings.len(), "rendered index");
    Ok(Html(
        render::render_index(&listings, &query, &Surface::Live).into_string(),
    ))
}

async fn card(
    State(state): State<AppState>,
    UrlPath(exhibit_id): UrlPath<i64>,
) -> Result<Html<String>, PageError> {
    let source = state.source();
    let photos_dir = state.settings.photos_dir.clone();

    let listing = tokio::task::spawn_blocking(move || {
        catalog::get_exhibit(&source, exhibit_id).map(|exhibit| Listing::resolve(exhibit, &photos_dir))
    })
    .await?
    .map_err(|err| PageError::from_catalog(err, &state.settings.xlsx_path))?;

    Ok(Html(render::render_card(&listing, &Surface::Live).into_string()))
}

async fn static_asset(UrlPath(name): UrlPath<String>) -> Response {
    match assets::find(&name) {
        Some(asset) => asset_response(asset),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn service_worker() -> Response {
    asset_response(&assets::SERVICE_WORKER)
}

fn asset_response(asset: &assets::Asset) -> Response {
    ([(header::CONTENT_TYPE, asset.content_type)], asset.body).into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Bind `host:port` and serve until Ctrl-C or SIGTERM.
pub async fn serve(settings: Settings) -> Result<(), ServerError> {
    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(
        stage = "web",
        addr = %addr,
        xlsx_path = %settings.xlsx_path.display(),
        photos_dir = %settings.photos_dir.display(),
        "server listening"
    );

    axum::serve(listener, router(AppState::new(settings)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(stage = "web", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!(stage = "web", "shutdown signal received");
}
