use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use solmask_core::{MaskConfig, MaskError, MaskStore, Point};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub const CHECK_PATH: &str = "/captcha/postresponse";

#[derive(Debug, Clone)]
pub struct AppState {
    pub store: MaskStore,
    /// Delete a mask after it has been checked once.
    pub consume: bool,
}

impl AppState {
    pub fn from_config(config: &MaskConfig) -> Self {
        Self {
            store: MaskStore::from_config(config),
            consume: config.consume,
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route(CHECK_PATH, post(check_solution))
        .layer(middleware::map_response(no_cache))
        .with_state(Arc::new(state))
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn no_cache(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}

#[derive(Deserialize)]
struct HelloParams {
    name: Option<String>,
}

async fn hello(Query(params): Query<HelloParams>) -> String {
    let name = params.name.unwrap_or_else(|| "World".to_string());
    format!("Hello, {name}!")
}

/// Fields of a submitted solution. `csol` holds `x:y`; browsers without
/// scripting send the two `nojs_*` fields instead.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Submission {
    pub cid: Option<String>,
    pub csol: Option<String>,
    pub nojs_csol_x: Option<String>,
    pub nojs_csol_y: Option<String>,
}

impl Submission {
    pub fn from_form(body: &[u8]) -> Self {
        let mut out = Self::default();
        for (key, value) in form_urlencoded::parse(body) {
            let slot = match key.as_ref() {
                "cid" => &mut out.cid,
                "csol" => &mut out.csol,
                "nojs_csol_x" => &mut out.nojs_csol_x,
                "nojs_csol_y" => &mut out.nojs_csol_y,
                _ => continue,
            };
            slot.get_or_insert_with(|| value.into_owned());
        }
        out
    }

    pub fn point(&self) -> Result<Point, Rejection> {
        let bad = |e: solmask_core::PointError| Rejection::BadRequest(e.to_string());
        match self.csol.as_deref() {
            Some(csol) if !csol.is_empty() && !csol.eq_ignore_ascii_case("null") => {
                csol.parse().map_err(bad)
            }
            _ => match (&self.nojs_csol_x, &self.nojs_csol_y) {
                (Some(x), Some(y)) => Point::from_parts(x, y).map_err(bad),
                _ => Err(Rejection::BadRequest("missing solution".to_string())),
            },
        }
    }
}

/// Non-verdict outcomes of a check.
#[derive(Debug)]
pub enum Rejection {
    BadRequest(String),
    UnknownMask,
    Internal(String),
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            Rejection::UnknownMask => (StatusCode::NOT_FOUND, "KO").into_response(),
            Rejection::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

impl From<MaskError> for Rejection {
    fn from(err: MaskError) -> Self {
        match err {
            MaskError::UnknownMask(_) => Rejection::UnknownMask,
            MaskError::InvalidId(_) => Rejection::BadRequest(err.to_string()),
            other => Rejection::Internal(other.to_string()),
        }
    }
}

async fn check_solution(
    State(state): State<Arc<AppState>>,
    body: axum::body::Bytes,
) -> Result<&'static str, Rejection> {
    let submission = Submission::from_form(&body);
    let cid = submission
        .cid
        .clone()
        .ok_or_else(|| Rejection::BadRequest("missing cid".to_string()))?;
    let point = submission.point()?;

    let verdict = tokio::task::spawn_blocking(move || {
        let verdict = state.store.check(&cid, point)?;
        if state.consume {
            state.store.remove(&cid)?;
        }
        info!(%cid, %point, verdict, "checked solution");
        Ok::<_, MaskError>(verdict)
    })
    .await
    .map_err(|e| Rejection::Internal(e.to_string()))?
    .map_err(|e| {
        warn!(error = %e, "solution check failed");
        Rejection::from(e)
    })?;

    Ok(if verdict { "OK" } else { "KO" })
}
