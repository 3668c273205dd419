//! HTTP server resolving requests through the compile pipeline.

use crate::config::ServeConfig;
use crate::dev::{ServerState, SharedState, reload_router};
use crate::error::{CliError, Result, ServeError};
use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use async_trait::async_trait;
use kiln_core::{
    HeaderSet, OptionsError, Origin, Resolution, Transform, TransformError, headers_for, resolve,
};
use kiln_transform::AssetKind;
use percent_encoding::percent_decode_str;
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};

/// Development server: the HTTP listener plus the live-reload listener.
pub struct DevServer {
    config: ServeConfig,
    state: SharedState,
}

impl DevServer {
    pub fn new(config: ServeConfig, state: SharedState) -> Self {
        Self { config, state }
    }

    /// Bind both ports and serve until either server stops.
    ///
    /// # Errors
    ///
    /// Returns error if either address cannot be bound.
    pub async fn start(self) -> Result<()> {
        let http_addr = format!("{}:{}", self.config.host, self.config.port);
        let ws_addr = format!("{}:{}", self.config.host, self.config.ws_port);

        let http_listener = tokio::net::TcpListener::bind(&http_addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", http_addr, e)))?;
        let ws_listener = tokio::net::TcpListener::bind(&ws_addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", ws_addr, e)))?;

        crate::ui::success(&format!(
            "Development server running at {}",
            self.config.server_url()
        ));
        if self.config.watch_files {
            crate::ui::info(&format!("Live reload on ws://{}", ws_addr));
        }

        let app = build_router(self.state.clone());
        let reload = reload_router(self.state.ctx.clone());

        tokio::try_join!(
            async {
                axum::serve(http_listener, app)
                    .await
                    .map_err(|e| CliError::Server(format!("HTTP server error: {}", e)))
            },
            async {
                axum::serve(ws_listener, reload)
                    .await
                    .map_err(|e| CliError::Server(format!("Live-reload server error: {}", e)))
            },
        )?;

        Ok(())
    }
}

/// Build the HTTP router. Every path goes through [`serve_url`].
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .fallback(handle_request)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn handle_request(State(state): State<SharedState>, uri: Uri) -> Response {
    serve_url(&state, uri.path()).await
}

/// Serve one request path.
///
/// The path is percent-decoded, compiled with the transform its extension calls
/// for, and answered with custom headers applied: 200 with content, 404 when SPA
/// fallback is off and nothing matches, 500 on any failure.
pub async fn serve_url(state: &SharedState, raw_path: &str) -> Response {
    match respond(state, raw_path).await {
        Ok(Some((bytes, headers))) => {
            (StatusCode::OK, header_map(&headers), Body::from(bytes)).into_response()
        }
        Ok(None) => {
            tracing::debug!(path = raw_path, "Not found");
            plain(StatusCode::NOT_FOUND, format!("File not found: {}", raw_path))
        }
        Err(err) => {
            tracing::error!(path = raw_path, "{err}");
            crate::ui::error(&err.to_string());
            plain(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

async fn respond(
    state: &SharedState,
    raw_path: &str,
) -> std::result::Result<Option<(Bytes, HeaderSet)>, ServeError> {
    let url = percent_decode_str(raw_path)
        .decode_utf8()
        .map_err(|_| ServeError::InvalidPath(raw_path.to_string()))?
        .into_owned();
    let ctx = &state.ctx;

    let kind = AssetKind::from_path(&url);
    let compiler = kind.is_compiled().then_some(CompileOnMiss {
        state: state.as_ref(),
        kind,
    });
    let transform = compiler.as_ref().map(|c| c as &dyn Transform);
    let resolution = resolve(ctx, &url, transform).await?;

    let (bytes, origin) = match resolution {
        Resolution::Content { bytes, origin } => (bytes, origin),
        Resolution::NotFound => return Ok(None),
    };

    let content_type = match origin {
        Origin::SpaFallback => AssetKind::content_type(&ctx.settings.index),
        Origin::Cache | Origin::Compiled => AssetKind::content_type(&url),
    };
    let defaults = default_headers(content_type);
    let table = state.headers.get(ctx).await?;

    Ok(Some((bytes, headers_for(&url, &table, &defaults))))
}

/// Builds the transformer for `kind` only when the pipeline compiles a file, so
/// cache hits and SPA fallbacks never load compiler options.
struct CompileOnMiss<'a> {
    state: &'a ServerState,
    kind: AssetKind,
}

#[async_trait]
impl Transform for CompileOnMiss<'_> {
    async fn transform(
        &self,
        url: &str,
        path: &Path,
        source: String,
    ) -> std::result::Result<String, TransformError> {
        let options_error = |err: OptionsError| TransformError::Compiler {
            path: path.to_path_buf(),
            message: err.to_string(),
        };

        match self.kind {
            AssetKind::AssemblyScript => {
                let compiler = self
                    .state
                    .assemblyscript_transformer()
                    .await
                    .map_err(options_error)?;
                compiler.transform(url, path, source).await
            }
            AssetKind::Script | AssetKind::Static => {
                let compiler = self
                    .state
                    .script_transformer()
                    .await
                    .map_err(options_error)?;
                compiler.transform(url, path, source).await
            }
        }
    }
}

fn default_headers(content_type: &str) -> HeaderSet {
    let mut headers = HeaderSet::new();
    headers.insert("Content-Type".to_string(), content_type.to_string());
    headers.insert("Cache-Control".to_string(), "no-cache".to_string());
    headers
}

/// Convert resolved headers, skipping names or values HTTP cannot carry.
fn header_map(headers: &HeaderSet) -> HeaderMap {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Skipping invalid custom header"),
        }
    }
    map
}

fn plain(status: StatusCode, message: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_headers() {
        let headers = default_headers("application/javascript");
        assert_eq!(
            headers.get("Content-Type").map(String::as_str),
            Some("application/javascript")
        );
        assert_eq!(
            headers.get("Cache-Control").map(String::as_str),
            Some("no-cache")
        );
    }

    #[test]
    fn test_header_map_skips_invalid_entries() {
        let mut headers = HeaderSet::new();
        headers.insert("X-Frame-Options".to_string(), "DENY".to_string());
        headers.insert("Bad Header".to_string(), "x".to_string());
        headers.insert("X-Bad-Value".to_string(), "line\nbreak".to_string());

        let map = header_map(&headers);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("x-frame-options").unwrap(), "DENY");
    }

    #[test]
    fn test_plain_response() {
        let response = plain(StatusCode::NOT_FOUND, "File not found: /x".to_string());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }
}
