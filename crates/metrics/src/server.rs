use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing, Router,
};
use prometheus::{proto::MetricFamily, Encoder, ProtobufEncoder, TextEncoder};
use snafu::ResultExt;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{error, Error, Metrics};

const PROTOBUF_MEDIA_TYPE: &str = "application/vnd.google.protobuf";

/// Content of the informational page served on `/`.
#[derive(Clone, Debug)]
pub struct LandingPage {
    pub title: String,

    pub build_info: String,
}

impl LandingPage {
    fn render(self, telemetry_path: &str) -> String {
        let Self { title, build_info } = self;
        let title = escape_html(&title);
        let build_info = escape_html(&build_info);
        let telemetry_path = escape_html(telemetry_path);
        format!(
            "<html>\n<head><title>{title}</title></head>\n<body>\n<h1>{title}</h1>\n<p><a \
             href='{telemetry_path}'>Metrics</a></p>\n<h2>Build</h2>\n<pre>{build_info}</pre>\n\
             </body>\n</html>\n"
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

struct ServerState<M> {
    metrics: M,

    landing_page: String,
}

/// # Errors
///
/// Returns an error if the listener can not be bound or the server stops unexpectedly.
pub async fn start_metrics_server<M, ShutdownSignal>(
    listen_address: SocketAddr,
    telemetry_path: &str,
    landing_page: LandingPage,
    metrics: M,
    shutdown_signal: ShutdownSignal,
) -> Result<(), Error>
where
    M: Metrics + 'static,
    ShutdownSignal: Future<Output = ()> + Send + 'static,
{
    let router = metrics_router(telemetry_path, landing_page, metrics);

    let listener = TcpListener::bind(listen_address)
        .await
        .context(error::BindTcpServerSnafu { listen_address })?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context(error::ServeHttpServerSnafu)
}

/// Routes `telemetry_path` to the encoded metrics and `/` to the landing page.
///
/// `telemetry_path` must start with `/`.
pub fn metrics_router<M>(telemetry_path: &str, landing_page: LandingPage, metrics: M) -> Router
where
    M: Metrics + 'static,
{
    let state =
        Arc::new(ServerState { metrics, landing_page: landing_page.render(telemetry_path) });

    let router = Router::new().route(telemetry_path, routing::get(serve_metrics::<M>));
    let router = if telemetry_path == "/" {
        router
    } else {
        router.route("/", routing::get(serve_landing_page::<M>))
    };

    router
        .fallback(fallback)
        .with_state(state)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CompressionLayer::new()),
        )
}

async fn serve_metrics<M>(State(state): State<Arc<ServerState<M>>>, headers: HeaderMap) -> Response
where
    M: Metrics,
{
    let families = state.metrics.gather().await;

    let result = if accepts_protobuf(&headers) {
        encode(&ProtobufEncoder::new(), &families)
    } else {
        encode(&TextEncoder::new(), &families)
    };

    match result {
        Ok((content_type, body)) => ([(header::CONTENT_TYPE, content_type)], body).into_response(),
        Err(err) => {
            tracing::error!("Failed to encode metrics, error: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

// SAFETY: `axum` handler must be async
#[allow(clippy::unused_async)]
async fn serve_landing_page<M>(State(state): State<Arc<ServerState<M>>>) -> Html<String> {
    Html(state.landing_page.clone())
}

// SAFETY: `axum` handler must be async
#[allow(clippy::unused_async)]
async fn fallback(uri: Uri) -> Response {
    (StatusCode::NOT_FOUND, format!("No route for {uri}")).into_response()
}

fn accepts_protobuf(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains(PROTOBUF_MEDIA_TYPE))
}

fn encode<E>(encoder: &E, families: &[MetricFamily]) -> prometheus::Result<(String, Vec<u8>)>
where
    E: Encoder,
{
    let mut buffer = Vec::new();
    encoder.encode(families, &mut buffer)?;
    Ok((encoder.format_type().to_string(), buffer))
}
