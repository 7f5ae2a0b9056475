//! Logging setup shared by Marquee services
//!
//! Console plus daily rolling files, with HTTP access lines split out under
//! the `api_access` target. The filter is reloadable so the level can be
//! changed through the admin API without a restart.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter,
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Access log target used by [`http_request_logger`]
pub const API_TARGET: &str = "api_access";

const SENSITIVE_KEYS: &[&str] = &["password", "token", "secret", "authorization"];
const REDACTED: &str = "***REDACTED***";
const MAX_BODY_LENGTH: usize = 500;
/// Largest request body the access logger buffers for capture
const MAX_CAPTURED_REQUEST_BYTES: usize = 64 * 1024;

/// Event formatter producing `timestamp [LEVEL] message`
///
/// Example: `2026-10-16T09:12:44.809113Z [INFO] Listening on 0.0.0.0:6080`
pub struct BracketedLevelFormat;

fn level_tag(level: Level) -> (&'static str, &'static str) {
    match level {
        Level::TRACE => ("[TRACE]", "\x1b[35m"),
        Level::DEBUG => ("[DEBUG]", "\x1b[34m"),
        Level::INFO => ("[INFO]", "\x1b[32m"),
        Level::WARN => ("[WARN]", "\x1b[33m"),
        Level::ERROR => ("[ERROR]", "\x1b[31m"),
    }
}

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        write!(
            writer,
            "{} ",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ")
        )?;

        let (tag, color) = level_tag(*event.metadata().level());
        if writer.has_ansi_escapes() {
            write!(writer, "{color}{tag}\x1b[0m ")?;
        } else {
            write!(writer, "{tag} ")?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// Appender guards must outlive the subscriber
static GUARDS: OnceLock<Mutex<Vec<WorkerGuard>>> = OnceLock::new();

type FilterHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;
static FILTER_HANDLE: OnceLock<FilterHandle> = OnceLock::new();
static CURRENT_FILTER: OnceLock<Mutex<String>> = OnceLock::new();

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Service name, used as file prefix and default debug target
    pub service_name: String,
    /// Directory for rolling log files
    pub log_dir: PathBuf,
    /// Base filter (e.g. "info" or "info,moviesrv=debug")
    pub level: String,
    /// Write ANSI colors to the console
    pub ansi: bool,
    /// Write access lines to a separate `{service}_api.log.*` file
    pub enable_api_log: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_string(),
            log_dir: PathBuf::from("logs"),
            level: "info".to_string(),
            ansi: true,
            enable_api_log: true,
        }
    }
}

impl LogConfig {
    /// Filter string used at startup. `RUST_LOG` takes precedence over config.
    fn initial_filter(&self) -> String {
        let api_level = if self.enable_api_log { "info" } else { "off" };
        match std::env::var("RUST_LOG") {
            Ok(env) if env.contains(API_TARGET) => env,
            Ok(env) => format!("{env},{API_TARGET}={api_level}"),
            Err(_) => format!("{},{API_TARGET}={api_level}", self.level),
        }
    }
}

fn keep_guard(guard: WorkerGuard) {
    let guards = GUARDS.get_or_init(|| Mutex::new(Vec::new()));
    match guards.lock() {
        Ok(mut slot) => slot.push(guard),
        Err(poisoned) => poisoned.into_inner().push(guard),
    }
}

/// Initialize the global subscriber
pub fn init_with_config(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.log_dir)?;

    let filter_str = config.initial_filter();
    let env_filter = EnvFilter::try_new(&filter_str)?;
    let (reload_filter, handle) = reload::Layer::new(env_filter);
    let _ = FILTER_HANDLE.set(handle);
    let _ = CURRENT_FILTER.set(Mutex::new(filter_str));

    let console_layer = fmt::layer()
        .with_ansi(config.ansi)
        .event_format(BracketedLevelFormat)
        .boxed();

    let service_file = tracing_appender::rolling::daily(
        &config.log_dir,
        format!("{}.log", config.service_name),
    );
    let (service_writer, guard) = tracing_appender::non_blocking(service_file);
    keep_guard(guard);

    let file_layer = fmt::layer()
        .with_writer(service_writer)
        .with_ansi(false)
        .event_format(BracketedLevelFormat)
        .with_filter(filter::filter_fn(|meta| meta.target() != API_TARGET))
        .boxed();

    let api_layer = if config.enable_api_log {
        let api_file = tracing_appender::rolling::daily(
            &config.log_dir,
            format!("{}_api.log", config.service_name),
        );
        let (api_writer, api_guard) = tracing_appender::non_blocking(api_file);
        keep_guard(api_guard);
        Some(
            fmt::layer()
                .with_writer(api_writer)
                .with_ansi(false)
                .event_format(BracketedLevelFormat)
                .with_filter(filter::filter_fn(|meta| meta.target() == API_TARGET))
                .boxed(),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(reload_filter)
        .with(console_layer)
        .with(file_layer)
        .with(api_layer)
        .try_init()?;

    tracing::info!("Logging: {} @ {:?}", config.service_name, config.log_dir);
    Ok(())
}

/// Replace the active filter at runtime
///
/// Accepts a bare level ("debug") or a full directive ("info,moviesrv=trace").
pub fn set_log_level(level: &str) -> Result<(), String> {
    let handle = FILTER_HANDLE
        .get()
        .ok_or("Logging not initialized with reload support")?;

    let new_filter =
        EnvFilter::try_new(level).map_err(|e| format!("Invalid log level '{}': {}", level, e))?;
    handle
        .reload(new_filter)
        .map_err(|e| format!("Failed to reload log filter: {}", e))?;

    if let Some(current) = CURRENT_FILTER.get() {
        if let Ok(mut slot) = current.lock() {
            *slot = level.to_string();
        }
    }

    tracing::info!("Log level changed to: {}", level);
    Ok(())
}

/// Current filter string, or "unknown" before initialization
pub fn get_log_level() -> String {
    CURRENT_FILTER
        .get()
        .and_then(|m| m.lock().ok())
        .map(|s| s.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Mask credential-bearing fields in a JSON body; non-JSON input passes through
pub fn redact_sensitive_fields(body: &str) -> String {
    use serde_json::Value;

    fn walk(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key = key.to_lowercase();
                    if SENSITIVE_KEYS.iter().any(|k| key.contains(k)) {
                        *val = Value::String(REDACTED.to_string());
                    } else {
                        walk(val);
                    }
                }
            },
            Value::Array(items) => items.iter_mut().for_each(walk),
            _ => {},
        }
    }

    let Ok(mut value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    walk(&mut value);
    serde_json::to_string(&value).unwrap_or_else(|_| body.to_string())
}

fn truncate_body(body: &str, max_length: usize) -> String {
    if body.len() <= max_length {
        return body.to_string();
    }
    let mut cut = max_length;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}[truncated {} bytes]", &body[..cut], body.len() - cut)
}

#[cfg(feature = "axum")]
fn is_mutating(method: &axum::http::Method) -> bool {
    matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE")
}

#[cfg(feature = "axum")]
/// Axum middleware writing one `api_access` line per request
///
/// Mutating requests are logged at INFO. At DEBUG, JSON bodies of mutating
/// requests are captured, redacted and truncated. Only bodies whose declared
/// `Content-Length` fits [`MAX_CAPTURED_REQUEST_BYTES`] are buffered; anything
/// else, multipart included, reaches the handler unread.
pub async fn http_request_logger(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    use axum::body::Body;
    use std::time::Instant;
    use tracing::{debug, info, level_enabled};

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let is_json = req
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    let fits_capture = req
        .headers()
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        .is_some_and(|len| len <= MAX_CAPTURED_REQUEST_BYTES);
    let start = Instant::now();

    let capture = level_enabled!(Level::DEBUG) && is_mutating(&method) && is_json && fits_capture;
    let (req, body) = if capture {
        let (parts, body) = req.into_parts();
        match axum::body::to_bytes(body, MAX_CAPTURED_REQUEST_BYTES).await {
            Ok(bytes) => {
                let logged = match std::str::from_utf8(&bytes) {
                    Ok(s) => truncate_body(&redact_sensitive_fields(s), MAX_BODY_LENGTH),
                    Err(_) => "<binary data>".to_string(),
                };
                (
                    axum::extract::Request::from_parts(parts, Body::from(bytes)),
                    Some(logged),
                )
            },
            Err(e) => {
                use axum::response::IntoResponse;
                tracing::warn!("Failed to read request body of {} {}: {}", method, path, e);
                return crate::api_types::AppError::bad_request("Failed to read request body")
                    .into_response();
            },
        }
    } else {
        (req, None)
    };

    let response = next.run(req).await;
    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis();

    match body {
        Some(body) => debug!(
            target: API_TARGET,
            method = %method,
            path = %path,
            status,
            duration_ms = %duration_ms,
            request_body = %body,
            "HTTP request"
        ),
        None if is_mutating(&method) => info!(
            target: API_TARGET,
            method = %method,
            path = %path,
            status,
            duration_ms = %duration_ms,
            "HTTP request"
        ),
        None => debug!(
            target: API_TARGET,
            method = %method,
            path = %path,
            status,
            duration_ms = %duration_ms,
            "HTTP request"
        ),
    }

    response
}
