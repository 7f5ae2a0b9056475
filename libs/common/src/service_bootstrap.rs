//! Service startup helpers: banner and logging bootstrap

use crate::logging::{self, LogConfig};
use std::path::Path;
use tracing::info;

/// Service metadata for startup
pub struct ServiceInfo {
    /// Service name (e.g., "moviesrv")
    pub name: String,
    /// Service version from Cargo.toml
    pub version: String,
    /// Service description
    pub description: String,
    /// Default port
    pub default_port: u16,
}

impl ServiceInfo {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
        default_port: u16,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
            default_port,
        }
    }
}

const MARQUEE_BANNER: &str = r#"
 ███╗   ███╗ █████╗ ██████╗  ██████╗ ██╗   ██╗███████╗███████╗
 ████╗ ████║██╔══██╗██╔══██╗██╔═══██╗██║   ██║██╔════╝██╔════╝
 ██╔████╔██║███████║██████╔╝██║   ██║██║   ██║█████╗  █████╗
 ██║╚██╔╝██║██╔══██║██╔══██╗██║▄▄ ██║██║   ██║██╔══╝  ██╔══╝
 ██║ ╚═╝ ██║██║  ██║██║  ██║╚██████╔╝╚██████╔╝███████╗███████╗
 ╚═╝     ╚═╝╚═╝  ╚═╝╚═╝  ╚═╝ ╚══▀▀═╝  ╚═════╝ ╚══════╝╚══════╝
"#;

/// Log the startup banner
pub fn print_startup_banner(service: &ServiceInfo) {
    info!("{}", MARQUEE_BANNER);
    info!(" {} v{}", service.name.to_uppercase(), service.version);
    info!(" {}", service.description);
    info!(" Default Port: {}", service.default_port);
    info!("");
}

/// Initialize logging under `{log_dir}/{service}`
pub fn init_logging(
    service: &ServiceInfo,
    level: &str,
    log_dir: &Path,
    enable_api_log: bool,
    ansi: bool,
) -> anyhow::Result<()> {
    let config = LogConfig {
        service_name: service.name.clone(),
        log_dir: log_dir.join(&service.name),
        level: level.to_string(),
        ansi,
        enable_api_log,
    };

    logging::init_with_config(config).map_err(|e| anyhow::anyhow!("{}", e))
}
