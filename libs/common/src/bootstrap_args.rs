//! Command-line arguments shared by Marquee services
//!
//! Services flatten [`ServiceArgs`] into their own parser and add subcommands.

/// Common service startup arguments
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct ServiceArgs {
    /// Log filter override (trace, debug, info, warn, error or a full directive)
    #[cfg_attr(feature = "cli", arg(short = 'l', long))]
    pub log_level: Option<String>,

    /// Bind address override (e.g. 127.0.0.1:6080)
    #[cfg_attr(feature = "cli", arg(short = 'b', long, env = "BIND_ADDRESS"))]
    pub bind_address: Option<String>,

    /// Disable colored console output
    #[cfg_attr(feature = "cli", arg(long))]
    pub no_color: bool,

    /// Only validate configuration, then exit
    #[cfg_attr(feature = "cli", arg(long))]
    pub validate: bool,

    /// Database path override
    #[cfg_attr(feature = "cli", arg(long, env = "DB_PATH"))]
    pub db_path: Option<String>,

    /// Configuration file (YAML)
    #[cfg_attr(feature = "cli", arg(short = 'c', long))]
    pub config: Option<String>,
}

impl ServiceArgs {
    /// Parse the log override into a `tracing::Level`, if it is a bare level
    pub fn parse_log_level(&self) -> Option<tracing::Level> {
        match self.log_level.as_deref()?.to_lowercase().as_str() {
            "trace" => Some(tracing::Level::TRACE),
            "debug" => Some(tracing::Level::DEBUG),
            "info" => Some(tracing::Level::INFO),
            "warn" | "warning" => Some(tracing::Level::WARN),
            "error" => Some(tracing::Level::ERROR),
            _ => None,
        }
    }

    /// Effective filter: CLI override, else the configured value
    pub fn log_filter(&self, configured: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| configured.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = ServiceArgs::default();
        assert!(args.log_level.is_none());
        assert!(!args.validate);
        assert_eq!(args.log_filter("warn"), "warn");
    }

    #[test]
    fn test_parse_log_level() {
        let args = ServiceArgs {
            log_level: Some("WARN".to_string()),
            ..Default::default()
        };
        assert_eq!(args.parse_log_level(), Some(tracing::Level::WARN));
        assert_eq!(args.log_filter("info"), "WARN");

        let args = ServiceArgs {
            log_level: Some("info,moviesrv=debug".to_string()),
            ..Default::default()
        };
        assert_eq!(args.parse_log_level(), None);
    }
}
