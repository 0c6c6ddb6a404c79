use crate::config::{LoggingConfig, DEFAULT_LOG_LEVEL};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// A non-empty `RUST_LOG` is used as-is; otherwise this crate logs at the
/// configured level.
pub fn init(config: &LoggingConfig) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(rust_log.as_deref(), &config.level);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_filter(rust_log: Option<&str>, level: &str) -> EnvFilter {
    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
        return EnvFilter::new(directives);
    }
    match EnvFilter::try_new(format!("remindctl={level}")) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("Ignoring invalid log level '{level}': {e}");
            EnvFilter::new(format!("remindctl={DEFAULT_LOG_LEVEL}"))
        }
    }
}

/// Mask a secret down to its last four characters.
pub fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    match chars.len() {
        0 => String::new(),
        n if n <= 4 => "****".to_string(),
        n => format!("****{}", chars[n - 4..].iter().collect::<String>()),
    }
}
