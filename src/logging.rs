use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

/// Crates that log too much below `warn`.
const NOISY_TARGETS: [&str; 5] = ["serenity", "tokio_cron_scheduler", "sqlx", "reqwest", "hyper"];

/// Filter for `level`, with the noisy dependencies capped at `warn`.
///
/// An unknown level falls back to `info`.
fn filter(level: &str) -> EnvFilter {
    let level = level.parse::<LevelFilter>().unwrap_or_else(|_| {
        eprintln!("Invalid LOG_LEVEL {:?}, using info", level);
        LevelFilter::INFO
    });

    NOISY_TARGETS
        .iter()
        .filter_map(|target| format!("{}=warn", target).parse::<Directive>().ok())
        .fold(EnvFilter::default().add_directive(level.into()), |filter, directive| {
            filter.add_directive(directive)
        })
}

/// Installs the global tracing subscriber.
pub fn init(level: &str) {
    tracing_subscriber::fmt().with_env_filter(filter(level)).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_noisy_targets() {
        let filter = filter("DEBUG").to_string();

        assert!(filter.contains("debug"));
        assert!(filter.contains("serenity=warn"));
        assert!(filter.contains("hyper=warn"));
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let filter = filter("loud").to_string();

        assert!(filter.contains("info"));
        assert!(!filter.contains("loud"));
    }
}
