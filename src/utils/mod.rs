pub mod snapshot;

use std::{env, sync::Once};

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVES: &str = "warn,installment_core=info";

/// Initializes the global tracing subscriber with sensible defaults.
///
/// `RUST_LOG`, when set, replaces the crate defaults entirely.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = build_filter(env::var(EnvFilter::DEFAULT_ENV).ok().as_deref());
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

fn build_filter(rust_log: Option<&str>) -> EnvFilter {
    match rust_log.map(str::trim).filter(|value| !value.is_empty()) {
        Some(directives) => EnvFilter::builder().parse_lossy(directives),
        None => EnvFilter::new(DEFAULT_DIRECTIVES),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn defaults_apply_only_without_rust_log() {
        for unset in [None, Some("  ")] {
            let filter = build_filter(unset).to_string();
            assert!(filter.contains("installment_core=info"), "{filter}");
            assert!(filter.contains("warn"), "{filter}");
        }
        assert_eq!(
            build_filter(Some("off")).max_level_hint(),
            Some(LevelFilter::OFF)
        );
        assert!(!build_filter(Some("debug"))
            .to_string()
            .contains("installment_core"));
    }
}
