use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Used when `RUST_LOG` is unset. Session workers log at debug for
/// attach/detach churn, which stays hidden unless asked for.
const DEFAULT_FILTER: &str = "info,parlor=info,parlor::hub=info,actix_web=info,actix_server=warn";

/// Install the global subscriber. `PARLOR_LOG_FORMAT=text` switches from JSON
/// lines to human-readable output for local play.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let text = std::env::var("PARLOR_LOG_FORMAT").is_ok_and(|format| format == "text");

    // Targets keep `[HUB]` and `[SESSION]` lines attributable to their module.
    let base = fmt::layer().with_target(true).with_thread_ids(false);
    let registry = tracing_subscriber::registry().with(env_filter);
    if text {
        registry.with(base.compact()).init();
    } else {
        registry.with(base.with_ansi(false).json()).init();
    }
}
