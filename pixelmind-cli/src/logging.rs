use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

const FALLBACK_LEVEL: &str = "warn";

/// HTTP-стек слишком разговорчив на `debug`; его уровень не поднимается выше `warn`.
const QUIET_TARGETS: [&str; 3] = ["hyper=warn", "hyper_util=warn", "reqwest=warn"];

/// Логи идут в stderr, чтобы не смешиваться с выводом команд.
///
/// `RUST_LOG` используется как есть; иначе берётся `default_level` из настроек.
pub fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init pixelmind-cli logging: {e}"))
}

fn filter_for(level: &str) -> EnvFilter {
    let base = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL));
    QUIET_TARGETS
        .iter()
        .filter_map(|target| target.parse::<Directive>().ok())
        .fold(base, EnvFilter::add_directive)
}
