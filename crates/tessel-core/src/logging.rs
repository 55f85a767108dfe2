use tracing_subscriber::EnvFilter;

/// Default directives: verbose for Tessel, quiet for the windowing stack.
pub const DEFAULT_FILTER: &str = "debug,winit=info,calloop=info,sctk=info";

/// Install the global `tracing` subscriber with [`DEFAULT_FILTER`], unless
/// `RUST_LOG` is set.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter);
}

/// Install the global `tracing` subscriber with explicit filter directives.
///
/// Calling this more than once is harmless; only the first subscriber wins.
pub fn init_with_filter(directives: &str) {
    install(EnvFilter::new(directives));
}

fn install(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
