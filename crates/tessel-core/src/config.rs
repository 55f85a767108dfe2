//! Runtime configuration for a Tessel application.

use crate::profiling::ProfilingBackend;

/// Environment variable overriding [`Config::log_filter`].
pub const ENV_LOG: &str = "TESSEL_LOG";
/// Environment variable selecting [`ProfilingMode`] (`off`, `on`, `http`).
pub const ENV_PROFILE: &str = "TESSEL_PROFILE";
/// Environment variable overriding [`Config::target_fps`] (`0` disables the cap).
pub const ENV_TARGET_FPS: &str = "TESSEL_TARGET_FPS";

/// Configuration for the Tessel toolkit.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `tracing` filter directives.
    pub log_filter: String,
    pub profiling: ProfilingMode,
    /// Frame rate cap enforced by sleeping at the end of a frame. `None` runs uncapped.
    pub target_fps: Option<u32>,
    /// Hide the native cursor over the window.
    pub hide_cursor: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_filter: crate::logging::DEFAULT_FILTER.to_string(),
            profiling: ProfilingMode::Off,
            target_fps: Some(60),
            hide_cursor: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilingMode {
    /// Profiling is disabled
    Off,
    /// Scopes are recorded in-process
    On,
    /// Scopes are recorded and served to external tools such as 'puffin_viewer'
    WithWebServer,
}

impl ProfilingMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" | "0" | "false" => Some(Self::Off),
            "on" | "1" | "true" => Some(Self::On),
            "http" | "web" | "server" => Some(Self::WithWebServer),
            _ => None,
        }
    }

    /// Backend to hand to [`crate::profiling::init_profiling`], if any.
    pub fn backend(self) -> Option<ProfilingBackend> {
        match self {
            ProfilingMode::Off => None,
            ProfilingMode::On => Some(ProfilingBackend::InProcess),
            #[cfg(feature = "profiling")]
            ProfilingMode::WithWebServer => Some(ProfilingBackend::PuffinHttp),
            #[cfg(not(feature = "profiling"))]
            ProfilingMode::WithWebServer => Some(ProfilingBackend::InProcess),
        }
    }
}

impl Config {
    /// Defaults overridden by the `TESSEL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`. Unparsable values are
    /// ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(filter) = lookup(ENV_LOG) {
            config.log_filter = filter;
        }

        if let Some(value) = lookup(ENV_PROFILE) {
            match ProfilingMode::parse(&value) {
                Some(mode) => config.profiling = mode,
                None => tracing::warn!("ignoring {ENV_PROFILE}={value:?}"),
            }
        }

        if let Some(value) = lookup(ENV_TARGET_FPS) {
            match value.trim().parse::<u32>() {
                Ok(0) => config.target_fps = None,
                Ok(fps) => config.target_fps = Some(fps),
                Err(_) => tracing::warn!("ignoring {ENV_TARGET_FPS}={value:?}"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.target_fps, Some(60));
        assert_eq!(config.profiling, ProfilingMode::Off);
        assert!(!config.hide_cursor);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = Config::from_lookup(|key| match key {
            ENV_LOG => Some("warn".to_string()),
            ENV_PROFILE => Some("ON".to_string()),
            ENV_TARGET_FPS => Some("30".to_string()),
            _ => None,
        });
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.profiling, ProfilingMode::On);
        assert_eq!(config.target_fps, Some(30));
    }

    #[test]
    fn test_zero_fps_disables_cap() {
        let config = Config::from_lookup(|key| (key == ENV_TARGET_FPS).then(|| "0".to_string()));
        assert_eq!(config.target_fps, None);
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let config = Config::from_lookup(|key| match key {
            ENV_PROFILE => Some("sometimes".to_string()),
            ENV_TARGET_FPS => Some("fast".to_string()),
            _ => None,
        });
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_profiling_backend() {
        assert_eq!(ProfilingMode::Off.backend(), None);
        assert_eq!(ProfilingMode::On.backend(), Some(ProfilingBackend::InProcess));
    }
}
