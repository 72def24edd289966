//! Opt-in `tracing` setup for hosts embedding `track-transform`.
//!
//! Script jobs log setup/execution timing and every worker-side fault through
//! `tracing`. Hosts that already install a subscriber can ignore this module.

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,track_transform=debug";

/// Installs a compact fmt subscriber when the `telemetry` feature is enabled.
///
/// `RUST_LOG` takes precedence over [`DEFAULT_FILTER`]. Returns `false` when the
/// feature is disabled or a global subscriber is already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

#[cfg(all(test, not(feature = "telemetry")))]
mod tests {
    #[test]
    fn disabled_feature_installs_nothing() {
        assert!(!super::init_default_tracing());
    }
}
