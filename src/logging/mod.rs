//! Tracing setup for the combo core.
//!
//! Initialization is idempotent: the first call wins, later calls (or an
//! already-installed global subscriber, e.g. bevy's LogPlugin) are ignored.
//! `RUST_LOG` overrides the built-in filter when set.

use bevy::prelude::*;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Default filter: quiet overall, verbose for combat state transitions.
pub const DEFAULT_FILTER: &str = "info,combo_core::combat=debug";

pub struct LoggingPlugin;

impl Plugin for LoggingPlugin {
    fn build(&self, _app: &mut App) {
        init_tracing(None);
    }
}

static TRACING_INIT: Once = Once::new();

/// Install a compact fmt subscriber. Pass a filter directive string to
/// override [`DEFAULT_FILTER`]; `RUST_LOG` beats both.
pub fn init_tracing(filter: Option<&str>) {
    let fallback = filter.unwrap_or(DEFAULT_FILTER).to_string();
    TRACING_INIT.call_once(move || {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&fallback));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact();

        // Ignore failure if another subscriber beat us to it.
        let _ = subscriber.try_init();
    });
}
