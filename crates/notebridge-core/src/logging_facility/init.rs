//! Subscriber installation

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Output profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable, debug level (store IO visible)
    Development,
    /// JSON lines, info level (operation start/end only)
    Production,
    /// No output; pair with `init_test_capture()`
    Test,
}

impl Profile {
    /// Filter used when `RUST_LOG` is unset
    pub fn default_directives(&self) -> &'static str {
        match self {
            Profile::Development => "notebridge_core=debug,notebridge_store=debug",
            Profile::Production => "notebridge_core=info,notebridge_store=info",
            Profile::Test => "off",
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directives()))
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`
///
/// Only the first call has any effect.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt().with_env_filter(profile.env_filter()).init();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(profile.env_filter())
                .init();
        }
        Profile::Test => {
            tracing_subscriber::registry().init();
        }
    });
}
