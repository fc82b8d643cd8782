//! Tracing setup for the promptlab binary.
//!
//! The global subscriber can only be installed once per process; repeat calls
//! to [`init_tracing`] are no-ops.

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `level`. With `json` set, every event is written as
/// one JSON object per line.
pub fn init_tracing(json: bool, level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let (text_layer, json_layer) = if json {
        (None, Some(fmt::layer().json().with_current_span(true)))
    } else {
        (Some(fmt::layer().with_target(false)), None)
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_harmless() {
        init_tracing(false, Level::INFO);
        init_tracing(true, Level::DEBUG);
        tracing::info!("still logging");
    }
}
