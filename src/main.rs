//! # Pad Bridge
//!
//! Demo poll loop: binds the configured joystick and prints normalized
//! input events as structured logs.

use anyhow::Result;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use pad_bridge::backend::evdev::EvdevRegistry;
use pad_bridge::backend::joystick::PrimaryJoystick;
use pad_bridge::backend::InputPoller;
use pad_bridge::config::Config;
use pad_bridge::snapshot::EventQueue;

/// Number of polls between status log messages
const LOG_INTERVAL_POLLS: u64 = 300;

/// Main entry point for the pad bridge demo loop
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (first CLI argument, or `pad-bridge.toml`)
///    - Enumerate input devices and bind the configured joystick
///
/// 2. **Main Loop**
///    - Poll the bound backend at the configured rate
///    - Drain the event queue, logging non-neutral events
///    - Log status every [`LOG_INTERVAL_POLLS`] polls
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Release the bound device
///    - Log total poll count
///
/// # Errors
///
/// Returns error only if the configuration file is present but invalid.
/// A disabled joystick section, a missing device, and enumeration or
/// open failures are not errors: the loop runs unbound and produces no
/// events.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Pad Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "pad-bridge.toml".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) if matches!(&e, pad_bridge::error::PadBridgeError::Io(io) if io.kind() == std::io::ErrorKind::NotFound) => {
            warn!("no config file at {}; using defaults", config_path);
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };

    // A missing or misconfigured controller is not fatal: the loop runs
    // unbound and produces no events.
    let mut poller = InputPoller::unbound();
    match EvdevRegistry::enumerate() {
        Ok(registry) => PrimaryJoystick::bind(&config.joystick, &registry, &mut poller),
        Err(e) => warn!("device enumeration failed: {}; input unbound", e),
    }

    let period_ms = 1000 / u64::from(config.poll.rate_hz);
    let mut poll_interval = interval(Duration::from_millis(period_ms.max(1)));

    info!("Starting poll loop at {}Hz", config.poll.rate_hz);
    info!("Press Ctrl+C to exit");

    let mut queue = EventQueue::new();
    let mut poll_count: u64 = 0;
    let mut last_log_count: u64 = 0;

    // Main poll loop
    loop {
        tokio::select! {
            _ = poll_interval.tick() => {
                poller.poll(&mut queue);
                poll_count += 1;

                while let Some(event) = queue.pop() {
                    if event.buttons != 0 || event.turn != 0 || event.forward != 0
                        || event.strafe != 0 || event.look != 0
                    {
                        debug!(
                            "buttons={:#x} turn={} forward={} strafe={} look={}",
                            event.buttons, event.turn, event.forward, event.strafe, event.look
                        );
                    }
                }

                if poll_count - last_log_count >= LOG_INTERVAL_POLLS {
                    info!("Completed {} polls ({}Hz)", poll_count, config.poll.rate_hz);
                    last_log_count = poll_count;
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total polls: {}", poll_count);
                break;
            }
        }
    }

    poller.shutdown();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_period_is_whole_milliseconds() {
        let config = Config::default();
        let period_ms = 1000 / u64::from(config.poll.rate_hz);
        assert!(period_ms >= 1, "rate {}Hz has sub-ms period", config.poll.rate_hz);
    }

    #[test]
    fn test_log_interval_constant() {
        // At the default 60Hz, 300 polls = 5 seconds between status lines.
        let seconds = LOG_INTERVAL_POLLS as f64 / Config::default().poll.rate_hz as f64;
        assert_eq!(seconds, 5.0);
    }
}
