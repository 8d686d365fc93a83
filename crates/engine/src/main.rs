use anyhow::Context;
use log::{error, info, warn};
use tcsim_core::ConnectionState;
use tcsim_engine::Engine;
use tcsim_engine::config::{load_config, load_default_config};
use tokio::sync::broadcast::error::RecvError;

fn print_help() {
    eprintln!(
        r#"tcsim - real-time transaction cost estimator

USAGE:
    tcsim [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Synthetic feed with built-in defaults
    tcsim

    # Live feed (wss:// endpoints need a build with --features tls)
    tcsim --config live.json
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    print_help();
                    anyhow::bail!("--config requires a path argument");
                };
                config_path = Some(path.clone());
            }
            arg => {
                print_help();
                anyhow::bail!("unknown argument: {}", arg);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            load_config(&path).with_context(|| format!("loading {}", path))?
        }
        None => load_default_config().context("loading embedded configuration")?,
    };
    config.validate().context("invalid configuration")?;

    let defaults = &config.defaults;
    info!(
        "Feed: {:?} {}:{} | qty={} vol={} tier={}",
        config.feed.mode,
        config.feed.exchange,
        config.feed.symbol,
        defaults.quantity,
        defaults.volatility,
        defaults.fee_tier
    );

    let engine = Engine::new(config)?;
    let mut estimates = engine.subscribe();
    let mut connection = engine.watch_connection();

    engine.connect()?;
    engine.start();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
            received = estimates.recv() => match received {
                Ok(estimate) => info!("#{} {}", estimate.sequence, estimate.summary()),
                Err(RecvError::Lagged(skipped)) => warn!("Display lagged, skipped {} estimates", skipped),
                Err(RecvError::Closed) => break,
            },
            changed = connection.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *connection.borrow_and_update();
                info!("Connection {}", state);
                if state == ConnectionState::Failed {
                    error!("Feed connection failed, giving up");
                    break;
                }
            }
        }
    }

    engine.stop();
    engine.disconnect();
    if let Some(last) = engine.latest_estimate() {
        info!("Last estimate #{}: {}", last.sequence, last.summary());
    }
    Ok(())
}
