use clap::Parser;
use log::info;
use tokio::sync::mpsc;

use quadrature::{DeltaWatch, GpioEncoder, Result};

mod cli;

/// # Quadrature
/// Samples a rotary encoder on a fixed timer and reports how far it moved.
///
/// The sampling thread only counts; this loop drains the count on an
/// interval, keeps a running position and logs it. Ctrl+C stops sampling and
/// picks up whatever was counted after the last drain.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let opts = cli::Opts::parse();

    let config = opts.encoder_config();
    let mut encoder = GpioEncoder::from_gpio(&config)?;
    info!(
        "sampling pins {}/{} at {} ({} step)",
        config.pin_a, config.pin_b, config.rate, config.resolution
    );

    let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })?;

    let (watch, mut deltas) = DeltaWatch::spawn(encoder.accumulator(), opts.drain_interval());
    let mut position: i64 = 0;

    loop {
        tokio::select! {
            Some(delta) = deltas.recv() => {
                position += delta as i64;
                info!("delta {:+} => position {}", delta, position);
            }
            _ = shutdown_rx.recv() => {
                info!("received Ctrl+C");
                break;
            }
            else => break,
        }
    }

    watch.stop().await;
    while let Some(delta) = deltas.recv().await {
        position += delta as i64;
    }

    encoder.stop()?;
    let mut remainder = 0;
    if encoder.update(&mut remainder) {
        position += remainder as i64;
        info!("drained {:+} after stop", remainder);
    }

    info!("final position {}", position);
    Ok(())
}
