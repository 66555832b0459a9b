use core::result;

use thiserror::Error;

pub type Result<T> = result::Result<T, Error>;

/// An Error that can occur in this crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    GpioError(#[from] rppal::gpio::Error),

    #[error("Failed to spawn timer thread: {0}")]
    SpawnError(#[from] std::io::Error),

    #[error("Timer thread error: {0}")]
    TimerThreadError(String),

    #[error("{0}")]
    SignalError(#[from] ctrlc::Error),
}
