//! # Quadrature
//! Timer-sampled quadrature decoding for a rotary encoder wired to two
//! pull-up inputs.
//!
//! A periodic tick reads both pins, pushes the pair into a 4-bit history and
//! classifies the history into a step of -1, 0 or +1. Steps are summed into an
//! [`Accumulator`] that the host drains whenever it likes.
//!
//! ```no_run
//! use quadrature::{EncoderConfig, GpioEncoder};
//!
//! # fn main() -> quadrature::Result<()> {
//! let mut encoder = GpioEncoder::from_gpio(&EncoderConfig::default())?;
//!
//! let mut delta = 0;
//! if encoder.update(&mut delta) {
//!     println!("moved {}", delta);
//! }
//! encoder.stop()?;
//! # Ok(())
//! # }
//! ```

pub mod accumulator;
pub mod encoder;
pub mod error;
pub mod sampler;
pub mod timer;
pub mod watch;

pub use accumulator::Accumulator;
pub use encoder::{Encoder, EncoderConfig, GpioEncoder};
pub use error::{Error, Result};
pub use sampler::{Resolution, Sampler};
pub use timer::{PeriodicTimer, SampleRate, Tick};
pub use watch::DeltaWatch;
