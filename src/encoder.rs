use std::convert::Infallible;
use std::sync::Arc;

use embedded_hal::digital::v2::InputPin;
use log::debug;
use rppal::gpio::{self, Gpio};

use crate::accumulator::Accumulator;
use crate::sampler::{Resolution, Sampler};
use crate::timer::{PeriodicTimer, SampleRate, Tick};
use crate::Result;

/// Where the encoder is wired and how it is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// BCM number of the A (clock) input
    pub pin_a: u8,
    /// BCM number of the B (data) input
    pub pin_b: u8,
    pub rate: SampleRate,
    pub resolution: Resolution,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            pin_a: 23,
            pin_b: 24,
            rate: SampleRate::default(),
            resolution: Resolution::default(),
        }
    }
}

/// What the timer runs every tick: sample the pins, count the step.
pub struct SamplingTask<A, B> {
    sampler: Sampler<A, B>,
    accumulator: Arc<Accumulator>,
}

impl<A, B> SamplingTask<A, B> {
    pub fn sampler(&self) -> &Sampler<A, B> {
        &self.sampler
    }
}

impl<A, B> Tick for SamplingTask<A, B>
where
    A: InputPin<Error = Infallible> + Send + 'static,
    B: InputPin<Error = Infallible> + Send + 'static,
{
    fn tick(&mut self) {
        self.accumulator.add(self.sampler.sample());
    }
}

/// A sampled quadrature encoder.
///
/// The sampler and its history live on the timer thread while running; the
/// host only ever touches the shared [`Accumulator`].
pub struct Encoder<A, B>
where
    A: InputPin<Error = Infallible> + Send + 'static,
    B: InputPin<Error = Infallible> + Send + 'static,
{
    accumulator: Arc<Accumulator>,
    timer: PeriodicTimer<SamplingTask<A, B>>,
}

pub type GpioEncoder = Encoder<gpio::InputPin, gpio::InputPin>;

impl GpioEncoder {
    /// Claim both pins as pull-up inputs and start sampling them.
    pub fn from_gpio(config: &EncoderConfig) -> Result<Self> {
        let gpio = Gpio::new()?;
        let a = gpio.get(config.pin_a)?.into_input_pullup();
        let b = gpio.get(config.pin_b)?.into_input_pullup();

        debug!(
            "encoder on pins A={} B={} ({} step)",
            config.pin_a, config.pin_b, config.resolution
        );
        Encoder::begin(a, b, config.rate, config.resolution)
    }
}

impl<A, B> Encoder<A, B>
where
    A: InputPin<Error = Infallible> + Send + 'static,
    B: InputPin<Error = Infallible> + Send + 'static,
{
    /// Seed the history from the current pin levels, then start the timer.
    pub fn begin(a: A, b: B, rate: SampleRate, resolution: Resolution) -> Result<Self> {
        let accumulator = Arc::new(Accumulator::new());
        let task = SamplingTask {
            sampler: Sampler::new(a, b, resolution),
            accumulator: accumulator.clone(),
        };

        let mut encoder = Self {
            accumulator,
            timer: PeriodicTimer::new(rate, task),
        };
        encoder.start()?;
        Ok(encoder)
    }

    /// Resume sampling after [`stop`](Encoder::stop). Steps counted before the
    /// stop are still waiting to be drained.
    pub fn start(&mut self) -> Result<()> {
        self.timer.start()
    }

    /// Halt sampling. The accumulator is left as is.
    pub fn stop(&mut self) -> Result<()> {
        self.timer.stop()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn rate(&self) -> SampleRate {
        self.timer.rate()
    }

    /// The sampler, while stopped.
    pub fn sampler(&self) -> Option<&Sampler<A, B>> {
        self.timer.task().map(SamplingTask::sampler)
    }

    /// Write the steps counted since the last call into `delta`.
    /// Returns false, with `delta` set to 0, when there were none.
    pub fn update(&self, delta: &mut i8) -> bool {
        self.accumulator.update(delta)
    }

    pub fn drain(&self) -> Option<i8> {
        self.accumulator.drain()
    }

    /// Handle for draining from elsewhere, e.g. a [`DeltaWatch`](crate::DeltaWatch).
    pub fn accumulator(&self) -> Arc<Accumulator> {
        self.accumulator.clone()
    }
}
