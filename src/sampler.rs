//! The quadrature state machine.
//!
//! Every tick the two pin levels are shifted into a 4-bit history: the
//! previous pair sits in bits 3..2, the current pair in bits 1..0, with pin A
//! as the high bit of each pair. Only a handful of the 16 histories count as
//! motion; everything else (no change, bounce, skipped states) classifies as 0.

use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use embedded_hal::digital::v2::InputPin;

/// Only the low 4 bits of the history carry meaning.
pub const HISTORY_MASK: u8 = 0b1111;

/// Which history patterns are counted as a step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Resolution {
    /// One step per detent. Only `0001` (-1) and `0010` (+1) count, which
    /// ignores most contact noise.
    #[default]
    FullStep,
    /// One step per state change, four per detent.
    QuarterStep,
}

impl Resolution {
    /// Classify a 4-bit history into -1, 0 or +1.
    ///
    /// Bits above the low nibble are ignored.
    pub fn classify(self, history: u8) -> i8 {
        match (self, history & HISTORY_MASK) {
            (_, 0b0001) => -1,
            (_, 0b0010) => 1,
            (Resolution::QuarterStep, 0b0111 | 0b1110 | 0b1000) => -1,
            (Resolution::QuarterStep, 0b1011 | 0b1101 | 0b0100) => 1,
            _ => 0,
        }
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Resolution::FullStep),
            "quarter" => Ok(Resolution::QuarterStep),
            unsupported => Err(format!("{} is not a valid resolution", unsupported)),
        }
    }
}

impl Display for Resolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::FullStep => f.write_str("full"),
            Resolution::QuarterStep => f.write_str("quarter"),
        }
    }
}

/// Push one pin-pair reading into `history` and drop everything but the
/// newest two pairs.
pub fn shift_in(history: u8, a: bool, b: bool) -> u8 {
    ((history << 2) | ((a as u8) << 1) | (b as u8)) & HISTORY_MASK
}

/// Owns the two encoder inputs and the shift history.
///
/// The history is only touched through [`Sampler::sample`], which the timer
/// calls once per tick.
#[derive(Debug)]
pub struct Sampler<A, B> {
    a: A,
    b: B,
    state: u8,
    resolution: Resolution,
}

impl<A, B> Sampler<A, B>
where
    A: InputPin<Error = Infallible>,
    B: InputPin<Error = Infallible>,
{
    /// Take ownership of the pins and seed the history from their current
    /// levels. The seeding sample is never counted.
    pub fn new(a: A, b: B, resolution: Resolution) -> Self {
        let mut sampler = Self {
            a,
            b,
            state: 0,
            resolution,
        };
        sampler.sample();
        sampler
    }

    /// Read both pins, advance the history and return the step it implies.
    pub fn sample(&mut self) -> i8 {
        self.state = shift_in(self.state, level(&self.a), level(&self.b));
        self.resolution.classify(self.state)
    }

    /// The masked history after the latest sample.
    pub fn state(&self) -> u8 {
        self.state
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn into_pins(self) -> (A, B) {
        (self.a, self.b)
    }
}

fn level<P: InputPin<Error = Infallible>>(pin: &P) -> bool {
    match pin.is_high() {
        Ok(high) => high,
        Err(never) => match never {},
    }
}
