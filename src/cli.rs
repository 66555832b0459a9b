use std::time::Duration;

use clap::Parser;
use git_version::git_version;

use quadrature::{EncoderConfig, Resolution, SampleRate};

const GIT_VERSION: &str = git_version!(fallback = "unknown");

/// Samples a quadrature encoder and logs every delta.
#[derive(Parser, Debug)]
#[clap(name = "Quadrature", version = GIT_VERSION)]
pub struct Opts {
    #[clap(long, default_value = "23")]
    pub pin_a: u8,

    #[clap(long, default_value = "24")]
    pub pin_b: u8,

    /// One of 500, 1000, 2000, 4000, 8000, 16000
    #[clap(short, long, default_value = "1000")]
    pub rate: SampleRate,

    /// full or quarter
    #[clap(long, default_value = "full")]
    pub resolution: Resolution,

    /// How often the host drains the counter
    #[clap(long, default_value = "50")]
    pub drain_ms: u64,
}

impl Opts {
    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            pin_a: self.pin_a,
            pin_b: self.pin_b,
            rate: self.rate,
            resolution: self.resolution,
        }
    }

    pub fn drain_interval(&self) -> Duration {
        Duration::from_millis(self.drain_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_encoder_config() {
        let opts = Opts::parse_from(["quadrature"]);
        assert_eq!(opts.encoder_config(), EncoderConfig::default());
        assert_eq!(opts.drain_interval(), Duration::from_millis(50));
    }

    #[test]
    fn parses_rate_and_resolution() {
        let opts = Opts::parse_from([
            "quadrature",
            "--rate",
            "16000",
            "--resolution",
            "quarter",
            "--pin-a",
            "3",
            "--pin-b",
            "4",
            "--drain-ms",
            "0",
        ]);
        let config = opts.encoder_config();
        assert_eq!(config.rate, SampleRate::Hz16000);
        assert_eq!(config.resolution, Resolution::QuarterStep);
        assert_eq!((config.pin_a, config.pin_b), (3, 4));
        assert_eq!(opts.drain_interval(), Duration::from_millis(1));
    }

    #[test]
    fn rejects_unsupported_rate() {
        assert!(Opts::try_parse_from(["quadrature", "--rate", "3000"]).is_err());
    }
}
