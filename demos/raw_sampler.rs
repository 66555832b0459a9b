use std::error::Error;
use std::thread;

use clap::Parser;
use rppal::gpio::Gpio;

use quadrature::{Resolution, SampleRate, Sampler};

/// Example: poll the state machine without the timer thread
#[derive(Parser)]
struct Opts {
    #[clap(short, long, default_value = "1000")]
    rate: SampleRate,

    #[clap(long, default_value = "full")]
    resolution: Resolution,

    #[clap(long, default_value = "23")]
    pin_a: u8,

    #[clap(long, default_value = "24")]
    pin_b: u8,

    /// stop after this many steps in either direction
    count: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    let opts: Opts = Opts::parse();

    let a = Gpio::new()?.get(opts.pin_a)?.into_input_pullup();
    let b = Gpio::new()?.get(opts.pin_b)?.into_input_pullup();

    let mut sampler = Sampler::new(a, b, opts.resolution);
    let mut encoder_idx: i64 = 0;

    loop {
        let step = sampler.sample();
        if step != 0 {
            encoder_idx += step as i64;
            println!("idx {} (history {:04b})", encoder_idx, sampler.state());
        }

        if encoder_idx.unsigned_abs() >= opts.count {
            println!("Completed {} steps", encoder_idx.abs());
            break;
        }

        thread::sleep(opts.rate.period());
    }

    Ok(())
}
