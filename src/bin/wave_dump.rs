use fourier_synth::{FourierSynth, Viewport};

use flexi_logger::{Logger, opt_format};

use std::error::Error;
use std::fs;

/// Print the sampled waveform of a preset as CSV.
///
/// Usage: wave_dump <preset.json> [width] [height]
fn main() -> Result<(), Box<dyn Error>> {
    // Start as "RUST_LOG=debug cargo run --bin wave_dump <preset>" to show
    // log info
    Logger::with_env_or_str("fourier_synth=warn")
                            .format(opt_format)
                            .start()?;

    let mut args = std::env::args().skip(1);
    let filename = args.next().ok_or("Please give name of preset file to load as argument")?;
    let width = match args.next() {
        Some(w) => w.parse::<usize>()?,
        None => 900,
    };
    let height = match args.next() {
        Some(h) => h.parse::<f64>()?,
        None => 300.0,
    };

    let json = fs::read_to_string(&filename)?;
    let mut synth = FourierSynth::default();
    synth.import_json(&json)?;

    let frame = synth.render(&Viewport::new(width, height));
    let wave = &frame.wave;
    eprintln!("{} harmonics at {} Hz, gain {:.3}, {} pass(es), peaks {:.3} / {:.3}",
        synth.table().harmonic_count(),
        synth.table().fundamental(),
        synth.config().gain,
        frame.passes,
        wave.peak_positive,
        wave.peak_negative);

    println!("x,y");
    for (x, y) in wave.values.iter().enumerate() {
        println!("{},{}", x, y);
    }
    Ok(())
}
