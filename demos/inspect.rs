//! Print a summary of an MFMC file.
//!
//! Usage: `cargo run --example inspect --features hdf5 -- <file.mfmc> [group]`
//! Set `RUST_LOG=mfmc=debug` to see how the file is classified.

use std::env;
use std::process::ExitCode;

use mfmc::prelude::*;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file.mfmc> [group]", args[0]);
        return ExitCode::FAILURE;
    }

    let mut options = OpenOptions::default();
    if let Some(group) = args.get(2) {
        options = options.root_group(group);
    }

    match run(&args[1], options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str, options: OpenOptions) -> Result<()> {
    let file = FileIndex::open_with(path, options)?;
    println!("{} ({})", file.name(), file.root_group());

    println!("\n=== Probes ({}) ===", file.probes().len());
    for (name, probe) in file.probes() {
        let shapes = probe.element_shape()?;
        println!(
            "  {}: {} elements, {:.2} MHz, {} rectangular",
            name,
            probe.n_elements()?,
            probe.centre_frequency()? / 1.0e6,
            shapes.iter().filter(|s| **s == ElementShape::Rectangular).count()
        );
    }

    println!("\n=== Sequences ({}) ===", file.sequences().len());
    for (name, seq) in file.sequences() {
        println!(
            "  {}: {} frames x {} ascans x {} samples ({})",
            name,
            seq.n_frames()?,
            seq.n_ascans()?,
            seq.ascan_length()?,
            seq.data_type()?
        );
        let v = seq.velocities()?;
        println!(
            "    specimen velocity: {} / {} m/s",
            v.specimen_shear, v.specimen_longitudinal
        );
        match seq.filter_type() {
            Ok(f) => println!("    filter: {:?}", f),
            Err(Error::OptionalFieldMissing(_)) => {}
            Err(e) => return Err(e),
        }
        match seq.date_and_time() {
            Ok(dt) => println!("    recorded: {}", dt),
            Err(Error::OptionalFieldMissing(_)) => {}
            Err(e) => return Err(e),
        }

        let laws = seq.laws()?;
        println!("    laws: {}", laws.len());
        if let Some((law_name, law)) = laws.iter().next() {
            println!("    {}:", law_name);
            for key in law.keys()? {
                match law.value(&key) {
                    Ok(value) => println!("      {}: {}", key.to_lowercase(), value.to_json()),
                    Err(Error::UnknownField(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }
    }
    Ok(())
}
