//! Shared MFMC fixtures built on the in-memory store.

#![allow(dead_code)]

use std::sync::Once;

use mfmc::core::{Array, MemoryStorage};
use mfmc::DataType;

pub const N_FRAMES: usize = 2;
pub const N_ASCANS: usize = 3;
pub const N_SAMPLES: usize = 8;
pub const TIME_STEP: f64 = 2.5e-8;
pub const START_TIME: f64 = 4.0e-6;

/// Install a log subscriber once per test binary (`RUST_LOG` controls it).
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Root carrying the MFMC contract and nothing else.
pub fn empty_file() -> MemoryStorage {
    let mut s = MemoryStorage::new("fixture.mfmc");
    s.attr("/", "TYPE", "MFMC").attr("/", "VERSION", "2.0.0");
    s
}

/// Add a flat linear-array probe with `n` elements.
pub fn add_probe(s: &mut MemoryStorage, name: &str, n: usize, shapes: Vec<i64>) {
    let path = format!("/{}", name);
    let positions: Vec<f64> = (0..n).flat_map(|i| [i as f64 * 6.0e-4, 0.0, 0.0]).collect();
    s.attr(&path, "TYPE", "PROBE")
        .attr(&path, "CENTRE_FREQUENCY", 5.0e6)
        .attr(&path, "PROBE_SERIAL_NUMBER", "SN-0042")
        .attr(&path, "Custom_Cable", "3m")
        .dataset(
            &format!("{}/ELEMENT_POSITION", path),
            Array::from_f64(DataType::Float64, &[n, 3], positions).unwrap(),
        )
        .dataset(
            &format!("{}/ELEMENT_MAJOR", path),
            Array::from_f64(DataType::Float64, &[n, 3], [5.0e-3, 0.0, 0.0].repeat(n)).unwrap(),
        )
        .dataset(
            &format!("{}/ELEMENT_MINOR", path),
            Array::from_f64(DataType::Float64, &[n, 3], [0.0, 2.5e-4, 0.0].repeat(n)).unwrap(),
        )
        .dataset(
            &format!("{}/ELEMENT_SHAPE", path),
            Array::from_i64(DataType::Int32, &[shapes.len()], shapes).unwrap(),
        );
}

/// Signed samples: `frame * 100 + ascan * 10 + sample - 40`.
pub fn signed_samples() -> Array {
    let mut values = Vec::new();
    for f in 0..N_FRAMES {
        for a in 0..N_ASCANS {
            for s in 0..N_SAMPLES {
                values.push((f * 100 + a * 10 + s) as i64 - 40);
            }
        }
    }
    Array::from_i64(DataType::Int16, &[N_FRAMES, N_ASCANS, N_SAMPLES], values).unwrap()
}

/// Add a sequence with three laws and the given sample data.
pub fn add_sequence(s: &mut MemoryStorage, name: &str, data: Array) {
    let path = format!("/{}", name);
    s.attr(&path, "TYPE", "SEQUENCE")
        .attr(&path, "TIME_STEP", TIME_STEP)
        .attr(&path, "START_TIME", START_TIME)
        .attr(&path, "SPECIMEN_VELOCITY", vec![3130.0, 5890.0])
        .dataset(&format!("{}/MFMC_DATA", path), data)
        .dataset(&format!("{}/TRANSMIT_LAW", path), vec![0i64, 2, 1])
        .dataset(&format!("{}/RECEIVE_LAW", path), vec![0i64, 0, 2])
        .dataset(&format!("{}/PROBE_LIST", path), vec![1i64, 0])
        .dataset(&format!("{}/PROBE_PLACEMENT_INDEX", path), vec![0i64])
        .dataset(&format!("{}/PROBE_POSITION", path), vec![0.0, 0.0, 0.0])
        .dataset(&format!("{}/PROBE_X_DIRECTION", path), vec![1.0, 0.0, 0.0])
        .dataset(&format!("{}/PROBE_Y_DIRECTION", path), vec![0.0, 1.0, 0.0]);
    for (i, law) in ["LAW<1>", "LAW<3>", "LAW<2>"].iter().enumerate() {
        let law_path = format!("{}/{}", path, law);
        s.attr(&law_path, "TYPE", "LAW")
            .dataset(&format!("{}/PROBE", law_path), vec![0i64])
            .dataset(&format!("{}/ELEMENT", law_path), vec![i as i64]);
    }
    s.group(&format!("{}/scratch", path));
}

/// Three probes stored out of natural order, one sequence, plus noise.
pub fn standard_file() -> MemoryStorage {
    let mut s = empty_file();
    add_probe(&mut s, "PROBE<1>", 3, vec![1, 2, 1]);
    add_probe(&mut s, "PROBE<10>", 2, vec![1, 1]);
    add_probe(&mut s, "PROBE<2>", 2, vec![2, 2]);
    add_sequence(&mut s, "SEQUENCE<1>", signed_samples());
    s.group("/untagged").attr("/thumbnail", "TYPE", "IMAGE");
    s
}
