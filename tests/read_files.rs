//! Integration tests for reading complete MFMC structures.

mod common;

use common::*;
use mfmc::core::MemoryStorage;
use mfmc::prelude::*;

fn open(store: MemoryStorage) -> FileIndex {
    init_logging();
    FileIndex::from_storage(store, OpenOptions::default()).expect("fixture should open")
}

#[test]
fn test_enumeration_order() {
    let file = open(standard_file());
    let probes: Vec<&str> = file.probes().names().collect();
    assert_eq!(probes, vec!["PROBE<1>", "PROBE<2>", "PROBE<10>"]);
    let sequences: Vec<&str> = file.sequences().names().collect();
    assert_eq!(sequences, vec!["SEQUENCE<1>"]);
}

#[test]
fn test_probe_fields() {
    let file = open(standard_file());
    let probe = &file.probes()["PROBE<1>"];
    assert_eq!(probe.n_elements().unwrap(), 3);
    assert_eq!(
        probe.get("probe_serial_number").unwrap(),
        Field::Value(Value::Text("SN-0042".into()))
    );
    let extra = probe.user_attributes().unwrap();
    assert_eq!(extra.len(), 1);
    assert_eq!(extra["Custom_Cable"].as_str(), Some("3m"));
    assert!(probe.user_datasets().unwrap().is_empty());

    let dirs = probe.ultrasound_direction().unwrap();
    assert_eq!(dirs.len(), 3);
    for d in dirs {
        assert!((d.z - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_sequence_derived_values() {
    let file = open(standard_file());
    let seq = &file.sequences()["SEQUENCE<1>"];
    assert_eq!(seq.n_frames().unwrap(), N_FRAMES);
    assert_eq!(seq.n_ascans().unwrap(), N_ASCANS);
    assert_eq!(seq.ascan_length().unwrap(), N_SAMPLES);
    assert_eq!(seq.data_type().unwrap(), DataType::Int16);

    let v = seq.velocities().unwrap();
    assert_eq!((v.specimen_shear, v.specimen_longitudinal), (3130.0, 5890.0));
    assert!(v.wedge_shear.is_none() && v.wedge_longitudinal.is_none());

    // Laws: the untagged scratch group is ignored.
    let laws: Vec<&str> = seq.laws().unwrap().names().collect();
    assert_eq!(laws, vec!["LAW<1>", "LAW<2>", "LAW<3>"]);
}

#[test]
fn test_cross_references() {
    let file = open(standard_file());
    let seq = &file.sequences()["SEQUENCE<1>"];

    let probes: Vec<String> = seq.probe_list().unwrap().iter().map(|p| p.name().to_string()).collect();
    assert_eq!(probes, vec!["PROBE<2>", "PROBE<1>"]);

    let law = file.find_law("SEQUENCE<1>", "LAW<3>").unwrap();
    let law_probes = law.probes().unwrap();
    assert_eq!(law_probes.len(), 1);
    assert_eq!(&law_probes[0], &file.probes()["PROBE<1>"]);
    assert_eq!(law.elements().unwrap(), vec![1]);
}

#[test]
fn test_ascan_pairs_laws() {
    let file = open(standard_file());
    let seq = &file.sequences()["SEQUENCE<1>"];
    let pairs: Vec<(String, String)> = seq
        .ascan_iter()
        .unwrap()
        .map(|a| {
            let a = a.unwrap();
            (a.transmit_law.name().to_string(), a.receive_law.name().to_string())
        })
        .collect();
    let expected = [("LAW<1>", "LAW<1>"), ("LAW<3>", "LAW<1>"), ("LAW<2>", "LAW<3>")];
    for (got, want) in pairs.iter().zip(expected) {
        assert_eq!((got.0.as_str(), got.1.as_str()), want);
    }
}

#[test]
fn test_ascan_data() {
    let file = open(standard_file());
    let seq = &file.sequences()["SEQUENCE<1>"];
    let a = seq.get_ascan(2, false).unwrap();
    assert_eq!(a.data.shape().sizes(), &[N_FRAMES, N_SAMPLES]);
    assert_eq!(a.len(), N_SAMPLES);
    let values = a.data.to_i64_vec().unwrap();
    assert_eq!(values[0], -20);
    assert_eq!(values[N_SAMPLES], 80);
}

#[test]
fn test_close_invalidates_entities() {
    let mut file = open(standard_file());
    let seq = file.sequences()["SEQUENCE<1>"].clone();
    let probe = file.probes()["PROBE<2>"].clone();
    assert!(seq.get_ascan(0, true).is_ok());

    file.close();
    assert!(matches!(seq.get_ascan(0, true), Err(Error::HandleClosed)));
    assert!(matches!(probe.element_shape(), Err(Error::HandleClosed)));
    assert!(matches!(seq.user_attributes(), Err(Error::HandleClosed)));
    file.close();
}

#[test]
fn test_drop_invalidates_entities() {
    let seq = {
        let file = open(standard_file());
        file.sequences()["SEQUENCE<1>"].clone()
    };
    assert!(matches!(seq.n_ascans(), Err(Error::HandleClosed)));
}

#[test]
fn test_json_rendering() {
    let file = open(standard_file());
    let probe = &file.probes()["PROBE<10>"];
    let value = probe.value("element_position").unwrap();
    let json = value.to_json();
    assert_eq!(json["shape"], serde_json::json!([2, 3]));
    assert_eq!(json["dtype"], "float64");
}
