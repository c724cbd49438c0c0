#![cfg(feature = "serde")]

use hmm_viterbi::{Decoder, HmmModel};

#[test]
fn decoding_serializes_with_labels_and_domain() {
    let model = HmmModel::from_dense(
        vec!["A", "B"],
        vec![0u8, 1],
        vec![0.6, 0.4],
        vec![vec![0.7, 0.3], vec![0.4, 0.6]],
        vec![vec![0.5, 0.5], vec![0.1, 0.9]],
    )
    .unwrap();
    let decoding = Decoder::default().decode(&model, &[0, 1, 1, 0]).unwrap();
    let json = serde_json::to_value(&decoding).unwrap();

    assert_eq!(json["path"], serde_json::json!(["A", "A", "A", "A"]));
    assert_eq!(json["trellis"]["domain"], "Log");
    assert_eq!(json["trellis"]["states"], serde_json::json!(["A", "B"]));
    assert_eq!(json["trellis"]["observations"], serde_json::json!([0, 1, 1, 0]));
    assert_eq!(json["trellis"]["values"].as_array().unwrap().len(), 8);

    let linear = serde_json::to_value(decoding.trellis().to_linear()).unwrap();
    assert_eq!(linear["domain"], "Linear");
    let first = linear["values"][0].as_f64().unwrap();
    assert!((first - 0.3).abs() < 1e-12);
}
