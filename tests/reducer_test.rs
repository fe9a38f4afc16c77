use rscurl::reducer::{
    DEFAULT_MAX_RESPONSE_BYTES, Parsed, ReducedBody, ReducerLimits, parse_json, reduce,
};
use serde_json::{Value, json};

fn limits(ceiling: usize) -> ReducerLimits {
    ReducerLimits {
        structured_text_ceiling: ceiling,
        ..Default::default()
    }
}

#[test]
fn byte_truncated_text_never_exceeds_limit() {
    let inputs: Vec<Vec<u8>> = vec![
        b"plain ascii text that goes on and on".to_vec(),
        "múltiple bÿtes ünïcödé 日本語テキスト".as_bytes().to_vec(),
        vec![0xF0, 0x9F, 0x98, 0x80, 0xF0, 0x9F, 0x98, 0x80, 0xF0, 0x9F],
        vec![0xFF, 0xFE, 0x00, 0x41, 0xC3, 0x28, 0xA0, 0xA1],
        br#"{"truncated": "json", "value": [1, 2, 3]}"#.to_vec(),
    ];

    for raw in &inputs {
        for max in 1..=raw.len() + 2 {
            let result = reduce(raw, raw.len(), max, &ReducerLimits::default());
            if let ReducedBody::PlainText { text, .. } = &result.body {
                assert!(
                    text.len() <= max,
                    "text of {} bytes exceeds limit {} for input {:?}",
                    text.len(),
                    max,
                    raw
                );
            }
            assert_eq!(result.truncated_by_bytes(), raw.len() > max || result.decode_cut);
            if std::str::from_utf8(raw).is_ok() {
                assert!(!result.decode_cut);
            }
        }
    }
}

#[test]
fn structured_output_round_trips() {
    let raw = br#"{"b": [1, 2.5, "x"], "a": {"nested": null, "flag": true}}"#;
    let result = reduce(raw, raw.len(), DEFAULT_MAX_RESPONSE_BYTES, &ReducerLimits::default());

    let Parsed::Json(reparsed) = parse_json(result.text()) else {
        panic!("final text should parse as JSON");
    };
    assert_eq!(serde_json::to_string_pretty(&reparsed).unwrap(), result.text());
}

#[test]
fn within_limits_output_equals_parsed_original() {
    let original = json!({ "zeta": 1, "alpha": [true, false], "mid": { "k": "v" } });
    let raw = serde_json::to_vec(&original).unwrap();

    let result = reduce(&raw, raw.len(), raw.len(), &ReducerLimits::default());

    match &result.body {
        ReducedBody::Structured {
            value,
            truncated_by_bytes,
            truncated_structurally,
            ..
        } => {
            assert_eq!(value, &original);
            assert!(!truncated_by_bytes);
            assert!(!truncated_structurally);
        }
        other => panic!("expected structured body, got {:?}", other),
    }
    assert!(!result.is_truncated());
    // Insertion order survives formatting.
    let zeta = result.text().find("zeta").unwrap();
    let alpha = result.text().find("alpha").unwrap();
    assert!(zeta < alpha);
}

#[test]
fn five_hundred_integers_keep_first_hundred() {
    let items: Vec<u64> = (0..500).map(|i| 1_000_000_000_000 + i).collect();
    let raw = serde_json::to_vec(&items).unwrap();
    let formatted_len = serde_json::to_string_pretty(&items).unwrap().len();
    let ceiling = formatted_len / 2;

    let result = reduce(&raw, raw.len(), DEFAULT_MAX_RESPONSE_BYTES, &limits(ceiling));

    let ReducedBody::Structured {
        value,
        truncated_by_bytes,
        truncated_structurally,
        ..
    } = &result.body
    else {
        panic!("expected structured body");
    };
    assert!(*truncated_structurally);
    assert!(!truncated_by_bytes);
    let kept: Vec<u64> = serde_json::from_value(value.clone()).unwrap();
    assert_eq!(kept, items[..100]);
    assert!(result.text().len() <= ceiling);
}

#[test]
fn small_payload_with_many_short_elements_is_reduced() {
    // Compact input well under the byte budget that expands when indented.
    let raw = serde_json::to_vec(&vec![0u8; 400]).unwrap();
    assert_eq!(raw.len(), 801);

    let result = reduce(&raw, raw.len(), 1000, &limits(1500));

    assert!(!result.truncated_by_bytes());
    assert!(result.truncated_structurally());
    assert_eq!(result.text().matches('0').count(), 100);
}

#[test]
fn byte_truncated_json_prefix_is_plain_text() {
    let raw = serde_json::to_vec(&json!({ "items": (0..100).collect::<Vec<_>>() })).unwrap();
    let result = reduce(&raw, raw.len(), 40, &ReducerLimits::default());

    match result.body {
        ReducedBody::PlainText {
            text,
            truncated_by_bytes,
            truncated_structurally,
        } => {
            assert!(truncated_by_bytes);
            assert!(!truncated_structurally);
            assert_eq!(text.as_bytes(), &raw[..40]);
        }
        other => panic!("expected plain text, got {:?}", other),
    }
}

#[test]
fn byte_truncation_can_still_yield_valid_json() {
    // A prefix that happens to be a complete document.
    let raw = b"[1, 2, 3]      trailing garbage";
    let result = reduce(raw, raw.len(), 15, &ReducerLimits::default());

    assert!(result.truncated_by_bytes());
    assert!(!result.truncated_structurally());
    let Parsed::Json(value) = parse_json(result.text()) else {
        panic!("expected JSON");
    };
    assert_eq!(value, Value::from(vec![1, 2, 3]));
}

#[test]
fn empty_response_is_empty_text() {
    let result = reduce(b"", 0, DEFAULT_MAX_RESPONSE_BYTES, &ReducerLimits::default());
    assert_eq!(result.text(), "");
    assert!(!result.is_truncated());
}
