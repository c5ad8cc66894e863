// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn flag_encodes_bare() {
    let mut args = Vec::new();
    OptionValue::Flag.encode_into("--resync", &mut args);
    assert_eq!(args, vec!["--resync".to_string()]);
}

#[test]
fn bool_true_encodes_bare_false_omits() {
    let mut args = Vec::new();
    OptionValue::Bool(true).encode_into("--force", &mut args);
    OptionValue::Bool(false).encode_into("--checksum", &mut args);
    assert_eq!(args, vec!["--force".to_string()]);
}

#[test]
fn scalar_encodes_key_value_pair() {
    let mut args = Vec::new();
    OptionValue::Text("10".to_string()).encode_into("--transfers", &mut args);
    assert_eq!(args, vec!["--transfers".to_string(), "10".to_string()]);
}

#[test]
fn list_repeats_flag_per_item() {
    let mut args = Vec::new();
    OptionValue::List(vec!["a".into(), "b".into()]).encode_into("--exclude", &mut args);
    assert_eq!(
        args,
        vec![
            "--exclude".to_string(),
            "a".to_string(),
            "--exclude".to_string(),
            "b".to_string()
        ]
    );
}

#[test]
fn kebab_cases_underscored_keys() {
    assert_eq!(kebab_flag("max_duration"), "--max-duration");
}

#[test]
fn reserved_keys_are_rejected() {
    let mut options = OptionMap::new();
    options.insert("resync".to_string(), OptionValue::Flag);
    options.insert("transfers".to_string(), OptionValue::Text("4".into()));
    let err = check_reserved_keys(&options).unwrap_err();
    assert_eq!(err, vec!["resync".to_string()]);
}

#[test]
fn round_trips_through_json_for_supported_shapes() {
    let mut options = OptionMap::new();
    options.insert("checksum".to_string(), OptionValue::Bool(true));
    options.insert("transfers".to_string(), OptionValue::Text("4".into()));
    options.insert(
        "exclude".to_string(),
        OptionValue::List(vec!["*.tmp".into(), "*.log".into()]),
    );
    options.insert("resync".to_string(), OptionValue::Flag);

    let json = serde_json::to_string(&options).unwrap();
    let decoded: OptionMap = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, options);
}
