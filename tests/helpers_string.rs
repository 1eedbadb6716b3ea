use eventgate::{BuildError, EventDocument, HelperDefinition, HelperRegistry};
use serde_json::json;

fn build(target: &str, name: &str, parameters: &[&str]) -> eventgate::Helper {
    HelperRegistry::engine()
        .build(&HelperDefinition::new(
            target,
            name,
            parameters.iter().copied(),
        ))
        .unwrap()
}

fn build_err(target: &str, name: &str, parameters: &[&str]) -> BuildError {
    match HelperRegistry::engine().build(&HelperDefinition::new(
        target,
        name,
        parameters.iter().copied(),
    )) {
        Err(err) => err,
        Ok(_) => panic!("expected build to fail"),
    }
}

#[test]
fn upper_and_lower_transform_references_and_literals() {
    let mut event = EventDocument::from_value(json!({"name": "midnight"}));
    let result = build("out", "string.upper", &["$name"])(&mut event);
    assert!(result.succeeded());
    assert_eq!(event.get_string("/out"), Some("MIDNIGHT"));

    let result = build("fixed", "string.lower", &["LOUD"])(&mut event);
    assert!(result.succeeded());
    assert_eq!(event.get_string("/fixed"), Some("loud"));
}

#[test]
fn upper_fails_without_touching_the_event_when_the_reference_is_missing() {
    let mut event = EventDocument::from_value(json!({"name": "x"}));
    let before = event.clone();
    let result = build("out", "string.upper", &["$missing"])(&mut event);
    assert!(!result.succeeded());
    assert!(result.trace().contains("Failure"));
    assert_eq!(event, before);
}

#[test]
fn trim_strips_runs_of_the_configured_character() {
    let mut event = EventDocument::from_value(json!({"field": "xxhellox"}));
    let result = build("field", "string.trim", &["both", "x"])(&mut event);
    assert!(result.succeeded());
    assert_eq!(event.get_string("/field"), Some("hello"));

    let mut event = EventDocument::from_value(json!({"field": "..value"}));
    build("field", "string.trim", &["begin", "."])(&mut event);
    assert_eq!(event.get_string("/field"), Some("value"));

    let mut event = EventDocument::from_value(json!({"field": "value--"}));
    build("field", "string.trim", &["end", "-"])(&mut event);
    assert_eq!(event.get_string("/field"), Some("value"));
}

#[test]
fn trim_rejects_bad_modes_and_separators_at_build_time() {
    assert!(matches!(
        build_err("f", "string.trim", &["sideways", "x"]),
        BuildError::InvalidParameter { .. }
    ));
    assert!(matches!(
        build_err("f", "string.trim", &["both", "xy"]),
        BuildError::InvalidParameter { .. }
    ));
    assert!(matches!(
        build_err("f", "string.trim", &["both"]),
        BuildError::ParameterCount { .. }
    ));
}

#[test]
fn concat_stringifies_mixed_arguments_in_order() {
    let mut event = EventDocument::from_value(json!({"n": 3, "s": "x"}));
    let result = build("out", "string.concat", &["$n", "/", "$s"])(&mut event);
    assert!(result.succeeded());
    assert_eq!(event.get_string("/out"), Some("3/x"));
}

#[test]
fn concat_serializes_objects_and_rejects_unsupported_types() {
    let mut event = EventDocument::from_value(json!({"obj": {"k": 1}, "flag": true}));
    let result = build("out", "string.concat", &["id=", "$obj"])(&mut event);
    assert!(result.succeeded());
    assert_eq!(event.get_string("/out"), Some("id={\"k\":1}"));

    let before = event.clone();
    let result = build("out", "string.concat", &["x", "$flag"])(&mut event);
    assert!(!result.succeeded());
    assert_eq!(event, before);
}

#[test]
fn concat_fails_on_a_missing_reference() {
    let mut event = EventDocument::from_value(json!({"s": "x"}));
    let before = event.clone();
    let result = build("out", "string.concat", &["$s", "$gone"])(&mut event);
    assert!(!result.succeeded());
    assert_eq!(event, before);
}

#[test]
fn from_array_joins_string_elements() {
    let mut event = EventDocument::from_value(json!({"parts": ["usr", "local", "bin"]}));
    let result = build("path", "string.fromArray", &["$parts", "/"])(&mut event);
    assert!(result.succeeded());
    assert_eq!(event.get_string("/path"), Some("usr/local/bin"));
}

#[test]
fn from_array_fails_on_non_string_members_and_missing_arrays() {
    let mut event = EventDocument::from_value(json!({"parts": ["ok", 7]}));
    let before = event.clone();
    assert!(!build("out", "string.fromArray", &["$parts", ","])(&mut event).succeeded());
    assert_eq!(event, before);

    assert!(!build("out", "string.fromArray", &["$gone", ","])(&mut event).succeeded());
}

#[test]
fn from_hex_decodes_pairs_into_text() {
    let mut event = EventDocument::from_value(json!({"h": "6869"}));
    let result = build("out", "string.fromHex", &["$h"])(&mut event);
    assert!(result.succeeded());
    assert_eq!(event.get_string("/out"), Some("hi"));
}

#[test]
fn from_hex_rejects_odd_lengths_and_bad_digits() {
    let mut event = EventDocument::from_value(json!({"h": "abc"}));
    let before = event.clone();
    let result = build("out", "string.fromHex", &["$h"])(&mut event);
    assert!(!result.succeeded());
    assert!(result.trace().contains("odd"));
    assert_eq!(event, before);

    let mut event = EventDocument::from_value(json!({"h": "zz"}));
    let result = build("out", "string.fromHex", &["$h"])(&mut event);
    assert!(!result.succeeded());
    assert_eq!(event.get_string("/out"), None);
}

#[test]
fn hex_to_number_parses_signed_integers() {
    let mut event = EventDocument::from_value(json!({"h": "1f"}));
    let result = build("n", "string.hexToNumber", &["$h"])(&mut event);
    assert!(result.succeeded());
    assert_eq!(event.get_int("/n"), Some(31));

    let mut event = EventDocument::from_value(json!({"h": "1f trailing"}));
    assert!(!build("n", "string.hexToNumber", &["$h"])(&mut event).succeeded());

    let mut event = EventDocument::from_value(json!({"h": "xyz"}));
    assert!(!build("n", "string.hexToNumber", &["$h"])(&mut event).succeeded());
}

#[test]
fn replace_substitutes_every_occurrence() {
    let mut event = EventDocument::from_value(json!({"msg": "a-b-c"}));
    let result = build("msg", "string.replace", &["-", "::"])(&mut event);
    assert!(result.succeeded());
    assert_eq!(event.get_string("/msg"), Some("a::b::c"));
}

#[test]
fn replace_terminates_when_the_replacement_contains_the_needle() {
    let mut event = EventDocument::from_value(json!({"msg": "aaa"}));
    let result = build("msg", "string.replace", &["a", "aa"])(&mut event);
    assert!(result.succeeded());
    assert_eq!(event.get_string("/msg"), Some("aaaaaa"));
}

#[test]
fn replace_resolves_reference_operands() {
    let mut event = EventDocument::from_value(json!({
        "msg": "user=root",
        "old": "root",
        "new": "admin",
    }));
    let result = build("msg", "string.replace", &["$old", "$new"])(&mut event);
    assert!(result.succeeded());
    assert_eq!(event.get_string("/msg"), Some("user=admin"));
}

#[test]
fn replace_rejects_an_empty_needle_at_build_time() {
    assert!(matches!(
        build_err("msg", "string.replace", &["", "x"]),
        BuildError::InvalidParameter { .. }
    ));
}

#[test]
fn replace_fails_on_missing_or_empty_targets() {
    let mut event = EventDocument::from_value(json!({}));
    assert!(!build("msg", "string.replace", &["a", "b"])(&mut event).succeeded());

    let mut event = EventDocument::from_value(json!({"msg": ""}));
    let before = event.clone();
    assert!(!build("msg", "string.replace", &["a", "b"])(&mut event).succeeded());
    assert_eq!(event, before);
}
