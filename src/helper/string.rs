//! String-valued field transformations.

use super::base::{
    check_minimum_parameters, check_parameter_count, check_parameter_kind, failure_trace,
    format_helper_name, parse_parameters, success_trace, BuildError, Helper, HelperDefinition,
    Parameter, ParameterKind,
};
use crate::event::document::EventDocument;
use crate::event::result::HelperResult;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone, Copy)]
enum Case {
    Upper,
    Lower,
}

impl Case {
    fn apply(self, input: &str) -> String {
        match self {
            Case::Upper => input.to_uppercase(),
            Case::Lower => input.to_lowercase(),
        }
    }
}

/// `string.upper(value|$ref)` — upper-cases the argument into the target.
pub fn upper(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    case_transform(definition, Case::Upper)
}

/// `string.lower(value|$ref)` — lower-cases the argument into the target.
pub fn lower(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    case_transform(definition, Case::Lower)
}

fn case_transform(definition: &HelperDefinition, case: Case) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_parameter_count(&definition.name, &parameters, 1)?;
    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);

    let parameter = parameters.into_iter().next().expect("arity checked above");
    match parameter.kind {
        ParameterKind::Reference => {
            let not_found = failure_trace(
                &formatted,
                &format!("reference '{}' not found", parameter.value),
            );
            let path = parameter.value;
            Ok(Box::new(move |event: &mut EventDocument| {
                let resolved = match event.get_string(&path) {
                    Some(value) => case.apply(value),
                    None => return HelperResult::Failure(not_found.clone()),
                };
                event.set_string(&target, resolved);
                HelperResult::Success(success.clone())
            }))
        }
        ParameterKind::Value => {
            let transformed = case.apply(&parameter.value);
            Ok(Box::new(move |event: &mut EventDocument| {
                event.set_string(&target, transformed.clone());
                HelperResult::Success(success.clone())
            }))
        }
    }
}

#[derive(Clone, Copy)]
enum TrimMode {
    Begin,
    End,
    Both,
}

/// `string.trim(begin|end|both, char)` — strips runs of `char` from the
/// target field in place.
pub fn trim(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_parameter_count(&definition.name, &parameters, 2)?;
    check_parameter_kind(&definition.name, &parameters[0], ParameterKind::Value)?;
    check_parameter_kind(&definition.name, &parameters[1], ParameterKind::Value)?;

    let mode = match parameters[0].value.as_str() {
        "begin" => TrimMode::Begin,
        "end" => TrimMode::End,
        "both" => TrimMode::Both,
        other => {
            return Err(BuildError::InvalidParameter {
                name: definition.name.clone(),
                reason: format!("unknown trim mode '{}'", other),
            })
        }
    };
    let mut chars = parameters[1].value.chars();
    let trim_char = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => {
            return Err(BuildError::InvalidParameter {
                name: definition.name.clone(),
                reason: "trim character must be exactly one character".to_string(),
            })
        }
    };

    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);
    let target_missing = failure_trace(&formatted, &format!("field '{}' not found", target));

    Ok(Box::new(move |event: &mut EventDocument| {
        let trimmed = match event.get_string(&target) {
            Some(value) => match mode {
                TrimMode::Begin => value.trim_start_matches(trim_char).to_string(),
                TrimMode::End => value.trim_end_matches(trim_char).to_string(),
                TrimMode::Both => value.trim_matches(trim_char).to_string(),
            },
            None => return HelperResult::Failure(target_missing.clone()),
        };
        event.set_string(&target, trimmed);
        HelperResult::Success(success.clone())
    }))
}

enum ConcatPiece {
    Literal(String),
    Reference {
        path: String,
        not_found: Arc<str>,
        unsupported: Arc<str>,
    },
}

/// `string.concat(a, $b, ...)` — concatenates literals and stringified
/// references into the target.
pub fn concat(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_minimum_parameters(&definition.name, &parameters, 2)?;
    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);

    let pieces: Vec<ConcatPiece> = parameters
        .into_iter()
        .map(|parameter| match parameter.kind {
            ParameterKind::Value => ConcatPiece::Literal(parameter.value),
            ParameterKind::Reference => ConcatPiece::Reference {
                not_found: failure_trace(
                    &formatted,
                    &format!("reference '{}' not found", parameter.value),
                ),
                unsupported: failure_trace(
                    &formatted,
                    &format!("reference '{}' has an unsupported type", parameter.value),
                ),
                path: parameter.value,
            },
        })
        .collect();

    Ok(Box::new(move |event: &mut EventDocument| {
        let mut composed = String::new();
        for piece in &pieces {
            match piece {
                ConcatPiece::Literal(literal) => composed.push_str(literal),
                ConcatPiece::Reference {
                    path,
                    not_found,
                    unsupported,
                } => {
                    let node = match event.get_value(path) {
                        Some(node) => node,
                        None => return HelperResult::Failure(not_found.clone()),
                    };
                    match node {
                        Value::String(text) => composed.push_str(text),
                        Value::Number(number) => composed.push_str(&number.to_string()),
                        Value::Object(_) => composed.push_str(&node.to_string()),
                        _ => return HelperResult::Failure(unsupported.clone()),
                    }
                }
            }
        }
        event.set_string(&target, composed);
        HelperResult::Success(success.clone())
    }))
}

/// `string.fromArray($array, separator)` — joins string elements of the
/// referenced array into the target.
pub fn from_array(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_parameter_count(&definition.name, &parameters, 2)?;
    check_parameter_kind(&definition.name, &parameters[0], ParameterKind::Reference)?;
    check_parameter_kind(&definition.name, &parameters[1], ParameterKind::Value)?;

    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);
    let not_array = failure_trace(
        &formatted,
        &format!("reference '{}' is not an array or not found", parameters[0].value),
    );
    let not_string = failure_trace(&formatted, "array member is not a string");

    let path = parameters[0].value.clone();
    let separator = parameters[1].value.clone();

    Ok(Box::new(move |event: &mut EventDocument| {
        let items = match event.get_array(&path) {
            Some(items) => items,
            None => return HelperResult::Failure(not_array.clone()),
        };
        let mut members = Vec::with_capacity(items.len());
        for item in items {
            match item.as_str() {
                Some(text) => members.push(text),
                None => return HelperResult::Failure(not_string.clone()),
            }
        }
        let composed = members.join(&separator);
        event.set_string(&target, composed);
        HelperResult::Success(success.clone())
    }))
}

/// `string.fromHex($hex)` — decodes a hex-pair string into the target.
pub fn from_hex(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_parameter_count(&definition.name, &parameters, 1)?;
    check_parameter_kind(&definition.name, &parameters[0], ParameterKind::Reference)?;

    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);
    let not_found = failure_trace(
        &formatted,
        &format!("reference '{}' is not a string or not found", parameters[0].value),
    );
    let odd_length = failure_trace(&formatted, "hex string has an odd number of digits");
    let not_utf8 = failure_trace(&formatted, "decoded bytes are not valid UTF-8");

    let path = parameters[0].value.clone();

    Ok(Box::new(move |event: &mut EventDocument| {
        let encoded = match event.get_string(&path) {
            Some(text) => text,
            None => return HelperResult::Failure(not_found.clone()),
        };
        let bytes = match hex::decode(encoded) {
            Ok(bytes) => bytes,
            Err(hex::FromHexError::OddLength) => {
                return HelperResult::Failure(odd_length.clone())
            }
            Err(hex::FromHexError::InvalidHexCharacter { c, .. }) => {
                return HelperResult::Failure(failure_trace(
                    &formatted,
                    &format!("character '{}' is not a valid hex digit", c),
                ))
            }
            Err(hex::FromHexError::InvalidStringLength) => {
                return HelperResult::Failure(odd_length.clone())
            }
        };
        let decoded = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => return HelperResult::Failure(not_utf8.clone()),
        };
        event.set_string(&target, decoded);
        HelperResult::Success(success.clone())
    }))
}

/// `string.hexToNumber($hex)` — parses a hex string into a signed integer.
pub fn hex_to_number(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_parameter_count(&definition.name, &parameters, 1)?;
    check_parameter_kind(&definition.name, &parameters[0], ParameterKind::Reference)?;

    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);
    let not_found = failure_trace(
        &formatted,
        &format!("reference '{}' is not a string or not found", parameters[0].value),
    );
    let bad_hex = failure_trace(&formatted, "bad hexadecimal string");

    let path = parameters[0].value.clone();

    Ok(Box::new(move |event: &mut EventDocument| {
        let text = match event.get_string(&path) {
            Some(text) => text,
            None => return HelperResult::Failure(not_found.clone()),
        };
        let parsed = match i32::from_str_radix(text, 16) {
            Ok(number) => number,
            Err(_) => return HelperResult::Failure(bad_hex.clone()),
        };
        event.set_int(&target, i64::from(parsed));
        HelperResult::Success(success.clone())
    }))
}

enum Operand {
    Literal(String),
    Reference {
        path: String,
        not_found: Arc<str>,
        empty: Arc<str>,
    },
}

impl Operand {
    fn build(parameter: &Parameter, formatted: &str) -> Self {
        match parameter.kind {
            ParameterKind::Value => Operand::Literal(parameter.value.clone()),
            ParameterKind::Reference => Operand::Reference {
                not_found: failure_trace(
                    formatted,
                    &format!("reference '{}' not found", parameter.value),
                ),
                empty: failure_trace(
                    formatted,
                    &format!("reference '{}' is empty", parameter.value),
                ),
                path: parameter.value.clone(),
            },
        }
    }

    fn resolve<'a>(&'a self, event: &'a EventDocument) -> Result<&'a str, Arc<str>> {
        match self {
            Operand::Literal(literal) => Ok(literal),
            Operand::Reference {
                path,
                not_found,
                empty,
            } => {
                let resolved = event.get_string(path).ok_or_else(|| not_found.clone())?;
                if resolved.is_empty() {
                    return Err(empty.clone());
                }
                Ok(resolved)
            }
        }
    }
}

/// `string.replace(old, new)` — replaces every occurrence of `old` in the
/// target field. The scan advances past each substitution so the loop
/// terminates even when `new` contains `old`.
pub fn replace(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_parameter_count(&definition.name, &parameters, 2)?;
    if parameters[0].kind == ParameterKind::Value && parameters[0].value.is_empty() {
        return Err(BuildError::InvalidParameter {
            name: definition.name.clone(),
            reason: "the substring to replace cannot be an empty literal".to_string(),
        });
    }

    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);
    let target_missing = failure_trace(&formatted, &format!("field '{}' not found", target));
    let target_empty = failure_trace(&formatted, &format!("field '{}' is empty", target));

    let old_operand = Operand::build(&parameters[0], &formatted);
    let new_operand = Operand::build(&parameters[1], &formatted);

    Ok(Box::new(move |event: &mut EventDocument| {
        let current = match event.get_string(&target) {
            Some(text) => text.to_string(),
            None => return HelperResult::Failure(target_missing.clone()),
        };
        if current.is_empty() {
            return HelperResult::Failure(target_empty.clone());
        }
        let old = match old_operand.resolve(event) {
            Ok(text) => text.to_string(),
            Err(trace) => return HelperResult::Failure(trace),
        };
        let new = match new_operand.resolve(event) {
            Ok(text) => text.to_string(),
            Err(trace) => return HelperResult::Failure(trace),
        };

        let mut rewritten = current;
        let mut scan_from = 0;
        while let Some(found) = rewritten[scan_from..].find(&old) {
            let at = scan_from + found;
            rewritten.replace_range(at..at + old.len(), &new);
            scan_from = at + new.len();
        }
        event.set_string(&target, rewritten);
        HelperResult::Success(success.clone())
    }))
}
