//! Array-valued field transformations.

use super::base::{
    check_minimum_parameters, check_parameter_count, check_parameter_kind, failure_trace,
    format_helper_name, parse_parameters, success_trace, BuildError, Helper, HelperDefinition,
    ParameterKind,
};
use crate::event::document::EventDocument;
use crate::event::result::HelperResult;
use serde_json::Value;
use std::sync::Arc;

enum AppendSource {
    Literal(String),
    Reference { path: String, not_found: Arc<str> },
}

/// `array.append(value|$ref, ...)` — appends each argument to the target
/// array: references contribute their JSON subtree, literals append as
/// strings. Every reference is resolved before the first append so a missing
/// one leaves the event untouched.
pub fn append(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_minimum_parameters(&definition.name, &parameters, 1)?;
    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);

    let sources: Vec<AppendSource> = parameters
        .into_iter()
        .map(|parameter| match parameter.kind {
            ParameterKind::Value => AppendSource::Literal(parameter.value),
            ParameterKind::Reference => AppendSource::Reference {
                not_found: failure_trace(
                    &formatted,
                    &format!("reference '{}' not found", parameter.value),
                ),
                path: parameter.value,
            },
        })
        .collect();

    Ok(Box::new(move |event: &mut EventDocument| {
        let mut resolved = Vec::with_capacity(sources.len());
        for source in &sources {
            match source {
                AppendSource::Literal(literal) => {
                    resolved.push(Value::String(literal.clone()));
                }
                AppendSource::Reference { path, not_found } => match event.get_value(path) {
                    Some(subtree) => resolved.push(subtree.clone()),
                    None => return HelperResult::Failure(not_found.clone()),
                },
            }
        }
        for value in resolved {
            event.append(&target, value);
        }
        HelperResult::Success(success.clone())
    }))
}

/// `array.splitString($source, separator)` — splits the referenced string by
/// a single-character separator and appends each piece to the target array.
pub fn split_string(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_parameter_count(&definition.name, &parameters, 2)?;
    check_parameter_kind(&definition.name, &parameters[0], ParameterKind::Reference)?;
    check_parameter_kind(&definition.name, &parameters[1], ParameterKind::Value)?;

    let mut chars = parameters[1].value.chars();
    let separator = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => {
            return Err(BuildError::InvalidParameter {
                name: definition.name.clone(),
                reason: "separator must be exactly one character".to_string(),
            })
        }
    };

    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);
    let not_found = failure_trace(
        &formatted,
        &format!("reference '{}' is not a string or not found", parameters[0].value),
    );

    let path = parameters[0].value.clone();

    Ok(Box::new(move |event: &mut EventDocument| {
        let pieces: Vec<String> = match event.get_string(&path) {
            Some(text) => text.split(separator).map(str::to_string).collect(),
            None => return HelperResult::Failure(not_found.clone()),
        };
        for piece in pieces {
            event.append(&target, Value::String(piece));
        }
        HelperResult::Success(success.clone())
    }))
}
