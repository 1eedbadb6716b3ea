//! Whole-field operations: merge, delete, rename.

use super::base::{
    check_parameter_count, check_parameter_kind, failure_trace, format_helper_name,
    parse_parameters, plain_failure_trace, success_trace, BuildError, Helper, HelperDefinition,
    ParameterKind,
};
use crate::event::document::{EventDocument, ValueType};
use crate::event::result::HelperResult;

/// `object.merge($source)` — merges the referenced subtree into the target.
/// Both must exist and share the same kind, which must be object or array.
pub fn merge(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_parameter_count(&definition.name, &parameters, 1)?;
    check_parameter_kind(&definition.name, &parameters[0], ParameterKind::Reference)?;

    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);
    let source_missing = failure_trace(
        &formatted,
        &format!("reference '{}' not found", parameters[0].value),
    );
    let target_missing = failure_trace(&formatted, &format!("field '{}' not found", target));
    let type_error = failure_trace(&formatted, "fields type error");

    let source = parameters[0].value.clone();

    Ok(Box::new(move |event: &mut EventDocument| {
        if !event.exists(&source) {
            return HelperResult::Failure(source_missing.clone());
        }
        if !event.exists(&target) {
            return HelperResult::Failure(target_missing.clone());
        }
        let source_type = event.value_type(&source);
        let target_type = event.value_type(&target);
        let mergeable = matches!(target_type, Some(ValueType::Object) | Some(ValueType::Array));
        if source_type != target_type || !mergeable {
            return HelperResult::Failure(type_error.clone());
        }
        event.merge(&source, &target);
        HelperResult::Success(success.clone())
    }))
}

/// `field.delete()` — erases the target field.
pub fn delete(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_parameter_count(&definition.name, &parameters, 0)?;

    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);
    let failure = plain_failure_trace(&formatted);

    Ok(Box::new(move |event: &mut EventDocument| {
        if event.erase(&target) {
            HelperResult::Success(success.clone())
        } else {
            HelperResult::Failure(failure.clone())
        }
    }))
}

/// `field.rename($source)` — moves the value at the referenced path to the
/// target field. Reports missing-source and erase failures separately.
pub fn rename(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_parameter_count(&definition.name, &parameters, 1)?;
    check_parameter_kind(&definition.name, &parameters[0], ParameterKind::Reference)?;

    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);
    let source_missing = failure_trace(
        &formatted,
        &format!("field '{}' does not exist", parameters[0].value),
    );
    let erase_failed = failure_trace(
        &formatted,
        &format!("field '{}' could not be removed", parameters[0].value),
    );

    let source = parameters[0].value.clone();

    Ok(Box::new(move |event: &mut EventDocument| {
        let value = match event.get_value(&source) {
            Some(value) => value.clone(),
            None => return HelperResult::Failure(source_missing.clone()),
        };
        if !event.erase(&source) {
            return HelperResult::Failure(erase_failed.clone());
        }
        event.set(&target, value);
        HelperResult::Success(success.clone())
    }))
}
