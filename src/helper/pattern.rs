//! Regular-expression extraction.

use super::base::{
    check_parameter_count, check_parameter_kind, failure_trace, format_helper_name,
    parse_parameters, plain_failure_trace, success_trace, BuildError, Helper, HelperDefinition,
    ParameterKind,
};
use crate::event::document::EventDocument;
use crate::event::result::HelperResult;
use regex::Regex;

/// `regex.extract($source, pattern)` — writes the first partial match of
/// `pattern` against the source string into the target. The captured group
/// is used when the pattern defines one, otherwise the whole match.
pub fn extract(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_parameter_count(&definition.name, &parameters, 2)?;
    check_parameter_kind(&definition.name, &parameters[0], ParameterKind::Reference)?;
    check_parameter_kind(&definition.name, &parameters[1], ParameterKind::Value)?;

    let pattern = Regex::new(&parameters[1].value).map_err(|source| BuildError::Pattern {
        name: definition.name.clone(),
        pattern: parameters[1].value.clone(),
        source,
    })?;

    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);
    let not_found = failure_trace(
        &formatted,
        &format!("reference '{}' not found", parameters[0].value),
    );
    let no_match = plain_failure_trace(&formatted);

    let path = parameters[0].value.clone();

    Ok(Box::new(move |event: &mut EventDocument| {
        let haystack = match event.get_string(&path) {
            Some(text) => text,
            None => return HelperResult::Failure(not_found.clone()),
        };
        let captured = pattern.captures(haystack).and_then(|captures| {
            captures
                .get(1)
                .or_else(|| captures.get(0))
                .map(|m| m.as_str().to_string())
        });
        match captured {
            Some(extracted) => {
                event.set_string(&target, extracted);
                HelperResult::Success(success.clone())
            }
            None => HelperResult::Failure(no_match.clone()),
        }
    }))
}
