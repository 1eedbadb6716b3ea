//! Digest helpers.

use super::base::{
    check_parameter_count, failure_trace, format_helper_name, parse_parameters, success_trace,
    BuildError, Helper, HelperDefinition, ParameterKind,
};
use crate::event::document::EventDocument;
use crate::event::result::HelperResult;
use sha1::{Digest, Sha1};

/// `hash.sha1(value|$ref)` — writes the SHA-1 digest of the argument into
/// the target as lowercase hex.
pub fn sha1_digest(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_parameter_count(&definition.name, &parameters, 1)?;

    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);
    let not_found = failure_trace(
        &formatted,
        &format!("reference '{}' is not a string or not found", parameters[0].value),
    );

    let parameter = parameters.into_iter().next().expect("arity checked above");

    Ok(Box::new(move |event: &mut EventDocument| {
        let input = match parameter.kind {
            ParameterKind::Reference => match event.get_string(&parameter.value) {
                Some(text) => text.to_string(),
                None => return HelperResult::Failure(not_found.clone()),
            },
            ParameterKind::Value => parameter.value.clone(),
        };
        let digest = Sha1::digest(input.as_bytes());
        event.set_string(&target, hex::encode(digest));
        HelperResult::Success(success.clone())
    }))
}
