//! Wall-clock helpers.

use super::base::{
    check_parameter_count, failure_trace, format_helper_name, parse_parameters, success_trace,
    BuildError, Helper, HelperDefinition,
};
use crate::event::document::EventDocument;
use crate::event::result::HelperResult;
use std::time::{SystemTime, UNIX_EPOCH};

/// `time.epochNow()` — writes the current wall-clock time in epoch seconds.
/// Values beyond the signed 32-bit range are reported as a Failure.
pub fn epoch_now(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_parameter_count(&definition.name, &parameters, 0)?;

    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);
    let overflow = failure_trace(&formatted, "overflow");

    Ok(Box::new(move |event: &mut EventDocument| {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        if seconds > i32::MAX as u64 {
            return HelperResult::Failure(overflow.clone());
        }
        event.set_int(&target, seconds as i64);
        HelperResult::Success(success.clone())
    }))
}
