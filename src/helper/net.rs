//! Network address classification.

use super::base::{
    check_parameter_count, check_parameter_kind, failure_trace, format_helper_name,
    parse_parameters, success_trace, BuildError, Helper, HelperDefinition, ParameterKind,
};
use crate::event::document::EventDocument;
use crate::event::result::HelperResult;
use std::net::{Ipv4Addr, Ipv6Addr};

/// `ip.version($address)` — writes `"IPv4"` or `"IPv6"` into the target
/// according to the referenced address string.
pub fn ip_version(definition: &HelperDefinition) -> Result<Helper, BuildError> {
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
    let not_an_ip = failure_trace(&formatted, "the string is not a valid IP address");

    let path = parameters[0].value.clone();

    Ok(Box::new(move |event: &mut EventDocument| {
        let address = match event.get_string(&path) {
            Some(text) => text,
            None => return HelperResult::Failure(not_found.clone()),
        };
        let version = if address.parse::<Ipv4Addr>().is_ok() {
            "IPv4"
        } else if address.parse::<Ipv6Addr>().is_ok() {
            "IPv6"
        } else {
            return HelperResult::Failure(not_an_ip.clone());
        };
        event.set_string(&target, version);
        HelperResult::Success(success.clone())
    }))
}
