use crate::event::document::{pointer_of, EventDocument};
use crate::event::result::HelperResult;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Leading character marking a textual argument as an event reference.
pub const REFERENCE_ANCHOR: char = '$';

/// Variant of a parsed helper argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Literal string, used verbatim.
    Value,
    /// Pointer path resolved against the event at invocation time.
    Reference,
}

impl ParameterKind {
    fn as_str(self) -> &'static str {
        match self {
            ParameterKind::Value => "value",
            ParameterKind::Reference => "reference",
        }
    }
}

/// A classified helper argument. References hold the normalized pointer path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub kind: ParameterKind,
    pub value: String,
}

impl Parameter {
    pub fn is_reference(&self) -> bool {
        self.kind == ParameterKind::Reference
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParameterKind::Value => f.write_str(&self.value),
            ParameterKind::Reference => write!(f, "{}{}", REFERENCE_ANCHOR, self.value),
        }
    }
}

/// Textual definition a helper is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperDefinition {
    pub target_field: String,
    pub name: String,
    pub raw_parameters: Vec<String>,
}

impl HelperDefinition {
    pub fn new(
        target_field: impl Into<String>,
        name: impl Into<String>,
        raw_parameters: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            target_field: target_field.into(),
            name: name.into(),
            raw_parameters: raw_parameters.into_iter().map(Into::into).collect(),
        }
    }

    /// Normalized pointer path of the field the helper writes.
    pub fn target_pointer(&self) -> String {
        pointer_of(&self.target_field)
    }
}

/// Error raised while building a helper from its definition.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("helper '{name}' is not registered")]
    UnknownHelper { name: String },
    #[error("helper '{name}' expects {expected} parameters but received {found}")]
    ParameterCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("helper '{name}' expects at least {minimum} parameters but received {found}")]
    TooFewParameters {
        name: String,
        minimum: usize,
        found: usize,
    },
    #[error("parameter '{parameter}' of helper '{name}' must be a {expected}")]
    ParameterKindMismatch {
        name: String,
        parameter: String,
        expected: &'static str,
    },
    #[error("helper '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("helper '{name}': failed to compile pattern '{pattern}': {source}")]
    Pattern {
        name: String,
        pattern: String,
        source: regex::Error,
    },
}

/// A built operator: reads/writes event fields, never panics, and reports
/// its outcome with a precomputed trace.
pub type Helper = Box<dyn Fn(&mut EventDocument) -> HelperResult + Send + Sync>;

/// Builder signature shared by every catalog entry.
pub type HelperBuilder = fn(&HelperDefinition) -> Result<Helper, BuildError>;

/// Classifies raw textual arguments into values and references.
pub fn parse_parameters(raw: &[String]) -> Vec<Parameter> {
    raw.iter()
        .map(|argument| match argument.strip_prefix(REFERENCE_ANCHOR) {
            Some(path) => Parameter {
                kind: ParameterKind::Reference,
                value: pointer_of(path),
            },
            None => Parameter {
                kind: ParameterKind::Value,
                value: argument.clone(),
            },
        })
        .collect()
}

/// Asserts an exact parameter count.
pub fn check_parameter_count(
    name: &str,
    parameters: &[Parameter],
    expected: usize,
) -> Result<(), BuildError> {
    if parameters.len() != expected {
        return Err(BuildError::ParameterCount {
            name: name.to_string(),
            expected,
            found: parameters.len(),
        });
    }
    Ok(())
}

/// Asserts a lower bound on the parameter count.
pub fn check_minimum_parameters(
    name: &str,
    parameters: &[Parameter],
    minimum: usize,
) -> Result<(), BuildError> {
    if parameters.len() < minimum {
        return Err(BuildError::TooFewParameters {
            name: name.to_string(),
            minimum,
            found: parameters.len(),
        });
    }
    Ok(())
}

/// Asserts the variant of a single parameter slot.
pub fn check_parameter_kind(
    name: &str,
    parameter: &Parameter,
    expected: ParameterKind,
) -> Result<(), BuildError> {
    if parameter.kind != expected {
        return Err(BuildError::ParameterKindMismatch {
            name: name.to_string(),
            parameter: parameter.to_string(),
            expected: expected.as_str(),
        });
    }
    Ok(())
}

/// Formats the operator identity used by every trace line.
pub fn format_helper_name(name: &str, target: &str, parameters: &[Parameter]) -> String {
    let mut formatted = format!("{}({}", name, target);
    for parameter in parameters {
        formatted.push_str(", ");
        formatted.push_str(&parameter.to_string());
    }
    formatted.push(')');
    formatted
}

/// Precomputes the success trace for a formatted operator name.
pub fn success_trace(formatted: &str) -> Arc<str> {
    Arc::from(format!("[{}] -> Success", formatted))
}

/// Precomputes a failure trace with a detail suffix.
pub fn failure_trace(formatted: &str, detail: &str) -> Arc<str> {
    Arc::from(format!("[{}] -> Failure: {}", formatted, detail))
}

/// Precomputes the bare failure trace.
pub fn plain_failure_trace(formatted: &str) -> Arc<str> {
    Arc::from(format!("[{}] -> Failure", formatted))
}

/// Registry mapping operator names to their builders.
#[derive(Clone, Default)]
pub struct HelperRegistry {
    builders: HashMap<String, HelperBuilder>,
}

impl HelperRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry preloaded with the engine operator catalog.
    pub fn engine() -> Self {
        let mut registry = Self::new();
        registry.register("string.upper", super::string::upper);
        registry.register("string.lower", super::string::lower);
        registry.register("string.trim", super::string::trim);
        registry.register("string.concat", super::string::concat);
        registry.register("string.fromArray", super::string::from_array);
        registry.register("string.fromHex", super::string::from_hex);
        registry.register("string.hexToNumber", super::string::hex_to_number);
        registry.register("string.replace", super::string::replace);
        registry.register("int.calc", super::numeric::calc);
        registry.register("regex.extract", super::pattern::extract);
        registry.register("array.append", super::array::append);
        registry.register("array.splitString", super::array::split_string);
        registry.register("object.merge", super::field::merge);
        registry.register("field.delete", super::field::delete);
        registry.register("field.rename", super::field::rename);
        registry.register("ip.version", super::net::ip_version);
        registry.register("time.epochNow", super::time::epoch_now);
        registry.register("hash.sha1", super::hash::sha1_digest);
        registry
    }

    /// Registers or replaces a builder under an operator name.
    pub fn register(&mut self, name: impl Into<String>, builder: HelperBuilder) {
        self.builders.insert(name.into(), builder);
    }

    /// Builds the helper named by the definition.
    pub fn build(&self, definition: &HelperDefinition) -> Result<Helper, BuildError> {
        let builder =
            self.builders
                .get(&definition.name)
                .ok_or_else(|| BuildError::UnknownHelper {
                    name: definition.name.clone(),
                })?;
        builder(definition)
    }

    /// Registered operator names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
