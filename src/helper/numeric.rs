//! Integer field arithmetic.

use super::base::{
    check_parameter_count, failure_trace, format_helper_name, parse_parameters, success_trace,
    BuildError, Helper, HelperDefinition, ParameterKind,
};
use crate::event::document::EventDocument;
use crate::event::result::HelperResult;
use std::sync::Arc;

#[derive(Clone, Copy, PartialEq, Eq)]
enum IntOperator {
    Sum,
    Sub,
    Mul,
    Div,
}

impl IntOperator {
    fn parse(name: &str, token: &str) -> Result<Self, BuildError> {
        match token {
            "sum" => Ok(IntOperator::Sum),
            "sub" => Ok(IntOperator::Sub),
            "mul" => Ok(IntOperator::Mul),
            "div" => Ok(IntOperator::Div),
            other => Err(BuildError::InvalidParameter {
                name: name.to_string(),
                reason: format!("unknown arithmetic operation '{}'", other),
            }),
        }
    }

    // 32-bit wrapping semantics; division by zero is rejected before the call.
    fn apply(self, lhs: i32, rhs: i32) -> i32 {
        match self {
            IntOperator::Sum => lhs.wrapping_add(rhs),
            IntOperator::Sub => lhs.wrapping_sub(rhs),
            IntOperator::Mul => lhs.wrapping_mul(rhs),
            IntOperator::Div => lhs.wrapping_div(rhs),
        }
    }
}

enum RightOperand {
    Literal(i32),
    Reference {
        path: String,
        not_found: Arc<str>,
        division_by_zero: Arc<str>,
    },
}

/// `int.calc(sum|sub|mul|div, value|$ref)` — applies the operation to the
/// integer in the target field and writes the result back.
pub fn calc(definition: &HelperDefinition) -> Result<Helper, BuildError> {
    let parameters = parse_parameters(&definition.raw_parameters);
    check_parameter_count(&definition.name, &parameters, 2)?;
    let operator = IntOperator::parse(&definition.name, &parameters[0].value)?;

    let target = definition.target_pointer();
    let formatted = format_helper_name(&definition.name, &target, &parameters);
    let success = success_trace(&formatted);
    let target_missing = failure_trace(&formatted, &format!("field '{}' not found", target));

    let right = match parameters[1].kind {
        ParameterKind::Value => {
            let literal: i32 =
                parameters[1]
                    .value
                    .parse()
                    .map_err(|_| BuildError::InvalidParameter {
                        name: definition.name.clone(),
                        reason: format!("could not convert '{}' to int", parameters[1].value),
                    })?;
            if operator == IntOperator::Div && literal == 0 {
                return Err(BuildError::InvalidParameter {
                    name: definition.name.clone(),
                    reason: "division by zero".to_string(),
                });
            }
            RightOperand::Literal(literal)
        }
        ParameterKind::Reference => RightOperand::Reference {
            not_found: failure_trace(
                &formatted,
                &format!("reference '{}' not found", parameters[1].value),
            ),
            division_by_zero: failure_trace(
                &formatted,
                &format!("reference '{}' is a zero divisor", parameters[1].value),
            ),
            path: parameters[1].value.clone(),
        },
    };

    Ok(Box::new(move |event: &mut EventDocument| {
        let lhs = match event.get_int(&target) {
            Some(value) => value as i32,
            None => return HelperResult::Failure(target_missing.clone()),
        };
        let rhs = match &right {
            RightOperand::Literal(literal) => *literal,
            RightOperand::Reference {
                path,
                not_found,
                division_by_zero,
            } => match event.get_int(path) {
                Some(resolved) => {
                    if operator == IntOperator::Div && resolved == 0 {
                        return HelperResult::Failure(division_by_zero.clone());
                    }
                    resolved as i32
                }
                None => return HelperResult::Failure(not_found.clone()),
            },
        };
        event.set_int(&target, i64::from(operator.apply(lhs, rhs)));
        HelperResult::Success(success.clone())
    }))
}
