//! Argument validation - binds pattern captures to handler parameters

use crate::application::errors::ArgumentError;
use crate::domain::entities::{ArgValue, Args, Captures, Handler, ParamKind};

/// Build the call arguments for `handler` from the values a pattern captured.
///
/// Empty captures count as absent. Captures with no matching parameter are
/// ignored.
pub fn validate_args(handler: &Handler, captures: &Captures) -> Result<Args, ArgumentError> {
    let mut args = Args::new();

    for param in handler.params() {
        let captured = captures.get(&param.name).filter(|value| !value.is_empty());

        let value = match (captured, &param.default) {
            (Some(raw), _) => match param.kind {
                Some(kind) => convert(raw, kind)?,
                None => ArgValue::Str(raw.clone()),
            },
            (None, Some(default)) => default.clone(),
            (None, None) => {
                return Err(ArgumentError::Missing {
                    param: param.name.clone(),
                    handler: handler.name().to_string(),
                })
            }
        };
        args.insert(param.name.clone(), value);
    }

    Ok(args)
}

fn convert(raw: &str, kind: ParamKind) -> Result<ArgValue, ArgumentError> {
    let type_error = || ArgumentError::Type {
        value: raw.to_string(),
        target: kind.to_string(),
    };
    let trimmed = raw.trim();

    match kind {
        ParamKind::Str => Ok(ArgValue::Str(raw.to_string())),
        ParamKind::Int => trimmed.parse().map(ArgValue::Int).map_err(|_| type_error()),
        ParamKind::Float => trimmed
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(ArgValue::Float)
            .ok_or_else(type_error),
        ParamKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(ArgValue::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(ArgValue::Bool(false)),
            _ => Err(type_error()),
        },
    }
}
