use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

use crate::error::FieldError;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

const MAX_EMAIL_LEN: usize = 254;

// Postgres TEXT cannot store 0x00
const NUL_MESSAGE: &str = "must not contain NUL characters";

/// Where a field is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Body,
    Query,
    Path,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Body => "body",
            Location::Query => "query",
            Location::Path => "path",
        }
    }
}

#[derive(Debug, Clone)]
enum Check {
    String,
    Length { min: Option<usize>, max: Option<usize> },
    Email,
    Int { min: Option<i64>, max: Option<i64> },
    Float,
    OneOf(&'static [&'static str]),
}

impl Check {
    /// Ok carries the (possibly coerced) value for the next check.
    fn apply(&self, value: Value) -> Result<Value, String> {
        match self {
            Check::String => match &value {
                Value::String(s) if s.contains('\0') => Err(NUL_MESSAGE.to_string()),
                Value::String(_) => Ok(value),
                _ => Err("must be a string".to_string()),
            },
            Check::Length { min, max } => {
                let len = match &value {
                    Value::String(s) => s.chars().count(),
                    _ => return Err("must be a string".to_string()),
                };
                if let Some(min) = min {
                    if len < *min {
                        return Err(if *min == 1 {
                            "must not be empty".to_string()
                        } else {
                            format!("must be at least {} characters", min)
                        });
                    }
                }
                if let Some(max) = max {
                    if len > *max {
                        return Err(format!("must be at most {} characters", max));
                    }
                }
                Ok(value)
            }
            Check::Email => match &value {
                Value::String(s) if s.contains('\0') => Err(NUL_MESSAGE.to_string()),
                Value::String(s) if s.len() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(s.trim()) => Ok(value),
                _ => Err("must be a valid email address".to_string()),
            },
            Check::Int { min, max } => {
                let n = match &value {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                };
                let message = int_message(*min, *max);
                let n = n.ok_or_else(|| message.clone())?;
                if min.map_or(false, |min| n < min) || max.map_or(false, |max| n > max) {
                    return Err(message);
                }
                Ok(Value::Number(n.into()))
            }
            Check::Float => {
                let n = match &value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                n.and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| "must be a number".to_string())
            }
            Check::OneOf(allowed) => match &value {
                Value::String(s) if allowed.contains(&s.as_str()) => Ok(value),
                _ => Err(format!("must be one of: {}", allowed.join(", "))),
            },
        }
    }
}

fn int_message(min: Option<i64>, max: Option<i64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("must be an integer between {} and {}", min, max),
        (Some(min), None) => format!("must be an integer of at least {}", min),
        (None, Some(max)) => format!("must be an integer of at most {}", max),
        (None, None) => "must be an integer".to_string(),
    }
}

/// Declarative rule for one request field.
///
/// ```ignore
/// FieldRule::body("email").email();
/// FieldRule::query("limit").optional().int(Some(1), Some(100));
/// ```
#[derive(Debug, Clone)]
pub struct FieldRule {
    field: &'static str,
    location: Location,
    optional: bool,
    checks: Vec<Check>,
}

impl FieldRule {
    fn new(location: Location, field: &'static str) -> Self {
        Self {
            field,
            location,
            optional: false,
            checks: Vec::new(),
        }
    }

    pub fn body(field: &'static str) -> Self {
        Self::new(Location::Body, field)
    }

    pub fn query(field: &'static str) -> Self {
        Self::new(Location::Query, field)
    }

    pub fn path(field: &'static str) -> Self {
        Self::new(Location::Path, field)
    }

    /// Absent or `null` values pass without running the checks
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn string(mut self) -> Self {
        self.checks.push(Check::String);
        self
    }

    pub fn non_empty(self) -> Self {
        self.length(Some(1), None)
    }

    pub fn max_length(self, max: usize) -> Self {
        self.length(None, Some(max))
    }

    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.checks.push(Check::Length { min, max });
        self
    }

    pub fn email(mut self) -> Self {
        self.checks.push(Check::Email);
        self
    }

    /// Integer within bounds; numeric strings are converted
    pub fn int(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.checks.push(Check::Int { min, max });
        self
    }

    /// Any finite number; numeric strings are converted
    pub fn float(mut self) -> Self {
        self.checks.push(Check::Float);
        self
    }

    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.checks.push(Check::OneOf(allowed));
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Run every check in order, stopping at the first failure.
    /// `Ok(None)` means an optional field was not supplied.
    pub fn evaluate(&self, value: Option<&Value>) -> Result<Option<Value>, FieldError> {
        let value = match value {
            None | Some(Value::Null) if self.optional => return Ok(None),
            None | Some(Value::Null) => return Err(self.error("is required".to_string())),
            Some(value) => value.clone(),
        };

        self.checks
            .iter()
            .try_fold(value, |value, check| check.apply(value))
            .map(Some)
            .map_err(|message| self.error(message))
    }

    fn error(&self, message: String) -> FieldError {
        FieldError {
            field: self.field.to_string(),
            location: self.location.as_str(),
            message,
        }
    }
}
