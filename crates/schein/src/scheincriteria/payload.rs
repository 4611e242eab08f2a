use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::criteria::Criterion;
use super::form::FormFieldDescriptor;
use super::registry::CriterionSchema;

/// Criterion configuration as submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionDto {
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("no criterion is registered for identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("criterion name must not be empty")]
    EmptyName,
    #[error("field '{field}' is not part of criterion '{identifier}'")]
    UnknownField { identifier: String, field: String },
    #[error("field '{field}' is required by criterion '{identifier}'")]
    MissingField { identifier: String, field: String },
    #[error("field '{field}' must be {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },
    #[error("field '{field}' is out of bounds: {reason}")]
    OutOfBounds { field: String, reason: String },
    #[error("field '{field}' must be one of the listed values, got '{value}'")]
    InvalidEnumValue { field: String, value: String },
    #[error("criterion data could not be read: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Checks `dto.data` field by field and deserializes it into the variant `schema` describes.
pub(crate) fn into_criterion(
    schema: &CriterionSchema,
    dto: &CriterionDto,
) -> Result<Criterion, PayloadError> {
    if dto.name.trim().is_empty() {
        return Err(PayloadError::EmptyName);
    }

    let identifier = schema.identifier();
    for field in dto.data.keys() {
        if schema.field(field).is_none() && !schema.is_ignored(field) {
            return Err(PayloadError::UnknownField {
                identifier: identifier.to_string(),
                field: field.clone(),
            });
        }
    }

    let mut data = Map::new();
    for (name, descriptor) in schema.fields() {
        let value = dto
            .data
            .get(name)
            .ok_or_else(|| PayloadError::MissingField {
                identifier: identifier.to_string(),
                field: name.to_string(),
            })?;
        check_value(name, descriptor, value, &dto.data)?;
        data.insert(name.to_string(), value.clone());
    }

    let tagged = json!({
        "identifier": identifier.as_str(),
        "data": Value::Object(data),
    });
    Ok(serde_json::from_value(tagged)?)
}

fn check_value(
    name: &str,
    descriptor: &FormFieldDescriptor,
    value: &Value,
    data: &Map<String, Value>,
) -> Result<(), PayloadError> {
    let invalid_type = |expected| PayloadError::InvalidType {
        field: name.to_string(),
        expected,
    };

    match descriptor {
        FormFieldDescriptor::String => {
            value.as_str().ok_or_else(|| invalid_type("a string"))?;
        }
        FormFieldDescriptor::Boolean => {
            value.as_bool().ok_or_else(|| invalid_type("a boolean"))?;
        }
        FormFieldDescriptor::Integer { min, max } => {
            let number = value.as_i64().ok_or_else(|| invalid_type("an integer"))?;
            check_bounds(
                name,
                number as f64,
                min.map(|min| min as f64),
                max.map(|max| max as f64),
            )?;
        }
        FormFieldDescriptor::Float {
            min,
            max,
            percentage,
            percentage_toggle_field,
        } => {
            let number = value.as_f64().ok_or_else(|| invalid_type("a number"))?;

            if *percentage {
                // Stored as a fraction, bounds describe the value shown in percent.
                check_bounds(name, number * 100.0, *min, *max)?;
                return Ok(());
            }

            let toggled = percentage_toggle_field
                .as_deref()
                .and_then(|toggle| data.get(toggle))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if toggled {
                check_bounds(name, number, Some(0.0), Some(1.0))?;
            }
            check_bounds(name, number, *min, *max)?;
        }
        FormFieldDescriptor::Enum { enum_values } => {
            let chosen = value.as_str().ok_or_else(|| invalid_type("a string"))?;
            if !enum_values.iter().any(|entry| entry.identifier == chosen) {
                return Err(PayloadError::InvalidEnumValue {
                    field: name.to_string(),
                    value: chosen.to_string(),
                });
            }
        }
    }

    Ok(())
}

fn check_bounds(
    name: &str,
    value: f64,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<(), PayloadError> {
    if !value.is_finite() {
        return Err(PayloadError::OutOfBounds {
            field: name.to_string(),
            reason: "value is not finite".to_string(),
        });
    }
    if let Some(min) = min {
        if value < min {
            return Err(PayloadError::OutOfBounds {
                field: name.to_string(),
                reason: format!("{value} is below {min}"),
            });
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(PayloadError::OutOfBounds {
                field: name.to_string(),
                reason: format!("{value} is above {max}"),
            });
        }
    }
    Ok(())
}
