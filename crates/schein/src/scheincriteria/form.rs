use serde::{Deserialize, Serialize};

use super::registry::RegistryError;

/// One selectable value of an enum field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSelectValue {
    pub identifier: String,
    pub value: String,
}

impl FormSelectValue {
    pub fn new(identifier: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            value: value.into(),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Declarative description of one configuration field, consumed by the client to render forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FormFieldDescriptor {
    String,
    Boolean,
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    Float {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "is_false")]
        percentage: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        percentage_toggle_field: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Enum { enum_values: Vec<FormSelectValue> },
}

impl FormFieldDescriptor {
    pub fn kind(&self) -> &'static str {
        match self {
            FormFieldDescriptor::String => "string",
            FormFieldDescriptor::Boolean => "boolean",
            FormFieldDescriptor::Integer { .. } => "integer",
            FormFieldDescriptor::Float { .. } => "float",
            FormFieldDescriptor::Enum { .. } => "enum",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum DeclaredType {
    String,
    Boolean,
    Number,
    Enum(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberFormat {
    Unspecified,
    Integer,
    Float,
}

/// Field as declared by a criterion variant, before it is resolved into a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    name: &'static str,
    declared: DeclaredType,
    ignored: bool,
    format: NumberFormat,
    min: Option<f64>,
    max: Option<f64>,
    percentage: bool,
    toggled_by: Option<&'static str>,
}

impl FieldDeclaration {
    fn with_type(name: &'static str, declared: DeclaredType) -> Self {
        Self {
            name,
            declared,
            ignored: false,
            format: NumberFormat::Unspecified,
            min: None,
            max: None,
            percentage: false,
            toggled_by: None,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::with_type(name, DeclaredType::String)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::with_type(name, DeclaredType::Boolean)
    }

    /// A numeric field. It needs at least one of `integer`, `float`, `percentage` or
    /// `possible_percentage` to resolve.
    pub fn number(name: &'static str) -> Self {
        Self::with_type(name, DeclaredType::Number)
    }

    pub fn enumeration<I, S>(name: &'static str, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = entries.into_iter().map(Into::into).collect();
        Self::with_type(name, DeclaredType::Enum(entries))
    }

    /// Keeps the field out of the form entirely.
    pub fn ignore(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn integer(mut self) -> Self {
        self.format = NumberFormat::Integer;
        self
    }

    pub fn float(mut self) -> Self {
        self.format = NumberFormat::Float;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// The value is always a fraction, shown to the user as 0-100.
    pub fn percentage(mut self) -> Self {
        self.percentage = true;
        self
    }

    /// The value is a fraction whenever the boolean field `toggle` is set.
    pub fn possible_percentage(mut self, toggle: &'static str) -> Self {
        self.toggled_by = Some(toggle);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub(crate) fn is_boolean(&self) -> bool {
        self.declared == DeclaredType::Boolean
    }

    /// Turns the declaration into its descriptor. Ignored fields resolve to `None`.
    ///
    /// `siblings` are the other fields of the same variant; they are needed to check the toggle
    /// of a possible-percentage field.
    pub(crate) fn resolve(
        &self,
        siblings: &[FieldDeclaration],
    ) -> Result<Option<FormFieldDescriptor>, RegistryError> {
        if self.ignored {
            return Ok(None);
        }

        let descriptor = match &self.declared {
            DeclaredType::String => FormFieldDescriptor::String,
            DeclaredType::Boolean => FormFieldDescriptor::Boolean,
            DeclaredType::Enum(entries) => FormFieldDescriptor::Enum {
                enum_values: entries
                    .iter()
                    .map(|entry| FormSelectValue::new(entry.clone(), entry.clone()))
                    .collect(),
            },
            DeclaredType::Number => self.resolve_number(siblings)?,
        };

        Ok(Some(descriptor))
    }

    fn resolve_number(
        &self,
        siblings: &[FieldDeclaration],
    ) -> Result<FormFieldDescriptor, RegistryError> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(RegistryError::InvalidBounds {
                    field: self.name,
                    min,
                    max,
                });
            }
        }

        if self.percentage && self.toggled_by.is_some() {
            return Err(RegistryError::ConflictingPercentage { field: self.name });
        }

        if self.format == NumberFormat::Integer {
            if self.percentage || self.toggled_by.is_some() {
                return Err(RegistryError::PercentageOnInteger { field: self.name });
            }
            return Ok(FormFieldDescriptor::Integer {
                min: self.min.map(|min| min.ceil() as i64),
                max: self.max.map(|max| max.floor() as i64),
            });
        }

        if self.percentage {
            return Ok(FormFieldDescriptor::Float {
                min: Some(0.0),
                max: Some(100.0),
                percentage: true,
                percentage_toggle_field: None,
            });
        }

        if let Some(toggle) = self.toggled_by {
            let sibling = siblings
                .iter()
                .find(|sibling| sibling.name == toggle && sibling.name != self.name);
            match sibling {
                Some(sibling) if sibling.is_boolean() && !sibling.ignored => {}
                Some(_) => {
                    return Err(RegistryError::ToggleNotBoolean {
                        field: self.name,
                        toggle,
                    })
                }
                None => {
                    return Err(RegistryError::MissingToggle {
                        field: self.name,
                        toggle,
                    })
                }
            }

            return Ok(FormFieldDescriptor::Float {
                min: self.min,
                max: self.max,
                percentage: false,
                percentage_toggle_field: Some(toggle.to_string()),
            });
        }

        match self.format {
            NumberFormat::Float => Ok(FormFieldDescriptor::Float {
                min: self.min,
                max: self.max,
                percentage: false,
                percentage_toggle_field: None,
            }),
            _ => Err(RegistryError::MissingNumberMetadata { field: self.name }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptors_serialize_with_kind_tag() {
        let float = FormFieldDescriptor::Float {
            min: Some(0.0),
            max: None,
            percentage: false,
            percentage_toggle_field: Some("percentage".to_string()),
        };

        assert_eq!(
            serde_json::to_value(&float).expect("serializes"),
            json!({ "kind": "float", "min": 0.0, "percentageToggleField": "percentage" })
        );
        assert_eq!(
            serde_json::to_value(FormFieldDescriptor::Boolean).expect("serializes"),
            json!({ "kind": "boolean" })
        );
    }

    #[test]
    fn enum_fields_list_their_entries() {
        let field = FieldDeclaration::enumeration("chart", ["PieChart", "BarChart"]);
        let descriptor = field.resolve(&[]).expect("resolves").expect("not ignored");

        assert_eq!(
            serde_json::to_value(&descriptor).expect("serializes"),
            json!({
                "kind": "enum",
                "enumValues": [
                    { "identifier": "PieChart", "value": "PieChart" },
                    { "identifier": "BarChart", "value": "BarChart" }
                ]
            })
        );
    }

    #[test]
    fn percentage_forces_full_range() {
        let field = FieldDeclaration::number("share").min(10.0).percentage();
        let descriptor = field.resolve(&[]).expect("resolves");

        assert_eq!(
            descriptor,
            Some(FormFieldDescriptor::Float {
                min: Some(0.0),
                max: Some(100.0),
                percentage: true,
                percentage_toggle_field: None,
            })
        );
    }

    #[test]
    fn integer_bounds_are_kept() {
        let field = FieldDeclaration::number("count").integer().min(0.0).max(12.0);

        assert_eq!(
            field.resolve(&[]).expect("resolves"),
            Some(FormFieldDescriptor::Integer {
                min: Some(0),
                max: Some(12)
            })
        );
    }

    #[test]
    fn ignored_fields_resolve_to_nothing() {
        let field = FieldDeclaration::string("identifier").ignore();

        assert_eq!(field.resolve(&[]).expect("resolves"), None);
    }

    #[test]
    fn bare_numbers_are_rejected() {
        let field = FieldDeclaration::number("valueNeeded").min(0.0);

        assert!(matches!(
            field.resolve(&[]),
            Err(RegistryError::MissingNumberMetadata {
                field: "valueNeeded"
            })
        ));
    }

    #[test]
    fn possible_percentage_requires_boolean_toggle() {
        let value = FieldDeclaration::number("valueNeeded").possible_percentage("percentage");

        assert!(matches!(
            value.resolve(&[]),
            Err(RegistryError::MissingToggle { .. })
        ));
        assert!(matches!(
            value.resolve(&[FieldDeclaration::string("percentage")]),
            Err(RegistryError::ToggleNotBoolean { .. })
        ));
        assert!(value
            .resolve(&[FieldDeclaration::boolean("percentage")])
            .expect("resolves")
            .is_some());
    }
}
