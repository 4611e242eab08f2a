use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use super::criteria::{
    AttendanceCriteria, Criterion, CriterionBlueprint, CriterionIdentifier, PresentationCriteria,
    ScheinexamCriteria, SheetIndividualCriteria, SheetTotalCriteria,
};
use super::form::{FieldDeclaration, FormFieldDescriptor};
use super::payload::{self, CriterionDto, PayloadError};

/// Form fields of one variant keyed by field name.
pub type FormDataSet = BTreeMap<String, FormFieldDescriptor>;

/// Form fields of every registered variant keyed by identifier.
pub type FormDataResponse = BTreeMap<CriterionIdentifier, FormDataSet>;

/// A field configuration the registry refuses to start with.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("criterion '{0}' is registered twice")]
    DuplicateIdentifier(CriterionIdentifier),
    #[error("field '{field}' cannot be a percentage and a possible percentage at once")]
    ConflictingPercentage { field: &'static str },
    #[error("integer field '{field}' cannot be a percentage")]
    PercentageOnInteger { field: &'static str },
    #[error("number field '{field}' needs integer, float or percentage metadata")]
    MissingNumberMetadata { field: &'static str },
    #[error("field '{field}' is toggled by '{toggle}' which is not declared")]
    MissingToggle {
        field: &'static str,
        toggle: &'static str,
    },
    #[error("field '{field}' is toggled by '{toggle}' which is not a boolean field")]
    ToggleNotBoolean {
        field: &'static str,
        toggle: &'static str,
    },
    #[error("field '{field}' has min {min} above max {max}")]
    InvalidBounds {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("field '{field}' is declared twice")]
    DuplicateField { field: &'static str },
}

/// Resolved form schema of one criterion variant.
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionSchema {
    identifier: CriterionIdentifier,
    fields: BTreeMap<&'static str, FormFieldDescriptor>,
    ignored: BTreeSet<&'static str>,
}

impl CriterionSchema {
    pub fn identifier(&self) -> CriterionIdentifier {
        self.identifier
    }

    pub fn field(&self, name: &str) -> Option<&FormFieldDescriptor> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FormFieldDescriptor)> {
        self.fields.iter().map(|(name, descriptor)| (*name, descriptor))
    }

    /// Declared but kept out of the form. Payloads may carry them; they are dropped.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.contains(name)
    }

    pub fn form_data(&self) -> FormDataSet {
        self.fields
            .iter()
            .map(|(name, descriptor)| (name.to_string(), descriptor.clone()))
            .collect()
    }
}

/// Collects variant blueprints and resolves them into an immutable [`CriteriaRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    blueprints: Vec<(CriterionIdentifier, Vec<FieldDeclaration>)>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<B: CriterionBlueprint>(mut self) -> Self {
        self.blueprints.push((B::IDENTIFIER, B::form_fields()));
        self
    }

    pub fn build(self) -> Result<CriteriaRegistry, RegistryError> {
        let mut schemas = BTreeMap::new();

        for (identifier, declarations) in self.blueprints {
            if schemas.contains_key(&identifier) {
                return Err(RegistryError::DuplicateIdentifier(identifier));
            }

            let schema = resolve_schema(identifier, &declarations).map_err(|error| {
                warn!(criteria = %identifier, %error, "criterion blueprint rejected");
                error
            })?;
            schemas.insert(identifier, schema);
        }

        debug!(count = schemas.len(), "criteria registry built");
        Ok(CriteriaRegistry { schemas })
    }
}

fn resolve_schema(
    identifier: CriterionIdentifier,
    declarations: &[FieldDeclaration],
) -> Result<CriterionSchema, RegistryError> {
    let mut fields = BTreeMap::new();
    let mut ignored = BTreeSet::new();
    let mut seen = BTreeSet::new();

    for declaration in declarations {
        let name = declaration.name();
        if !seen.insert(name) {
            return Err(RegistryError::DuplicateField { field: name });
        }

        match declaration.resolve(declarations)? {
            Some(descriptor) => {
                info!(criteria = %identifier, "{} field '{}' added", descriptor.kind(), name);
                fields.insert(name, descriptor);
            }
            None => {
                ignored.insert(name);
            }
        }
    }

    Ok(CriterionSchema {
        identifier,
        fields,
        ignored,
    })
}

/// Form schemas of all registered criterion variants. Built once and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaRegistry {
    schemas: BTreeMap<CriterionIdentifier, CriterionSchema>,
}

impl CriteriaRegistry {
    /// Registry with all five criterion variants.
    pub fn builtin() -> Result<Self, RegistryError> {
        RegistryBuilder::new()
            .register::<AttendanceCriteria>()
            .register::<PresentationCriteria>()
            .register::<ScheinexamCriteria>()
            .register::<SheetIndividualCriteria>()
            .register::<SheetTotalCriteria>()
            .build()
    }

    pub fn schema(&self, identifier: &str) -> Option<&CriterionSchema> {
        let identifier = identifier.parse::<CriterionIdentifier>().ok()?;
        self.schemas.get(&identifier)
    }

    pub fn schemas(&self) -> impl Iterator<Item = &CriterionSchema> {
        self.schemas.values()
    }

    pub fn form_data(&self) -> FormDataResponse {
        self.schemas
            .iter()
            .map(|(identifier, schema)| (*identifier, schema.form_data()))
            .collect()
    }

    /// Validates a payload against its identifier's schema and builds the typed criterion.
    pub fn parse_payload(&self, dto: &CriterionDto) -> Result<Criterion, PayloadError> {
        let schema = self
            .schema(&dto.identifier)
            .ok_or_else(|| PayloadError::UnknownIdentifier(dto.identifier.clone()))?;

        payload::into_criterion(schema, dto)
    }
}
