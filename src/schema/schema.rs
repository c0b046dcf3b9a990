use serde::{Deserialize, Serialize};

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Number,
    Boolean,
}

/// Field definition. `facetable` is legal on any type, `sortable` only on
/// numbers (checked when the field is added to a schema).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: FieldType,
    pub facetable: bool,
    pub sortable: bool,
}

impl FieldDefinition {
    pub fn text(name: &str) -> Self {
        FieldDefinition {
            name: name.to_string(),
            field_type: FieldType::Text,
            facetable: false,
            sortable: false,
        }
    }

    pub fn number(name: &str) -> Self {
        FieldDefinition {
            name: name.to_string(),
            field_type: FieldType::Number,
            facetable: false,
            sortable: false,
        }
    }

    pub fn boolean(name: &str) -> Self {
        FieldDefinition {
            name: name.to_string(),
            field_type: FieldType::Boolean,
            facetable: false,
            sortable: false,
        }
    }

    pub fn facetable(mut self) -> Self {
        self.facetable = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Does a runtime value agree with this field's declared type? Values
    /// that disagree are stored but skipped by the indexing pipeline.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        matches!(
            (self.field_type, value),
            (FieldType::Text, FieldValue::Text(_))
                | (FieldType::Number, FieldValue::Number(_))
                | (FieldType::Boolean, FieldValue::Boolean(_))
        )
    }
}

/// Ordered field definitions. Declaration order drives the global token
/// position counter, so it is part of the schema's identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<FieldDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Schema { fields: Vec::new() }
    }

    pub fn with_field(mut self, def: FieldDefinition) -> Result<Self> {
        if def.sortable && def.field_type != FieldType::Number {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("field '{}' is sortable but not a number", def.name),
            ));
        }
        if self.fields.iter().any(|f| f.name == def.name) {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("duplicate field '{}'", def.name),
            ));
        }
        self.fields.push(def);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
