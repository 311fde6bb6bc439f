//! YAML schema files.
//!
//! A schema lists enums and messages; a field's `type` is a scalar name or
//! the name of an enum or message declared earlier in the file.
//!
//! ```yaml
//! enums:
//!   - name: PhoneType
//!     values: { MOBILE: 0, HOME: 1 }
//! messages:
//!   - name: Person
//!     fields:
//!       - { name: name, number: 1, rule: required, type: string }
//!       - { name: scores, number: 5, rule: repeated, type: sint64, packed: true }
//! ```

use proto_codec::{
    DescriptorError, EnumDescriptor, FieldOptions, FieldRule, FieldType, MessageDescriptor,
    ScalarType,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Schema loading errors
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Schema file unreadable
    #[error("reading schema: {0}")]
    Io(#[from] std::io::Error),

    /// Schema file is not valid YAML for this format
    #[error("parsing schema: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Descriptor registration rejected a declaration
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// Field type names nothing declared so far
    #[error("message {message}: field `{field}` has unknown type `{type_name}`")]
    UnknownType {
        /// Enclosing message
        message: String,
        /// Field name
        field: String,
        /// Unresolved type name
        type_name: String,
    },

    /// Two enums or messages share a name
    #[error("type `{0}` declared twice")]
    DuplicateType(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    #[serde(default)]
    enums: Vec<EnumDef>,
    #[serde(default)]
    messages: Vec<MessageDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnumDef {
    name: String,
    values: BTreeMap<String, i32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MessageDef {
    name: String,
    #[serde(default)]
    fields: Vec<FieldDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDef {
    name: String,
    number: u32,
    rule: RuleDef,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    packed: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RuleDef {
    Required,
    Repeated,
}

impl From<RuleDef> for FieldRule {
    fn from(rule: RuleDef) -> Self {
        match rule {
            RuleDef::Required => FieldRule::Required,
            RuleDef::Repeated => FieldRule::Repeated,
        }
    }
}

/// Resolved descriptors by type name
#[derive(Debug, Default)]
pub struct Schema {
    enums: HashMap<String, Arc<EnumDescriptor>>,
    messages: HashMap<String, Arc<MessageDescriptor>>,
}

impl Schema {
    /// Read and resolve a schema file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let schema = Self::parse(&content)?;
        crate::component_debug!(
            "schema",
            "Loaded {} enums and {} messages from {:?}",
            schema.enums.len(),
            schema.messages.len(),
            path.as_ref()
        );
        Ok(schema)
    }

    /// Resolve a schema from YAML text
    pub fn parse(yaml: &str) -> Result<Self, SchemaError> {
        let file: SchemaFile = serde_yaml::from_str(yaml)?;
        let mut schema = Self::default();

        for def in file.enums {
            schema.check_unique(&def.name)?;
            let descriptor = EnumDescriptor::new(&def.name, def.values)?;
            schema.enums.insert(def.name, descriptor);
        }

        for def in file.messages {
            schema.check_unique(&def.name)?;
            let mut builder = MessageDescriptor::builder(&def.name);
            for field in &def.fields {
                let field_type = schema.resolve(&def.name, field)?;
                let options = FieldOptions {
                    packed: field.packed,
                };
                builder = builder.field(
                    field.rule.into(),
                    &field.name,
                    field_type,
                    field.number,
                    options,
                )?;
            }
            schema.messages.insert(def.name, builder.build());
        }

        Ok(schema)
    }

    /// Look up a message type
    pub fn message(&self, name: &str) -> Option<&Arc<MessageDescriptor>> {
        self.messages.get(name)
    }

    /// Declared message names, sorted
    pub fn message_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.messages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn check_unique(&self, name: &str) -> Result<(), SchemaError> {
        if self.enums.contains_key(name) || self.messages.contains_key(name) {
            return Err(SchemaError::DuplicateType(name.to_string()));
        }
        Ok(())
    }

    fn resolve(&self, message: &str, field: &FieldDef) -> Result<FieldType, SchemaError> {
        if let Some(scalar) = ScalarType::from_name(&field.type_name) {
            return Ok(FieldType::Scalar(scalar));
        }
        if let Some(descriptor) = self.enums.get(&field.type_name) {
            return Ok(FieldType::Enum(Arc::clone(descriptor)));
        }
        if let Some(descriptor) = self.messages.get(&field.type_name) {
            return Ok(FieldType::Message(Arc::clone(descriptor)));
        }
        Err(SchemaError::UnknownType {
            message: message.to_string(),
            field: field.name.clone(),
            type_name: field.type_name.clone(),
        })
    }
}
