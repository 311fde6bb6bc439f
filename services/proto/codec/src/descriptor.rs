//! Message and field descriptors.
//!
//! A [`MessageDescriptor`] is the descriptor table for one message type. It is
//! built once through [`MessageDescriptorBuilder`], which rejects conflicting
//! registrations, and is then shared read-only behind an [`Arc`]. Code
//! generators only need this module: the message name plus, for every field,
//! its number, name, rule, type and options.

use crate::error::DescriptorError;
use crate::value::Value;
use proto_wire::{WireType, MAX_FIELD_NUMBER};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Scalar field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// 64-bit float, fixed64 on the wire
    Double,
    /// 32-bit float, fixed32 on the wire
    Float,
    /// Signed varint, negatives take ten bytes
    Int32,
    /// Signed varint
    Int64,
    /// Unsigned varint
    Uint32,
    /// Unsigned varint
    Uint64,
    /// Zigzag varint
    Sint32,
    /// Zigzag varint
    Sint64,
    /// Unsigned fixed32
    Fixed32,
    /// Unsigned fixed64
    Fixed64,
    /// Signed fixed32
    Sfixed32,
    /// Signed fixed64
    Sfixed64,
    /// 0/1 varint
    Bool,
    /// UTF-8 text, length-delimited
    String,
    /// Raw bytes, length-delimited
    Bytes,
}

impl ScalarType {
    /// Wire type used for a single value of this type
    pub fn wire_type(self) -> WireType {
        match self {
            ScalarType::Int32
            | ScalarType::Int64
            | ScalarType::Uint32
            | ScalarType::Uint64
            | ScalarType::Sint32
            | ScalarType::Sint64
            | ScalarType::Bool => WireType::Varint,
            ScalarType::Fixed64 | ScalarType::Sfixed64 | ScalarType::Double => WireType::Fixed64,
            ScalarType::Fixed32 | ScalarType::Sfixed32 | ScalarType::Float => WireType::Fixed32,
            ScalarType::String | ScalarType::Bytes => WireType::LengthDelimited,
        }
    }

    /// Whether repeated values of this type may use packed encoding
    pub fn is_packable(self) -> bool {
        !matches!(self, ScalarType::String | ScalarType::Bytes)
    }

    /// Schema name of the type (`"int32"`, `"bytes"`, ...)
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Double => "double",
            ScalarType::Float => "float",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Uint32 => "uint32",
            ScalarType::Uint64 => "uint64",
            ScalarType::Sint32 => "sint32",
            ScalarType::Sint64 => "sint64",
            ScalarType::Fixed32 => "fixed32",
            ScalarType::Fixed64 => "fixed64",
            ScalarType::Sfixed32 => "sfixed32",
            ScalarType::Sfixed64 => "sfixed64",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
        }
    }

    /// Look a scalar type up by its schema name
    pub fn from_name(name: &str) -> Option<Self> {
        let scalar = match name {
            "double" => ScalarType::Double,
            "float" => ScalarType::Float,
            "int32" => ScalarType::Int32,
            "int64" => ScalarType::Int64,
            "uint32" => ScalarType::Uint32,
            "uint64" => ScalarType::Uint64,
            "sint32" => ScalarType::Sint32,
            "sint64" => ScalarType::Sint64,
            "fixed32" => ScalarType::Fixed32,
            "fixed64" => ScalarType::Fixed64,
            "sfixed32" => ScalarType::Sfixed32,
            "sfixed64" => ScalarType::Sfixed64,
            "bool" => ScalarType::Bool,
            "string" => ScalarType::String,
            "bytes" => ScalarType::Bytes,
            _ => return None,
        };
        Some(scalar)
    }

    fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (
                ScalarType::Int32 | ScalarType::Sint32 | ScalarType::Sfixed32,
                Value::I32(_)
            ) | (
                ScalarType::Int64 | ScalarType::Sint64 | ScalarType::Sfixed64,
                Value::I64(_)
            ) | (ScalarType::Uint32 | ScalarType::Fixed32, Value::U32(_))
                | (ScalarType::Uint64 | ScalarType::Fixed64, Value::U64(_))
                | (ScalarType::Float, Value::F32(_))
                | (ScalarType::Double, Value::F64(_))
                | (ScalarType::Bool, Value::Bool(_))
                | (ScalarType::String, Value::String(_))
                | (ScalarType::Bytes, Value::Bytes(_))
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRule {
    /// Exactly one value, checked at encode time
    Required,
    /// Zero or more values
    Repeated,
}

impl fmt::Display for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRule::Required => f.write_str("required"),
            FieldRule::Repeated => f.write_str("repeated"),
        }
    }
}

/// Encoding options recognised on a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FieldOptions {
    /// Encode a repeated numeric field as one length-delimited block
    pub packed: bool,
}

impl FieldOptions {
    /// Options with packed encoding enabled
    pub fn packed() -> Self {
        Self { packed: true }
    }
}

/// Semantic type of a field, resolved at registration
#[derive(Debug, Clone)]
pub enum FieldType {
    /// Primitive scalar
    Scalar(ScalarType),
    /// Enumeration, encoded as an int32 varint
    Enum(Arc<EnumDescriptor>),
    /// Nested message, encoded length-delimited
    Message(Arc<MessageDescriptor>),
}

impl FieldType {
    /// Wire type used for a single (unpacked) value
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldType::Scalar(scalar) => scalar.wire_type(),
            FieldType::Enum(_) => WireType::Varint,
            FieldType::Message(_) => WireType::LengthDelimited,
        }
    }

    /// Whether repeated values may use packed encoding
    pub fn is_packable(&self) -> bool {
        match self {
            FieldType::Scalar(scalar) => scalar.is_packable(),
            FieldType::Enum(_) => true,
            FieldType::Message(_) => false,
        }
    }

    /// Whether `value` may be stored in a field of this type
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Scalar(scalar), value) => scalar.accepts(value),
            (FieldType::Enum(_), Value::Enum(_)) => true,
            (FieldType::Message(descriptor), Value::Message(message)) => {
                MessageDescriptor::same_type(descriptor, message.descriptor())
            }
            _ => false,
        }
    }
}

impl PartialEq for FieldType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldType::Scalar(a), FieldType::Scalar(b)) => a == b,
            (FieldType::Enum(a), FieldType::Enum(b)) => Arc::ptr_eq(a, b) || a == b,
            (FieldType::Message(a), FieldType::Message(b)) => MessageDescriptor::same_type(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(scalar) => write!(f, "{}", scalar),
            FieldType::Enum(descriptor) => write!(f, "enum {}", descriptor.name()),
            FieldType::Message(descriptor) => write!(f, "message {}", descriptor.name()),
        }
    }
}

impl From<ScalarType> for FieldType {
    fn from(scalar: ScalarType) -> Self {
        FieldType::Scalar(scalar)
    }
}

impl From<Arc<EnumDescriptor>> for FieldType {
    fn from(descriptor: Arc<EnumDescriptor>) -> Self {
        FieldType::Enum(descriptor)
    }
}

impl From<&Arc<EnumDescriptor>> for FieldType {
    fn from(descriptor: &Arc<EnumDescriptor>) -> Self {
        FieldType::Enum(Arc::clone(descriptor))
    }
}

impl From<Arc<MessageDescriptor>> for FieldType {
    fn from(descriptor: Arc<MessageDescriptor>) -> Self {
        FieldType::Message(descriptor)
    }
}

impl From<&Arc<MessageDescriptor>> for FieldType {
    fn from(descriptor: &Arc<MessageDescriptor>) -> Self {
        FieldType::Message(Arc::clone(descriptor))
    }
}

/// Metadata for one message field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    rule: FieldRule,
    name: String,
    field_type: FieldType,
    number: u32,
    options: FieldOptions,
}

impl FieldDescriptor {
    /// Cardinality
    pub fn rule(&self) -> FieldRule {
        self.rule
    }

    /// Accessor name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Semantic type
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Wire identity
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Encoding options
    pub fn options(&self) -> FieldOptions {
        self.options
    }

    /// Whether the field holds a sequence
    pub fn is_repeated(&self) -> bool {
        self.rule == FieldRule::Repeated
    }

    /// Whether the field is encoded as one packed block
    pub fn is_packed(&self) -> bool {
        self.options.packed
    }
}

/// Enumeration type: a named set of legal integer values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    name: String,
    values: Vec<(String, i32)>,
}

impl EnumDescriptor {
    /// Create an enum from `(name, value)` pairs
    ///
    /// Several names may share a value; a name may appear only once.
    pub fn new<I, S>(name: &str, values: I) -> Result<Arc<Self>, DescriptorError>
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();
        for (value_name, value) in values {
            let value_name = value_name.into();
            if !seen.insert(value_name.clone()) {
                return Err(DescriptorError::DuplicateEnumValue {
                    enum_name: name.to_string(),
                    name: value_name,
                });
            }
            collected.push((value_name, value));
        }

        Ok(Arc::new(Self {
            name: name.to_string(),
            values: collected,
        }))
    }

    /// Enum type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared `(name, value)` pairs in declaration order
    pub fn values(&self) -> impl Iterator<Item = (&str, i32)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Whether `value` is one of the declared values
    pub fn contains(&self, value: i32) -> bool {
        self.values.iter().any(|(_, v)| *v == value)
    }

    /// Value declared under `name`
    pub fn value_of(&self, name: &str) -> Option<i32> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| *value)
    }

    /// First name declared for `value`
    pub fn name_of(&self, value: i32) -> Option<&str> {
        self.values
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, _)| name.as_str())
    }
}

/// Descriptor table for one message type
#[derive(Debug)]
pub struct MessageDescriptor {
    name: String,
    /// Sorted by field number
    fields: Vec<FieldDescriptor>,
    by_number: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
}

impl MessageDescriptor {
    /// Start registering fields for a message type
    pub fn builder(name: &str) -> MessageDescriptorBuilder {
        MessageDescriptorBuilder::new(name)
    }

    /// Message type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in ascending field-number order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Field registered under `number`
    pub fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.index_of_number(number).map(|index| &self.fields[index])
    }

    /// Field registered under `name`
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index_of_name(name).map(|index| &self.fields[index])
    }

    /// Whether `a` and `b` describe the same message type
    ///
    /// Separately built descriptors match when their names and every field
    /// (number, name, rule, type, options) agree.
    pub fn same_type(a: &Arc<Self>, b: &Arc<Self>) -> bool {
        Arc::ptr_eq(a, b) || (a.name == b.name && a.fields == b.fields)
    }

    pub(crate) fn index_of_number(&self, number: u32) -> Option<usize> {
        self.by_number.get(&number).copied()
    }

    pub(crate) fn index_of_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}

/// Registers the fields of a message type
///
/// Every registration is checked immediately, so a conflicting field never
/// survives until encode time.
#[derive(Debug)]
pub struct MessageDescriptorBuilder {
    name: String,
    fields: BTreeMap<u32, FieldDescriptor>,
}

impl MessageDescriptorBuilder {
    /// Create an empty builder
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: BTreeMap::new(),
        }
    }

    /// Register a required field
    pub fn required(
        self,
        name: &str,
        field_type: impl Into<FieldType>,
        number: u32,
    ) -> Result<Self, DescriptorError> {
        self.field(
            FieldRule::Required,
            name,
            field_type,
            number,
            FieldOptions::default(),
        )
    }

    /// Register a repeated field
    pub fn repeated(
        self,
        name: &str,
        field_type: impl Into<FieldType>,
        number: u32,
    ) -> Result<Self, DescriptorError> {
        self.field(
            FieldRule::Repeated,
            name,
            field_type,
            number,
            FieldOptions::default(),
        )
    }

    /// Register a repeated field with packed encoding
    pub fn repeated_packed(
        self,
        name: &str,
        field_type: impl Into<FieldType>,
        number: u32,
    ) -> Result<Self, DescriptorError> {
        self.field(
            FieldRule::Repeated,
            name,
            field_type,
            number,
            FieldOptions::packed(),
        )
    }

    /// Register a field with explicit rule and options
    pub fn field(
        mut self,
        rule: FieldRule,
        name: &str,
        field_type: impl Into<FieldType>,
        number: u32,
        options: FieldOptions,
    ) -> Result<Self, DescriptorError> {
        let field_type = field_type.into();

        if number == 0 || number > MAX_FIELD_NUMBER {
            return Err(DescriptorError::InvalidFieldNumber {
                field: name.to_string(),
                number,
            });
        }

        if self.fields.contains_key(&number) {
            return Err(DescriptorError::DuplicateFieldNumber {
                message: self.name.clone(),
                number,
            });
        }

        if self.fields.values().any(|field| field.name == name) {
            return Err(DescriptorError::DuplicateFieldName {
                message: self.name.clone(),
                name: name.to_string(),
            });
        }

        if options.packed && (rule != FieldRule::Repeated || !field_type.is_packable()) {
            return Err(DescriptorError::InvalidPacked(name.to_string()));
        }

        self.fields.insert(
            number,
            FieldDescriptor {
                rule,
                name: name.to_string(),
                field_type,
                number,
                options,
            },
        );
        Ok(self)
    }

    /// Freeze the descriptor table
    pub fn build(self) -> Arc<MessageDescriptor> {
        // BTreeMap iteration yields ascending field numbers.
        let fields: Vec<FieldDescriptor> = self.fields.into_values().collect();
        let by_number = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.number, index))
            .collect();
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.name.clone(), index))
            .collect();

        Arc::new(MessageDescriptor {
            name: self.name,
            fields,
            by_number,
            by_name,
        })
    }
}
