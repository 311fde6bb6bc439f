//! Message instances.
//!
//! A [`DynamicMessage`] pairs a descriptor with one value slot per field. All
//! writes go through the descriptor, so a slot only ever holds values its
//! field type accepts.

use crate::decode::Decoder;
use crate::descriptor::{FieldDescriptor, FieldRule, MessageDescriptor};
use crate::encode::Encoder;
use crate::error::{AccessError, CodecError};
use crate::value::Value;
use bytes::{Bytes, BytesMut};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Single(Option<Value>),
    Repeated(Vec<Value>),
}

impl Slot {
    fn for_field(field: &FieldDescriptor) -> Self {
        match field.rule() {
            FieldRule::Required => Slot::Single(None),
            FieldRule::Repeated => Slot::Repeated(Vec::new()),
        }
    }

    fn values(&self) -> &[Value] {
        match self {
            Slot::Single(Some(value)) => std::slice::from_ref(value),
            Slot::Single(None) => &[],
            Slot::Repeated(values) => values,
        }
    }
}

/// Instance of a runtime-declared message type
#[derive(Clone)]
pub struct DynamicMessage {
    descriptor: Arc<MessageDescriptor>,
    /// Parallel to `descriptor.fields()`
    slots: Vec<Slot>,
}

impl DynamicMessage {
    /// Create an instance with every field unset
    pub fn new(descriptor: Arc<MessageDescriptor>) -> Self {
        let slots = descriptor.fields().iter().map(Slot::for_field).collect();
        Self { descriptor, slots }
    }

    /// Create an instance from `(field name, value)` pairs
    ///
    /// Required fields take the last value given for them; repeated fields
    /// collect every value in order.
    pub fn from_attrs<I, K>(
        descriptor: Arc<MessageDescriptor>,
        attrs: I,
    ) -> Result<Self, AccessError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut message = Self::new(descriptor);
        for (name, value) in attrs {
            message.insert(name.as_ref(), value)?;
        }
        Ok(message)
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self, AccessError> {
        self.insert(name, value.into())?;
        Ok(self)
    }

    /// Message type
    pub fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    /// Set a required field or append to a repeated one
    pub fn insert(&mut self, name: &str, value: Value) -> Result<(), AccessError> {
        let index = self.checked_index(name, &value)?;
        match &mut self.slots[index] {
            Slot::Single(slot) => *slot = Some(value),
            Slot::Repeated(values) => values.push(value),
        }
        Ok(())
    }

    /// Current value of a required field
    pub fn get(&self, name: &str) -> Result<Option<&Value>, AccessError> {
        match &self.slots[self.index(name)?] {
            Slot::Single(value) => Ok(value.as_ref()),
            Slot::Repeated(_) => Err(AccessError::NotSingular(name.to_string())),
        }
    }

    /// Current values of a repeated field
    pub fn get_repeated(&self, name: &str) -> Result<&[Value], AccessError> {
        match &self.slots[self.index(name)?] {
            Slot::Repeated(values) => Ok(values),
            Slot::Single(_) => Err(AccessError::NotRepeated(name.to_string())),
        }
    }

    /// Values stored under a field number, empty when unset or unknown
    pub fn get_by_number(&self, number: u32) -> &[Value] {
        self.descriptor
            .index_of_number(number)
            .map(|index| self.slots[index].values())
            .unwrap_or(&[])
    }

    /// [`insert`](Self::insert) addressed by field number
    pub fn insert_by_number(
        &mut self,
        number: u32,
        value: impl Into<Value>,
    ) -> Result<(), AccessError> {
        let index = self
            .descriptor
            .index_of_number(number)
            .ok_or_else(|| AccessError::UnknownField(number.to_string()))?;
        let value = value.into();
        let field = &self.descriptor.fields()[index];
        if !field.field_type().accepts(&value) {
            return Err(type_mismatch(field, &value));
        }
        self.assign_at(index, value);
        Ok(())
    }

    /// Overwrite a required field
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), AccessError> {
        let value = value.into();
        let index = self.checked_index(name, &value)?;
        match &mut self.slots[index] {
            Slot::Single(slot) => {
                *slot = Some(value);
                Ok(())
            }
            Slot::Repeated(_) => Err(AccessError::NotSingular(name.to_string())),
        }
    }

    /// Append to a repeated field
    pub fn push(&mut self, name: &str, value: impl Into<Value>) -> Result<(), AccessError> {
        let value = value.into();
        let index = self.checked_index(name, &value)?;
        match &mut self.slots[index] {
            Slot::Repeated(values) => {
                values.push(value);
                Ok(())
            }
            Slot::Single(_) => Err(AccessError::NotRepeated(name.to_string())),
        }
    }

    /// Replace every value of a repeated field
    pub fn set_repeated(&mut self, name: &str, values: Vec<Value>) -> Result<(), AccessError> {
        let index = self.index(name)?;
        let field = &self.descriptor.fields()[index];
        if !field.is_repeated() {
            return Err(AccessError::NotRepeated(name.to_string()));
        }
        if let Some(bad) = values.iter().find(|v| !field.field_type().accepts(v)) {
            return Err(type_mismatch(field, bad));
        }
        self.slots[index] = Slot::Repeated(values);
        Ok(())
    }

    /// Reset a field to unset / empty
    pub fn clear(&mut self, name: &str) -> Result<(), AccessError> {
        let index = self.index(name)?;
        self.slots[index] = Slot::for_field(&self.descriptor.fields()[index]);
        Ok(())
    }

    /// Whether a required field is set or a repeated field is non-empty
    pub fn has(&self, name: &str) -> Result<bool, AccessError> {
        Ok(!self.slots[self.index(name)?].values().is_empty())
    }

    /// Check that every required field is set, recursing into nested messages
    pub fn validate(&self) -> Result<(), CodecError> {
        self.validate_required()?;
        for slot in &self.slots {
            for value in slot.values() {
                if let Value::Message(nested) = value {
                    nested.validate()?;
                }
            }
        }
        Ok(())
    }

    /// Encode with default limits
    pub fn encode(&self) -> Result<Bytes, CodecError> {
        Encoder::default().encode(self)
    }

    /// Encode with default limits, appending to `buf`
    pub fn encode_to(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        Encoder::default().encode_to(self, buf)
    }

    /// Decode a new instance of `descriptor` with default limits
    pub fn decode(descriptor: &Arc<MessageDescriptor>, buf: &[u8]) -> Result<Self, CodecError> {
        Decoder::default().decode(descriptor, buf)
    }

    /// Decode into this instance with default limits
    pub fn decode_into(&mut self, buf: &[u8]) -> Result<(), CodecError> {
        Decoder::default().decode_into(self, buf)
    }

    /// Required-field check for this level only
    pub(crate) fn validate_required(&self) -> Result<(), CodecError> {
        for (field, slot) in self.descriptor.fields().iter().zip(&self.slots) {
            if matches!(slot, Slot::Single(None)) {
                return Err(CodecError::RequiredFieldMissing(field.name().to_string()));
            }
        }
        Ok(())
    }

    pub(crate) fn values_at(&self, index: usize) -> &[Value] {
        self.slots[index].values()
    }

    /// Store a decoded value: overwrite a single slot, append to a repeated one
    pub(crate) fn assign_at(&mut self, index: usize, value: Value) {
        match &mut self.slots[index] {
            Slot::Single(slot) => *slot = Some(value),
            Slot::Repeated(values) => values.push(value),
        }
    }

    fn index(&self, name: &str) -> Result<usize, AccessError> {
        self.descriptor
            .index_of_name(name)
            .ok_or_else(|| AccessError::UnknownField(name.to_string()))
    }

    fn checked_index(&self, name: &str, value: &Value) -> Result<usize, AccessError> {
        let index = self.index(name)?;
        let field = &self.descriptor.fields()[index];
        if !field.field_type().accepts(value) {
            return Err(type_mismatch(field, value));
        }
        Ok(index)
    }
}

fn type_mismatch(field: &FieldDescriptor, value: &Value) -> AccessError {
    AccessError::TypeMismatch {
        field: field.name().to_string(),
        expected: field.field_type().to_string(),
        found: value.kind(),
    }
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        MessageDescriptor::same_type(&self.descriptor, &other.descriptor)
            && self.slots == other.slots
    }
}

impl fmt::Debug for DynamicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.descriptor.name());
        for (field, slot) in self.descriptor.fields().iter().zip(&self.slots) {
            match slot {
                Slot::Single(Some(value)) => {
                    out.field(field.name(), value);
                }
                Slot::Single(None) => {}
                Slot::Repeated(values) => {
                    out.field(field.name(), values);
                }
            }
        }
        out.finish()
    }
}
