//! Message encoding.

use crate::config::CodecConfig;
use crate::descriptor::{FieldDescriptor, FieldType, ScalarType};
use crate::error::{AccessError, CodecError};
use crate::message::DynamicMessage;
use crate::value::Value;
use bytes::{Bytes, BytesMut};
use proto_wire::{WireType, WireWriter};
use tracing::trace;

/// Message encoder
///
/// Output is deterministic: fields are written in ascending field-number
/// order and repeated values in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: CodecConfig,
}

impl Encoder {
    /// Create an encoder with the given limits
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Encode a message
    pub fn encode(&self, message: &DynamicMessage) -> Result<Bytes, CodecError> {
        let mut writer = WireWriter::new();
        self.encode_message(message, &mut writer, 0)?;
        trace!(
            "encoded {} ({} bytes)",
            message.descriptor().name(),
            writer.len()
        );
        Ok(writer.freeze())
    }

    /// Encode a message onto the end of `buf`
    ///
    /// `buf` is left untouched when encoding fails.
    pub fn encode_to(
        &self,
        message: &DynamicMessage,
        buf: &mut BytesMut,
    ) -> Result<(), CodecError> {
        let bytes = self.encode(message)?;
        buf.extend_from_slice(&bytes);
        Ok(())
    }

    fn encode_message(
        &self,
        message: &DynamicMessage,
        writer: &mut WireWriter,
        depth: usize,
    ) -> Result<(), CodecError> {
        if depth > self.config.max_depth {
            return Err(CodecError::DepthExceeded(self.config.max_depth));
        }

        message.validate_required()?;

        for (index, field) in message.descriptor().fields().iter().enumerate() {
            let values = message.values_at(index);
            if values.is_empty() {
                continue;
            }

            if field.is_packed() {
                let mut block = WireWriter::new();
                for value in values {
                    self.encode_value(field, value, &mut block, depth)?;
                }
                writer.append_tag(field.number(), WireType::LengthDelimited);
                writer.append_length_delimited(block.as_slice());
            } else {
                let wire_type = field.field_type().wire_type();
                for value in values {
                    writer.append_tag(field.number(), wire_type);
                    self.encode_value(field, value, writer, depth)?;
                }
            }
        }

        Ok(())
    }

    /// Write one untagged value
    fn encode_value(
        &self,
        field: &FieldDescriptor,
        value: &Value,
        writer: &mut WireWriter,
        depth: usize,
    ) -> Result<(), CodecError> {
        match (field.field_type(), value) {
            (FieldType::Scalar(scalar), value) => encode_scalar(field, *scalar, value, writer),
            (FieldType::Enum(descriptor), Value::Enum(number)) => {
                if !descriptor.contains(*number) {
                    return Err(CodecError::InvalidEnumValue {
                        field: field.name().to_string(),
                        value: *number,
                    });
                }
                writer.append_int32(*number);
                Ok(())
            }
            (FieldType::Message(_), Value::Message(nested)) => {
                let mut scratch = WireWriter::new();
                self.encode_message(nested, &mut scratch, depth + 1)?;
                writer.append_length_delimited(scratch.as_slice());
                Ok(())
            }
            _ => Err(mismatch(field, value)),
        }
    }
}

fn encode_scalar(
    field: &FieldDescriptor,
    scalar: ScalarType,
    value: &Value,
    writer: &mut WireWriter,
) -> Result<(), CodecError> {
    match (scalar, value) {
        (ScalarType::Int32, Value::I32(v)) => writer.append_int32(*v),
        (ScalarType::Sint32, Value::I32(v)) => writer.append_sint32(*v),
        (ScalarType::Sfixed32, Value::I32(v)) => writer.append_sfixed32(*v),
        (ScalarType::Int64, Value::I64(v)) => writer.append_int64(*v),
        (ScalarType::Sint64, Value::I64(v)) => writer.append_sint64(*v),
        (ScalarType::Sfixed64, Value::I64(v)) => writer.append_sfixed64(*v),
        (ScalarType::Uint32, Value::U32(v)) => writer.append_uint32(*v),
        (ScalarType::Fixed32, Value::U32(v)) => writer.append_fixed32(*v),
        (ScalarType::Uint64, Value::U64(v)) => writer.append_uint64(*v),
        (ScalarType::Fixed64, Value::U64(v)) => writer.append_fixed64(*v),
        (ScalarType::Float, Value::F32(v)) => writer.append_float(*v),
        (ScalarType::Double, Value::F64(v)) => writer.append_double(*v),
        (ScalarType::Bool, Value::Bool(v)) => writer.append_bool(*v),
        (ScalarType::String, Value::String(v)) => writer.append_string(v),
        (ScalarType::Bytes, Value::Bytes(v)) => writer.append_bytes(v),
        _ => return Err(mismatch(field, value)),
    }
    Ok(())
}

fn mismatch(field: &FieldDescriptor, value: &Value) -> CodecError {
    AccessError::TypeMismatch {
        field: field.name().to_string(),
        expected: field.field_type().to_string(),
        found: value.kind(),
    }
    .into()
}
