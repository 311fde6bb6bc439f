//! Message decoding.

use crate::config::CodecConfig;
use crate::descriptor::{FieldDescriptor, FieldType, MessageDescriptor, ScalarType};
use crate::error::CodecError;
use crate::message::DynamicMessage;
use crate::value::Value;
use bytes::Bytes;
use proto_wire::{WireReader, WireType};
use std::sync::Arc;
use tracing::{debug, trace};

/// Message decoder
///
/// Fields may arrive in any order. Unknown field numbers are skipped so later
/// fields stay readable; a buffer that ends inside a tag or value is rejected.
/// Required fields are not checked.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: CodecConfig,
}

impl Decoder {
    /// Create a decoder with the given limits
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Decode a new instance of `descriptor`
    pub fn decode(
        &self,
        descriptor: &Arc<MessageDescriptor>,
        buf: &[u8],
    ) -> Result<DynamicMessage, CodecError> {
        self.decode_bytes(descriptor, Bytes::copy_from_slice(buf))
    }

    /// Decode a new instance of `descriptor` without copying `buf`
    pub fn decode_bytes(
        &self,
        descriptor: &Arc<MessageDescriptor>,
        buf: Bytes,
    ) -> Result<DynamicMessage, CodecError> {
        self.check_size(&buf)?;
        let mut message = DynamicMessage::new(Arc::clone(descriptor));
        self.merge(&mut message, buf, 0)?;
        Ok(message)
    }

    /// Decode into an existing instance
    ///
    /// Required fields are overwritten and repeated fields appended to. On
    /// error `target` keeps its previous contents.
    pub fn decode_into(&self, target: &mut DynamicMessage, buf: &[u8]) -> Result<(), CodecError> {
        let buf = Bytes::copy_from_slice(buf);
        self.check_size(&buf)?;
        let mut scratch = target.clone();
        self.merge(&mut scratch, buf, 0)?;
        *target = scratch;
        Ok(())
    }

    fn check_size(&self, buf: &Bytes) -> Result<(), CodecError> {
        if buf.len() > self.config.max_message_size {
            return Err(CodecError::Size(buf.len()));
        }
        Ok(())
    }

    fn merge(
        &self,
        message: &mut DynamicMessage,
        buf: Bytes,
        depth: usize,
    ) -> Result<(), CodecError> {
        if depth > self.config.max_depth {
            return Err(CodecError::DepthExceeded(self.config.max_depth));
        }

        let descriptor = Arc::clone(message.descriptor());
        let mut reader = WireReader::new(buf);

        while !reader.is_empty() {
            let tag = reader.read_tag()?;

            let Some(index) = descriptor.index_of_number(tag.field_number) else {
                debug!(
                    "{}: skipping unknown field {} ({})",
                    descriptor.name(),
                    tag.field_number,
                    tag.wire_type
                );
                reader.skip(tag.wire_type)?;
                continue;
            };

            let field = &descriptor.fields()[index];
            let expected = field.field_type().wire_type();

            // Packed and unpacked encodings are both accepted for packable repeated fields.
            if tag.wire_type == WireType::LengthDelimited
                && expected != WireType::LengthDelimited
                && field.is_repeated()
                && field.field_type().is_packable()
            {
                let mut block = WireReader::new(reader.read_length_delimited()?);
                while !block.is_empty() {
                    let value = self.read_value(field, &mut block, depth)?;
                    message.assign_at(index, value);
                }
                continue;
            }

            if tag.wire_type != expected {
                return Err(CodecError::WireTypeMismatch {
                    field: field.name().to_string(),
                    expected,
                    found: tag.wire_type,
                });
            }

            let value = self.read_value(field, &mut reader, depth)?;
            message.assign_at(index, value);
        }

        trace!("decoded {} at depth {}", descriptor.name(), depth);
        Ok(())
    }

    /// Read one untagged value of the field's declared type
    fn read_value(
        &self,
        field: &FieldDescriptor,
        reader: &mut WireReader,
        depth: usize,
    ) -> Result<Value, CodecError> {
        match field.field_type() {
            FieldType::Scalar(scalar) => read_scalar(field, *scalar, reader),
            FieldType::Enum(_) => Ok(Value::Enum(reader.read_int32()?)),
            FieldType::Message(descriptor) => {
                let bytes = reader.read_length_delimited()?;
                let mut nested = DynamicMessage::new(Arc::clone(descriptor));
                self.merge(&mut nested, bytes, depth + 1)?;
                Ok(Value::Message(nested))
            }
        }
    }
}

fn read_scalar(
    field: &FieldDescriptor,
    scalar: ScalarType,
    reader: &mut WireReader,
) -> Result<Value, CodecError> {
    let value = match scalar {
        ScalarType::Int32 => Value::I32(reader.read_int32()?),
        ScalarType::Sint32 => Value::I32(reader.read_sint32()?),
        ScalarType::Sfixed32 => Value::I32(reader.read_sfixed32()?),
        ScalarType::Int64 => Value::I64(reader.read_int64()?),
        ScalarType::Sint64 => Value::I64(reader.read_sint64()?),
        ScalarType::Sfixed64 => Value::I64(reader.read_sfixed64()?),
        ScalarType::Uint32 => Value::U32(reader.read_uint32()?),
        ScalarType::Fixed32 => Value::U32(reader.read_fixed32()?),
        ScalarType::Uint64 => Value::U64(reader.read_uint64()?),
        ScalarType::Fixed64 => Value::U64(reader.read_fixed64()?),
        ScalarType::Float => Value::F32(reader.read_float()?),
        ScalarType::Double => Value::F64(reader.read_double()?),
        ScalarType::Bool => Value::Bool(reader.read_bool()?),
        ScalarType::String => {
            let bytes = reader.read_length_delimited()?;
            let text = String::from_utf8(bytes.to_vec())
                .map_err(|_| CodecError::InvalidUtf8(field.name().to_string()))?;
            Value::String(text)
        }
        ScalarType::Bytes => Value::Bytes(reader.read_length_delimited()?),
    };
    Ok(value)
}
