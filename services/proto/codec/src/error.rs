//! Codec, registration and field access errors.

use proto_wire::{WireError, WireType};
use thiserror::Error;

/// Errors raised while building descriptors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    /// Two fields of one message claim the same number
    #[error("message {message}: field number {number} registered twice")]
    DuplicateFieldNumber {
        /// Message type name
        message: String,
        /// Conflicting field number
        number: u32,
    },

    /// Two fields of one message share a name
    #[error("message {message}: field name `{name}` registered twice")]
    DuplicateFieldName {
        /// Message type name
        message: String,
        /// Conflicting field name
        name: String,
    },

    /// Field number outside 1..=MAX_FIELD_NUMBER
    #[error("field `{field}`: invalid field number {number}")]
    InvalidFieldNumber {
        /// Field name
        field: String,
        /// Rejected number
        number: u32,
    },

    /// `packed` requested on a field that cannot be packed
    #[error("field `{0}`: packed requires a repeated numeric field")]
    InvalidPacked(String),

    /// Two enum values share a name
    #[error("enum {enum_name}: value name `{name}` declared twice")]
    DuplicateEnumValue {
        /// Enum type name
        enum_name: String,
        /// Conflicting value name
        name: String,
    },
}

/// Errors raised by named-field accessors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No field with this name or number
    #[error("unknown field `{0}`")]
    UnknownField(String),

    /// Value kind does not match the declared field type
    #[error("field `{field}` expects {expected}, got {found}")]
    TypeMismatch {
        /// Field name
        field: String,
        /// Declared field type
        expected: String,
        /// Kind of the rejected value
        found: &'static str,
    },

    /// Sequence operation on a required field
    #[error("field `{0}` is not repeated")]
    NotRepeated(String),

    /// Single-value operation on a repeated field
    #[error("field `{0}` is repeated")]
    NotSingular(String),
}

/// Encode/decode errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Required field absent at encode time
    #[error("field {0} is required but not set")]
    RequiredFieldMissing(String),

    /// Enum field holds a value its type does not declare
    #[error("invalid value given for `{field}`: {value}")]
    InvalidEnumValue {
        /// Field name
        field: String,
        /// Rejected value
        value: i32,
    },

    /// Known field arrived with an incompatible wire type
    #[error("field `{field}` expects {expected}, found {found}")]
    WireTypeMismatch {
        /// Field name
        field: String,
        /// Wire type of the declared field type
        expected: WireType,
        /// Wire type read from the buffer
        found: WireType,
    },

    /// String field is not valid UTF-8
    #[error("field `{0}` is not valid utf-8")]
    InvalidUtf8(String),

    /// Nested messages deeper than the configured limit
    #[error("nesting depth exceeds {0}")]
    DepthExceeded(usize),

    /// Input larger than the configured limit
    #[error("size limit exceeded: {0}")]
    Size(usize),

    /// Wire protocol error
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// Field access error
    #[error("access error: {0}")]
    Access(#[from] AccessError),
}

impl CodecError {
    /// Whether the input ended in the middle of a tag or value
    pub fn is_truncated(&self) -> bool {
        matches!(self, CodecError::Wire(WireError::Truncated))
    }
}
