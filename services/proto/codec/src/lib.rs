//! Runtime message descriptors and the Protocol Buffers codec for redb.
//!
//! Message types are declared at runtime: a [`MessageDescriptor`] registers
//! typed, numbered fields once, and [`DynamicMessage`] instances of it are
//! encoded to and decoded from the Protocol Buffers binary format.
//!
//! ## Features
//!
//! - **Checked Registration**: duplicate field numbers or names and illegal
//!   `packed` options are rejected when the descriptor is built
//! - **Typed Accessors**: values are checked against the field type on write
//! - **Deterministic Encoding**: fields always leave in ascending number order
//! - **Packed Repeated Fields**: opt-in on encode, always accepted on decode
//! - **Forward Compatible Decoding**: unknown field numbers are skipped
//! - **Bounded Recursion**: nesting depth and input size limits via [`CodecConfig`]
//!
//! ## Example
//!
//! ```rust
//! use proto_codec::{DynamicMessage, MessageDescriptor, ScalarType};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let point = MessageDescriptor::builder("Point")
//!     .required("x", ScalarType::Int32, 1)?
//!     .required("y", ScalarType::Int32, 2)?
//!     .build();
//!
//! let message = DynamicMessage::new(point.clone()).with("x", 1)?.with("y", 2)?;
//! let bytes = message.encode()?;
//! assert_eq!(bytes.as_ref(), &[0x08, 0x01, 0x10, 0x02]);
//!
//! let decoded = DynamicMessage::decode(&point, &bytes)?;
//! assert_eq!(decoded, message);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod decode;
pub mod descriptor;
pub mod encode;
pub mod error;
pub mod message;
pub mod value;

// Re-export main types
pub use config::{CodecConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_MESSAGE_SIZE};
pub use decode::Decoder;
pub use descriptor::{
    EnumDescriptor, FieldDescriptor, FieldOptions, FieldRule, FieldType, MessageDescriptor,
    MessageDescriptorBuilder, ScalarType,
};
pub use encode::Encoder;
pub use error::{AccessError, CodecError, DescriptorError};
pub use message::DynamicMessage;
pub use value::Value;

pub use proto_wire::{WireError, WireType};
