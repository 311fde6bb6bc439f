//! End-to-end encode/decode behaviour against fixed byte layouts.

use bytes::Bytes;
use once_cell::sync::Lazy;
use proto_codec::{
    CodecError, DynamicMessage, EnumDescriptor, MessageDescriptor, ScalarType, Value, WireError,
};
use std::sync::Arc;

static PHONE_TYPE: Lazy<Arc<EnumDescriptor>> = Lazy::new(|| {
    EnumDescriptor::new("PhoneType", [("MOBILE", 0), ("HOME", 1), ("WORK", 2)]).unwrap()
});

static PHONE_NUMBER: Lazy<Arc<MessageDescriptor>> = Lazy::new(|| {
    MessageDescriptor::builder("PhoneNumber")
        .required("number", ScalarType::String, 1)
        .unwrap()
        .required("kind", &*PHONE_TYPE, 2)
        .unwrap()
        .build()
});

static PERSON: Lazy<Arc<MessageDescriptor>> = Lazy::new(|| {
    MessageDescriptor::builder("Person")
        .required("name", ScalarType::String, 1)
        .unwrap()
        .required("id", ScalarType::Int32, 2)
        .unwrap()
        .repeated("email", ScalarType::String, 3)
        .unwrap()
        .repeated("phone", &*PHONE_NUMBER, 4)
        .unwrap()
        .repeated_packed("scores", ScalarType::Sint64, 5)
        .unwrap()
        .required("balance", ScalarType::Double, 6)
        .unwrap()
        .required("active", ScalarType::Bool, 7)
        .unwrap()
        .required("avatar", ScalarType::Bytes, 8)
        .unwrap()
        .repeated("ratios", ScalarType::Float, 9)
        .unwrap()
        .required("serial", ScalarType::Fixed64, 10)
        .unwrap()
        .build()
});

static POINT: Lazy<Arc<MessageDescriptor>> = Lazy::new(|| {
    MessageDescriptor::builder("Point")
        .required("x", ScalarType::Int32, 1)
        .unwrap()
        .required("y", ScalarType::Int32, 2)
        .unwrap()
        .build()
});

static NUMERICS: Lazy<Arc<MessageDescriptor>> = Lazy::new(|| {
    MessageDescriptor::builder("Numerics")
        .required("small", ScalarType::Sint32, 1)
        .unwrap()
        .required("wide", ScalarType::Int64, 2)
        .unwrap()
        .required("count", ScalarType::Uint64, 3)
        .unwrap()
        .required("flags", ScalarType::Fixed32, 4)
        .unwrap()
        .required("offset", ScalarType::Sfixed32, 5)
        .unwrap()
        .required("stamp", ScalarType::Sfixed64, 6)
        .unwrap()
        .repeated_packed("kinds", &*PHONE_TYPE, 7)
        .unwrap()
        .build()
});

fn numerics(
    small: i32,
    wide: i64,
    count: u64,
    flags: u32,
    offset: i32,
    stamp: i64,
) -> DynamicMessage {
    DynamicMessage::new(Arc::clone(&NUMERICS))
        .with("small", small)
        .unwrap()
        .with("wide", wide)
        .unwrap()
        .with("count", count)
        .unwrap()
        .with("flags", flags)
        .unwrap()
        .with("offset", offset)
        .unwrap()
        .with("stamp", stamp)
        .unwrap()
}

fn phone(number: &str, kind: i32) -> DynamicMessage {
    DynamicMessage::new(Arc::clone(&PHONE_NUMBER))
        .with("number", number)
        .unwrap()
        .with("kind", Value::Enum(kind))
        .unwrap()
}

fn person() -> DynamicMessage {
    DynamicMessage::new(Arc::clone(&PERSON))
        .with("name", "Ada Lovelace")
        .unwrap()
        .with("id", -42)
        .unwrap()
        .with("email", "ada@example.com")
        .unwrap()
        .with("email", "ada@engine.example")
        .unwrap()
        .with("phone", phone("555-0100", 1))
        .unwrap()
        .with("phone", phone("555-0199", 2))
        .unwrap()
        .with("scores", -1i64)
        .unwrap()
        .with("scores", 150i64)
        .unwrap()
        .with("scores", i64::MIN)
        .unwrap()
        .with("balance", 1815.5f64)
        .unwrap()
        .with("active", true)
        .unwrap()
        .with("avatar", Bytes::from_static(&[0, 1, 2, 255]))
        .unwrap()
        .with("ratios", 0.25f32)
        .unwrap()
        .with("serial", u64::MAX)
        .unwrap()
}

#[test]
fn test_point_bytes() {
    let point = DynamicMessage::new(Arc::clone(&POINT))
        .with("x", 1)
        .unwrap()
        .with("y", 2)
        .unwrap();

    let bytes = point.encode().unwrap();
    assert_eq!(bytes.as_ref(), &[0x08, 0x01, 0x10, 0x02]);
    assert_eq!(DynamicMessage::decode(&POINT, &bytes).unwrap(), point);
}

#[test]
fn test_round_trip_all_field_kinds() {
    let original = person();
    let bytes = original.encode().unwrap();
    let decoded = DynamicMessage::decode(&PERSON, &bytes).unwrap();

    assert_eq!(decoded, original);
    assert_eq!(decoded.get_repeated("phone").unwrap().len(), 2);
    assert_eq!(
        decoded.get_repeated("scores").unwrap(),
        &[Value::I64(-1), Value::I64(150), Value::I64(i64::MIN)]
    );
}

#[test]
fn test_encoding_is_deterministic() {
    assert_eq!(person().encode().unwrap(), person().encode().unwrap());
}

#[test]
fn test_reencode_is_identical() {
    let bytes = person().encode().unwrap();
    let decoded = DynamicMessage::decode(&PERSON, &bytes).unwrap();
    assert_eq!(decoded.encode().unwrap(), bytes);
}

#[test]
fn test_required_field_enforcement() {
    let mut message = person();
    message.clear("balance").unwrap();
    assert_eq!(
        message.encode(),
        Err(CodecError::RequiredFieldMissing("balance".to_string()))
    );

    message.set("balance", 0.0f64).unwrap();
    assert!(message.encode().is_ok());
}

#[test]
fn test_packed_and_unpacked_decode_alike() {
    let packed = MessageDescriptor::builder("Numbers")
        .repeated_packed("numbers", ScalarType::Int32, 3)
        .unwrap()
        .build();
    let unpacked = MessageDescriptor::builder("Numbers")
        .repeated("numbers", ScalarType::Int32, 3)
        .unwrap()
        .build();

    let mut message = DynamicMessage::new(packed.clone());
    for n in [1, 2, 3] {
        message.push("numbers", n).unwrap();
    }
    let packed_bytes = message.encode().unwrap();
    assert_eq!(packed_bytes.as_ref(), &[0x1A, 0x03, 0x01, 0x02, 0x03]);

    let unpacked_bytes: &[u8] = &[0x18, 0x01, 0x18, 0x02, 0x18, 0x03];
    let expected = vec![Value::I32(1), Value::I32(2), Value::I32(3)];

    // Either descriptor reads either layout.
    for descriptor in [&packed, &unpacked] {
        for bytes in [&packed_bytes[..], unpacked_bytes] {
            let decoded = DynamicMessage::decode(descriptor, bytes).unwrap();
            assert_eq!(decoded.get_repeated("numbers").unwrap(), expected.as_slice());
        }
    }
}

#[test]
fn test_packed_blocks_concatenate() {
    let descriptor = MessageDescriptor::builder("Numbers")
        .repeated_packed("numbers", ScalarType::Int32, 3)
        .unwrap()
        .build();
    let bytes = [0x1A, 0x02, 0x01, 0x02, 0x18, 0x03, 0x1A, 0x01, 0x04];

    let decoded = DynamicMessage::decode(&descriptor, &bytes).unwrap();
    assert_eq!(
        decoded.get_repeated("numbers").unwrap(),
        &[Value::I32(1), Value::I32(2), Value::I32(3), Value::I32(4)]
    );
}

#[test]
fn test_unknown_fields_skipped() {
    let mut bytes = vec![0x08, 0x01];
    bytes.extend_from_slice(&[0x18, 0xAC, 0x02]); // 3: varint 300
    bytes.extend_from_slice(&[0x21, 1, 2, 3, 4, 5, 6, 7, 8]); // 4: fixed64
    bytes.extend_from_slice(&[0x2A, 0x03, b'a', b'b', b'c']); // 5: bytes
    bytes.extend_from_slice(&[0x35, 1, 2, 3, 4]); // 6: fixed32
    bytes.extend_from_slice(&[0x10, 0x02]);

    let decoded = DynamicMessage::decode(&POINT, &bytes).unwrap();
    assert_eq!(decoded.get("x").unwrap(), Some(&Value::I32(1)));
    assert_eq!(decoded.get("y").unwrap(), Some(&Value::I32(2)));
}

#[test]
fn test_truncation_detected_at_every_length() {
    let bytes = person().encode().unwrap();

    for len in 0..bytes.len() {
        let result = DynamicMessage::decode(&PERSON, &bytes[..len]);
        // Cutting exactly between two fields still leaves a well-formed prefix.
        if let Err(err) = result {
            assert!(
                err.is_truncated(),
                "prefix of {} bytes gave {:?}",
                len,
                err
            );
        }
    }

    let short = &bytes[..bytes.len() - 1];
    assert_eq!(
        DynamicMessage::decode(&PERSON, short),
        Err(CodecError::Wire(WireError::Truncated))
    );
}

#[test]
fn test_truncated_point() {
    let err = DynamicMessage::decode(&POINT, &[0x08, 0x01, 0x10]).unwrap_err();
    assert_eq!(err, CodecError::Wire(WireError::Truncated));
}

#[test]
fn test_malformed_varint() {
    let mut bytes = vec![0x08];
    bytes.extend_from_slice(&[0xFF; 11]);
    let err = DynamicMessage::decode(&POINT, &bytes).unwrap_err();
    assert_eq!(err, CodecError::Wire(WireError::MalformedVarint));
}

#[test]
fn test_invalid_enum_rejected_in_nested_message() {
    let mut message = person();
    message
        .set_repeated("phone", vec![Value::Message(phone("555-0123", 9))])
        .unwrap();

    assert_eq!(
        message.encode(),
        Err(CodecError::InvalidEnumValue {
            field: "kind".to_string(),
            value: 9
        })
    );
}

#[test]
fn test_negative_int32_round_trip() {
    let point = DynamicMessage::new(Arc::clone(&POINT))
        .with("x", -1)
        .unwrap()
        .with("y", i32::MIN)
        .unwrap();

    let bytes = point.encode().unwrap();
    // tag + ten-byte varint per field
    assert_eq!(bytes.len(), 22);
    assert_eq!(DynamicMessage::decode(&POINT, &bytes).unwrap(), point);
}

#[test]
fn test_numeric_kinds_bytes() {
    let message = numerics(-2, 300, 1, 1, -1, -2)
        .with("kinds", Value::Enum(1))
        .unwrap()
        .with("kinds", Value::Enum(2))
        .unwrap();

    let mut expected = vec![0x08, 0x03]; // sint32 -2
    expected.extend_from_slice(&[0x10, 0xAC, 0x02]); // int64 300
    expected.extend_from_slice(&[0x18, 0x01]); // uint64 1
    expected.extend_from_slice(&[0x25, 0x01, 0x00, 0x00, 0x00]); // fixed32 1
    expected.extend_from_slice(&[0x2D, 0xFF, 0xFF, 0xFF, 0xFF]); // sfixed32 -1
    // sfixed64 -2
    expected.extend_from_slice(&[0x31, 0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    expected.extend_from_slice(&[0x3A, 0x02, 0x01, 0x02]); // packed enums

    let bytes = message.encode().unwrap();
    assert_eq!(bytes.as_ref(), expected.as_slice());
    assert_eq!(DynamicMessage::decode(&NUMERICS, &bytes).unwrap(), message);
}

#[test]
fn test_numeric_kinds_extremes_round_trip() {
    for message in [
        numerics(i32::MIN, i64::MIN, u64::MAX, u32::MAX, i32::MIN, i64::MIN),
        numerics(i32::MAX, i64::MAX, 0, 0, i32::MAX, i64::MAX),
    ] {
        let message = message.with("kinds", Value::Enum(0)).unwrap();
        let bytes = message.encode().unwrap();
        let decoded = DynamicMessage::decode(&NUMERICS, &bytes).unwrap();

        assert_eq!(decoded, message);
        assert_eq!(decoded.encode().unwrap(), bytes);
    }
}

#[test]
fn test_invalid_enum_rejected_in_packed_field() {
    let message = numerics(0, 0, 0, 0, 0, 0)
        .with("kinds", Value::Enum(1))
        .unwrap()
        .with("kinds", Value::Enum(5))
        .unwrap();

    assert_eq!(
        message.encode(),
        Err(CodecError::InvalidEnumValue {
            field: "kinds".to_string(),
            value: 5
        })
    );
}
