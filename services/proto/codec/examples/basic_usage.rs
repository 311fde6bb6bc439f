//! Basic usage example for the proto codec.

use proto_codec::{
    CodecConfig, Decoder, DynamicMessage, EnumDescriptor, MessageDescriptor, ScalarType, Value,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Proto Codec Example ===\n");

    // 1. Register message types
    println!("1. Registering message types...");
    let phone_type = EnumDescriptor::new("PhoneType", [("MOBILE", 0), ("HOME", 1), ("WORK", 2)])?;
    let phone_number = MessageDescriptor::builder("PhoneNumber")
        .required("number", ScalarType::String, 1)?
        .required("kind", &phone_type, 2)?
        .build();
    let person = MessageDescriptor::builder("Person")
        .required("name", ScalarType::String, 1)?
        .required("id", ScalarType::Int32, 2)?
        .repeated("phone", &phone_number, 4)?
        .repeated_packed("lucky_numbers", ScalarType::Uint32, 5)?
        .build();

    for field in person.fields() {
        println!(
            "   {} {} {} = {}{}",
            field.rule(),
            field.field_type(),
            field.name(),
            field.number(),
            if field.is_packed() { " [packed]" } else { "" }
        );
    }

    // 2. Build and encode an instance
    println!("\n2. Encoding a Person...");
    let mobile = DynamicMessage::new(phone_number.clone())
        .with("number", "555-0100")?
        .with("kind", Value::Enum(0))?;
    let mut ada = DynamicMessage::new(person.clone())
        .with("name", "Ada")?
        .with("id", 1815)?
        .with("phone", mobile)?;
    for n in [3u32, 7, 42] {
        ada.push("lucky_numbers", n)?;
    }

    let bytes = ada.encode()?;
    println!("   Encoded size: {} bytes", bytes.len());
    println!("   Bytes: {:02X?}", bytes.as_ref());

    // 3. Decode it back
    println!("\n3. Decoding...");
    let decoded = DynamicMessage::decode(&person, &bytes)?;
    println!("   {:?}", decoded);
    println!("   Round trip matches: {}", decoded == ada);

    // 4. Required field enforcement
    println!("\n4. Encoding with a required field missing...");
    let incomplete = DynamicMessage::new(person.clone()).with("name", "Nobody")?;
    match incomplete.encode() {
        Ok(_) => println!("   unexpectedly succeeded"),
        Err(err) => println!("   Rejected: {}", err),
    }

    // 5. Bounded decoding
    println!("\n5. Decoding with a depth limit of zero...");
    let strict = Decoder::new(CodecConfig {
        max_depth: 0,
        ..CodecConfig::default()
    });
    match strict.decode(&person, &bytes) {
        Ok(_) => println!("   unexpectedly succeeded"),
        Err(err) => println!("   Rejected: {}", err),
    }

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
