//! Protocol Buffers payload tool.
//!
//! Lists the raw fields of a payload, decodes it against a YAML schema, or
//! checks that it validates and re-encodes to the same bytes.

use anyhow::{anyhow, bail, Context};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use proto_codec::{Decoder, DynamicMessage, Encoder, MessageDescriptor};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod dump;
mod logging;
mod schema;

use config::ProtoConfig;
use logging::RedbLogFormatter;
use schema::Schema;

/// Inspect, decode and check Protocol Buffers payloads
#[derive(Parser, Debug)]
#[command(
    name = "redb-proto",
    version,
    about = "Inspect, decode and check Protocol Buffers payloads"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Configuration file path
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List top-level fields without a schema
    Inspect {
        /// Payload file, or `-` for stdin
        input: PathBuf,
    },

    /// Decode a payload and print the message tree
    Decode {
        #[command(flatten)]
        target: Target,
    },

    /// Decode, validate and re-encode a payload
    Check {
        #[command(flatten)]
        target: Target,
    },
}

#[derive(clap::Args, Debug)]
struct Target {
    /// Schema file (defaults to the configured schema)
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Message type to decode as
    #[arg(long)]
    message: String,

    /// Payload file, or `-` for stdin
    input: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::new("info")
        .add_directive(format!("redb_proto={}", args.log_level).parse()?)
        .add_directive(format!("proto_codec={}", args.log_level).parse()?)
        .add_directive(format!("proto_wire={}", args.log_level).parse()?);

    let formatter = RedbLogFormatter::new("proto");

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .event_format(formatter)
        .init();

    info!("Starting reDB Proto v{}", env!("CARGO_PKG_VERSION"));

    let config = ProtoConfig::load_from_file(&args.config)?;

    match args.command {
        Command::Inspect { input } => inspect(&input),
        Command::Decode { target } => decode(&config, &target),
        Command::Check { target } => check(&config, &target),
    }
}

fn inspect(input: &Path) -> anyhow::Result<()> {
    let payload = read_input(input)?;
    let fields = dump::parse_fields(payload).context("malformed payload")?;

    println!("{:>5}  {:<16}  value", "field", "wire type");
    for field in &fields {
        println!("{}", field);
    }
    component_info!("inspect", "{} top-level fields", fields.len());
    Ok(())
}

fn decode(config: &ProtoConfig, target: &Target) -> anyhow::Result<()> {
    let message = decode_target(config, target)?;
    println!("{:#?}", message);
    Ok(())
}

fn check(config: &ProtoConfig, target: &Target) -> anyhow::Result<()> {
    let payload = read_input(&target.input)?;
    let descriptor = resolve_message(config, target)?;
    let message = Decoder::new(config.codec)
        .decode_bytes(&descriptor, payload.clone())
        .with_context(|| format!("decoding {}", descriptor.name()))?;

    message
        .validate()
        .with_context(|| format!("{} is incomplete", descriptor.name()))?;

    let reencoded = Encoder::new(config.codec).encode(&message)?;
    if reencoded == payload {
        println!("ok: {} ({} bytes, canonical)", descriptor.name(), payload.len());
    } else {
        println!(
            "ok: {} ({} bytes, re-encodes to {} different bytes)",
            descriptor.name(),
            payload.len(),
            reencoded.len()
        );
        component_warn!("check", "Payload is valid but not in canonical form");
    }
    Ok(())
}

fn decode_target(config: &ProtoConfig, target: &Target) -> anyhow::Result<DynamicMessage> {
    let payload = read_input(&target.input)?;
    let descriptor = resolve_message(config, target)?;
    Decoder::new(config.codec)
        .decode_bytes(&descriptor, payload)
        .with_context(|| format!("decoding {}", descriptor.name()))
}

fn resolve_message(
    config: &ProtoConfig,
    target: &Target,
) -> anyhow::Result<Arc<MessageDescriptor>> {
    let path = target
        .schema
        .as_ref()
        .or(config.schema.as_ref())
        .ok_or_else(|| anyhow!("no schema given; pass --schema or set PROTO_SCHEMA"))?;

    let schema = Schema::load(path).with_context(|| format!("loading schema {:?}", path))?;
    match schema.message(&target.message) {
        Some(descriptor) => Ok(Arc::clone(descriptor)),
        None => bail!(
            "message {} not found in {:?} (available: {})",
            target.message,
            path,
            schema.message_names().join(", ")
        ),
    }
}

fn read_input(input: &Path) -> anyhow::Result<Bytes> {
    let payload = if input == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("reading stdin")?;
        buf
    } else {
        std::fs::read(input).with_context(|| format!("reading {:?}", input))?
    };

    component_debug!("input", "Read {} bytes from {:?}", payload.len(), input);
    Ok(Bytes::from(payload))
}
