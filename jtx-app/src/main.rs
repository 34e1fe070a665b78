//! JTX (JT/T 808 extra field decoder) Application
//!
//! 命令行入口：把十六进制的位置附加信息解码成记录并打印诊断信息。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jtx_codec::jt808::LocationExtra;
use jtx_codec::{schema_for, ExtraFieldDecoder};
use jtx_core::utils::{bytes_to_hex, hex_to_bytes};
use jtx_core::{ConfigError, DecoderConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a hex encoded location extra payload
    Decode {
        /// Payload bytes as hex, whitespace allowed
        #[arg(long)]
        hex: String,

        /// Path to a JSON decoder configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the location extra schema as JSON
    Schema,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("invalid hex payload: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("failed to load config: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "jtx failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), AppError> {
    match command {
        Command::Decode { hex, config, json } => decode(&hex, config, json),
        Command::Schema => {
            let descriptors = schema_for::<LocationExtra>().descriptors();
            println!("{}", serde_json::to_string_pretty(&descriptors)?);
            Ok(())
        }
    }
}

fn decode(hex: &str, config: Option<PathBuf>, json: bool) -> Result<(), AppError> {
    let config = match config {
        Some(path) => DecoderConfig::load(path)?,
        None => DecoderConfig::default(),
    };
    let data = hex_to_bytes(hex)?;
    tracing::debug!(payload = %bytes_to_hex(&data), ?config, "decoding payload");

    let decoder = ExtraFieldDecoder::with_config(config);
    let decoded = decoder.decode_slice::<LocationExtra>(&data);

    if json {
        println!("{}", serde_json::to_string_pretty(&decoded.record)?);
    } else {
        println!("{:#?}", decoded.record);
    }
    println!("consumed {} of {} bytes", decoded.consumed, data.len());
    for issue in &decoded.issues {
        if issue.is_fatal_for_record() {
            println!("issue (record cut short): {issue}");
        } else {
            println!("issue: {issue}");
        }
    }
    Ok(())
}
