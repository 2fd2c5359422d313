//! PDF Template Guard CLI - bridge interface for the designer and renderer
//!
//! Commands: check, resolve, encode, convert, default-font
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on validation failure, 1 on usage or I/O errors

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use pdftemplate_core::{
    base_pdf::{needs_fetch, BasePdfResolver},
    check,
    codec::{blob_to_base64_pdf, FileBlob},
    config::EngineConfig,
    error::AssetError,
    font::{get_default_font, get_fallback_font_name},
    payload::PayloadKind,
    template::BasePdf,
    units::{mm2pt_lenient, parse_float, pt2mm, pt2px},
};

#[derive(Parser)]
#[command(name = "pdftemplate-cli")]
#[command(about = "PDF Template Guard CLI - template consistency validation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON engine config
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a payload
    Check {
        /// Payload kind (inputs, ui-options, template, ui-props, preview-props,
        /// designer-props, generate-props)
        #[arg(short, long)]
        kind: PayloadKind,

        /// JSON payload, or @path to read it from a file
        #[arg(short, long)]
        payload: String,
    },

    /// Resolve a base document to a PDF data-URI
    Resolve {
        /// URL or data-URI
        #[arg(short, long)]
        base_pdf: String,
    },

    /// Encode a PDF file as a data-URI
    Encode {
        #[arg(short, long)]
        file: PathBuf,

        /// Media type to declare instead of guessing from the extension
        #[arg(short, long)]
        media_type: Option<String>,
    },

    /// Convert between physical units
    Convert {
        #[arg(value_enum)]
        conversion: Conversion,

        value: String,
    },

    /// Describe the embedded default font
    DefaultFont,
}

#[derive(Clone, Copy, ValueEnum)]
enum Conversion {
    Mm2pt,
    Pt2mm,
    Pt2px,
}

fn read_payload(arg: &str) -> Result<Value, String> {
    let text = match arg.strip_prefix('@') {
        Some(path) => {
            fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?
        }
        None => arg.to_string(),
    };
    serde_json::from_str(&text).map_err(|e| format!("Invalid payload: {}", e))
}

/// Offline, a URL passes through unchanged and `fetched` is false.
async fn resolve_report(resolver: &BasePdfResolver, input: BasePdf) -> Result<Value, AssetError> {
    let resolved = resolver.resolve(&input).await?;
    Ok(json!({
        "success": true,
        "fetched": resolver.is_online() && needs_fetch(&input),
        "basePdf": resolved,
    }))
}

fn print_json(value: &Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap());
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match EngineConfig::resolve(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            print_json(&json!({"success": false, "error": e.to_string()}));
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Check { kind, payload } => {
            let data = match read_payload(&payload) {
                Ok(d) => d,
                Err(e) => {
                    print_json(&json!({"valid": false, "error": e}));
                    return ExitCode::FAILURE;
                }
            };

            match check(kind, &data) {
                Ok(()) => {
                    print_json(&json!({"valid": true, "kind": kind.name()}));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    print_json(&json!({
                        "valid": false,
                        "kind": kind.name(),
                        "error": e.to_string(),
                    }));
                    ExitCode::from(2)  // Validation failure
                }
            }
        }

        Commands::Resolve { base_pdf } => {
            let resolver = match BasePdfResolver::from_config(&config.fetch) {
                Ok(r) => r,
                Err(e) => {
                    print_json(&json!({"success": false, "error": e.to_string()}));
                    return ExitCode::FAILURE;
                }
            };

            match resolve_report(&resolver, BasePdf::from(base_pdf)).await {
                Ok(report) => {
                    print_json(&report);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    print_json(&json!({"success": false, "error": e.to_string()}));
                    ExitCode::from(2)
                }
            }
        }

        Commands::Encode { file, media_type } => {
            let blob = match media_type {
                Some(m) => FileBlob::new(file, &m),
                None => FileBlob::guess(file),
            };

            match blob_to_base64_pdf(&blob).await {
                Ok(uri) => {
                    print_json(&json!({"success": true, "dataUri": uri}));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    print_json(&json!({"success": false, "error": e.to_string()}));
                    ExitCode::from(2)
                }
            }
        }

        Commands::Convert { conversion, value } => {
            let result = match conversion {
                Conversion::Mm2pt => mm2pt_lenient(&value),
                Conversion::Pt2mm => pt2mm(parse_float(&value)),
                Conversion::Pt2px => pt2px(parse_float(&value)),
            };
            if result.is_nan() {
                print_json(&json!({"success": false, "error": format!("not a number: {}", value)}));
                return ExitCode::FAILURE;
            }
            print_json(&json!({"success": true, "value": result}));
            ExitCode::SUCCESS
        }

        Commands::DefaultFont => {
            let font = get_default_font();
            let name = match get_fallback_font_name(&font) {
                Ok(n) => n,
                Err(e) => {
                    print_json(&json!({"success": false, "error": e.to_string()}));
                    return ExitCode::FAILURE;
                }
            };
            print_json(&json!({
                "name": name,
                "bytes": font[name].data.len(),
                "fallback": font[name].fallback,
            }));
            ExitCode::SUCCESS
        }
    }
}
