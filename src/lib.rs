//! PDF Template Guard - Consistency Validation Core
//!
//! # Guarantees
//! 1. Structure Is Checked First
//! 2. Every Cause Is Reported
//! 3. Exactly One Fallback Font
//! 4. Every Referenced Font Exists
//! 5. Every Non-Builtin Type Has A Plugin
//! 6. Inputs Are Never Mutated

pub mod base_pdf;
pub mod check;
pub mod codec;
pub mod config;
pub mod error;
pub mod font;
pub mod payload;
pub mod plugin;
pub mod shape;
pub mod template;
pub mod units;

pub use base_pdf::{needs_fetch, resolve_base_pdf, BasePdfResolver, Fetcher, HttpFetcher};
pub use check::{
    check, check_consistency, check_designer_props, check_generate_props, check_inputs,
    check_payload, check_preview_props, check_template, check_ui_options, check_ui_props,
};
pub use codec::{base64_to_bytes, blob_to_base64_pdf, Blob, BlobSource, FileBlob};
pub use config::{EngineConfig, FetchConfig};
pub use error::{AssetError, CheckError, ConfigError, Violations};
pub use font::{
    check_font, get_default_font, get_fallback_font_name, Font, FontResource, DEFAULT_FONT_NAME,
};
pub use payload::{Payload, PayloadKind};
pub use plugin::{check_plugins, Plugin, Plugins, BUILTIN_SCHEMA_TYPES};
pub use shape::{Shape, Violation};
pub use template::{BasePdf, Schema, SchemaPage, Template};
pub use units::{mm2pt, mm2pt_lenient, pt2mm, pt2px};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
