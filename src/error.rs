//! Error Taxonomy
//!
//! Multi-cause failures carry every cause; nothing here is fail-fast.

use std::fmt;

use thiserror::Error;

use crate::shape::Violation;

const RULE: &str = "--------------------------";

/// Consistency and structural failures raised by the check façade.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Invalid argument:\n--------------------------\n{0}")]
    SchemaValidation(Violations),

    #[error("fallback flag is not found in font. true fallback flag must be only one.")]
    NoFallbackFont,

    #[error("{0} fallback flags found in font. true fallback flag must be only one.")]
    MultipleFallbackFonts(usize),

    #[error("{} of template.schemas is not found in font.", .0.join(", "))]
    MissingFontReference(Vec<String>),

    #[error("{} of template.schemas is not found in plugins.", .0.join(", "))]
    MissingPluginForType(Vec<String>),

    #[error("Payload could not be decoded: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Failures of the binary asset codec and base document resolver.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Invalid base64 data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("template.basePdf must be pdf data, got {media_type}")]
    NotAPdf { media_type: String },

    #[error("Failed to fetch {url}: {source}")]
    NetworkFetch {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to read blob: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl AssetError {
    pub fn network(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::NetworkFetch {
            url: url.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Every violation found by one structural check, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let blocks: Vec<String> = self
            .0
            .iter()
            .map(|v| {
                format!(
                    "ERROR POSITION: {}\nERROR MESSAGE: {}\n{RULE}",
                    v.path_string(),
                    v.message
                )
            })
            .collect();
        f.write_str(&blocks.join("\n"))
    }
}
