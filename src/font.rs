//! Font Set - fallback resolution and template coverage

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::CheckError;
use crate::template::Template;

pub const DEFAULT_FONT_NAME: &str = "DejaVuSans";

static DEFAULT_FONT_DATA: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

/// Font resources keyed by font name.
pub type Font = BTreeMap<String, FontResource>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontResource {
    #[serde(with = "crate::codec::bytes_or_base64")]
    pub data: Vec<u8>,
    #[serde(default)]
    pub fallback: bool,
    /// Whether the renderer may embed only the glyphs it uses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subset: Option<bool>,
}

impl FontResource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            fallback: false,
            subset: None,
        }
    }

    pub fn fallback(data: impl Into<Vec<u8>>) -> Self {
        Self {
            fallback: true,
            ..Self::new(data)
        }
    }
}

/// The embedded font set used when the caller supplies none.
pub fn get_default_font() -> Font {
    Font::from([(
        DEFAULT_FONT_NAME.to_string(),
        FontResource::fallback(DEFAULT_FONT_DATA),
    )])
}

/// Name of the single entry flagged as fallback.
pub fn get_fallback_font_name(font: &Font) -> Result<&str, CheckError> {
    let mut fallbacks = fallback_names(font);
    match (fallbacks.next(), fallbacks.count()) {
        (None, _) => Err(CheckError::NoFallbackFont),
        (Some(name), 0) => Ok(name),
        (Some(_), others) => Err(CheckError::MultipleFallbackFonts(others + 1)),
    }
}

/// Checks the fallback invariant, then that every font the template
/// references exists in `font`.
pub fn check_font(font: &Font, template: &Template) -> Result<(), CheckError> {
    match fallback_names(font).count() {
        0 => return Err(CheckError::NoFallbackFont),
        1 => {}
        n => return Err(CheckError::MultipleFallbackFonts(n)),
    }

    let missing: Vec<String> = template
        .font_names()
        .into_iter()
        .filter(|name| !font.contains_key(*name))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(CheckError::MissingFontReference(missing));
    }

    debug!(fonts = font.len(), "font set covers template");
    Ok(())
}

fn fallback_names(font: &Font) -> impl Iterator<Item = &str> {
    font.iter()
        .filter(|(_, resource)| resource.fallback)
        .map(|(name, _)| name.as_str())
}
