//! Payload Shapes and Request Types
//!
//! Each entry point has a structural shape for untyped input and a typed
//! request that names its template, font and plugins explicitly.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::codec::base64_to_bytes;
use crate::font::Font;
use crate::plugin::Plugins;
use crate::shape::{ObjectShape, Shape};
use crate::template::Template;

pub const LANGS: &[&str] = &["en", "ja", "ar", "th", "pl", "it", "de", "es", "fr"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Inputs,
    UiOptions,
    Template,
    UiProps,
    PreviewProps,
    DesignerProps,
    GenerateProps,
}

impl PayloadKind {
    pub const ALL: [PayloadKind; 7] = [
        Self::Inputs,
        Self::UiOptions,
        Self::Template,
        Self::UiProps,
        Self::PreviewProps,
        Self::DesignerProps,
        Self::GenerateProps,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Inputs => "inputs",
            Self::UiOptions => "ui-options",
            Self::Template => "template",
            Self::UiProps => "ui-props",
            Self::PreviewProps => "preview-props",
            Self::DesignerProps => "designer-props",
            Self::GenerateProps => "generate-props",
        }
    }

    /// Structural shape for this payload, built fresh on each call.
    pub fn shape(self) -> Shape {
        match self {
            Self::Inputs => inputs_shape(),
            Self::UiOptions => ui_options_shape().into_shape(),
            Self::Template => template_shape(),
            Self::UiProps => ui_props_shape().into_shape(),
            Self::PreviewProps => ui_props_shape()
                .required("inputs", inputs_shape())
                .strict()
                .into_shape(),
            Self::DesignerProps => ui_props_shape().strict().into_shape(),
            Self::GenerateProps => ObjectShape::new()
                .required("template", template_shape())
                .optional("options", generator_options_shape().into_shape())
                .optional("plugins", Shape::record(plugin_shape()))
                .required("inputs", inputs_shape())
                .strict()
                .into_shape(),
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PayloadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown payload kind: {}", s))
    }
}

// --- Shapes ---

fn schema_shape() -> Shape {
    ObjectShape::new()
        .required("type", Shape::String)
        .required(
            "position",
            ObjectShape::new()
                .required("x", Shape::Number)
                .required("y", Shape::Number)
                .into_shape(),
        )
        .required("width", Shape::Number)
        .required("height", Shape::Number)
        .optional("rotate", Shape::Number)
        .optional("opacity", Shape::Number)
        .optional("fontName", Shape::String)
        .into_shape()
}

fn template_shape() -> Shape {
    ObjectShape::new()
        .required("schemas", Shape::array(Shape::record(schema_shape())))
        .required("basePdf", Shape::Union(vec![Shape::String, Shape::Bytes]))
        .optional("sampledata", Shape::array_exact(Shape::record(Shape::String), 1))
        .optional("columns", Shape::array(Shape::String))
        .into_shape()
}

fn inputs_shape() -> Shape {
    Shape::array_min(Shape::record(Shape::String), 1)
}

fn decodable_base64(value: &Value) -> Result<(), String> {
    match value.as_str() {
        Some(text) => base64_to_bytes(text)
            .map(drop)
            .map_err(|_| "Font data must be valid base64".to_string()),
        None => Ok(()),
    }
}

fn font_shape() -> Shape {
    Shape::record(
        ObjectShape::new()
            .required(
                "data",
                Shape::Union(vec![Shape::String, Shape::Bytes]).refine(decodable_base64),
            )
            .optional("fallback", Shape::Boolean)
            .optional("subset", Shape::Boolean)
            .into_shape(),
    )
}

fn plugin_shape() -> Shape {
    ObjectShape::new()
        .optional("ui", Shape::Any)
        .optional("pdf", Shape::Any)
        .required(
            "propPanel",
            ObjectShape::new()
                .optional("schema", Shape::Any)
                .optional("widgets", Shape::record(Shape::Any))
                .required("defaultValue", Shape::String)
                .required("defaultSchema", schema_shape())
                .into_shape(),
        )
        .into_shape()
}

fn common_options_shape() -> ObjectShape {
    ObjectShape::new().optional("font", font_shape())
}

fn generator_options_shape() -> ObjectShape {
    common_options_shape()
        .optional("author", Shape::String)
        .optional("creationDate", Shape::DateTime)
        .optional("creator", Shape::String)
        .optional("keywords", Shape::array(Shape::String))
        .optional("language", Shape::String)
        .optional("modificationDate", Shape::DateTime)
        .optional("producer", Shape::String)
        .optional("subject", Shape::String)
        .optional("title", Shape::String)
}

fn ui_options_shape() -> ObjectShape {
    common_options_shape()
        .optional("lang", Shape::Enum(LANGS))
        .optional("theme", Shape::record(Shape::Any))
}

fn ui_props_shape() -> ObjectShape {
    ObjectShape::new()
        .required("template", template_shape())
        .optional("options", ui_options_shape().into_shape())
        .optional("plugins", Shape::record(plugin_shape()))
        .required("domContainer", Shape::Present)
}

// --- Typed requests ---

/// A payload the check façade can validate and then inspect by name.
pub trait Payload: DeserializeOwned {
    const KIND: PayloadKind;

    fn template(&self) -> Option<&Template> {
        None
    }

    fn font(&self) -> Option<&Font> {
        None
    }

    fn plugins(&self) -> Option<&Plugins> {
        None
    }
}

pub type InputRecord = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inputs(pub Vec<InputRecord>);

impl Payload for Inputs {
    const KIND: PayloadKind = PayloadKind::Inputs;
}

impl Payload for Template {
    const KIND: PayloadKind = PayloadKind::Template;

    fn template(&self) -> Option<&Template> {
        Some(self)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateProps {
    pub template: Template,
    pub inputs: Vec<InputRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<GeneratorOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Plugins>,
}

impl Payload for GenerateProps {
    const KIND: PayloadKind = PayloadKind::GenerateProps;

    fn template(&self) -> Option<&Template> {
        Some(&self.template)
    }

    fn font(&self) -> Option<&Font> {
        self.options.as_ref()?.font.as_ref()
    }

    fn plugins(&self) -> Option<&Plugins> {
        self.plugins.as_ref()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Payload for UiOptions {
    const KIND: PayloadKind = PayloadKind::UiOptions;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiProps {
    pub template: Template,
    /// Host element the UI mounts into; opaque here.
    pub dom_container: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<UiOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Plugins>,
}

impl UiProps {
    fn font(&self) -> Option<&Font> {
        self.options.as_ref()?.font.as_ref()
    }
}

impl Payload for UiProps {
    const KIND: PayloadKind = PayloadKind::UiProps;

    fn template(&self) -> Option<&Template> {
        Some(&self.template)
    }

    fn font(&self) -> Option<&Font> {
        UiProps::font(self)
    }

    fn plugins(&self) -> Option<&Plugins> {
        self.plugins.as_ref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewProps {
    #[serde(flatten)]
    pub ui: UiProps,
    pub inputs: Vec<InputRecord>,
}

impl Payload for PreviewProps {
    const KIND: PayloadKind = PayloadKind::PreviewProps;

    fn template(&self) -> Option<&Template> {
        Some(&self.ui.template)
    }

    fn font(&self) -> Option<&Font> {
        self.ui.font()
    }

    fn plugins(&self) -> Option<&Plugins> {
        self.ui.plugins.as_ref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesignerProps(pub UiProps);

impl Payload for DesignerProps {
    const KIND: PayloadKind = PayloadKind::DesignerProps;

    fn template(&self) -> Option<&Template> {
        Some(&self.0.template)
    }

    fn font(&self) -> Option<&Font> {
        self.0.font()
    }

    fn plugins(&self) -> Option<&Plugins> {
        self.0.plugins.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in PayloadKind::ALL {
            assert_eq!(kind.name().parse::<PayloadKind>().unwrap(), kind);
        }
        assert!("unknown".parse::<PayloadKind>().is_err());
    }

    #[test]
    fn test_generate_props_is_strict() {
        let errors = PayloadKind::GenerateProps
            .shape()
            .validate(&json!({
                "template": {"schemas": [], "basePdf": "base.pdf"},
                "inputs": [{}],
                "domContainer": {}
            }))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Unrecognized key(s) in object: 'domContainer'");
    }

    #[test]
    fn test_designer_requires_container() {
        let errors = PayloadKind::DesignerProps
            .shape()
            .validate(&json!({"template": {"schemas": [], "basePdf": "base.pdf"}}))
            .unwrap_err();
        assert_eq!(errors[0].path_string(), "domContainer");
        assert_eq!(errors[0].message, "Required");
    }

    #[test]
    fn test_font_data_must_decode() {
        let errors = PayloadKind::UiOptions
            .shape()
            .validate(&json!({"font": {"A": {"data": "%%%", "fallback": true}}}))
            .unwrap_err();
        assert_eq!(errors[0].path_string(), "font.A.data");
        assert_eq!(errors[0].message, "Font data must be valid base64");
    }

    #[test]
    fn test_ui_options_lang_enum() {
        let shape = PayloadKind::UiOptions.shape();
        assert!(shape.validate(&json!({"lang": "ja", "theme": {}})).is_ok());
        assert!(shape.validate(&json!({"lang": "xx"})).is_err());
    }

    #[test]
    fn test_preview_props_deserialize_flattened() {
        let props: PreviewProps = serde_json::from_value(json!({
            "template": {"schemas": [], "basePdf": "base.pdf"},
            "domContainer": "#root",
            "inputs": [{"name": "pdfme"}],
            "options": {"lang": "en"}
        }))
        .unwrap();
        assert_eq!(props.inputs[0]["name"], "pdfme");
        assert_eq!(props.ui.dom_container, json!("#root"));
        assert!(props.font().is_none());
    }
}
