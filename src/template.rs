//! Template Model - base document plus ordered schema pages

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::codec::PDF_DATA_URI_PREFIX;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub base_pdf: BasePdf,
    pub schemas: Vec<SchemaPage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampledata: Option<Vec<BTreeMap<String, String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

/// One page of field descriptors keyed by field name.
pub type SchemaPage = BTreeMap<String, Schema>;

impl Template {
    pub fn new(base_pdf: BasePdf, schemas: Vec<SchemaPage>) -> Self {
        Self {
            base_pdf,
            schemas,
            sampledata: None,
            columns: None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.iter().flat_map(|page| page.values())
    }

    /// Distinct non-empty font names referenced by any field.
    pub fn font_names(&self) -> BTreeSet<&str> {
        self.fields()
            .filter_map(|s| s.font_name.as_deref())
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Distinct type tags across all pages.
    pub fn schema_types(&self) -> BTreeSet<&str> {
        self.fields().map(|s| s.kind.as_str()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Position,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    /// Plugin-specific rendering attributes.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Schema {
    pub fn new(kind: &str, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            kind: kind.to_string(),
            position: Position { x, y },
            width,
            height,
            rotate: None,
            opacity: None,
            font_name: None,
            attributes: Map::new(),
        }
    }

    pub fn with_font_name(mut self, font_name: &str) -> Self {
        self.font_name = Some(font_name.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// The document a template is laid over. Exactly one form is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawBasePdf", into = "RawBasePdf")]
pub enum BasePdf {
    /// Network reference to fetch.
    Url(String),
    /// `data:application/pdf;...` literal.
    DataUri(String),
    Binary(Vec<u8>),
}

impl BasePdf {
    pub fn is_data_uri(&self) -> bool {
        matches!(self, Self::DataUri(_))
    }
}

impl From<String> for BasePdf {
    fn from(value: String) -> Self {
        if value.starts_with(PDF_DATA_URI_PREFIX) {
            Self::DataUri(value)
        } else {
            Self::Url(value)
        }
    }
}

impl From<&str> for BasePdf {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Vec<u8>> for BasePdf {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawBasePdf {
    Text(String),
    Bytes(Vec<u8>),
}

impl From<RawBasePdf> for BasePdf {
    fn from(raw: RawBasePdf) -> Self {
        match raw {
            RawBasePdf::Text(text) => Self::from(text),
            RawBasePdf::Bytes(bytes) => Self::Binary(bytes),
        }
    }
}

impl From<BasePdf> for RawBasePdf {
    fn from(base_pdf: BasePdf) -> Self {
        match base_pdf {
            BasePdf::Url(text) | BasePdf::DataUri(text) => Self::Text(text),
            BasePdf::Binary(bytes) => Self::Bytes(bytes),
        }
    }
}
