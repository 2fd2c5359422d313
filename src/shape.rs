//! Declarative Shape Engine
//!
//! A shape describes what a JSON tree must look like. Evaluation never stops
//! at the first problem: every violation is collected with its path.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{}", index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl Violation {
    pub fn new(path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self { path, message: message.into() }
    }

    /// Dot-joined path, e.g. `template.schemas.0.name.width`.
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Extra predicate run after the inner shape has matched.
pub type Refinement = fn(&Value) -> Result<(), String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LenBound {
    Any,
    Min(usize),
    Exact(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownKeys {
    /// Unlisted keys are accepted and ignored.
    Allow,
    /// Unlisted keys are a violation.
    Reject,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub optional: bool,
}

#[derive(Debug, Clone)]
pub struct ObjectShape {
    fields: Vec<Field>,
    unknown: UnknownKeys,
}

impl ObjectShape {
    pub fn new() -> Self {
        Self { fields: vec![], unknown: UnknownKeys::Allow }
    }

    pub fn required(self, name: &'static str, shape: Shape) -> Self {
        self.field(name, shape, false)
    }

    pub fn optional(self, name: &'static str, shape: Shape) -> Self {
        self.field(name, shape, true)
    }

    /// Adds a field, replacing any earlier field with the same name.
    pub fn field(mut self, name: &'static str, shape: Shape, optional: bool) -> Self {
        self.fields.retain(|f| f.name != name);
        self.fields.push(Field { name, shape, optional });
        self
    }

    pub fn strict(mut self) -> Self {
        self.unknown = UnknownKeys::Reject;
        self
    }

    pub fn into_shape(self) -> Shape {
        Shape::Object(self)
    }

    fn collect(&self, value: &Value, path: &mut Vec<PathSegment>, out: &mut Vec<Violation>) {
        let Value::Object(map) = value else {
            out.push(type_mismatch(path, "object", value));
            return;
        };

        for field in &self.fields {
            path.push(PathSegment::Key(field.name.to_string()));
            match map.get(field.name) {
                Some(v) => field.shape.collect(v, path, out),
                None if field.optional => {}
                None => out.push(Violation::new(path.clone(), "Required")),
            }
            path.pop();
        }

        if self.unknown == UnknownKeys::Reject {
            let unknown: Vec<String> = map
                .keys()
                .filter(|k| !self.fields.iter().any(|f| f.name == k.as_str()))
                .map(|k| format!("'{}'", k))
                .collect();
            if !unknown.is_empty() {
                out.push(Violation::new(
                    path.clone(),
                    format!("Unrecognized key(s) in object: {}", unknown.join(", ")),
                ));
            }
        }
    }
}

impl Default for ObjectShape {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub enum Shape {
    /// Anything, including null.
    Any,
    /// Anything except null.
    Present,
    String,
    Number,
    Boolean,
    /// Array of integers in 0..=255.
    Bytes,
    /// RFC 3339 timestamp string.
    DateTime,
    Enum(&'static [&'static str]),
    Array { item: Box<Shape>, len: LenBound },
    /// Object with arbitrary keys whose values all match.
    Record(Box<Shape>),
    Object(ObjectShape),
    Union(Vec<Shape>),
    Refined { inner: Box<Shape>, check: Refinement },
}

impl Shape {
    pub fn array(item: Shape) -> Self {
        Self::Array { item: Box::new(item), len: LenBound::Any }
    }

    pub fn array_min(item: Shape, min: usize) -> Self {
        Self::Array { item: Box::new(item), len: LenBound::Min(min) }
    }

    pub fn array_exact(item: Shape, len: usize) -> Self {
        Self::Array { item: Box::new(item), len: LenBound::Exact(len) }
    }

    pub fn record(value: Shape) -> Self {
        Self::Record(Box::new(value))
    }

    pub fn refine(self, check: Refinement) -> Self {
        Self::Refined { inner: Box::new(self), check }
    }

    /// Checks `value`, returning every violation found.
    pub fn validate(&self, value: &Value) -> Result<(), Vec<Violation>> {
        let mut out = vec![];
        self.collect(value, &mut vec![], &mut out);
        if out.is_empty() {
            Ok(())
        } else {
            Err(out)
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        self.validate(value).is_ok()
    }

    fn collect(&self, value: &Value, path: &mut Vec<PathSegment>, out: &mut Vec<Violation>) {
        match self {
            Self::Any => {}
            Self::Present => {
                if value.is_null() {
                    out.push(Violation::new(path.clone(), "Required"));
                }
            }
            Self::String => {
                if !value.is_string() {
                    out.push(type_mismatch(path, "string", value));
                }
            }
            Self::Number => {
                if !value.is_number() {
                    out.push(type_mismatch(path, "number", value));
                }
            }
            Self::Boolean => {
                if !value.is_boolean() {
                    out.push(type_mismatch(path, "boolean", value));
                }
            }
            Self::Bytes => match value {
                Value::Array(items) => {
                    let all_bytes = items
                        .iter()
                        .all(|v| v.as_u64().map_or(false, |n| n <= u8::MAX as u64));
                    if !all_bytes {
                        out.push(Violation::new(path.clone(), "Expected byte values (0-255)"));
                    }
                }
                _ => out.push(type_mismatch(path, "byte array", value)),
            },
            Self::DateTime => match value {
                Value::String(s) if chrono::DateTime::parse_from_rfc3339(s).is_ok() => {}
                Value::String(_) => out.push(Violation::new(path.clone(), "Invalid date")),
                _ => out.push(type_mismatch(path, "date", value)),
            },
            Self::Enum(options) => match value.as_str() {
                Some(s) if options.contains(&s) => {}
                _ => {
                    let expected: Vec<String> =
                        options.iter().map(|o| format!("'{}'", o)).collect();
                    out.push(Violation::new(
                        path.clone(),
                        format!(
                            "Invalid enum value. Expected {}, received {}",
                            expected.join(" | "),
                            describe(value)
                        ),
                    ));
                }
            },
            Self::Array { item, len } => {
                let Value::Array(items) = value else {
                    out.push(type_mismatch(path, "array", value));
                    return;
                };
                match *len {
                    LenBound::Min(min) if items.len() < min => out.push(Violation::new(
                        path.clone(),
                        format!("Array must contain at least {} element(s)", min),
                    )),
                    LenBound::Exact(n) if items.len() != n => out.push(Violation::new(
                        path.clone(),
                        format!("Array must contain exactly {} element(s)", n),
                    )),
                    _ => {}
                }
                for (index, v) in items.iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    item.collect(v, path, out);
                    path.pop();
                }
            }
            Self::Record(inner) => {
                let Value::Object(map) = value else {
                    out.push(type_mismatch(path, "object", value));
                    return;
                };
                for (key, v) in map {
                    path.push(PathSegment::Key(key.clone()));
                    inner.collect(v, path, out);
                    path.pop();
                }
            }
            Self::Object(object) => object.collect(value, path, out),
            Self::Union(options) => {
                if !options.iter().any(|o| o.matches(value)) {
                    out.push(Violation::new(path.clone(), "Invalid input"));
                }
            }
            Self::Refined { inner, check } => {
                let before = out.len();
                inner.collect(value, path, out);
                if out.len() == before {
                    if let Err(message) = check(value) {
                        out.push(Violation::new(path.clone(), message));
                    }
                }
            }
        }
    }
}

fn type_mismatch(path: &[PathSegment], expected: &str, value: &Value) -> Violation {
    Violation::new(
        path.to_vec(),
        format!("Expected {}, received {}", expected, kind_of(value)),
    )
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        other => kind_of(other).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point() -> Shape {
        ObjectShape::new()
            .required("x", Shape::Number)
            .required("y", Shape::Number)
            .into_shape()
    }

    #[test]
    fn test_collects_every_violation() {
        let shape = ObjectShape::new()
            .required("name", Shape::String)
            .required("at", point())
            .into_shape();

        let errors = shape.validate(&json!({"at": {"x": "1"}})).unwrap_err();
        let paths: Vec<_> = errors.iter().map(Violation::path_string).collect();
        assert_eq!(paths, vec!["name", "at.x", "at.y"]);
        assert_eq!(errors[1].message, "Expected number, received string");
        assert_eq!(errors[2].message, "Required");
    }

    #[test]
    fn test_strict_object_rejects_unknown_keys() {
        let shape = ObjectShape::new().optional("a", Shape::Any).strict().into_shape();
        let errors = shape.validate(&json!({"a": 1, "b": 2, "c": 3})).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Unrecognized key(s) in object: 'b', 'c'");
    }

    #[test]
    fn test_array_bounds_and_item_paths() {
        let shape = Shape::array_min(Shape::String, 1);
        let errors = shape.validate(&json!([])).unwrap_err();
        assert_eq!(errors[0].message, "Array must contain at least 1 element(s)");

        let errors = shape.validate(&json!(["ok", 3])).unwrap_err();
        assert_eq!(errors[0].path_string(), "1");

        let exact = Shape::array_exact(Shape::Any, 1);
        assert!(exact.validate(&json!([1, 2])).is_err());
        assert!(exact.validate(&json!([1])).is_ok());
    }

    #[test]
    fn test_enum_message_lists_options() {
        let shape = Shape::Enum(&["en", "ja"]);
        let errors = shape.validate(&json!("xx")).unwrap_err();
        assert_eq!(
            errors[0].message,
            "Invalid enum value. Expected 'en' | 'ja', received 'xx'"
        );
    }

    #[test]
    fn test_union_and_bytes() {
        let shape = Shape::Union(vec![Shape::String, Shape::Bytes]);
        assert!(shape.matches(&json!("abc")));
        assert!(shape.matches(&json!([0, 255])));
        assert!(!shape.matches(&json!([256])));
        assert_eq!(shape.validate(&json!(true)).unwrap_err()[0].message, "Invalid input");
    }

    #[test]
    fn test_refinement_runs_after_inner_shape() {
        fn non_empty(v: &Value) -> Result<(), String> {
            match v.as_str() {
                Some("") => Err("Must not be empty".into()),
                _ => Ok(()),
            }
        }
        let shape = Shape::String.refine(non_empty);
        assert_eq!(shape.validate(&json!("")).unwrap_err()[0].message, "Must not be empty");
        // Only the type mismatch is reported, not the refinement.
        assert_eq!(shape.validate(&json!(1)).unwrap_err().len(), 1);
    }

    #[test]
    fn test_date_time_and_present() {
        assert!(Shape::DateTime.matches(&json!("2024-01-02T03:04:05Z")));
        assert!(!Shape::DateTime.matches(&json!("yesterday")));
        assert!(!Shape::Present.matches(&Value::Null));
        assert!(Shape::Any.matches(&Value::Null));
    }
}
