//! Check Façade - structural validation, then consistency rules
//!
//! Structure is always checked first. Font and plugin coverage run only on
//! a structurally valid payload that names the entities involved.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{CheckError, Violations};
use crate::font::{check_font, Font};
use crate::payload::{
    DesignerProps, GenerateProps, Inputs, Payload, PayloadKind, PreviewProps, UiOptions, UiProps,
};
use crate::plugin::{check_plugins, Plugins};
use crate::template::Template;

/// Cross-entity rule evaluated against a template.
pub trait ConsistencyRule {
    fn name(&self) -> &'static str;
    fn check(&self, template: &Template) -> Result<(), CheckError>;
}

pub struct FontCoverageRule<'a> {
    pub font: &'a Font,
}

impl ConsistencyRule for FontCoverageRule<'_> {
    fn name(&self) -> &'static str {
        "font_coverage"
    }

    fn check(&self, template: &Template) -> Result<(), CheckError> {
        check_font(self.font, template)
    }
}

pub struct PluginCoverageRule<'a> {
    pub plugins: &'a Plugins,
}

impl ConsistencyRule for PluginCoverageRule<'_> {
    fn name(&self) -> &'static str {
        "plugin_coverage"
    }

    fn check(&self, template: &Template) -> Result<(), CheckError> {
        check_plugins(self.plugins, template)
    }
}

/// Rules that apply to `payload`, in evaluation order.
pub fn rules_for<P: Payload>(payload: &P) -> Vec<Box<dyn ConsistencyRule + '_>> {
    let mut rules: Vec<Box<dyn ConsistencyRule + '_>> = vec![];
    if let Some(font) = payload.font() {
        rules.push(Box::new(FontCoverageRule { font }));
    }
    if let Some(plugins) = payload.plugins() {
        rules.push(Box::new(PluginCoverageRule { plugins }));
    }
    rules
}

/// Runs the consistency rules for an already typed payload.
pub fn check_consistency<P: Payload>(payload: &P) -> Result<(), CheckError> {
    let Some(template) = payload.template() else {
        return Ok(());
    };
    let kind = P::KIND;
    for rule in rules_for(payload) {
        if let Err(e) = rule.check(template) {
            warn!(rule = rule.name(), kind = %kind, "consistency check failed: {}", e);
            return Err(e);
        }
        debug!(rule = rule.name(), "consistency check passed");
    }
    Ok(())
}

/// Validates untyped `data` as `P`, returning the typed payload.
pub fn check_payload<P: Payload>(data: &Value) -> Result<P, CheckError> {
    let kind = P::KIND;
    debug!(kind = %kind, "checking payload");
    if let Err(violations) = kind.shape().validate(data) {
        warn!(kind = %kind, violations = violations.len(), "payload failed structural validation");
        return Err(CheckError::SchemaValidation(Violations(violations)));
    }

    let payload = P::deserialize(data)?;
    check_consistency(&payload)?;
    Ok(payload)
}

/// Dispatches on a runtime-selected kind.
pub fn check(kind: PayloadKind, data: &Value) -> Result<(), CheckError> {
    match kind {
        PayloadKind::Inputs => check_inputs(data),
        PayloadKind::UiOptions => check_ui_options(data),
        PayloadKind::Template => check_template(data),
        PayloadKind::UiProps => check_ui_props(data),
        PayloadKind::PreviewProps => check_preview_props(data),
        PayloadKind::DesignerProps => check_designer_props(data),
        PayloadKind::GenerateProps => check_generate_props(data),
    }
}

pub fn check_inputs(data: &Value) -> Result<(), CheckError> {
    check_payload::<Inputs>(data).map(drop)
}

pub fn check_ui_options(data: &Value) -> Result<(), CheckError> {
    check_payload::<UiOptions>(data).map(drop)
}

pub fn check_template(data: &Value) -> Result<(), CheckError> {
    check_payload::<Template>(data).map(drop)
}

pub fn check_ui_props(data: &Value) -> Result<(), CheckError> {
    check_payload::<UiProps>(data).map(drop)
}

pub fn check_preview_props(data: &Value) -> Result<(), CheckError> {
    check_payload::<PreviewProps>(data).map(drop)
}

pub fn check_designer_props(data: &Value) -> Result<(), CheckError> {
    check_payload::<DesignerProps>(data).map(drop)
}

pub fn check_generate_props(data: &Value) -> Result<(), CheckError> {
    check_payload::<GenerateProps>(data).map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template() -> Value {
        json!({
            "basePdf": "data:application/pdf;base64,JVBERi0xLjQ=",
            "schemas": [{
                "name": {
                    "type": "text",
                    "position": {"x": 10, "y": 10},
                    "width": 50,
                    "height": 8,
                    "fontName": "Serif"
                },
                "code": {
                    "type": "qrcode",
                    "position": {"x": 10, "y": 30},
                    "width": 20,
                    "height": 20
                }
            }]
        })
    }

    #[test]
    fn test_rules_follow_named_fields() {
        let props: GenerateProps = serde_json::from_value(json!({
            "template": template(),
            "inputs": [{"name": "a"}],
            "plugins": {}
        }))
        .unwrap();
        let names: Vec<_> = rules_for(&props).iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["plugin_coverage"]);
    }

    #[test]
    fn test_template_alone_has_no_consistency_rules() {
        assert!(check_template(&template()).is_ok());
    }

    #[test]
    fn test_non_string_font_name_is_structural() {
        let mut data = template();
        data["schemas"][0]["name"]["fontName"] = json!(12);

        let Err(CheckError::SchemaValidation(violations)) = check_template(&data) else {
            panic!("expected a structural failure");
        };
        let paths: Vec<String> = violations.iter().map(|v| v.path_string()).collect();
        assert_eq!(paths, vec!["schemas.0.name.fontName"]);
    }

    #[test]
    fn test_dispatch_by_kind() {
        assert!(check(PayloadKind::Inputs, &json!([{"a": "b"}])).is_ok());
        assert!(matches!(
            check(PayloadKind::Inputs, &json!([])),
            Err(CheckError::SchemaValidation(_))
        ));
    }
}
