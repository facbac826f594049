//! Document components: compiled templates and the `kit` UI library.

use std::{collections::BTreeMap, sync::Arc};

use unidoc_core::{
    ComponentRef, DocumentComponent, DocumentProps, ExportRecord, ExportValue,
    component::{RenderError, Result},
};

use crate::template::{Template, TemplateContext};

/// Escape text for use in HTML attribute values and text nodes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `<script>` tags for every script URL.
pub fn script_tags(props: &DocumentProps) -> String {
    props
        .scripts
        .iter()
        .map(|src| format!(r#"<script src="{}"></script>"#, escape_html(src)))
        .collect()
}

/// `<link rel="stylesheet">` tags for every style URL.
pub fn style_tags(props: &DocumentProps) -> String {
    props
        .styles
        .iter()
        .map(|href| format!(r#"<link rel="stylesheet" href="{}" />"#, escape_html(href)))
        .collect()
}

/// Renders the page's script tags.
#[derive(Debug, Default)]
pub struct Scripts;

impl DocumentComponent for Scripts {
    fn name(&self) -> &str {
        "Scripts"
    }

    fn render(&self, props: &DocumentProps) -> Result<String> {
        Ok(script_tags(props))
    }
}

/// Renders the page's stylesheet links.
#[derive(Debug, Default)]
pub struct Styles;

impl DocumentComponent for Styles {
    fn name(&self) -> &str {
        "Styles"
    }

    fn render(&self, props: &DocumentProps) -> Result<String> {
        Ok(style_tags(props))
    }
}

/// Exports of the `kit` runtime library.
#[must_use]
pub fn kit_module() -> ExportRecord {
    let mut record = ExportRecord::new();
    record.insert("scripts", ExportValue::Component(Arc::new(Scripts)));
    record.insert("styles", ExportValue::Component(Arc::new(Styles)));
    record
}

/// A template compiled into a component.
///
/// Template variables: `styles` and `scripts` (ready-made tags), `page_path`
/// (escaped), plus the raw JSON arrays `styles_json` and `scripts_json`.
/// Partials render with the same props as the template.
#[derive(Debug)]
pub struct TemplateComponent {
    template: Template,
    partials: BTreeMap<String, ComponentRef>,
}

impl TemplateComponent {
    /// Create a component from a template and its bound partials.
    pub fn new(template: Template, partials: BTreeMap<String, ComponentRef>) -> Self {
        Self { template, partials }
    }
}

impl DocumentComponent for TemplateComponent {
    fn name(&self) -> &str {
        self.template.name()
    }

    fn render(&self, props: &DocumentProps) -> Result<String> {
        let mut context = TemplateContext::new()
            .with_var("styles", style_tags(props))
            .with_var("scripts", script_tags(props))
            .with_var("page_path", escape_html(&props.page_path))
            .with_var("styles_json", json_array(&props.styles)?)
            .with_var("scripts_json", json_array(&props.scripts)?);

        for (request, component) in &self.partials {
            context.insert_partial(request.clone(), component.render(props)?);
        }

        self.template
            .render(&context)
            .map_err(|e| RenderError::component(self.template.name(), e.to_string()))
    }
}

fn json_array(values: &[String]) -> Result<String> {
    serde_json::to_string(values).map_err(|e| RenderError::component("json", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> DocumentProps {
        DocumentProps {
            styles: vec!["/web/index.css".to_string()],
            scripts: vec!["/web/vendor.js".to_string(), "/web/index.js".to_string()],
            page_path: "/detail?id=1&x=\"2\"".to_string(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_kit_components() {
        let props = props();
        assert_eq!(
            Scripts.render(&props).unwrap(),
            r#"<script src="/web/vendor.js"></script><script src="/web/index.js"></script>"#
        );
        assert_eq!(
            Styles.render(&props).unwrap(),
            r#"<link rel="stylesheet" href="/web/index.css" />"#
        );

        let kit = kit_module();
        assert_eq!(kit.keys().collect::<Vec<_>>(), vec!["scripts", "styles"]);
    }

    #[test]
    fn test_template_component_variables() {
        let template = Template::new(
            "document",
            r#"<body data-path="{{ page_path }}">{{ scripts }}<!-- {{ scripts_json }} --></body>"#,
        )
        .unwrap();
        let component = TemplateComponent::new(template, BTreeMap::new());

        let html = component.render(&props()).unwrap();
        assert!(html.contains(r#"data-path="/detail?id=1&amp;x=&quot;2&quot;""#));
        assert!(html.contains(r#"<script src="/web/index.js"></script>"#));
        assert!(html.contains(r#"["/web/vendor.js","/web/index.js"]"#));
    }

    #[test]
    fn test_template_component_partials_receive_props() {
        let template = Template::new("document", "<head>{{> kit/styles }}</head>").unwrap();
        let mut partials: BTreeMap<String, ComponentRef> = BTreeMap::new();
        partials.insert("kit/styles".to_string(), Arc::new(Styles));
        let component = TemplateComponent::new(template, partials);

        let html = component.render(&props()).unwrap();
        assert_eq!(
            html,
            r#"<head><link rel="stylesheet" href="/web/index.css" /></head>"#
        );
    }

    #[test]
    fn test_template_component_missing_variable_fails() {
        let template = Template::new("document", "{{ title }}").unwrap();
        let component = TemplateComponent::new(template, BTreeMap::new());

        let err = component.render(&props()).unwrap_err();
        assert!(err.to_string().contains("document"));
        assert!(err.to_string().contains("title"));
    }
}
