//! The templating collaborator that turns content descriptors into nodes.
//!
//! The grid never builds view nodes itself. For every cell it produces a
//! [`ContentDescriptor`] and a [`BindingContext`], and asks a
//! [`TemplateHost`] to render them. Hosts backed by a real binding engine
//! produce live nodes; [`TextTemplateHost`] produces plain strings.

use crate::model::{ProvidedContext, Record, RowKey};
use lattice_grid_core::logging::targets;

/// What a cell should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentDescriptor {
    /// Text already resolved by the grid.
    Text(String),
    /// A raw template with embedded bindings for the host to evaluate.
    Template(String),
}

impl ContentDescriptor {
    /// Returns the text, for resolved descriptors.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentDescriptor::Text(s) => Some(s),
            ContentDescriptor::Template(_) => None,
        }
    }
}

/// Values a template may bind to.
#[derive(Debug, Clone, Copy)]
pub struct BindingContext<'a> {
    /// The row's record.
    pub record: &'a Record,
    /// The grid's provided context.
    pub context: &'a ProvidedContext,
    /// The row's identity, if it has one.
    pub row_key: Option<&'a RowKey>,
}

/// Renders content descriptors into view nodes.
pub trait TemplateHost {
    /// The node type produced for a cell.
    type Node: Clone;

    /// Renders a descriptor against a binding context.
    fn render(&self, descriptor: &ContentDescriptor, ctx: &BindingContext<'_>) -> Self::Node;
}

/// A [`TemplateHost`] producing strings.
///
/// Templates may reference `{{record.<field>}}` and `{{context.<path>}}`
/// (or `{{providedContext.<path>}}`), where `<path>` walks nested objects
/// with dots. Undefined references render empty.
///
/// # Example
///
/// ```
/// use lattice_grid::host::{BindingContext, ContentDescriptor, TemplateHost, TextTemplateHost};
/// use lattice_grid::model::{ProvidedContext, Record};
///
/// let record = Record::new().with("name", "Ann");
/// let mut context = ProvidedContext::new();
/// context.insert("unit".into(), "yrs".into());
///
/// let ctx = BindingContext { record: &record, context: &context, row_key: None };
/// let template = ContentDescriptor::Template("{{ record.name }} ({{context.unit}})".into());
/// assert_eq!(TextTemplateHost.render(&template, &ctx), "Ann (yrs)");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextTemplateHost;

impl TextTemplateHost {
    /// Interpolates every binding in `template`.
    pub fn interpolate(template: &str, ctx: &BindingContext<'_>) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    out.push_str(&Self::evaluate(after[..end].trim(), ctx));
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn evaluate(expression: &str, ctx: &BindingContext<'_>) -> String {
        let (root, path) = expression.split_once('.').unwrap_or((expression, ""));
        match root {
            "record" if !path.is_empty() => ctx
                .record
                .get(path)
                .map(|v| v.to_display_string())
                .unwrap_or_default(),
            "context" | "providedContext" if !path.is_empty() => {
                lookup_context(ctx.context, path).unwrap_or_default()
            }
            "$key" => ctx.row_key.map(|k| k.to_string()).unwrap_or_default(),
            _ => {
                tracing::trace!(target: targets::RENDER, expression, "unresolved binding");
                String::new()
            }
        }
    }
}

impl TemplateHost for TextTemplateHost {
    type Node = String;

    fn render(&self, descriptor: &ContentDescriptor, ctx: &BindingContext<'_>) -> String {
        match descriptor {
            ContentDescriptor::Text(text) => text.clone(),
            ContentDescriptor::Template(template) => Self::interpolate(template, ctx),
        }
    }
}

fn lookup_context(context: &ProvidedContext, path: &str) -> Option<String> {
    let mut segments = path.split('.');
    let mut value = context.get(segments.next()?)?;
    for segment in segments {
        value = value.get(segment)?;
    }
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ProvidedContext {
        let value = serde_json::json!({"user": {"name": "Root", "level": 3}, "flag": null});
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_interpolates_record_and_context() {
        let record = Record::new().with("name", "Bo").with("age", 25);
        let context = context();
        let ctx = BindingContext {
            record: &record,
            context: &context,
            row_key: None,
        };
        assert_eq!(
            TextTemplateHost::interpolate("{{record.name}} is {{record.age}}", &ctx),
            "Bo is 25"
        );
        assert_eq!(
            TextTemplateHost::interpolate("by {{providedContext.user.name}} L{{context.user.level}}", &ctx),
            "by Root L3"
        );
    }

    #[test]
    fn test_undefined_references_render_empty() {
        let record = Record::new();
        let context = context();
        let ctx = BindingContext {
            record: &record,
            context: &context,
            row_key: None,
        };
        assert_eq!(
            TextTemplateHost::interpolate("[{{record.nope}}][{{context.flag}}][{{context.x.y}}][{{other}}]", &ctx),
            "[][][][]"
        );
    }

    #[test]
    fn test_unterminated_binding_is_literal() {
        let record = Record::new();
        let context = ProvidedContext::new();
        let ctx = BindingContext {
            record: &record,
            context: &context,
            row_key: None,
        };
        assert_eq!(TextTemplateHost::interpolate("a {{record.x", &ctx), "a {{record.x");
    }

    #[test]
    fn test_row_key_binding() {
        let record = Record::new();
        let context = ProvidedContext::new();
        let key = RowKey::Int(9);
        let ctx = BindingContext {
            record: &record,
            context: &context,
            row_key: Some(&key),
        };
        let node = TextTemplateHost.render(&ContentDescriptor::Template("#{{$key}}".into()), &ctx);
        assert_eq!(node, "#9");
        assert_eq!(
            TextTemplateHost.render(&ContentDescriptor::Text("plain".into()), &ctx),
            "plain"
        );
    }
}
