//! Argument templating for `run-local-collection --template`.
//!
//! Each argument is an independent template. `{field}` is replaced by the
//! value of one of the six known fields, `{{` and `}}` produce literal braces.
//! Anything else inside braces is an error.

use crate::collection::CollectionDetails;
use crate::error::{Error, Result};

/// Names of the fields available to templates.
const FIELDS: [&str; 6] = [
    "cwd",
    "root_path",
    "collection_path",
    "namespace",
    "name",
    "collection_name",
];

/// Values substituted into templated arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    /// The directory the tool was started in.
    pub cwd: String,
    /// Root of the synthetic tree, the directory containing `ansible_collections`.
    pub root_path: String,
    /// The collection inside the synthetic tree.
    pub collection_path: String,
    pub namespace: String,
    pub name: String,
    /// `<namespace>.<name>`
    pub collection_name: String,
}

impl TemplateContext {
    pub fn new(
        cwd: impl Into<String>,
        root_path: impl Into<String>,
        collection_path: impl Into<String>,
        details: &CollectionDetails,
    ) -> Self {
        Self {
            cwd: cwd.into(),
            root_path: root_path.into(),
            collection_path: collection_path.into(),
            namespace: details.namespace.clone(),
            name: details.name.clone(),
            collection_name: details.collection_name(),
        }
    }

    fn lookup(&self, field: &str) -> Option<&str> {
        let value = match field {
            "cwd" => &self.cwd,
            "root_path" => &self.root_path,
            "collection_path" => &self.collection_path,
            "namespace" => &self.namespace,
            "name" => &self.name,
            "collection_name" => &self.collection_name,
            _ => return None,
        };
        Some(value)
    }
}

/// Template every argument of `argv`.
pub fn template_argv(argv: &[String], context: &TemplateContext) -> Result<Vec<String>> {
    argv.iter()
        .enumerate()
        .map(|(i, arg)| {
            render(arg, context).map_err(|reason| Error::Template {
                index: i + 1,
                argument: arg.clone(),
                reason,
            })
        })
        .collect()
}

/// Render a single template string.
pub fn render(template: &str, context: &TemplateContext) -> std::result::Result<String, String> {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' => {
                if chars.next_if(|&(_, c)| c == '{').is_some() {
                    output.push('{');
                    continue;
                }
                let mut field = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    field.push(c);
                }
                if !closed {
                    return Err(format!("unmatched '{{' at position {pos}"));
                }
                output.push_str(substitute(&field, context)?);
            }
            '}' => {
                if chars.next_if(|&(_, c)| c == '}').is_none() {
                    return Err(format!("single '}}' encountered at position {pos}"));
                }
                output.push('}');
            }
            _ => output.push(ch),
        }
    }

    Ok(output)
}

fn substitute<'a>(field: &str, context: &'a TemplateContext) -> std::result::Result<&'a str, String> {
    if field.is_empty() {
        return Err("empty placeholder".to_string());
    }
    if field.contains([':', '!', '{']) {
        return Err(format!(
            "unsupported format specification in placeholder '{field}'"
        ));
    }
    context
        .lookup(field)
        .ok_or_else(|| {
            format!(
                "unknown placeholder '{field}' (available: {})",
                FIELDS.join(", ")
            )
        })
}
