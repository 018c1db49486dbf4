//! Rendering of server-supplied error templates such as `"Invalid %1"` or
//! `"No such entity with %fieldName = %fieldValue"`.

use serde_json::Value;

/// Values substituted into an error template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageParameters {
    /// Positional values, placeholder `%1` is the first element
    List(Vec<String>),
    /// Named values in the order the JSON map yields them, placeholder `%name`
    Named(Vec<(String, String)>),
}

impl MessageParameters {
    /// Read the `parameters` field of an error body.
    ///
    /// Arrays become [`MessageParameters::List`], objects become
    /// [`MessageParameters::Named`]; anything else yields `None`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Self::List(items.iter().map(render).collect())),
            Value::Object(map) => Some(Self::Named(
                map.iter().map(|(k, v)| (k.clone(), render(v))).collect(),
            )),
            _ => None,
        }
    }

    fn placeholders(&self) -> Vec<(String, &str)> {
        match self {
            Self::List(values) => values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("%{}", i + 1), v.as_str()))
                .collect(),
            Self::Named(pairs) => pairs
                .iter()
                .map(|(k, v)| (format!("%{k}"), v.as_str()))
                .collect(),
        }
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Substitute `parameters` into `template`.
///
/// Every occurrence of a placeholder is replaced in a single left-to-right
/// pass. Where several placeholders match at the same position the longest
/// one wins. Substituted text is not scanned again, and placeholders without
/// a value stay as they are. The order of named parameters has no effect on
/// the result.
#[must_use]
pub fn interpolate(template: &str, parameters: Option<&MessageParameters>) -> String {
    let Some(parameters) = parameters else {
        return template.to_owned();
    };
    let placeholders = parameters.placeholders();
    if placeholders.is_empty() {
        return template.to_owned();
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let hit = placeholders
            .iter()
            .filter(|(token, _)| tail.starts_with(token.as_str()))
            .max_by_key(|(token, _)| token.len());
        match hit {
            Some((token, value)) => {
                out.push_str(value);
                rest = &tail[token.len()..];
            }
            None => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
