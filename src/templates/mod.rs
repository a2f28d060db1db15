//! User templates loaded into the Tera engine
//!
//! Templates are registered under their file path relative to the template
//! directory (so `{% extends "base.html" %}` works) and looked up by name,
//! which is that path without its extension.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;
use std::path::PathBuf;
use tera::{Context, Tera};

use crate::helpers::parse_date;

/// A template file found by the loader
#[derive(Debug, Clone)]
pub struct TemplateFile {
    /// Lookup name (`blog/entry` for `blog/entry.html`)
    pub name: String,
    /// Full path on disk
    pub path: PathBuf,
    /// Template source text
    pub source: String,
}

impl TemplateFile {
    /// Path relative to the template directory, used as the Tera name
    pub fn file_name(&self) -> String {
        match self.path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", self.name, ext),
            None => self.name.clone(),
        }
    }
}

/// Template renderer over the discovered templates
pub struct TemplateRenderer {
    tera: Tera,
    /// Lookup name -> registered Tera name
    names: BTreeMap<String, String>,
}

impl TemplateRenderer {
    /// Compile all templates; a syntax error in any of them is fatal
    pub fn new(templates: &[TemplateFile]) -> tera::Result<Self> {
        let mut tera = Tera::default();

        // Page bodies are already HTML
        tera.autoescape_on(vec![]);

        let names: BTreeMap<String, String> = templates
            .iter()
            .map(|t| (t.name.clone(), t.file_name()))
            .collect();

        tera.add_raw_templates(
            templates
                .iter()
                .map(|t| (t.file_name(), t.source.as_str())),
        )?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera, names })
    }

    /// Whether a template with this lookup name exists
    pub fn has(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Render a template by lookup name
    ///
    /// Returns `None` if no such template exists.
    pub fn render(&self, name: &str, context: &Context) -> Option<tera::Result<String>> {
        let registered = self.names.get(name)?;
        Some(self.tera.render(registered, context))
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    Ok(tera::Value::String(result))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "…".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!("{}{}", truncated.trim_end(), omission)))
    }
}

/// Tera filter: reformat a front-matter date with a chrono format string
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "%Y-%m-%d".to_string(),
    };

    // Unparsable dates pass through untouched
    let Some(date) = parse_date(&s) else {
        return Ok(tera::Value::String(s));
    };

    // Bad specifiers and offsets on zone-free dates surface as fmt::Error
    let mut formatted = String::new();
    write!(formatted, "{}", date.format(&format)).map_err(|_| {
        tera::Error::msg(format!("date_format: cannot format '{}' with '{}'", s, format))
    })?;
    Ok(tera::Value::String(formatted))
}

/// Data structures for template context

/// The page being rendered
#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub title: String,
    pub author: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub draft: bool,
    pub template: String,
    pub extra: indexmap::IndexMap<String, serde_yaml::Value>,
    pub content: String,
    pub path: String,
    pub url: String,
}

/// One entry of the site listing
#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    pub title: String,
    pub date: Option<String>,
    pub url: String,
    pub path: String,
    pub draft: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteData<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub base_url: &'a str,
    pub pages: Vec<PageSummary>,
    pub extra: &'a BTreeMap<String, serde_yaml::Value>,
}
