//! Content document model

use serde::Serialize;
use std::path::Path;

use super::FrontMatter;

/// A Markdown source file split into front matter and body
#[derive(Debug, Clone, Serialize)]
pub struct ContentDocument {
    /// Source file path relative to the source root, `/`-separated
    pub source: String,

    /// Parsed front matter
    pub front_matter: FrontMatter,

    /// Raw markdown body (front matter removed)
    pub body: String,
}

impl ContentDocument {
    pub fn new(source: String, front_matter: FrontMatter, body: String) -> Self {
        Self {
            source,
            front_matter,
            body,
        }
    }

    /// Title from front matter, or the file stem
    pub fn title(&self) -> String {
        self.front_matter.title.clone().unwrap_or_else(|| {
            Path::new(&self.source)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Untitled")
                .to_string()
        })
    }

    /// Template this document asks for
    pub fn template_name<'a>(&'a self, default_template: &'a str) -> &'a str {
        self.front_matter
            .template
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(default_template)
    }

    pub fn is_draft(&self) -> bool {
        self.front_matter.draft
    }

    /// Output path relative to the public directory
    pub fn output_path(&self) -> String {
        output_path_for(&self.source)
    }
}

/// Rewrite a source path's extension to `.html`
///
/// `blog/intro.md` -> `blog/intro.html`
pub fn output_path_for(source: &str) -> String {
    let (dir, file) = match source.rfind('/') {
        Some(pos) => (&source[..=pos], &source[pos + 1..]),
        None => ("", source),
    };
    let stem = match file.rfind('.') {
        Some(0) | None => file,
        Some(pos) => &file[..pos],
    };
    format!("{}{}.html", dir, stem)
}
