//! Content loader - discovers documents, templates and assets

use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::{ContentDocument, FrontMatter};
use crate::error::{Result, SiteError};
use crate::templates::TemplateFile;
use crate::Site;

/// Everything found in the source and template trees
#[derive(Debug, Default)]
pub struct Discovery {
    /// Loaded documents, sorted by source path
    pub documents: Vec<ContentDocument>,
    /// Template files, sorted by name
    pub templates: Vec<TemplateFile>,
    /// Non-Markdown files relative to the source root, copied verbatim
    pub assets: Vec<String>,
    /// Files that were skipped, with the reason
    pub warnings: Vec<String>,
}

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    ignore: Vec<Pattern>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        let ignore = site
            .config
            .ignore
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    tracing::warn!("Ignoring invalid ignore pattern {:?}: {}", p, e);
                    None
                }
            })
            .collect();
        Self { site, ignore }
    }

    /// Discover documents, templates and assets
    pub fn discover(&self) -> Result<Discovery> {
        if !self.site.source_dir.is_dir() {
            return Err(SiteError::Discovery {
                path: self.site.source_dir.clone(),
            });
        }

        let mut discovery = Discovery::default();
        self.load_content(&mut discovery);
        self.load_templates(&mut discovery);

        tracing::debug!(
            "Discovered {} documents, {} templates, {} assets",
            discovery.documents.len(),
            discovery.templates.len(),
            discovery.assets.len()
        );

        Ok(discovery)
    }

    fn load_content(&self, discovery: &mut Discovery) {
        let root = &self.site.source_dir;

        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.is_content_entry(e))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    discovery.warnings.push(e.to_string());
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = relative_path(root, path);
            if self.ignore.iter().any(|p| p.matches(&relative)) {
                tracing::debug!("Ignored: {}", relative);
                continue;
            }

            if !is_markdown_file(path) {
                discovery.assets.push(relative);
                continue;
            }

            match load_document(path, relative) {
                Ok(doc) => discovery.documents.push(doc),
                Err(message) => {
                    tracing::warn!("Skipping {:?}: {}", path, message);
                    discovery.warnings.push(format!("{}: {}", path.display(), message));
                }
            }
        }

        discovery.documents.sort_by(|a, b| a.source.cmp(&b.source));
        discovery.assets.sort();
    }

    fn load_templates(&self, discovery: &mut Discovery) {
        let root = &self.site.template_dir;
        if !root.is_dir() {
            tracing::warn!("Template directory {:?} does not exist", root);
            return;
        }

        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable template entry: {}", e);
                    discovery.warnings.push(e.to_string());
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !is_template_file(path) {
                continue;
            }

            let relative = relative_path(root, path);
            let name = template_name(&relative);

            if discovery.templates.iter().any(|t| t.name == name) {
                tracing::warn!("Duplicate template name '{}', ignoring {:?}", name, path);
                continue;
            }

            match fs::read_to_string(path) {
                Ok(source) => discovery.templates.push(TemplateFile {
                    name,
                    path: path.to_path_buf(),
                    source,
                }),
                Err(e) => {
                    tracing::warn!("Skipping template {:?}: {}", path, e);
                    discovery.warnings.push(format!("{}: {}", path.display(), e));
                }
            }
        }

        discovery.templates.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Skip hidden entries, plus site files that nest inside the source root
    fn is_content_entry(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        if is_hidden(entry) {
            return false;
        }
        let path = entry.path();
        path != self.site.public_dir
            && path != self.site.template_dir
            && path != self.site.config_path()
    }
}

fn load_document(path: &Path, relative: String) -> std::result::Result<ContentDocument, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let (fm, body) = FrontMatter::parse(&content)
        .map_err(|e| format!("invalid front matter: {}", e))?;
    Ok(ContentDocument::new(relative, fm, body.to_string()))
}

/// `/`-separated path of `path` below `root`
fn relative_path(root: &Path, path: &Path) -> String {
    let relative: PathBuf = path.strip_prefix(root).unwrap_or(path).to_path_buf();
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Template name: relative path without extension
fn template_name(relative: &str) -> String {
    match relative.rfind('.') {
        Some(pos) if !relative[pos..].contains('/') => relative[..pos].to_string(),
        _ => relative.to_string(),
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

fn is_template_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e, "html" | "htm" | "xml" | "tera"))
        .unwrap_or(false)
}
