//! Error types shared by the build pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while discovering, rendering and writing a site
#[derive(Debug, Error)]
pub enum SiteError {
    /// The source root is missing; nothing can be built
    #[error("source directory not found: {}", path.display())]
    Discovery { path: PathBuf },

    /// A document names a template that was never discovered
    #[error("template '{template}' not found (required by {document})")]
    TemplateNotFound { template: String, document: String },

    /// The template engine rejected a document
    #[error("failed to render {document}: {message}")]
    Render { document: String, message: String },

    /// Two documents map to the same output file; the first by source path wins
    #[error("{document} would overwrite {output}, already produced by {owner}")]
    OutputConflict {
        document: String,
        output: String,
        owner: String,
    },

    #[error("failed to write {}: {}", path.display(), source)]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("failed to load templates: {0}")]
    Templates(#[from] tera::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = SiteError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let discovery = SiteError::Discovery {
            path: PathBuf::from("content"),
        };
        assert_eq!(discovery.to_string(), "source directory not found: content");

        let err = SiteError::TemplateNotFound {
            template: "post".to_string(),
            document: "blog/a.md".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "template 'post' not found (required by blog/a.md)"
        );
    }
}
