//! Content module - front matter, documents, discovery and Markdown rendering

mod document;
mod frontmatter;
pub mod loader;
mod markdown;

pub use document::{output_path_for, ContentDocument};
pub use frontmatter::FrontMatter;
pub use loader::{ContentLoader, Discovery};
pub use markdown::MarkdownRenderer;
