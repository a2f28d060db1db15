//! Helper functions shared by the renderer and templates

mod date;
mod url;

pub use date::*;
pub use url::*;
