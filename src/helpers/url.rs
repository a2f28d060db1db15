//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Characters escaped in URL paths; `/` and existing `%` escapes are kept
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// The link prefix for pages written at `page_path`
///
/// Always ends with `/`. For a rooted base-url the prefix is the same on
/// every page; for a relative one it climbs out of the page's directory.
///
/// # Examples
/// ```ignore
/// root_for(&config /* base-url: / */, "blog/a.html")  // -> "/"
/// root_for(&config /* base-url: . */, "blog/a.html")  // -> "../"
/// ```
pub fn root_for(config: &SiteConfig, page_path: &str) -> String {
    if !config.is_relative_base() {
        return format!("{}/", config.base_url.trim_end_matches('/'));
    }

    let depth = page_path.matches('/').count();
    let mut root = "../".repeat(depth);

    let base = config.base_url.trim_start_matches("./");
    let base = if base == "." { "" } else { base.trim_end_matches('/') };
    if !base.is_empty() {
        root.push_str(base);
        root.push('/');
    }

    if root.is_empty() {
        "./".to_string()
    } else {
        root
    }
}

/// Link from the page at `page_path` to the site path `target`
///
/// # Examples
/// ```ignore
/// url_for(&config /* base-url: /blog/ */, "index.html", "css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, page_path: &str, target: &str) -> String {
    let target = target.trim_start_matches('/');
    format!("{}{}", root_for(config, page_path), encode_path(target))
}

/// Percent-encode a URL path
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> SiteConfig {
        SiteConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rooted_base() {
        let config = config("/");
        assert_eq!(root_for(&config, "blog/a.html"), "/");
        assert_eq!(url_for(&config, "blog/a.html", "index.html"), "/index.html");
        assert_eq!(url_for(&config, "index.html", "/css/style.css"), "/css/style.css");
    }

    #[test]
    fn test_absolute_base() {
        let config = config("https://example.com/blog");
        assert_eq!(
            url_for(&config, "a/b/c.html", "about.html"),
            "https://example.com/blog/about.html"
        );
    }

    #[test]
    fn test_relative_base() {
        let config = config(".");
        assert_eq!(root_for(&config, "index.html"), "./");
        assert_eq!(url_for(&config, "blog/a.html", "index.html"), "../index.html");
        assert_eq!(
            url_for(&config, "blog/2024/a.html", "blog/b.html"),
            "../../blog/b.html"
        );

        let nested = self::config("./site/");
        assert_eq!(root_for(&nested, "index.html"), "site/");
        assert_eq!(url_for(&nested, "x/y.html", "z.html"), "../site/z.html");
    }

    #[test]
    fn test_encode_path() {
        assert_eq!(encode_path("my notes/a b.html"), "my%20notes/a%20b.html");
        assert_eq!(encode_path("already%20done.html"), "already%20done.html");
    }
}
