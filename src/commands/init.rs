//! Initialize a new site skeleton

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::CONFIG_FILE;

const CONFIG: &str = r#"# Site
title: My Site
description: ''

# URL
## `/` when served from a web root, `.` for browsing files directly
base-url: /

# Directory
source-dir: content
template-dir: templates
public-dir: public
ignore: []

# Rendering
default-template: default
index-drafts: false
highlight-theme: base16-ocean.dark

# Dev server
serve:
  host: localhost
  port: 3000
"#;

const BASE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{% block title %}{{ site.title }}{% endblock %}</title>
</head>
<body>
  <header><a href="{{ root }}">{{ site.title }}</a></header>
  <main>{% block main %}{% endblock %}</main>
</body>
</html>
"#;

const DEFAULT_TEMPLATE: &str = r#"{% extends "base.html" %}
{% block title %}{{ page.title }} | {{ site.title }}{% endblock %}
{% block main %}
<article>
  <h1>{{ page.title }}</h1>
  {% if page.date %}<time>{{ page.date | date_format(format="%B %d, %Y") }}</time>{% endif %}
  {{ page.content }}
</article>
{% endblock %}
"#;

const INDEX_TEMPLATE: &str = r#"{% extends "base.html" %}
{% block main %}
<ul>
{% for p in site.pages %}
  <li><a href="{{ p.url }}">{{ p.title }}</a>{% if p.date %} <small>{{ p.date }}</small>{% endif %}</li>
{% endfor %}
</ul>
{% endblock %}
"#;

/// Initialize a new site in the given directory
///
/// Existing files are left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("content"))?;
    fs::create_dir_all(target_dir.join("templates"))?;

    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
---

This is your first post. Edit `content/hello-world.md`, then run:

```bash
$ quill render
$ quill serve
```
"#,
        now.format("%Y-%m-%d %H:%M:%S")
    );

    let files: [(&str, &str); 5] = [
        (CONFIG_FILE, CONFIG),
        ("templates/base.html", BASE_TEMPLATE),
        ("templates/default.html", DEFAULT_TEMPLATE),
        ("templates/index.html", INDEX_TEMPLATE),
        ("content/hello-world.md", &sample_post),
    ];

    for (relative, contents) in files {
        let path = target_dir.join(relative);
        if path.exists() {
            tracing::info!("Exists, skipping: {:?}", path);
            continue;
        }
        fs::write(&path, contents).with_context(|| format!("failed to write {:?}", path))?;
        tracing::debug!("Created: {:?}", path);
    }

    Ok(())
}
