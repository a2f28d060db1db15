//! Generator module - renders documents through their templates into the public directory

use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use tera::Context;

use crate::content::{ContentDocument, Discovery, MarkdownRenderer};
use crate::error::{Result, SiteError};
use crate::helpers::{parse_date, root_for, url_for};
use crate::templates::{PageData, PageSummary, SiteData, TemplateRenderer};
use crate::writer::{OutputWriter, WriteOutcome};
use crate::Site;

/// Template that, when present, renders the site index
const INDEX_TEMPLATE: &str = "index";
const INDEX_PATH: &str = "index.html";

/// A document that could not be rendered
#[derive(Debug)]
pub struct DocumentFailure {
    pub source: String,
    pub error: SiteError,
}

/// Outcome of a full render
#[derive(Debug, Default)]
pub struct RenderReport {
    /// Pages whose output was created or changed
    pub written: usize,
    /// Pages whose output already had identical bytes
    pub unchanged: usize,
    /// Static files copied from the source tree
    pub assets: usize,
    /// Whether a site index was rendered from the `index` template
    pub index_generated: bool,
    /// Per-document errors; these documents produced no output
    pub failures: Vec<DocumentFailure>,
    /// Files the loader skipped
    pub warnings: Vec<String>,
}

impl RenderReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Unchanged => self.unchanged += 1,
            WriteOutcome::Created | WriteOutcome::Updated => self.written += 1,
        }
    }
}

/// An entry of the site listing before URLs are resolved against a page
#[derive(Debug, Clone)]
struct ListingEntry {
    title: String,
    date: Option<String>,
    path: String,
    draft: bool,
}

/// Static site generator using the site's Tera templates
pub struct Generator<'a> {
    site: &'a Site,
    markdown: MarkdownRenderer,
    templates: TemplateRenderer,
    writer: OutputWriter,
}

impl<'a> Generator<'a> {
    /// Create a generator over the discovered templates
    pub fn new(site: &'a Site, discovery: &Discovery) -> Result<Self> {
        let templates = TemplateRenderer::new(&discovery.templates)?;
        let markdown = MarkdownRenderer::with_theme(&site.config.highlight_theme);

        Ok(Self {
            site,
            markdown,
            templates,
            writer: OutputWriter::new(&site.public_dir),
        })
    }

    /// Render every document, copy assets and write the index
    ///
    /// Per-document failures are collected in the report; only write
    /// failures abort.
    pub fn generate(&self, discovery: &Discovery) -> Result<RenderReport> {
        let mut report = RenderReport {
            warnings: discovery.warnings.clone(),
            ..Default::default()
        };

        fs::create_dir_all(&self.site.public_dir).map_err(|source| SiteError::FileWrite {
            path: self.site.public_dir.clone(),
            source,
        })?;

        // Template resolution decides which documents exist in the output,
        // and the first document (by source path) claims each output path
        let mut owners: BTreeMap<String, String> = BTreeMap::new();
        let mut renderable = Vec::new();
        for doc in &discovery.documents {
            if let Err(error) = self.claim_output(doc, &owners) {
                tracing::warn!("{}", error);
                report.failures.push(DocumentFailure {
                    source: doc.source.clone(),
                    error,
                });
                continue;
            }
            owners.insert(doc.output_path(), doc.source.clone());
            renderable.push(doc);
        }

        let generate_index =
            self.templates.has(INDEX_TEMPLATE) && !owners.contains_key(INDEX_PATH);
        if generate_index {
            owners.insert(INDEX_PATH.to_string(), format!("the {} template", INDEX_TEMPLATE));
        } else if self.templates.has(INDEX_TEMPLATE) {
            tracing::debug!("A document provides {}, skipping generated index", INDEX_PATH);
        }

        self.copy_assets(discovery, &owners, &mut report)?;

        let listing = self.build_listing(&renderable);

        let rendered: Vec<(&ContentDocument, Result<String>)> = renderable
            .par_iter()
            .map(|doc| (*doc, self.render_document(doc, &listing)))
            .collect();

        for (doc, html) in rendered {
            match html {
                Ok(html) => {
                    let outcome = self.writer.write(&doc.output_path(), html.as_bytes())?;
                    report.record(outcome);
                }
                Err(error) => {
                    tracing::warn!("{}", error);
                    report.failures.push(DocumentFailure {
                        source: doc.source.clone(),
                        error,
                    });
                }
            }
        }

        if generate_index {
            self.generate_index(&listing, &mut report)?;
        }

        Ok(report)
    }

    /// Render one document to HTML
    ///
    /// Pure given the document, the configuration and the listing.
    fn render_document(&self, doc: &ContentDocument, listing: &[ListingEntry]) -> Result<String> {
        let template = self.resolve_template(doc)?;
        let path = doc.output_path();
        let fm = &doc.front_matter;

        let page = PageData {
            title: doc.title(),
            author: fm.author.clone(),
            date: fm.date.clone(),
            description: fm.description.clone(),
            draft: fm.draft,
            template: template.to_string(),
            extra: fm.extra.clone(),
            content: self.markdown.render(&doc.body),
            url: url_for(&self.site.config, &path, &path),
            path,
        };

        self.render_page(template, &page, listing, &doc.source)
    }

    fn render_page(
        &self,
        template: &str,
        page: &PageData,
        listing: &[ListingEntry],
        document: &str,
    ) -> Result<String> {
        let config = &self.site.config;
        let site = SiteData {
            title: &config.title,
            description: &config.description,
            base_url: &config.base_url,
            pages: self.listing_for(listing, &page.path),
            extra: &config.extra,
        };

        let mut context = Context::new();
        context.insert("page", page);
        context.insert("site", &site);
        context.insert("root", &root_for(config, &page.path));

        match self.templates.render(template, &context) {
            Some(Ok(html)) => Ok(html),
            Some(Err(e)) => Err(SiteError::Render {
                document: document.to_string(),
                message: describe_tera_error(&e),
            }),
            None => Err(SiteError::TemplateNotFound {
                template: template.to_string(),
                document: document.to_string(),
            }),
        }
    }

    /// Resolve the template and check no earlier document owns the output path
    fn claim_output(&self, doc: &ContentDocument, owners: &BTreeMap<String, String>) -> Result<()> {
        self.resolve_template(doc)?;
        let output = doc.output_path();
        match owners.get(&output) {
            Some(owner) => Err(SiteError::OutputConflict {
                document: doc.source.clone(),
                output,
                owner: owner.clone(),
            }),
            None => Ok(()),
        }
    }

    fn resolve_template<'d>(&'d self, doc: &'d ContentDocument) -> Result<&'d str> {
        let name = doc.template_name(&self.site.config.default_template);
        if self.templates.has(name) {
            Ok(name)
        } else {
            Err(SiteError::TemplateNotFound {
                template: name.to_string(),
                document: doc.source.clone(),
            })
        }
    }

    /// Listing handed to every template: newest first, drafts per configuration
    fn build_listing(&self, docs: &[&ContentDocument]) -> Vec<ListingEntry> {
        let mut entries: Vec<ListingEntry> = docs
            .iter()
            .filter(|doc| self.site.config.index_drafts || !doc.is_draft())
            .map(|doc| ListingEntry {
                title: doc.title(),
                date: doc.front_matter.date.clone(),
                path: doc.output_path(),
                draft: doc.is_draft(),
            })
            .collect();

        entries.sort_by(|a, b| {
            let da = a.date.as_deref().and_then(parse_date);
            let db = b.date.as_deref().and_then(parse_date);
            match (da, db) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| a.path.cmp(&b.path))
        });

        entries
    }

    fn listing_for(&self, listing: &[ListingEntry], page_path: &str) -> Vec<PageSummary> {
        listing
            .iter()
            .map(|entry| PageSummary {
                title: entry.title.clone(),
                date: entry.date.clone(),
                url: url_for(&self.site.config, page_path, &entry.path),
                path: entry.path.clone(),
                draft: entry.draft,
            })
            .collect()
    }

    /// Render `index.html` from the `index` template
    fn generate_index(&self, listing: &[ListingEntry], report: &mut RenderReport) -> Result<()> {
        let config = &self.site.config;
        let page = PageData {
            title: config.title.clone(),
            author: None,
            date: None,
            description: Some(config.description.clone()).filter(|d| !d.is_empty()),
            draft: false,
            template: INDEX_TEMPLATE.to_string(),
            extra: Default::default(),
            content: String::new(),
            path: INDEX_PATH.to_string(),
            url: url_for(config, INDEX_PATH, INDEX_PATH),
        };

        match self.render_page(INDEX_TEMPLATE, &page, listing, INDEX_PATH) {
            Ok(html) => {
                let outcome = self.writer.write(INDEX_PATH, html.as_bytes())?;
                report.record(outcome);
                report.index_generated = true;
            }
            Err(error) => {
                tracing::warn!("{}", error);
                report.failures.push(DocumentFailure {
                    source: INDEX_PATH.to_string(),
                    error,
                });
            }
        }

        Ok(())
    }

    /// Copy non-Markdown source files verbatim
    ///
    /// Assets whose path a rendered page already claims are skipped.
    fn copy_assets(
        &self,
        discovery: &Discovery,
        owners: &BTreeMap<String, String>,
        report: &mut RenderReport,
    ) -> Result<()> {
        for asset in &discovery.assets {
            if let Some(owner) = owners.get(asset) {
                tracing::warn!("Skipping asset {}: output produced by {}", asset, owner);
                report
                    .warnings
                    .push(format!("{}: output produced by {}", asset, owner));
                continue;
            }
            let source = self.site.source_dir.join(asset);
            let contents = match fs::read(&source) {
                Ok(contents) => contents,
                Err(e) => {
                    tracing::warn!("Skipping asset {:?}: {}", source, e);
                    report.warnings.push(format!("{}: {}", source.display(), e));
                    continue;
                }
            };
            self.writer.write(asset, &contents)?;
            report.assets += 1;
        }
        Ok(())
    }
}

/// Tera nests the useful message in the error source chain
fn describe_tera_error(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::ContentLoader;
    use std::path::Path;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site_with(base: &Path, config: SiteConfig) -> Site {
        Site::with_config(base.to_path_buf(), config)
    }

    fn build(site: &Site) -> RenderReport {
        let discovery = ContentLoader::new(site).discover().unwrap();
        let generator = Generator::new(site, &discovery).unwrap();
        generator.generate(&discovery).unwrap()
    }

    fn plain_config() -> SiteConfig {
        SiteConfig {
            highlight_theme: String::new(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_template_skips_only_that_document() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write(&base.join("templates/default.html"), "<h1>{{ page.title }}</h1>{{ page.content }}");
        write(&base.join("content/good.md"), "---\ntitle: Good\n---\nbody");
        write(&base.join("content/bad.md"), "---\ntemplate: nope\n---\nbody");

        let site = site_with(base, plain_config());
        let report = build(&site);

        assert_eq!(report.written, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].source, "bad.md");
        assert!(matches!(
            report.failures[0].error,
            SiteError::TemplateNotFound { ref template, .. } if template == "nope"
        ));
        assert!(!base.join("public/bad.html").exists());

        let good = fs::read_to_string(base.join("public/good.html")).unwrap();
        assert_eq!(good, "<h1>Good</h1><p>body</p>\n");
    }

    #[test]
    fn test_render_error_is_per_document() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write(&base.join("templates/default.html"), "{{ page.content }}");
        write(&base.join("templates/strict.html"), "{{ page.extra.missing.deeper }}");
        write(&base.join("content/a.md"), "a");
        write(&base.join("content/b.md"), "---\ntemplate: strict\n---\nb");

        let site = site_with(base, plain_config());
        let report = build(&site);

        assert_eq!(report.written, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0].error, SiteError::Render { .. }));
    }

    #[test]
    fn test_drafts_rendered_but_not_listed() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write(
            &base.join("templates/default.html"),
            "{% for p in site.pages %}[{{ p.title }}]{% endfor %}",
        );
        write(&base.join("content/old.md"), "---\ntitle: Old\ndate: 2023-01-01\n---\n");
        write(&base.join("content/new.md"), "---\ntitle: New\ndate: 2024-06-01\n---\n");
        write(&base.join("content/wip.md"), "---\ntitle: WIP\ndraft: true\n---\n");

        let site = site_with(base, plain_config());
        build(&site);

        assert!(base.join("public/wip.html").exists());
        let listing = fs::read_to_string(base.join("public/old.html")).unwrap();
        assert_eq!(listing, "[New][Old]");

        let config = SiteConfig {
            index_drafts: true,
            ..plain_config()
        };
        let site = site_with(base, config);
        build(&site);
        let listing = fs::read_to_string(base.join("public/old.html")).unwrap();
        assert_eq!(listing, "[New][Old][WIP]");
    }

    #[test]
    fn test_generated_index_and_links() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write(&base.join("templates/default.html"), "{{ root }}|{{ page.url }}");
        write(
            &base.join("templates/index.html"),
            "{% for p in site.pages %}<a href=\"{{ p.url }}\">{{ p.title }}</a>{% endfor %}",
        );
        write(&base.join("content/blog/calls.md"), "---\ntitle: Calls\n---\n");

        let config = SiteConfig {
            base_url: ".".to_string(),
            ..plain_config()
        };
        let site = site_with(base, config);
        let report = build(&site);

        assert!(report.index_generated);
        let index = fs::read_to_string(base.join("public/index.html")).unwrap();
        assert_eq!(index, "<a href=\"./blog/calls.html\">Calls</a>");
        let post = fs::read_to_string(base.join("public/blog/calls.html")).unwrap();
        assert_eq!(post, "../|../blog/calls.html");
    }

    #[test]
    fn test_document_index_wins_over_generated() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write(&base.join("templates/default.html"), "doc:{{ page.title }}");
        write(&base.join("templates/index.html"), "generated");
        write(&base.join("content/index.md"), "---\ntitle: Home\n---\n");

        let site = site_with(base, plain_config());
        let report = build(&site);

        assert!(!report.index_generated);
        let index = fs::read_to_string(base.join("public/index.html")).unwrap();
        assert_eq!(index, "doc:Home");
    }

    #[test]
    fn test_assets_copied() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write(&base.join("templates/default.html"), "x");
        write(&base.join("content/css/site.css"), "body {}");

        let site = site_with(base, plain_config());
        let report = build(&site);

        assert_eq!(report.assets, 1);
        assert_eq!(
            fs::read_to_string(base.join("public/css/site.css")).unwrap(),
            "body {}"
        );
    }

    #[test]
    fn test_rerender_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write(&base.join("templates/default.html"), "{{ page.content }}");
        write(&base.join("content/a.md"), "# A");
        write(&base.join("content/b/c.md"), "```rust\nfn main() {}\n```");

        let site = site_with(base, SiteConfig::default());
        let first = build(&site);
        assert_eq!(first.written, 2);

        let second = build(&site);
        assert_eq!(second.written, 0);
        assert_eq!(second.unchanged, 2);
    }

    #[test]
    fn test_output_conflicts_resolved_by_first_source() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write(&base.join("templates/default.html"), "{{ page.title }}");
        write(&base.join("templates/index.html"), "generated");
        write(&base.join("content/a.markdown"), "---\ntitle: From markdown\n---\n");
        write(&base.join("content/a.md"), "---\ntitle: From md\n---\n");
        write(&base.join("content/b.html"), "static b");
        write(&base.join("content/b.md"), "---\ntitle: Rendered b\n---\n");
        write(&base.join("content/index.html"), "static index");

        let site = site_with(base, plain_config());
        let first = build(&site);

        assert_eq!(first.failures.len(), 1);
        assert_eq!(first.failures[0].source, "a.md");
        assert!(matches!(
            first.failures[0].error,
            SiteError::OutputConflict { ref owner, .. } if owner == "a.markdown"
        ));
        assert_eq!(first.assets, 0);
        assert_eq!(first.warnings.len(), 2);
        assert!(first.index_generated);

        let read = |p: &str| fs::read_to_string(base.join("public").join(p)).unwrap();
        assert_eq!(read("a.html"), "From markdown");
        assert_eq!(read("b.html"), "Rendered b");
        assert_eq!(read("index.html"), "generated");

        let second = build(&site);
        assert_eq!(second.written, 0);
        assert_eq!(second.unchanged, 3);
    }

    #[test]
    fn test_date_format_error_is_per_document() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write(&base.join("templates/default.html"), "{{ page.title }}");
        write(
            &base.join("templates/stamped.html"),
            r#"{{ page.date | date_format(format="%Y-%m-%dT%H:%M:%S%z") }}"#,
        );
        write(&base.join("content/plain.md"), "---\ntitle: Plain\n---\n");
        write(
            &base.join("content/stamped.md"),
            "---\ntemplate: stamped\ndate: 2024-01-15 10:30\n---\n",
        );

        let site = site_with(base, plain_config());
        let report = build(&site);

        assert_eq!(report.written, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].source, "stamped.md");
        assert!(matches!(report.failures[0].error, SiteError::Render { .. }));
        assert_eq!(
            fs::read_to_string(base.join("public/plain.html")).unwrap(),
            "Plain"
        );
    }
}
