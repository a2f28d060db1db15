//! Render the site into the public directory

use anyhow::{Context, Result};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::path::Path;
use std::time::Duration;

use crate::content::ContentLoader;
use crate::generator::{Generator, RenderReport};
use crate::Site;

/// Discover, render and write the whole site
///
/// Fatal errors (missing source root, broken templates, write failures)
/// are returned; per-document errors are left in the report.
pub fn run(site: &Site) -> Result<RenderReport> {
    let start = std::time::Instant::now();

    let discovery = ContentLoader::new(site)
        .discover()
        .context("content discovery failed")?;

    tracing::info!(
        "Loaded {} documents and {} templates",
        discovery.documents.len(),
        discovery.templates.len()
    );

    let generator = Generator::new(site, &discovery)
        .with_context(|| format!("failed to compile templates in {:?}", site.template_dir))?;
    let report = generator.generate(&discovery)?;

    tracing::info!(
        "Rendered {} pages ({} unchanged), copied {} assets in {:.2}s",
        report.written,
        report.unchanged,
        report.assets,
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}

/// Print the per-document errors and loader warnings of a render
pub fn print_report(report: &RenderReport) {
    for warning in &report.warnings {
        eprintln!("warning: skipped {}", warning);
    }
    for failure in &report.failures {
        eprintln!("error: {}", failure.error);
    }
    if !report.is_success() {
        eprintln!("{} document(s) failed to render", report.failures.len());
    }
}

/// Watch sources, templates and config, re-rendering on change
///
/// `drafts_in_index` is the command-line override, re-applied whenever
/// the configuration is reloaded.
pub async fn watch(site: &Site, drafts_in_index: bool) -> Result<()> {
    let site = site.clone();
    tokio::task::spawn_blocking(move || watch_blocking(&site, drafts_in_index)).await?
}

fn watch_blocking(site: &Site, drafts_in_index: bool) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Debounce editor save bursts into one rebuild
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in [&site.source_dir, &site.template_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    let config_path = site.config_path();
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant(site, &e.path))
                    .collect();
                if relevant.is_empty() {
                    continue;
                }
                for event in &relevant {
                    tracing::info!("Changed: {}", event.path.display());
                }

                // A config edit may move directories or change defaults
                let current = if relevant.iter().any(|e| e.path == config_path) {
                    reload_site(site, drafts_in_index)
                } else {
                    site.clone()
                };

                match run(&current) {
                    Ok(report) => print_report(&report),
                    Err(e) => tracing::error!("Render failed: {:#}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Re-read `config.yaml`, keeping the previous site if it no longer parses
fn reload_site(site: &Site, drafts_in_index: bool) -> Site {
    match Site::new(&site.base_dir) {
        Ok(mut reloaded) => {
            if drafts_in_index {
                reloaded.config.index_drafts = true;
            }
            reloaded
        }
        Err(e) => {
            tracing::error!("Keeping previous configuration: {}", e);
            site.clone()
        }
    }
}

/// Ignore editor droppings, VCS metadata and our own output
fn is_relevant(site: &Site, path: &Path) -> bool {
    if path.starts_with(&site.public_dir) {
        return false;
    }
    let path_str = path.to_string_lossy();
    !path_str.contains("/.git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}
