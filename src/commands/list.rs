//! List discovered content

use anyhow::{Context, Result};
use std::collections::BTreeMap;

use crate::content::ContentLoader;
use crate::Site;

/// Print each document with the template it resolves to
pub fn run(site: &Site) -> Result<()> {
    let discovery = ContentLoader::new(site)
        .discover()
        .context("content discovery failed")?;

    let known: Vec<&str> = discovery.templates.iter().map(|t| t.name.as_str()).collect();
    let default_template = &site.config.default_template;

    println!("Documents ({}):", discovery.documents.len());
    for doc in &discovery.documents {
        let template = doc.template_name(default_template);
        let missing = if known.contains(&template) { "" } else { " (missing)" };
        let draft = if doc.is_draft() { " [draft]" } else { "" };
        println!(
            "  {} -> {} [{}{}]{}",
            doc.source,
            doc.output_path(),
            template,
            missing,
            draft
        );
    }

    let mut usage: BTreeMap<&str, usize> = known.iter().map(|name| (*name, 0)).collect();
    for doc in &discovery.documents {
        if let Some(count) = usage.get_mut(doc.template_name(default_template)) {
            *count += 1;
        }
    }

    println!("Templates ({}):", usage.len());
    for (name, count) in usage {
        println!("  {} ({})", name, count);
    }

    if !discovery.warnings.is_empty() {
        println!("Skipped ({}):", discovery.warnings.len());
        for warning in &discovery.warnings {
            println!("  {}", warning);
        }
    }

    Ok(())
}
