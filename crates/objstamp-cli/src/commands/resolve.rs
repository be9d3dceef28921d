//! resolve command - show the metadata an object name would receive

use super::OutputFormat;
use anyhow::Result;
use colored::Colorize;
use objstamp_core::rules::{extension, ResolvedMetadata};
use objstamp_core::Profile;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
struct ResolveResult {
    name: String,
    extension: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    cache_control: String,
}

fn resolve(profile: Profile, name: &str) -> ResolveResult {
    let ResolvedMetadata {
        content_type,
        cache_control,
    } = profile.resolve(name);

    ResolveResult {
        name: name.to_string(),
        extension: extension(name).to_string(),
        content_type,
        cache_control,
    }
}

pub fn execute(profile: Profile, names: &[String], output: OutputFormat) -> Result<()> {
    let results: Vec<ResolveResult> = names.iter().map(|name| resolve(profile, name)).collect();

    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        OutputFormat::Text => {
            println!("{} {}", "Profile:".bold(), profile);
            for result in &results {
                println!();
                println!("{}", result.name.cyan());
                let ext = if result.extension.is_empty() {
                    "(none)"
                } else {
                    result.extension.as_str()
                };
                println!("  extension:     {}", ext);
                if let Some(content_type) = &result.content_type {
                    println!("  content-type:  {}", content_type.green());
                }
                println!("  cache-control: {}", result.cache_control.green());
            }
        }
    }

    Ok(())
}
