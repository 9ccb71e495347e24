//! `speedloop check` – load the URL list and print what would be measured.

use anyhow::Result;
use speedloop_core::config;
use std::path::Path;

pub fn run_check(config_path: &Path) -> Result<()> {
    let list = config::load_urls(config_path)?;
    let suspicious = list.suspicious();

    println!("{}: {} URL(s)", config_path.display(), list.urls.len());
    for url in &list.urls {
        let marker = if suspicious.contains(&url.as_str()) { "?" } else { "-" };
        println!("  {} {}", marker, url);
    }
    if !suspicious.is_empty() {
        println!(
            "{} entr{} marked '?' are not http(s) URLs.",
            suspicious.len(),
            if suspicious.len() == 1 { "y" } else { "ies" }
        );
    }
    Ok(())
}
