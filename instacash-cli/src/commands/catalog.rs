//! Catalog command - billers, banks and top-up methods

use anyhow::Result;
use colored::Colorize;

use instacash_core::config::Config;

use super::get_data_dir;

pub fn run(json: bool) -> Result<()> {
    let config = Config::load(&get_data_dir())?;
    let catalog = &config.catalog;

    if json {
        println!("{}", serde_json::to_string_pretty(catalog)?);
        return Ok(());
    }

    let sections = [
        ("Billers", &catalog.billers),
        ("Banks", &catalog.banks),
        ("Top-up methods", &catalog.topup_methods),
    ];
    for (title, names) in sections {
        println!("{}", title.bold());
        for name in names {
            println!("  • {}", name);
        }
        println!();
    }
    Ok(())
}
