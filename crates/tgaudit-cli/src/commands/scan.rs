//! Discovery report command.

use std::path::PathBuf;

use tgaudit_core::Config;

pub fn run(config: &Config, dir: Option<PathBuf>) -> anyhow::Result<()> {
    let store = super::open_store(config, dir)?;

    let pairs: Vec<_> = store.discover()?.collect();
    println!(
        "Discovered {} account(s) in {}",
        pairs.len(),
        store.base_dir().display()
    );
    for pair in &pairs {
        println!("  {}", pair.session_path.display());
    }

    let errors = store.json_errors();
    if !errors.is_empty() {
        println!();
        println!("Malformed metadata ({}):", errors.len());
        for path in &errors {
            println!("  {}", path.display());
        }
        println!();
        println!(
            "Move broken accounts into {} to keep future scans clean",
            store.errors_dir().display()
        );
    }

    Ok(())
}
