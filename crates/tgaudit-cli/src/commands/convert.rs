//! Batch format migration command.

use std::path::PathBuf;

use indicatif::ProgressBar;

use tgaudit_client::ProxyConfig;
use tgaudit_core::Config;
use tgaudit_pipeline::SessionFormatConverter;

pub fn run(
    config: &Config,
    dir: Option<PathBuf>,
    proxy: Option<String>,
    no_write: bool,
) -> anyhow::Result<()> {
    let spec = proxy
        .or_else(|| config.convert.proxy.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("no proxy specification: pass --proxy or set convert.proxy")
        })?;
    let proxy = ProxyConfig::parse(&spec)?;

    let store = super::open_store(config, dir)?;
    let write_json = !no_write && config.convert.write_json;
    let converter = SessionFormatConverter::new(store, proxy, write_json);

    let pairs: Vec<_> = converter.store().discover()?.collect();
    let bar = ProgressBar::new(pairs.len() as u64);

    let mut converted = 0usize;
    let mut failed = 0usize;
    for pair in &pairs {
        match converter.convert(pair) {
            Ok(_) => converted += 1,
            Err(err) => {
                failed += 1;
                bar.suspend(|| println!("  {}: {}", pair.session_path.display(), err));
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if failed > 0 {
        println!("Converted {converted} account(s), {failed} failed");
    } else {
        println!("Converted {converted} account(s)");
    }
    if !write_json {
        println!("Dry run: metadata files were not modified");
    }

    let errors = converter.store().json_errors();
    if !errors.is_empty() {
        println!(
            "Skipped {} account(s) with missing or malformed metadata",
            errors.len()
        );
    }

    Ok(())
}
