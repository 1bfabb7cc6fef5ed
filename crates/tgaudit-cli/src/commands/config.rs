//! Configuration management commands.

use tgaudit_core::Config;

use crate::ConfigAction;

pub fn handle(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_validated()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::config_dir().join("config.toml").display());
        }
    }
    Ok(())
}
