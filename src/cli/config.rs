//! Config command for inspecting and creating the configuration file.

use anyhow::Result;
use clap::Args;

use crate::config::Config;

/// Show or initialise the configuration file
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Print the loaded configuration as TOML (the default)
    #[arg(long, conflicts_with_all = ["path", "init"])]
    pub show: bool,

    /// Print the path of the config file
    #[arg(long, conflicts_with = "init")]
    pub path: bool,

    /// Write a default config file if none exists
    #[arg(long)]
    pub init: bool,
}

impl ConfigArgs {
    /// Execute the config command
    pub fn execute(&self, config: &Config) -> Result<()> {
        if self.path {
            println!("{}", Config::config_file_path()?.display());
            return Ok(());
        }

        if self.init {
            let path = Config::config_file_path()?;
            if Config::exists() {
                println!("Config already exists: {}", path.display());
            } else {
                Config::new().save()?;
                println!("Created {}", path.display());
            }
            return Ok(());
        }

        print!("{}", toml::to_string_pretty(config)?);
        Ok(())
    }
}
