//! Config file command.

use crate::config::{self, Config};

/// Write the effective configuration to the standard config file.
pub fn cmd_init_config(current: &Config, force: bool) -> anyhow::Result<()> {
    let path = config::config_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if path.exists() && !force {
        println!("Config already exists at {} (use --force to overwrite)", path.display());
        return Ok(());
    }

    let written = config::save(current)?;
    println!("Wrote {}", written.display());
    Ok(())
}
