use anyhow::Context;
use difftrail_common::config::config_file_path;
use difftrail_common::AppConfig;

pub fn run(config: &AppConfig, init: bool) -> anyhow::Result<()> {
    if init {
        let path = config_file_path();
        if path.exists() {
            anyhow::bail!("{} already exists", path.display());
        }
        let path = AppConfig::default()
            .save()
            .context("Failed to write config")?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    println!("# {}", config_file_path().display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
