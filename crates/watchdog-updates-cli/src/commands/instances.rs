use anyhow::Result;

use crate::config::AppConfig;

use super::format;

pub fn run(config: &AppConfig) -> Result<()> {
    println!("Base URL: {}", config.base_url);
    format::print_instance_table(&config.instances);
    Ok(())
}
