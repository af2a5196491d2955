//! Config command - show the saved configuration.

use anyhow::Result;
use portsentinel_core::{ConfigStore, HostPortService};

pub async fn show(service: &HostPortService, json: bool) -> Result<()> {
    let config = service.state().snapshot_config();

    if !json {
        let store = ConfigStore::new()?;
        println!("# {}", store.config_path().display());
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
