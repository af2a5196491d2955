//! Ports command - manage which ports are watched.

use anyhow::{bail, Result};
use portsentinel_core::domain::validate_port;
use portsentinel_core::{Config, HostPortService};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct PortEntry {
    port: u16,
    preset: bool,
    custom: bool,
    enabled: bool,
    pinned: bool,
}

fn entries(config: &Config) -> Vec<PortEntry> {
    let enabled = config.enabled_ports();
    let mut ports: Vec<u16> = config
        .preset_ports
        .keys()
        .copied()
        .chain(config.custom_ports.iter().copied())
        .collect();
    ports.sort_unstable();
    ports.dedup();

    ports
        .into_iter()
        .map(|port| PortEntry {
            port,
            preset: config.preset_ports.contains_key(&port),
            custom: config.custom_ports.contains(&port),
            enabled: enabled.contains(&port),
            pinned: config.is_pinned(port),
        })
        .collect()
}

pub fn list(service: &HostPortService, json: bool) -> Result<()> {
    let entries = entries(&service.state().snapshot_config());

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{:<6} {:<7} {:<8} PINNED", "PORT", "KIND", "ENABLED");
    println!("{}", "-".repeat(30));
    for entry in &entries {
        let kind = if entry.custom { "custom" } else { "preset" };
        println!(
            "{:<6} {:<7} {:<8} {}",
            entry.port,
            kind,
            if entry.enabled { "yes" } else { "no" },
            if entry.pinned { "yes" } else { "" }
        );
    }
    Ok(())
}

pub async fn add(service: &HostPortService, port: u32) -> Result<()> {
    let port = service.add_custom_port_and_save(port).await?;
    println!("✓ Added port {}", port);
    Ok(())
}

pub async fn remove(service: &HostPortService, port: u32) -> Result<()> {
    let port = validate_port(port)?;
    service.remove_custom_port_and_save(port).await?;
    println!("✓ Removed port {}", port);
    Ok(())
}

pub async fn pin(service: &HostPortService, port: u32, pinned: bool) -> Result<()> {
    let port = validate_port(port)?;
    service.toggle_pin_and_save(port, pinned).await?;

    if pinned {
        if !service.state().ports().contains(&port) {
            eprintln!("Note: port {} is not enabled; the pin applies once it is", port);
        }
        println!("✓ Pinned port {}", port);
    } else {
        println!("✓ Unpinned port {}", port);
    }
    Ok(())
}

pub async fn set_enabled(service: &HostPortService, port: u32, enabled: bool) -> Result<()> {
    let port = validate_port(port)?;
    let config = service.state().snapshot_config();

    if !config.preset_ports.contains_key(&port) {
        if config.custom_ports.contains(&port) {
            bail!("port {} is a custom port; use `ports remove {}` instead", port, port);
        }
        bail!("port {} is not a preset; use `ports add {}` instead", port, port);
    }

    service.toggle_preset_and_save(port, enabled).await?;
    let verb = if enabled { "Enabled" } else { "Disabled" };
    println!("✓ {} preset port {}", verb, port);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_entries_merge_presets_and_custom_ports() {
        let config = Config {
            preset_ports: BTreeMap::from([(80, true), (443, false)]),
            custom_ports: vec![9000, 80],
            pinned_ports: BTreeMap::from([(9000, true)]),
            ..Default::default()
        };

        let entries = entries(&config);
        let summary: Vec<_> = entries
            .iter()
            .map(|e| (e.port, e.preset, e.custom, e.enabled, e.pinned))
            .collect();
        assert_eq!(
            summary,
            vec![
                (80, true, true, true, false),
                (443, true, false, false, false),
                (9000, false, true, true, true),
            ]
        );
    }
}
