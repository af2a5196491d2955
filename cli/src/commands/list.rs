//! List command - scan configured ports and show their owners.

use std::collections::BTreeSet;

use anyhow::Result;
use chrono::Local;
use portsentinel_core::{HostPortService, PortScanResult, PortStatus};

use super::truncate;
use crate::redact::mask_sensitive_args;

pub async fn run(service: &HostPortService, json: bool) -> Result<()> {
    let report = service.refresh_all().await;
    let results = service.state().snapshot_results();

    if json {
        println!("{}", serde_json::to_string_pretty(&masked(&results))?);
    } else {
        print!("{}", render_table(&results, &service.state().pinned_ports()));
    }

    if let Some(e) = report.error {
        eprintln!("Warning: {}", e);
    }
    Ok(())
}

/// Results with secrets masked out of their command lines.
pub fn masked(results: &[PortScanResult]) -> Vec<PortScanResult> {
    results
        .iter()
        .cloned()
        .map(|mut result| {
            result.command_line = mask_sensitive_args(&result.command_line);
            result
        })
        .collect()
}

/// Render results as a fixed-width table.
pub fn render_table(results: &[PortScanResult], pinned: &BTreeSet<u16>) -> String {
    if results.is_empty() {
        return "No ports configured. Add one with `portsentinel ports add <port>`.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<6} {:<1} {:<8} {:<8} {:<20} {:<9} COMMAND\n",
        "PORT", "", "STATUS", "PID", "PROCESS", "UPDATED"
    ));
    out.push_str(&format!("{}\n", "-".repeat(90)));

    let mut in_use = 0;
    for result in results {
        let pin = if pinned.contains(&result.port) { "*" } else { " " };
        let pid = if result.pid > 0 {
            result.pid.to_string()
        } else {
            "-".to_string()
        };
        let detail = match (&result.status, &result.error) {
            (PortStatus::InUse, _) => {
                in_use += 1;
                mask_sensitive_args(result.command_or_exe())
            }
            (_, Some(error)) => error.clone(),
            _ => String::new(),
        };
        let updated = result.updated_at.with_timezone(&Local).format("%H:%M:%S");

        out.push_str(&format!(
            "{:<6} {:<1} {:<8} {:<8} {:<20} {:<9} {}\n",
            result.port,
            pin,
            result.status.display_name(),
            pid,
            truncate(&result.process_name, 20),
            updated,
            truncate(&detail, 40)
        ));
    }

    out.push_str(&format!(
        "\nTotal: {} ports, {} in use\n",
        results.len(),
        in_use
    ));
    out
}
