//! Scan command - check a single port.

use std::collections::BTreeSet;

use anyhow::Result;
use portsentinel_core::domain::validate_port;
use portsentinel_core::HostPortService;

use super::list::{masked, render_table};

pub async fn run(service: &HostPortService, port: u32, json: bool) -> Result<()> {
    let port = validate_port(port)?;
    let result = service.refresh_one(port).await?;

    if json {
        let result = masked(std::slice::from_ref(&result));
        println!("{}", serde_json::to_string_pretty(&result[0])?);
        return Ok(());
    }

    let pinned: BTreeSet<u16> = service
        .state()
        .is_pinned(port)
        .then_some(port)
        .into_iter()
        .collect();
    print!("{}", render_table(&[result], &pinned));
    Ok(())
}
