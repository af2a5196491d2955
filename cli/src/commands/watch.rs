//! Watch command - rescan on an interval until interrupted.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use portsentinel_core::{AutoRefresher, HostPortService};
use tracing::debug;

use super::list::{masked, render_table};

/// Clear the screen and move the cursor home.
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

pub async fn run(service: Arc<HostPortService>, interval_ms: Option<u64>, json: bool) -> Result<()> {
    let configured = service.state().snapshot_config().ui.auto_refresh_interval_ms;
    let interval = Duration::from_millis(interval_ms.filter(|ms| *ms > 0).unwrap_or(configured));
    let redraw = !json && atty::is(atty::Stream::Stdout);

    refresh_and_draw(&service, interval, redraw, json).await;

    let refresher = AutoRefresher::new();
    let ticking = Arc::clone(&service);
    refresher
        .start(interval, move || {
            let service = Arc::clone(&ticking);
            async move { refresh_and_draw(&service, interval, redraw, json).await }
        })
        .await;

    tokio::signal::ctrl_c().await?;
    debug!("Interrupted, stopping watch");
    refresher.stop().await;
    Ok(())
}

async fn refresh_and_draw(service: &HostPortService, interval: Duration, redraw: bool, json: bool) {
    let report = service.refresh_all().await;
    let results = service.state().snapshot_results();

    if json {
        // One document per line so the stream can be piped.
        match serde_json::to_string(&masked(&results)) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("Error: {}", e),
        }
        return;
    }

    let mut out = String::new();
    if redraw {
        out.push_str(CLEAR_SCREEN);
    }
    out.push_str(&format!(
        "PortSentinel | every {}ms | {} | Ctrl-C to exit\n\n",
        interval.as_millis(),
        Local::now().format("%H:%M:%S")
    ));
    out.push_str(&render_table(&results, &service.state().pinned_ports()));
    if let Some(e) = &report.error {
        out.push_str(&format!("\nWarning: {}\n", e));
    }

    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(out.as_bytes());
    let _ = stdout.flush();
}
