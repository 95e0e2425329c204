//! Terminal check-in desk.
//!
//! Reads ticket codes from stdin, one per line. A handheld barcode/QR scanner
//! in keyboard mode works out of the box; codes can also be typed.
//!
//! # Usage
//!
//! ```bash
//! TICKETDESK_API_URL=http://localhost:5000/api \
//! TICKETDESK_TOKEN=<admin jwt> \
//! cargo run --bin ticketdesk-checkin -- [event-id]
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ticketdesk::reader::LineReader;
use ticketdesk::{AdminSession, ApiClient, CheckinController, Config, ScanSession};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run());
    // Stdin reads block a runtime thread until the next line; don't wait for it.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(api = %config.api_base_url, "configuration loaded");

    let mut client = ApiClient::from_config(&config)?;
    let session = match std::env::var("TICKETDESK_TOKEN") {
        Ok(token) => {
            let session = AdminSession::restore(token, Utc::now())?;
            tracing::info!(user = %session.user().email, "using stored admin session");
            client = client.authorized(&session);
            Some(session)
        }
        Err(_) => None,
    };

    let (controller, handle) = CheckinController::new(Arc::new(client), LineReader::stdin(), &config);
    let controller = tokio::spawn(controller.run());

    handle.load_today_events()?;
    let mut updates = handle.subscribe();
    let state = {
        let loaded = tokio::time::timeout(
            config.request_timeout + Duration::from_secs(1),
            updates.wait_for(|s| s.selected_event.is_some() || s.last_error.is_some()),
        )
        .await;
        match loaded {
            Ok(Ok(state)) => state.clone(),
            _ => handle.snapshot(),
        }
    };

    if state.today_events.is_empty() {
        println!("No events scheduled for today.");
        return Ok(());
    }
    println!("Today's events:");
    for event in &state.today_events {
        println!("  {}  {}  {} @ {}", event.id, event.time, event.name, event.venue);
    }

    if let Some(event_id) = std::env::args().nth(1) {
        handle.select_event(&event_id)?;
    }
    handle.start()?;
    println!("Scanning. Press Ctrl+C to stop.");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut last_line = String::new();
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = status_line(&updates.borrow_and_update());
                if line != last_line {
                    println!("{line}");
                    last_line = line;
                }
            }
        }
    }

    handle.stop()?;
    drop(handle);
    drop(updates);
    let _ = controller.await;
    if let Some(session) = session {
        session.logout();
    }
    Ok(())
}

fn status_line(state: &ScanSession) -> String {
    let stats = state.stats();
    let event = state
        .selected_event
        .as_ref()
        .map(|e| e.name.as_str())
        .unwrap_or("no event");
    let mut line = format!(
        "[{}] {} | checked in {}/{} ({:.0}%)",
        state.phase, event, stats.checked_in, stats.capacity, stats.progress_percent
    );
    if let Some(message) = &state.last_result_message {
        line.push_str(&format!(" | {message}"));
    }
    if let Some(error) = &state.last_error {
        line.push_str(&format!(" | error: {error}"));
    }
    line
}
