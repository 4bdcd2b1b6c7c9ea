//! Pulse client entry point
//!
//! Run with:
//! ```bash
//! PULSE_TOKEN=... cargo run -p pulse-service --bin pulse-client
//! ```
//!
//! Configuration is loaded from environment variables. Set `PULSE_ROOM` to follow one
//! room's live events.

use anyhow::Context;
use pulse_cache::RealtimeCache;
use pulse_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use pulse_core::RoomId;
use pulse_http::{HttpApiClient, HttpUploader};
use pulse_realtime::{ConnectionManager, ConnectionState, Session, WebSocketConnector};
use pulse_service::{RoomService, ServiceContext};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Client failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_app(&config.app)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        api = %config.api.base_url,
        realtime = %config.realtime.url,
        "Configuration loaded"
    );

    let http = reqwest::Client::builder()
        .timeout(config.api.request_timeout())
        .build()
        .context("Failed to build HTTP client")?;
    let api = Arc::new(HttpApiClient::with_client(http.clone(), &config.api.base_url));
    let uploader = Arc::new(HttpUploader::new(http, api.clone(), &config.upload));
    let connector = Arc::new(WebSocketConnector::new(&config.realtime)?);

    let manager = ConnectionManager::new(
        config.realtime.clone(),
        config.timing.clone(),
        connector,
        api,
        Arc::new(RealtimeCache::new()),
    );
    let ctx = ServiceContext::new(manager, uploader, &config);

    let session = Session::from_optional_token(std::env::var("PULSE_TOKEN").ok())
        .context("PULSE_TOKEN must hold a valid bearer token")?;
    info!(user_id = %session.user_id(), "Signing in");

    let mut states = ctx.manager().subscribe_state();
    ctx.manager().start(session);

    let room = std::env::var("PULSE_ROOM").ok().map(RoomId::from);
    let mut notices = ctx.notices().subscribe();

    let follow_ctx = ctx.clone();
    let mut follow_states = states.clone();
    let follow = async move {
        let Some(room_id) = room else {
            return std::future::pending::<()>().await;
        };
        wait_connected(&mut follow_states).await;
        match RoomService::new(&follow_ctx).open(&room_id).await {
            Ok(mut view) => {
                for pending in view.take_pending() {
                    info!(message_id = %pending.message.id, "Buffered message");
                }
                while let Some(event) = view.next_event().await {
                    info!(room_id = %room_id, event = %event.event_type(), "Room event");
                }
            }
            Err(e) => warn!(room_id = %room_id, error = %e, "Could not open room"),
        }
        std::future::pending::<()>().await;
    };
    tokio::pin!(follow);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                info!(state = %state, "Connection state changed");
                if state == ConnectionState::Disconnected {
                    warn!("Connection lost; giving up until restarted");
                }
            }
            Ok(notice) = notices.recv() => {
                warn!(kind = ?notice.kind, code = %notice.code, message = %notice.message, "Notice");
            }
            () = &mut follow => {}
        }
    }

    ctx.shutdown();
    Ok(())
}

async fn wait_connected(states: &mut tokio::sync::watch::Receiver<ConnectionState>) {
    // A closed sender means the manager is gone; nothing left to wait for
    let _ = states
        .wait_for(|state| *state == ConnectionState::Connected)
        .await;
}
