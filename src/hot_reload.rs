use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::SinkExt;
use notify_debouncer_full::{
    new_debouncer, DebouncedEvent,
    notify::{Error as NotifyError, RecursiveMode, Watcher},
};
use tracing::{debug, error, info};

use crate::content_loader::reload_content;
use crate::state::{AppState, RefreshBroadcaster};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(tx): State<RefreshBroadcaster>,
) -> impl IntoResponse {
    debug!("browser subscribed to reload notifications");
    ws.on_upgrade(|socket| notify_on_reload(socket, tx))
}

/// Pushes a single reload message when the content changes. The page
/// refreshes in response and opens a fresh socket, so one message per
/// connection is all that is needed.
async fn notify_on_reload(mut socket: WebSocket, tx: RefreshBroadcaster) {
    let mut rx = tx.subscribe();

    if rx.recv().await.is_ok()
        && socket
            .send(Message::Text("reload".to_string().into()))
            .await
            .is_err()
    {
        debug!("Client disconnected before reload message could be sent");
    }
    let _ = socket.close().await;
}

/// Watches the content directory and, on changes, reloads articles and
/// templates into shared state, then tells connected browsers to refresh.
pub fn start_content_watcher(tx: RefreshBroadcaster, app_state: Arc<AppState>) {
    info!("Starting content watcher for hot-reload...");
    let content_dir = app_state.config.content.dir.clone();
    tokio::spawn(async move {
        let (watcher_tx, mut watcher_rx) = tokio::sync::mpsc::channel(1);

        let mut debouncer = new_debouncer(
            Duration::from_millis(200),
            None,
            move |res: Result<Vec<DebouncedEvent>, Vec<NotifyError>>| match res {
                Ok(events) => {
                    let relevant_change = events.iter().any(|event| {
                        let is_relevant_kind = event.kind.is_modify()
                            || event.kind.is_create()
                            || event.kind.is_remove();
                        // Skip editor temp files (Emacs: .#*, ~ backups)
                        let is_temp_file = event.event.paths.iter().any(|path| {
                            path.file_name()
                                .and_then(|name| name.to_str())
                                .map_or(false, |s| s.starts_with(".#") || s.ends_with('~'))
                        });
                        is_relevant_kind && !is_temp_file
                    });

                    if relevant_change {
                        if let Err(e) = watcher_tx.blocking_send(()) {
                            error!("Failed to send watcher event: {}", e);
                        }
                    }
                }
                Err(errors) => {
                    for e in errors {
                        error!("Watcher error: {}", e);
                    }
                }
            },
        )
        .expect("Failed to create debouncer");

        debouncer
            .watcher()
            .watch(content_dir.as_ref(), RecursiveMode::Recursive)
            .expect("Failed to start watching content directory");

        // Keep the debouncer alive and wait for events
        while watcher_rx.recv().await.is_some() {
            info!("Content change detected, reloading content and sending signal...");

            reload_content(&app_state).await;

            // Send reload signal to all connected WebSocket clients
            if let Err(e) = tx.send(()) {
                error!("Failed to broadcast reload signal: {}", e);
            }
        }
    });
}
