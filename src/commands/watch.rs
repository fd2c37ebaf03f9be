use clap::Args;
use tokio::sync::broadcast::{error::RecvError, Receiver};

use crate::api::RemoteApi;
use crate::models::LogRecord;
use crate::push::{self, PushHub};
use crate::sync::{SyncError, SyncManager};

/// Follow the push channel, merging each pushed log into the local cache.
#[derive(Args)]
pub struct WatchCommand {}

impl WatchCommand {
    pub async fn run<A: RemoteApi>(
        &self,
        manager: &SyncManager<A>,
        server_url: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Show what is already cached before the connection comes up.
        if let Some(cached) = manager.cached_logs().await? {
            println!("Cached logs ({}):", cached.len());
            for record in &cached {
                println!("  {}", record);
            }
        }

        let hub = PushHub::new();
        let mut events = hub.subscribe();

        let url = server_url.to_string();
        // The hub moves into the listener task; when the connection ends the
        // hub drops and the receive loop below observes Closed.
        let listener = tokio::spawn(async move { push::listen(&url, &hub).await });

        println!("Watching for new logs (ctrl-c to stop)...");
        if let Err(err) = ingest_events(manager, &mut events).await {
            // Stop the connection before surfacing the cache failure.
            listener.abort();
            let _ = listener.await;
            return Err(err.into());
        }

        listener.await??;
        Ok(())
    }
}

/// Drains pushed records into the cache until the hub closes. A store
/// failure stops the loop and propagates.
async fn ingest_events<A: RemoteApi>(
    manager: &SyncManager<A>,
    events: &mut Receiver<LogRecord>,
) -> Result<(), SyncError> {
    loop {
        match events.recv().await {
            Ok(record) => {
                println!("New log: {}", record);
                manager.ingest_pushed(record).await?;
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "push events dropped, cache may lag until next list");
            }
            Err(RecvError::Closed) => return Ok(()),
        }
    }
}
