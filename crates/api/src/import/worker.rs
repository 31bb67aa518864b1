//! Background worker that drains one import session.
//!
//! Strictly sequential over the item list: fetch the full product record,
//! transform it, upsert it, record the outcome, pause, repeat. One item's
//! failure never aborts the session. The worker is supervised -- a crash
//! is logged and the session still reaches a finished, sweepable state
//! instead of leaking.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use ataka_core::import::{
    transform_product, INTER_ITEM_DELAY_MS, SESSION_RETENTION_SECS,
};
use ataka_core::types::DbId;
use ataka_db::repositories::BookRepo;
use ataka_db::DbPool;
use ataka_woo::WooClient;

use super::store::ImportSessionStore;

/// One import run, ready to be spawned onto the runtime.
pub struct ImportWorker {
    pool: DbPool,
    store: Arc<ImportSessionStore>,
    client: WooClient,
    session_id: String,
    user_id: DbId,
}

impl ImportWorker {
    pub fn new(
        pool: DbPool,
        store: Arc<ImportSessionStore>,
        client: WooClient,
        session_id: String,
        user_id: DbId,
    ) -> Self {
        Self {
            pool,
            store,
            client,
            session_id,
            user_id,
        }
    }

    /// Spawn the worker as a supervised background task.
    ///
    /// The caller gets control back immediately; progress is observable
    /// only through the session store. The supervisor task logs a panic
    /// or cancellation and schedules the session for removal either way.
    pub fn spawn(self, cancel: CancellationToken) {
        let store = Arc::clone(&self.store);
        let session_id = self.session_id.clone();

        let worker = tokio::spawn(self.run(cancel));

        tokio::spawn(async move {
            if let Err(join_err) = worker.await {
                tracing::error!(
                    import_id = %session_id,
                    error = %join_err,
                    "Import worker crashed",
                );
                store.update(&session_id, |session| {
                    session.finished_at = Some(chrono::Utc::now());
                });
                store.schedule_expiry(&session_id, Duration::from_secs(SESSION_RETENTION_SECS));
            }
        });
    }

    async fn run(self, cancel: CancellationToken) {
        let Some(session) = self.store.get(&self.session_id) else {
            tracing::warn!(import_id = %self.session_id, "Import session vanished before start");
            return;
        };

        tracing::info!(
            import_id = %self.session_id,
            total = session.total,
            "Import worker started",
        );

        for (index, item) in session.items.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(import_id = %self.session_id, index, "Import worker cancelled");
                break;
            }

            self.store
                .update(&self.session_id, |s| s.mark_importing(index));

            match self.import_one(item.woocommerce_id).await {
                Ok(()) => {
                    self.store.update(&self.session_id, |s| {
                        s.record_success(index);
                    });
                }
                Err(message) => {
                    tracing::warn!(
                        import_id = %self.session_id,
                        woocommerce_id = item.woocommerce_id,
                        error = %message,
                        "Product import failed",
                    );
                    self.store.update(&self.session_id, |s| {
                        s.record_error(index, message);
                    });
                }
            }

            // Throttle against the external API. Doubles as the
            // cancellation checkpoint between items.
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!(import_id = %self.session_id, "Import worker cancelled");
                    break;
                }
                () = tokio::time::sleep(Duration::from_millis(INTER_ITEM_DELAY_MS)) => {}
            }
        }

        self.store.update(&self.session_id, |s| {
            s.finished_at = Some(chrono::Utc::now());
        });
        self.store.schedule_expiry(
            &self.session_id,
            Duration::from_secs(SESSION_RETENTION_SECS),
        );

        if let Some(session) = self.store.get(&self.session_id) {
            tracing::info!(
                import_id = %self.session_id,
                succeeded = session.succeeded,
                failed = session.failed,
                total = session.total,
                "Import worker finished",
            );
        }
    }

    /// Fetch, transform, and upsert one product. The error string ends up
    /// on the session item for the progress UI.
    async fn import_one(&self, woocommerce_id: i64) -> Result<(), String> {
        let product = self
            .client
            .fetch_product(woocommerce_id)
            .await
            .map_err(|e| e.to_string())?;

        let draft = transform_product(&product, self.user_id, chrono::Utc::now());

        BookRepo::import_book(&self.pool, &draft)
            .await
            .map_err(|e| e.to_string())?;

        Ok(())
    }
}

/// Periodically sweep expired sessions until cancelled.
///
/// Runs alongside the request handlers; one sweep a minute keeps the
/// registry bounded without a per-session timer.
pub async fn run_session_sweeper(store: Arc<ImportSessionStore>, cancel: CancellationToken) {
    const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!("Import session sweeper stopped");
                return;
            }
            () = tokio::time::sleep(SWEEP_INTERVAL) => {
                let removed = store.sweep_expired();
                if removed > 0 {
                    tracing::debug!(removed, "Swept expired import sessions");
                }
            }
        }
    }
}
