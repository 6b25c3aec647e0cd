use crate::error::EngineError;
use crate::pipeline::{IngestInputs, MonitorEngine};
use alerter::alert_for;
use chrono::{DateTime, Utc};
use configuration::MonitorConfig;
use core_types::{Clock, ItemId, Snapshot};
use events::{ItemAssessment, MonitorMessage};
use severity::{RuleBasedClassifier, SeverityPolicy};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// The concurrent front door of the engine.
///
/// Every item gets its own [`MonitorEngine`] behind its own lock, so cycles
/// for one item run strictly one after another while different items proceed
/// in parallel. Results are broadcast as [`MonitorMessage`]s to every
/// subscriber.
pub struct Monitor {
    config: Arc<MonitorConfig>,
    policy: Arc<dyn SeverityPolicy>,
    clock: Arc<dyn Clock>,
    scopes: Mutex<HashMap<ItemId, Arc<Mutex<ItemScope>>>>,
    event_tx: broadcast::Sender<MonitorMessage>,
}

/// One item's engine. A retired scope has been forgotten and must not run
/// further cycles.
struct ItemScope {
    engine: MonitorEngine,
    retired: bool,
}

impl Monitor {
    /// Validates `config` and creates a monitor that reads time from `clock`.
    pub fn new(config: MonitorConfig, clock: Arc<dyn Clock>) -> Result<Self, EngineError> {
        configuration::validate(&config)?;
        let policy = Arc::new(RuleBasedClassifier::new(config.severity.clone())?);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::info!(seller_id = %config.seller_id, "monitor created");
        Ok(Self {
            config: Arc::new(config),
            policy,
            clock,
            scopes: Mutex::new(HashMap::new()),
            event_tx,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorMessage> {
        self.event_tx.subscribe()
    }

    /// Runs one cycle for the item at the clock's current time.
    ///
    /// The clock is read only once the item's lock is held, so queued cycles
    /// for the same item always see non-decreasing times.
    pub async fn ingest(
        &self,
        item_id: &str,
        snapshot: &Snapshot,
        inputs: IngestInputs,
    ) -> Result<ItemAssessment, EngineError> {
        self.run_cycle(item_id, snapshot, None, inputs).await
    }

    /// Runs one cycle for the item at an explicit time, e.g. when replaying
    /// recorded snapshots.
    pub async fn ingest_at(
        &self,
        item_id: &str,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
        inputs: IngestInputs,
    ) -> Result<ItemAssessment, EngineError> {
        self.run_cycle(item_id, snapshot, Some(now), inputs).await
    }

    /// Drops all state for an item that is no longer polled.
    ///
    /// Waits for the item's in-flight cycle, so its messages always precede
    /// `ItemForgotten`. Cycles queued behind this call start from fresh state.
    pub async fn forget(&self, item_id: &str) -> bool {
        let mut scopes = self.scopes.lock().await;
        let Some(scope) = scopes.remove(item_id) else {
            return false;
        };
        scope.lock().await.retired = true;
        drop(scopes);

        tracing::info!(item_id, "item forgotten");
        let _ = self.event_tx.send(MonitorMessage::ItemForgotten {
            item_id: item_id.to_string(),
        });
        true
    }

    /// Items with live state, in no particular order.
    pub async fn items(&self) -> Vec<ItemId> {
        self.scopes.lock().await.keys().cloned().collect()
    }

    async fn run_cycle(
        &self,
        item_id: &str,
        snapshot: &Snapshot,
        at: Option<DateTime<Utc>>,
        inputs: IngestInputs,
    ) -> Result<ItemAssessment, EngineError> {
        loop {
            let scope = self.scope(item_id).await?;
            let mut guard = scope.lock().await;
            if guard.retired {
                // Forgotten while this cycle waited; pick up the fresh scope.
                continue;
            }
            let now = at.unwrap_or_else(|| self.clock.now());
            let assessment = guard.engine.ingest(item_id, snapshot, now, inputs)?;

            // Published under the item lock so a concurrent forget is ordered after it.
            self.publish(&assessment);
            return Ok(assessment);
        }
    }

    async fn scope(&self, item_id: &str) -> Result<Arc<Mutex<ItemScope>>, EngineError> {
        let mut scopes = self.scopes.lock().await;
        if let Some(scope) = scopes.get(item_id) {
            return Ok(Arc::clone(scope));
        }

        let engine = MonitorEngine::with_policy(&self.config, Arc::clone(&self.policy))?;
        let scope = Arc::new(Mutex::new(ItemScope {
            engine,
            retired: false,
        }));
        scopes.insert(item_id.to_string(), Arc::clone(&scope));
        tracing::debug!(item_id, items = scopes.len(), "started monitoring item");
        Ok(scope)
    }

    fn publish(&self, assessment: &ItemAssessment) {
        let alert = alert_for(assessment);
        // Sending only fails when nobody is subscribed.
        let _ = self
            .event_tx
            .send(MonitorMessage::Assessment(Box::new(assessment.clone())));
        if let Some(alert) = alert {
            let _ = self.event_tx.send(MonitorMessage::Alert(alert));
        }
    }
}
