use crate::error::AlerterError;
use crate::grouping::{SeverityGroup, SeveritySummary, group_by_severity};
use core_types::ItemId;
use events::{AlertRecord, ItemAssessment, MonitorMessage};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

const DEFAULT_ALERT_CAPACITY: usize = 500;

/// The latest assessment per item plus a bounded log of recent alerts.
#[derive(Debug, Clone)]
pub struct AlertBoard {
    latest: HashMap<ItemId, ItemAssessment>,
    alerts: VecDeque<AlertRecord>,
    alert_capacity: usize,
}

#[derive(Serialize)]
struct BoardView<'a> {
    summary: SeveritySummary,
    groups: Vec<SeverityGroup<'a>>,
    alerts: &'a VecDeque<AlertRecord>,
}

impl AlertBoard {
    pub fn new() -> Self {
        Self::with_alert_capacity(DEFAULT_ALERT_CAPACITY)
    }

    /// Keeps at most `capacity` alerts, dropping the oldest first.
    pub fn with_alert_capacity(capacity: usize) -> Self {
        Self {
            latest: HashMap::new(),
            alerts: VecDeque::new(),
            alert_capacity: capacity.max(1),
        }
    }

    pub fn apply(&mut self, message: MonitorMessage) {
        match message {
            MonitorMessage::Assessment(assessment) => {
                self.latest.insert(assessment.item_id.clone(), *assessment);
            }
            MonitorMessage::Alert(alert) => {
                if self.alerts.len() == self.alert_capacity {
                    self.alerts.pop_front();
                }
                self.alerts.push_back(alert);
            }
            MonitorMessage::ItemForgotten { item_id } => {
                self.latest.remove(&item_id);
                self.alerts.retain(|a| a.item_id != item_id);
            }
        }
    }

    pub fn grouped(&self) -> Vec<SeverityGroup<'_>> {
        group_by_severity(self.latest.values())
    }

    pub fn summary(&self) -> SeveritySummary {
        SeveritySummary::from_assessments(self.latest.values())
    }

    pub fn latest(&self, item_id: &str) -> Option<&ItemAssessment> {
        self.latest.get(item_id)
    }

    /// Alerts in the order they were raised.
    pub fn alerts(&self) -> impl Iterator<Item = &AlertRecord> {
        self.alerts.iter()
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    pub fn to_json(&self) -> Result<String, AlerterError> {
        let view = BoardView {
            summary: self.summary(),
            groups: self.grouped(),
            alerts: &self.alerts,
        };
        Ok(serde_json::to_string_pretty(&view)?)
    }
}

impl Default for AlertBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// A long-running listener that folds every broadcast `MonitorMessage` into
/// the shared board. Returns once every sender has been dropped.
pub async fn run_alert_board(
    board: Arc<RwLock<AlertBoard>>,
    mut event_rx: broadcast::Receiver<MonitorMessage>,
) {
    tracing::info!("Alert board started. Listening for monitor messages.");

    loop {
        match event_rx.recv().await {
            Ok(message) => {
                if let MonitorMessage::Alert(alert) = &message {
                    tracing::warn!(
                        item_id = %alert.item_id,
                        severity = %alert.severity,
                        message = %alert.message,
                        "alert raised"
                    );
                }
                board.write().await.apply(message);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!("Alert board lagged, skipped {} messages.", n);
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!("Broadcast channel closed. Alert board shutting down.");
                break;
            }
        }
    }
}
