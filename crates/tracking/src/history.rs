use crate::error::TrackingError;
use chrono::{DateTime, Duration, Utc};
use configuration::HistoryParams;
use core_types::{HistoricalObservation, ItemId};
use std::collections::{HashMap, VecDeque};

/// Rolling per-item history of observations.
///
/// Observations must arrive in non-decreasing timestamp order per item. The
/// store never sorts; an older observation is rejected so the window stays
/// intact.
#[derive(Debug, Clone)]
pub struct HistoricalStore {
    retention: Duration,
    series: HashMap<ItemId, VecDeque<HistoricalObservation>>,
}

impl HistoricalStore {
    pub fn new(params: &HistoryParams) -> Result<Self, TrackingError> {
        let retention = params.retention_window();
        if retention <= Duration::zero() {
            return Err(TrackingError::InvalidParameters(
                "history retention must be positive".to_string(),
            ));
        }
        Ok(Self {
            retention,
            series: HashMap::new(),
        })
    }

    /// Appends `observation`, then evicts everything for the item older than
    /// the retention window measured back from the new observation.
    pub fn record(
        &mut self,
        item_id: &str,
        observation: HistoricalObservation,
    ) -> Result<(), TrackingError> {
        if observation.item_id != item_id {
            return Err(TrackingError::ItemMismatch {
                expected: item_id.to_string(),
                got: observation.item_id,
            });
        }

        let series = self.series.entry(item_id.to_string()).or_default();
        if let Some(latest) = series.back() {
            if observation.timestamp < latest.timestamp {
                return Err(TrackingError::OutOfOrder {
                    item_id: item_id.to_string(),
                    latest: latest.timestamp,
                    got: observation.timestamp,
                });
            }
        }

        let cutoff = observation.timestamp - self.retention;
        series.push_back(observation);
        let evicted = evict_older_than(series, cutoff);
        if evicted > 0 {
            tracing::debug!(item_id, evicted, retained = series.len(), "evicted stale observations");
        }
        Ok(())
    }

    /// The last `n` observations for the item in chronological order, or fewer
    /// when the history is shorter.
    pub fn recent(&self, item_id: &str, n: usize) -> Vec<&HistoricalObservation> {
        let Some(series) = self.series.get(item_id) else {
            return Vec::new();
        };
        let skip = series.len().saturating_sub(n);
        series.iter().skip(skip).collect()
    }

    pub fn len(&self, item_id: &str) -> usize {
        self.series.get(item_id).map_or(0, |s| s.len())
    }

    /// Drops all history for an item that is no longer monitored.
    pub fn forget(&mut self, item_id: &str) -> bool {
        self.series.remove(item_id).is_some()
    }
}

fn evict_older_than(series: &mut VecDeque<HistoricalObservation>, cutoff: DateTime<Utc>) -> usize {
    let mut evicted = 0;
    while series.front().is_some_and(|front| front.timestamp < cutoff) {
        series.pop_front();
        evicted += 1;
    }
    evicted
}
