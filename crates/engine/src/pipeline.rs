use crate::error::EngineError;
use analytics::{OfferNormalizer, TargetCalculator};
use chrono::{DateTime, Utc};
use configuration::MonitorConfig;
use core_types::{HistoricalObservation, ItemId, SeverityLevel, Snapshot};
use events::ItemAssessment;
use rust_decimal::Decimal;
use serde::Deserialize;
use severity::{RuleBasedClassifier, SeverityInputs, SeverityPolicy};
use std::collections::HashMap;
use std::sync::Arc;
use tracking::{HistoricalStore, StabilityTracker, TrendDetector};

/// Optional per-cycle inputs supplied by collaborators outside the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct IngestInputs {
    /// Estimated margin percentage at your current price.
    pub margin_pct: Option<Decimal>,
    /// Overrides the best rank carried by the snapshot's sales ranks.
    pub best_sales_rank: Option<u32>,
}

/// The synchronous monitoring pipeline.
///
/// Each call to [`MonitorEngine::ingest`] runs one full cycle for one item:
///
/// ```text
/// normalize -> targets -> history.record -> stability.update -> trend.detect -> classify
/// ```
///
/// The engine owns the temporal state of every item it has seen. It is not
/// internally synchronized; [`crate::Monitor`] gives each item its own engine
/// behind a lock.
pub struct MonitorEngine {
    normalizer: OfferNormalizer,
    targets: TargetCalculator,
    history: HistoricalStore,
    stability: StabilityTracker,
    trends: TrendDetector,
    policy: Arc<dyn SeverityPolicy>,
    last_severity: HashMap<ItemId, SeverityLevel>,
}

impl MonitorEngine {
    /// Validates `config` and builds an engine with the rule-based classifier.
    pub fn new(config: &MonitorConfig) -> Result<Self, EngineError> {
        let policy = RuleBasedClassifier::new(config.severity.clone())?;
        Self::with_policy(config, Arc::new(policy))
    }

    /// Builds an engine that classifies through `policy`.
    pub fn with_policy(
        config: &MonitorConfig,
        policy: Arc<dyn SeverityPolicy>,
    ) -> Result<Self, EngineError> {
        configuration::validate(config)?;
        Ok(Self {
            normalizer: OfferNormalizer::new(config.seller_id.clone()),
            targets: TargetCalculator::new(&config.targets)?,
            history: HistoricalStore::new(&config.history)?,
            stability: StabilityTracker::new(&config.stability)?,
            trends: TrendDetector::new(&config.trend)?,
            policy,
            last_severity: HashMap::new(),
        })
    }

    /// Runs one monitoring cycle for `item_id`.
    ///
    /// `now` is the observation time recorded in history and used for the
    /// stability and trend clocks; the snapshot's own event time is only
    /// carried through for presentation. A snapshot for another item is
    /// rejected before any state changes.
    pub fn ingest(
        &mut self,
        item_id: &str,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
        inputs: IngestInputs,
    ) -> Result<ItemAssessment, EngineError> {
        if snapshot.item_id != item_id {
            return Err(EngineError::ItemMismatch {
                expected: item_id.to_string(),
                got: snapshot.item_id.clone(),
            });
        }

        let book = self.normalizer.normalize(snapshot);
        let targets = self.targets.calculate(&book);
        let your_price = book.your_landed_price();
        let your_position = book.your_position();
        let has_featured_offer = book.has_featured_offer();
        tracing::debug!(
            item_id,
            offers = book.offer_count(),
            rejected = book.rejected(),
            ?your_price,
            ?your_position,
            market_low = ?targets.market_low,
            "normalized snapshot"
        );

        self.history.record(
            item_id,
            HistoricalObservation {
                item_id: item_id.to_string(),
                timestamp: now,
                offer_count: book.offer_count(),
                your_position,
                has_featured_offer,
                your_price,
                market_low: targets.market_low,
                competitor_count: book.competitor_count(),
            },
        )?;

        let stability = self
            .stability
            .update(item_id, has_featured_offer, your_position, now)?
            .clone();

        let trend_is_new = self.trends.detect(item_id, &self.history, now).is_some();
        let trend = self.trends.live_signal(item_id, now).cloned();

        let best_sales_rank = inputs
            .best_sales_rank
            .or_else(|| snapshot.best_sales_rank());

        let classification = self.policy.classify(&SeverityInputs {
            your_landed_price: your_price,
            targets: &targets,
            your_position,
            offer_count: book.offer_count(),
            has_featured_offer,
            best_sales_rank,
            margin_pct: inputs.margin_pct,
            stability: Some(&stability),
            live_trend: trend.as_ref(),
        });

        let previous_severity = self
            .last_severity
            .insert(item_id.to_string(), classification.level);
        if previous_severity != Some(classification.level) {
            tracing::info!(
                item_id,
                from = ?previous_severity,
                to = %classification.level,
                reason = ?classification.reason,
                "severity changed"
            );
        }

        Ok(ItemAssessment {
            item_id: item_id.to_string(),
            event_time: snapshot.event_time,
            assessed_at: now,
            severity: classification.level,
            previous_severity,
            reason: classification.reason,
            applied_override: classification.applied_override,
            targets,
            your_price,
            your_position,
            offer_count: book.offer_count(),
            has_featured_offer,
            best_sales_rank,
            gap_percentage: classification.gap_percentage,
            stability,
            trend,
            trend_is_new,
        })
    }

    /// The severity the item ended its last cycle on.
    pub fn last_severity(&self, item_id: &str) -> Option<SeverityLevel> {
        self.last_severity.get(item_id).copied()
    }

    pub fn history(&self) -> &HistoricalStore {
        &self.history
    }

    /// Drops every piece of state held for the item.
    pub fn forget(&mut self, item_id: &str) -> bool {
        let had_history = self.history.forget(item_id);
        let had_stability = self.stability.forget(item_id);
        let had_trend = self.trends.forget(item_id);
        let had_severity = self.last_severity.remove(item_id).is_some();
        had_history || had_stability || had_trend || had_severity
    }
}
