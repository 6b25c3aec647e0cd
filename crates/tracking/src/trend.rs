use crate::error::TrackingError;
use crate::history::HistoricalStore;
use chrono::{DateTime, Duration, Utc};
use configuration::TrendParams;
use core_types::{HistoricalObservation, ItemId, TrendKind, TrendSignal};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Trend Detector
///
/// Compares the **oldest** and **newest** observation in the most recent
/// sub-window of an item's history:
///
/// ```text
/// competitor surge : newest.competitors >= oldest.competitors + surge
/// position decline : newest.position    >= oldest.position    + decline
/// price war        : (oldest.low - newest.low) / oldest.low    > drop
/// ```
///
/// When several conditions hold at once the most actionable wins:
/// price war, then competitor surge, then position decline.
///
/// At most one signal is kept per item. A fresh detection replaces whatever
/// was stored; a cycle with no detection leaves the old signal to age out.
#[derive(Debug, Clone)]
pub struct TrendDetector {
    window: usize,
    signal_ttl: Duration,
    competitor_surge: usize,
    position_decline: u32,
    price_war_drop: Decimal,
    signals: HashMap<ItemId, TrendSignal>,
}

impl TrendDetector {
    pub fn new(params: &TrendParams) -> Result<Self, TrackingError> {
        if params.window < 2 {
            return Err(TrackingError::InvalidParameters(
                "trend window must hold at least two observations".to_string(),
            ));
        }
        if params.competitor_surge == 0 || params.position_decline == 0 {
            return Err(TrackingError::InvalidParameters(
                "competitor_surge and position_decline must be at least one".to_string(),
            ));
        }
        if params.price_war_drop <= Decimal::ZERO {
            return Err(TrackingError::InvalidParameters(
                "price_war_drop must be positive".to_string(),
            ));
        }
        Ok(Self {
            window: params.window,
            signal_ttl: params.signal_lifetime(),
            competitor_surge: params.competitor_surge as usize,
            position_decline: params.position_decline,
            price_war_drop: params.price_war_drop,
            signals: HashMap::new(),
        })
    }

    /// Looks for a trend in the item's recent history and stores it.
    ///
    /// Returns the newly detected signal, or `None` when nothing was detected
    /// this cycle (including when fewer than two observations exist).
    pub fn detect(
        &mut self,
        item_id: &str,
        store: &HistoricalStore,
        now: DateTime<Utc>,
    ) -> Option<&TrendSignal> {
        let recent = store.recent(item_id, self.window);
        let (oldest, newest) = match recent.as_slice() {
            [oldest, .., newest] => (*oldest, *newest),
            _ => return None,
        };

        let (kind, message) = self.evaluate(oldest, newest)?;
        tracing::warn!(item_id, kind = %kind, %message, "trend detected");

        let signal = TrendSignal {
            item_id: item_id.to_string(),
            kind,
            message,
            timestamp: now,
        };
        self.signals.insert(item_id.to_string(), signal);
        self.signals.get(item_id)
    }

    /// The stored signal for the item if it is still live at `now`.
    pub fn live_signal(&self, item_id: &str, now: DateTime<Utc>) -> Option<&TrendSignal> {
        self.signals
            .get(item_id)
            .filter(|s| s.is_live(now, self.signal_ttl))
    }

    pub fn forget(&mut self, item_id: &str) -> bool {
        self.signals.remove(item_id).is_some()
    }

    fn evaluate(
        &self,
        oldest: &HistoricalObservation,
        newest: &HistoricalObservation,
    ) -> Option<(TrendKind, String)> {
        if let (Some(old_low), Some(new_low)) = (oldest.market_low, newest.market_low) {
            if old_low > Decimal::ZERO {
                let drop = (old_low - new_low) / old_low;
                if drop > self.price_war_drop {
                    let pct = (drop * Decimal::ONE_HUNDRED).round_dp(1);
                    return Some((
                        TrendKind::PriceWar,
                        format!("market low fell {pct}% from {old_low} to {new_low}"),
                    ));
                }
            }
        }

        let surge_at = oldest.competitor_count.saturating_add(self.competitor_surge);
        if newest.competitor_count >= surge_at {
            return Some((
                TrendKind::CompetitorSurge,
                format!(
                    "competitors rose from {} to {}",
                    oldest.competitor_count, newest.competitor_count
                ),
            ));
        }

        if let (Some(old_pos), Some(new_pos)) = (oldest.your_position, newest.your_position) {
            if new_pos >= old_pos.saturating_add(self.position_decline) {
                return Some((
                    TrendKind::PositionDecline,
                    format!("position fell from {old_pos} to {new_pos}"),
                ));
            }
        }

        None
    }
}
