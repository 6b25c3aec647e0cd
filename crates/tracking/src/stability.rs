use crate::error::TrackingError;
use chrono::{DateTime, Duration, Utc};
use configuration::StabilityParams;
use core_types::{ItemId, StabilityState};
use std::collections::HashMap;

/// Accumulates "locked-in" streaks per item.
///
/// Streaks grow by the time elapsed since the previous update while their
/// condition holds and reset to zero the moment it fails. A missed poll does
/// not break a streak; only losing the condition does. Each update is O(1).
#[derive(Debug, Clone)]
pub struct StabilityTracker {
    required: Duration,
    top_positions: u32,
    states: HashMap<ItemId, StabilityState>,
}

impl StabilityTracker {
    pub fn new(params: &StabilityParams) -> Result<Self, TrackingError> {
        let required = params.required_streak();
        if required <= Duration::zero() {
            return Err(TrackingError::InvalidParameters(
                "stability requirement must be positive".to_string(),
            ));
        }
        if params.top_positions == 0 {
            return Err(TrackingError::InvalidParameters(
                "stability top_positions must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            required,
            top_positions: params.top_positions,
            states: HashMap::new(),
        })
    }

    /// Folds one observation into the item's streaks.
    ///
    /// `position` is `None` when you had no offer, which breaks the
    /// top-positions streak.
    pub fn update(
        &mut self,
        item_id: &str,
        has_featured_offer: bool,
        position: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<&StabilityState, TrackingError> {
        let state = self
            .states
            .entry(item_id.to_string())
            .or_insert_with(|| StabilityState::new(item_id.to_string()));

        let elapsed = match state.last_observed_at {
            Some(last) if now < last => {
                return Err(TrackingError::OutOfOrder {
                    item_id: item_id.to_string(),
                    latest: last,
                    got: now,
                });
            }
            Some(last) => now - last,
            None => Duration::zero(),
        };

        if has_featured_offer {
            state.featured_offer_streak += elapsed;
        } else {
            state.featured_offer_streak = Duration::zero();
        }

        if position.is_some_and(|p| p <= self.top_positions) {
            state.top_three_streak += elapsed;
        } else {
            state.top_three_streak = Duration::zero();
        }

        let was_stable = state.is_stable;
        state.is_stable =
            state.featured_offer_streak >= self.required && state.top_three_streak >= self.required;
        state.last_observed_at = Some(now);

        if state.is_stable != was_stable {
            tracing::info!(item_id, is_stable = state.is_stable, "stability changed");
        }

        Ok(state)
    }

    pub fn get(&self, item_id: &str) -> Option<&StabilityState> {
        self.states.get(item_id)
    }

    pub fn forget(&mut self, item_id: &str) -> bool {
        self.states.remove(item_id).is_some()
    }
}
