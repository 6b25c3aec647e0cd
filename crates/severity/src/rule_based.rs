use crate::error::SeverityError;
use crate::{Classification, SeverityInputs, SeverityPolicy};
use configuration::SeverityParams;
use core_types::{SeverityLevel, SeverityOverride, SeverityReason};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// The ordered guard-clause classifier.
///
/// Rules are evaluated top to bottom and the first match wins:
///
/// 1. Best sales rank worse than `low_priority_rank` skips rules 2 and 3.
/// 2. `critical`: gap > `critical_gap_pct`, no featured offer, outside the top tier.
/// 3. `critical`: gap > `extreme_gap_pct`.
/// 4. `high`: featured offer held at a margin below `min_margin_pct`.
/// 5. `high`: gap > `high_gap_pct` and no featured offer.
/// 6. `high`: no featured offer, inside the top tier, more than
///    `near_miss_min_offers` offers.
/// 7. `warning`: gap > `warning_gap_pct`, or outside the top positions with more
///    than `crowded_min_offers` offers.
/// 8. `good`.
///
/// Then `good` becomes `stable` for a locked-in item, and `warning` becomes
/// `high` while a trend signal is live. All thresholds are strict.
#[derive(Debug, Clone)]
pub struct RuleBasedClassifier {
    params: SeverityParams,
}

impl RuleBasedClassifier {
    /// Creates a new `RuleBasedClassifier`, checking the thresholds are coherent.
    pub fn new(params: SeverityParams) -> Result<Self, SeverityError> {
        if params.top_tier_fraction <= dec!(0) || params.top_tier_fraction > dec!(1) {
            return Err(SeverityError::InvalidParameters(
                "top_tier_fraction must be in (0, 1]".to_string(),
            ));
        }
        if params.critical_gap_pct > params.extreme_gap_pct {
            return Err(SeverityError::InvalidParameters(
                "critical_gap_pct must not exceed extreme_gap_pct".to_string(),
            ));
        }
        if params.warning_gap_pct > params.high_gap_pct {
            return Err(SeverityError::InvalidParameters(
                "warning_gap_pct must not exceed high_gap_pct".to_string(),
            ));
        }
        if params.top_positions == 0 {
            return Err(SeverityError::InvalidParameters(
                "top_positions must be at least 1".to_string(),
            ));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &SeverityParams {
        &self.params
    }

    /// Position within the best `top_tier_fraction` of all offers.
    fn in_top_tier(&self, position: Option<u32>, offer_count: usize) -> bool {
        match position {
            Some(p) if offer_count > 0 => {
                Decimal::from(p) <= self.params.top_tier_fraction * Decimal::from(offer_count)
            }
            _ => false,
        }
    }

    fn in_top_positions(&self, position: Option<u32>) -> bool {
        position.is_some_and(|p| p <= self.params.top_positions)
    }

    fn base_rule(&self, inputs: &SeverityInputs<'_>, gap: Decimal) -> (SeverityLevel, SeverityReason) {
        let p = &self.params;
        let featured = inputs.has_featured_offer;
        let top_tier = self.in_top_tier(inputs.your_position, inputs.offer_count);

        let low_priority = inputs
            .best_sales_rank
            .is_some_and(|rank| rank > p.low_priority_rank);

        if low_priority {
            tracing::debug!(
                rank = ?inputs.best_sales_rank,
                "low-priority item, skipping critical gap rules"
            );
        } else {
            if gap > p.critical_gap_pct && !featured && !top_tier {
                return (SeverityLevel::Critical, SeverityReason::GapOutsideTopTier);
            }
            if gap > p.extreme_gap_pct {
                return (SeverityLevel::Critical, SeverityReason::ExtremeGap);
            }
        }

        if featured && inputs.margin_pct.is_some_and(|m| m < p.min_margin_pct) {
            return (SeverityLevel::High, SeverityReason::ThinMargin);
        }

        if gap > p.high_gap_pct && !featured {
            return (SeverityLevel::High, SeverityReason::GapWithoutFeaturedOffer);
        }

        if !featured && top_tier && inputs.offer_count > p.near_miss_min_offers {
            return (SeverityLevel::High, SeverityReason::RecoverableNearMiss);
        }

        let crowded_out =
            !self.in_top_positions(inputs.your_position) && inputs.offer_count > p.crowded_min_offers;
        if gap > p.warning_gap_pct || crowded_out {
            return (SeverityLevel::Warning, SeverityReason::DriftingFromTop);
        }

        (SeverityLevel::Good, SeverityReason::Competitive)
    }
}

impl SeverityPolicy for RuleBasedClassifier {
    fn classify(&self, inputs: &SeverityInputs<'_>) -> Classification {
        let gap = inputs
            .targets
            .gap_percentage(inputs.your_landed_price)
            .unwrap_or(Decimal::ZERO);

        let (base_level, reason) = self.base_rule(inputs, gap);

        let locked_in = inputs.stability.is_some_and(|s| s.is_stable);
        let (level, applied_override) = match base_level {
            SeverityLevel::Good if locked_in => {
                (SeverityLevel::Stable, Some(SeverityOverride::LockedIn))
            }
            SeverityLevel::Warning if inputs.live_trend.is_some() => {
                (SeverityLevel::High, Some(SeverityOverride::TrendEscalation))
            }
            other => (other, None),
        };

        tracing::debug!(
            %gap,
            base = %base_level,
            level = %level,
            ?reason,
            ?applied_override,
            "classified"
        );

        Classification {
            level,
            base_level,
            reason,
            applied_override,
            gap_percentage: gap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::{CompetitiveTargets, StabilityState, TrendKind, TrendSignal};

    fn classifier() -> RuleBasedClassifier {
        RuleBasedClassifier::new(SeverityParams::default()).unwrap()
    }

    fn targets(low: Decimal) -> CompetitiveTargets {
        CompetitiveTargets {
            market_low: Some(low),
            lowest_comparable_fulfillment: None,
            second_lowest: Some(low),
            competitive_floor: Some(low * dec!(0.8)),
        }
    }

    struct Case {
        price: Option<Decimal>,
        low: Decimal,
        position: Option<u32>,
        offers: usize,
        featured: bool,
        rank: Option<u32>,
        margin: Option<Decimal>,
    }

    impl Default for Case {
        fn default() -> Self {
            Self {
                price: Some(dec!(20)),
                low: dec!(20),
                position: Some(1),
                offers: 1,
                featured: true,
                rank: None,
                margin: None,
            }
        }
    }

    fn run(case: Case) -> Classification {
        run_with(case, None, None)
    }

    fn run_with(
        case: Case,
        stability: Option<&StabilityState>,
        trend: Option<&TrendSignal>,
    ) -> Classification {
        let t = targets(case.low);
        classifier().classify(&SeverityInputs {
            your_landed_price: case.price,
            targets: &t,
            your_position: case.position,
            offer_count: case.offers,
            has_featured_offer: case.featured,
            best_sales_rank: case.rank,
            margin_pct: case.margin,
            stability,
            live_trend: trend,
        })
    }

    fn stable_state() -> StabilityState {
        let mut s = StabilityState::new("A".to_string());
        s.is_stable = true;
        s
    }

    fn trend() -> TrendSignal {
        TrendSignal {
            item_id: "A".to_string(),
            kind: TrendKind::CompetitorSurge,
            message: "competitors rose from 4 to 8".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn sole_featured_seller_is_good() {
        let c = run(Case::default());
        assert_eq!(c.level, SeverityLevel::Good);
        assert_eq!(c.reason, SeverityReason::Competitive);
    }

    #[test]
    fn locked_in_good_becomes_stable() {
        let state = stable_state();
        let c = run_with(Case::default(), Some(&state), None);
        assert_eq!(c.level, SeverityLevel::Stable);
        assert_eq!(c.base_level, SeverityLevel::Good);
        assert_eq!(c.applied_override, Some(SeverityOverride::LockedIn));
    }

    #[test]
    fn rule_two_critical_above_fifty_outside_top_tier() {
        let c = run(Case {
            price: Some(dec!(30.01)),
            position: Some(8),
            offers: 10,
            featured: false,
            ..Case::default()
        });
        assert_eq!(c.level, SeverityLevel::Critical);
        assert_eq!(c.reason, SeverityReason::GapOutsideTopTier);
    }

    #[test]
    fn exactly_fifty_percent_does_not_trigger_rule_two() {
        let c = run(Case {
            price: Some(dec!(30)),
            position: Some(8),
            offers: 10,
            featured: false,
            ..Case::default()
        });
        assert_eq!(c.gap_percentage, dec!(50));
        assert_eq!(c.level, SeverityLevel::High);
        assert_eq!(c.reason, SeverityReason::GapWithoutFeaturedOffer);
    }

    #[test]
    fn rule_two_needs_position_outside_top_tier() {
        let c = run(Case {
            price: Some(dec!(31)),
            position: Some(2),
            offers: 10,
            featured: false,
            ..Case::default()
        });
        assert_eq!(c.reason, SeverityReason::GapWithoutFeaturedOffer);
    }

    #[test]
    fn rule_three_critical_even_with_featured_offer() {
        let c = run(Case {
            price: Some(dec!(35.01)),
            ..Case::default()
        });
        assert_eq!(c.level, SeverityLevel::Critical);
        assert_eq!(c.reason, SeverityReason::ExtremeGap);

        let boundary = run(Case {
            price: Some(dec!(35)),
            ..Case::default()
        });
        assert_eq!(boundary.gap_percentage, dec!(75));
        assert_ne!(boundary.level, SeverityLevel::Critical);
    }

    #[test]
    fn low_priority_rank_suppresses_critical() {
        let c = run(Case {
            price: Some(dec!(24.40)),
            position: Some(8),
            offers: 10,
            featured: false,
            rank: Some(500_000),
            ..Case::default()
        });
        assert_eq!(c.gap_percentage, dec!(22));
        assert_eq!(c.level, SeverityLevel::High);
        assert_eq!(c.reason, SeverityReason::GapWithoutFeaturedOffer);

        let huge_gap = run(Case {
            price: Some(dec!(60)),
            rank: Some(500_000),
            ..Case::default()
        });
        assert_ne!(huge_gap.level, SeverityLevel::Critical);
    }

    #[test]
    fn rank_at_threshold_is_not_low_priority() {
        let c = run(Case {
            price: Some(dec!(36)),
            rank: Some(200_000),
            ..Case::default()
        });
        assert_eq!(c.level, SeverityLevel::Critical);
    }

    #[test]
    fn rule_four_thin_margin_while_featured() {
        let c = run(Case {
            margin: Some(dec!(9.5)),
            ..Case::default()
        });
        assert_eq!(c.level, SeverityLevel::High);
        assert_eq!(c.reason, SeverityReason::ThinMargin);

        let at_threshold = run(Case {
            margin: Some(dec!(10)),
            ..Case::default()
        });
        assert_eq!(at_threshold.level, SeverityLevel::Good);
    }

    #[test]
    fn rule_four_skipped_without_margin_input() {
        let c = run(Case {
            margin: None,
            ..Case::default()
        });
        assert_eq!(c.level, SeverityLevel::Good);
    }

    #[test]
    fn rule_five_boundary_at_twenty_percent() {
        let over = run(Case {
            price: Some(dec!(24.01)),
            position: Some(4),
            offers: 4,
            featured: false,
            ..Case::default()
        });
        assert_eq!(over.reason, SeverityReason::GapWithoutFeaturedOffer);

        let at = run(Case {
            price: Some(dec!(24)),
            position: Some(4),
            offers: 4,
            featured: false,
            ..Case::default()
        });
        assert_eq!(at.level, SeverityLevel::Warning);
    }

    #[test]
    fn rule_six_recoverable_near_miss() {
        let c = run(Case {
            price: Some(dec!(20)),
            position: Some(1),
            offers: 6,
            featured: false,
            ..Case::default()
        });
        assert_eq!(c.level, SeverityLevel::High);
        assert_eq!(c.reason, SeverityReason::RecoverableNearMiss);

        let five_offers = run(Case {
            price: Some(dec!(20)),
            position: Some(1),
            offers: 5,
            featured: false,
            ..Case::default()
        });
        assert_eq!(five_offers.level, SeverityLevel::Good);
    }

    #[test]
    fn rule_seven_warning_on_small_gap_or_crowding() {
        let small_gap = run(Case {
            price: Some(dec!(21.01)),
            ..Case::default()
        });
        assert_eq!(small_gap.level, SeverityLevel::Warning);

        let at_five = run(Case {
            price: Some(dec!(21)),
            ..Case::default()
        });
        assert_eq!(at_five.level, SeverityLevel::Good);

        let crowded = run(Case {
            position: Some(4),
            offers: 4,
            ..Case::default()
        });
        assert_eq!(crowded.level, SeverityLevel::Warning);
    }

    #[test]
    fn live_trend_upgrades_warning_only() {
        let signal = trend();
        let warning = run_with(
            Case {
                position: Some(4),
                offers: 4,
                ..Case::default()
            },
            None,
            Some(&signal),
        );
        assert_eq!(warning.level, SeverityLevel::High);
        assert_eq!(warning.base_level, SeverityLevel::Warning);
        assert_eq!(warning.applied_override, Some(SeverityOverride::TrendEscalation));

        let good = run_with(Case::default(), None, Some(&signal));
        assert_eq!(good.level, SeverityLevel::Good);
    }

    #[test]
    fn no_offer_counts_as_zero_gap() {
        let c = run(Case {
            price: None,
            position: None,
            offers: 2,
            featured: false,
            ..Case::default()
        });
        assert_eq!(c.gap_percentage, Decimal::ZERO);
        assert_eq!(c.level, SeverityLevel::Good);

        let crowded = run(Case {
            price: None,
            position: None,
            offers: 4,
            featured: false,
            ..Case::default()
        });
        assert_eq!(crowded.level, SeverityLevel::Warning);
    }

    #[test]
    fn rejects_inverted_gap_thresholds() {
        let params = SeverityParams {
            critical_gap_pct: dec!(80),
            ..SeverityParams::default()
        };
        assert!(RuleBasedClassifier::new(params).is_err());
    }
}
