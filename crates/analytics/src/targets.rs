use crate::error::AnalyticsError;
use crate::normalizer::OfferBook;
use configuration::TargetParams;
use core_types::CompetitiveTargets;
use rust_decimal::Decimal;

/// A stateless calculator for the price targets of one offer book.
#[derive(Debug, Clone)]
pub struct TargetCalculator {
    floor_ratio: Decimal,
}

impl TargetCalculator {
    pub fn new(params: &TargetParams) -> Result<Self, AnalyticsError> {
        if params.floor_ratio <= Decimal::ZERO || params.floor_ratio > Decimal::ONE {
            return Err(AnalyticsError::InvalidParameters(format!(
                "floor_ratio must be in (0, 1], got {}",
                params.floor_ratio
            )));
        }
        Ok(Self {
            floor_ratio: params.floor_ratio,
        })
    }

    /// Derives market low, comparable-fulfillment low, second lowest and floor.
    ///
    /// An empty book yields all-`None` targets. With a single offer the second
    /// lowest equals the market low. Equal prices are counted separately, so
    /// two offers at the market low make the second lowest equal to it too.
    pub fn calculate(&self, book: &OfferBook) -> CompetitiveTargets {
        let mut prices: Vec<Decimal> = book.landed_prices().collect();
        if prices.is_empty() {
            return CompetitiveTargets::default();
        }
        prices.sort();

        let market_low = prices[0];
        let second_lowest = prices.get(1).copied().unwrap_or(market_low);

        let lowest_comparable_fulfillment = book
            .offers()
            .iter()
            .filter(|o| o.offer.has_comparable_fulfillment())
            .map(|o| o.landed_price)
            .min();

        CompetitiveTargets {
            market_low: Some(market_low),
            lowest_comparable_fulfillment,
            second_lowest: Some(second_lowest),
            competitive_floor: Some(market_low * self.floor_ratio),
        }
    }
}

impl Default for TargetCalculator {
    fn default() -> Self {
        Self {
            floor_ratio: TargetParams::default().floor_ratio,
        }
    }
}
