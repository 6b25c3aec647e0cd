use core_types::{Offer, Snapshot};
use rust_decimal::Decimal;

/// An offer with its landed price worked out and ownership resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOffer {
    pub offer: Offer,
    pub landed_price: Decimal,
    /// The offer belongs to the monitoring seller.
    pub is_yours: bool,
}

/// The uniform competitive picture of one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferBook {
    offers: Vec<NormalizedOffer>,
    /// Index into `offers` of your cheapest offer.
    yours: Option<usize>,
    rejected: usize,
}

impl OfferBook {
    pub fn offers(&self) -> &[NormalizedOffer] {
        &self.offers
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn offer_count(&self) -> usize {
        self.offers.len()
    }

    /// Offers from any seller other than you.
    pub fn competitor_count(&self) -> usize {
        self.offers.iter().filter(|o| !o.is_yours).count()
    }

    /// Offers dropped for carrying negative prices.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn your_offer(&self) -> Option<&NormalizedOffer> {
        self.yours.map(|i| &self.offers[i])
    }

    pub fn your_landed_price(&self) -> Option<Decimal> {
        self.your_offer().map(|o| o.landed_price)
    }

    /// Your 1-based rank by landed price. Offers at the same price share a rank.
    pub fn your_position(&self) -> Option<u32> {
        let yours = self.your_landed_price()?;
        let cheaper = self
            .offers
            .iter()
            .filter(|o| o.landed_price < yours)
            .count();
        Some(cheaper as u32 + 1)
    }

    /// True when the marketplace features any of your offers, not only the
    /// cheapest one.
    pub fn has_featured_offer(&self) -> bool {
        self.offers
            .iter()
            .any(|o| o.is_yours && o.offer.is_featured_offer)
    }

    pub fn landed_prices(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.offers.iter().map(|o| o.landed_price)
    }
}

/// Turns raw snapshots into [`OfferBook`]s for one seller.
#[derive(Debug, Clone)]
pub struct OfferNormalizer {
    seller_id: String,
}

impl OfferNormalizer {
    pub fn new(seller_id: impl Into<String>) -> Self {
        Self {
            seller_id: seller_id.into(),
        }
    }

    pub fn seller_id(&self) -> &str {
        &self.seller_id
    }

    /// Computes landed prices and finds your offer.
    ///
    /// Offers with a negative listing or shipping price are dropped rather than
    /// failing the whole snapshot. When you have several offers on the same
    /// listing, the cheapest one represents you.
    pub fn normalize(&self, snapshot: &Snapshot) -> OfferBook {
        let mut book = OfferBook::default();

        for offer in &snapshot.offers {
            let negative_shipping = offer.shipping_price.is_some_and(|s| s.is_sign_negative());
            if offer.listing_price.is_sign_negative() || negative_shipping {
                tracing::warn!(
                    item_id = %snapshot.item_id,
                    seller_id = %offer.seller_id,
                    "dropping offer with a negative price"
                );
                book.rejected += 1;
                continue;
            }

            let normalized = NormalizedOffer {
                landed_price: offer.landed_price(),
                is_yours: offer.seller_id == self.seller_id,
                offer: offer.clone(),
            };

            if normalized.is_yours {
                let cheaper_than_current = book
                    .your_offer()
                    .is_none_or(|current| normalized.landed_price < current.landed_price);
                if cheaper_than_current {
                    book.yours = Some(book.offers.len());
                }
            }
            book.offers.push(normalized);
        }

        tracing::debug!(
            item_id = %snapshot.item_id,
            offers = book.offer_count(),
            has_own_offer = book.yours.is_some(),
            "normalized snapshot"
        );
        book
    }
}
