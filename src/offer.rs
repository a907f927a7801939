//! Offer entity, draft builder and auction lead bookkeeping

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::category::Category;
use crate::error::{MarketError, Result};
use crate::utils;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl Ord for TimeStamp<Utc> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for TimeStamp<Utc> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .unwrap()
            .into()
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
    /// Shift by a signed duration. Used for expiry windows.
    pub fn offset(&self, d: Duration) -> Self {
        Self(self.0 + d)
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> std::result::Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(
        d: &mut minicbor::Decoder<'b>,
        _: &mut C,
    ) -> std::result::Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferType {
    /// Buyers send counter-proposals; the seller picks one.
    #[n(0)]
    Negotiable,
    /// Buyers bid against each other inside a time window.
    #[n(1)]
    Auction,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferStatus {
    #[n(0)]
    Active,
    #[n(1)]
    Sold,
    #[n(2)]
    Closed,
    #[n(3)]
    Expired,
}

impl OfferStatus {
    /// Status only ever moves forward out of `Active`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, OfferStatus::Active)
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct AuctionWindow {
    #[n(0)]
    pub starts_at: TimeStamp<Utc>,
    #[n(1)]
    pub ends_at: TimeStamp<Utc>,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub seller_id: String,
    #[n(2)]
    pub title: String,
    #[n(3)]
    pub description: String,
    #[n(4)]
    pub images: Vec<String>,
    #[n(5)]
    pub tags: Vec<String>,
    /// Advertised unit price in minor currency units.
    #[n(6)]
    pub base_price: u64,
    #[n(7)]
    pub min_quantity: u64,
    /// Informational only, never reserved or decremented.
    #[n(8)]
    pub available_quantity: u64,
    #[n(9)]
    pub offer_type: OfferType,
    #[n(10)]
    pub status: OfferStatus,
    /// Derived once from the seller's category at creation, never changes.
    #[n(11)]
    pub target_category: Category,
    #[n(12)]
    pub auction: Option<AuctionWindow>,
    /// Leading unit price. Auction only, monotonically increasing.
    #[n(13)]
    pub current_bid: Option<u64>,
    #[n(14)]
    pub current_bidder: Option<String>,
    /// Set once the expiring-soon notification went out.
    #[n(15)]
    pub closing_soon_notified: bool,
    #[n(16)]
    pub created_at: TimeStamp<Utc>,
    #[n(17)]
    pub updated_at: TimeStamp<Utc>,
}

impl Offer {
    pub fn is_active(&self) -> bool {
        self.status == OfferStatus::Active
    }

    pub fn is_auction(&self) -> bool {
        self.offer_type == OfferType::Auction
    }

    pub fn auction_ends(&self) -> Option<&TimeStamp<Utc>> {
        self.auction.as_ref().map(|w| &w.ends_at)
    }

    /// True for an auction whose window has fully elapsed.
    pub fn has_ended(&self, now: &TimeStamp<Utc>) -> bool {
        match self.auction_ends() {
            Some(ends_at) => self.is_auction() && *ends_at <= *now,
            None => false,
        }
    }

    /// True for an auction that is still running but ends within `window`.
    pub fn ends_within(&self, now: &TimeStamp<Utc>, window: Duration) -> bool {
        match self.auction_ends() {
            Some(ends_at) => {
                self.is_auction() && *now < *ends_at && *ends_at <= now.offset(window)
            }
            None => false,
        }
    }

    /// Monotonic compare-and-set on the auction lead: the lead only moves
    /// when `amount` strictly beats it. Returns whether the lead changed.
    /// Callers serialize through the offer row, which is what makes the
    /// read-check-write sequence atomic.
    pub fn record_bid(&mut self, amount: u64, bidder_id: &str) -> bool {
        match self.current_bid {
            Some(current) if amount <= current => false,
            _ => {
                self.current_bid = Some(amount);
                self.current_bidder = Some(bidder_id.to_string());
                true
            }
        }
    }
}

/// Draft for a new offer. Field checks happen in [`OfferDraft::build`], the
/// same place the target category is derived.
#[derive(Debug, Default)]
pub struct OfferDraft {
    title: Option<String>,
    description: Option<String>,
    images: Vec<String>,
    tags: Vec<String>,
    base_price: u64,
    min_quantity: u64,
    available_quantity: u64,
    offer_type: Option<OfferType>,
    auction: Option<AuctionWindow>,
}

impl OfferDraft {
    /// Construct a new builder object, this becomes the basis for a draft
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
    pub fn set_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
    pub fn add_image(mut self, image_ref: &str) -> Self {
        self.images.push(image_ref.to_string());
        self
    }
    pub fn add_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }
    pub fn set_base_price(mut self, price: u64) -> Self {
        self.base_price = price;
        self
    }
    pub fn set_min_quantity(mut self, quantity: u64) -> Self {
        self.min_quantity = quantity;
        self
    }
    pub fn set_available_quantity(mut self, quantity: u64) -> Self {
        self.available_quantity = quantity;
        self
    }
    pub fn set_offer_type(mut self, offer_type: OfferType) -> Self {
        self.offer_type = Some(offer_type);
        self
    }
    pub fn set_auction_window(mut self, starts_at: TimeStamp<Utc>, ends_at: TimeStamp<Utc>) -> Self {
        self.auction = Some(AuctionWindow { starts_at, ends_at });
        self
    }

    /// Checks fields, then assembles the offer row with a fresh id.
    pub fn build(
        self,
        seller_id: &str,
        target_category: Category,
        now: TimeStamp<Utc>,
    ) -> Result<Offer> {
        let title = match self.title {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(MarketError::InvalidDraft("title is required".into())),
        };
        if self.base_price == 0 {
            return Err(MarketError::InvalidDraft("base price must be positive".into()));
        }
        if self.min_quantity == 0 {
            return Err(MarketError::InvalidDraft(
                "minimum order quantity must be positive".into(),
            ));
        }
        if self.available_quantity < self.min_quantity {
            return Err(MarketError::InvalidDraft(
                "available quantity must cover the minimum order quantity".into(),
            ));
        }
        let offer_type = self
            .offer_type
            .ok_or_else(|| MarketError::InvalidDraft("offer type is not set".into()))?;

        match (offer_type, &self.auction) {
            (OfferType::Auction, None) => {
                return Err(MarketError::InvalidDraft(
                    "auctions require a start and end time".into(),
                ));
            }
            (OfferType::Auction, Some(w)) if w.ends_at <= w.starts_at => {
                return Err(MarketError::InvalidDraft(
                    "auction must end after it starts".into(),
                ));
            }
            (OfferType::Negotiable, Some(_)) => {
                return Err(MarketError::InvalidDraft(
                    "negotiable offers take no auction window".into(),
                ));
            }
            _ => {}
        }

        Ok(Offer {
            id: utils::new_offer_id()?,
            seller_id: seller_id.to_string(),
            title,
            description: self.description.unwrap_or_default(),
            images: self.images,
            tags: self.tags,
            base_price: self.base_price,
            min_quantity: self.min_quantity,
            available_quantity: self.available_quantity,
            offer_type,
            status: OfferStatus::Active,
            target_category,
            auction: self.auction,
            current_bid: None,
            current_bidder: None,
            closing_soon_notified: false,
            created_at: now.clone(),
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> OfferDraft {
        OfferDraft::new()
            .set_title("Pallet of olive oil, 1L bottles")
            .set_description("Extra virgin, 12 bottles per case")
            .set_base_price(4_500)
            .set_min_quantity(10)
            .set_available_quantity(400)
            .set_offer_type(OfferType::Negotiable)
    }

    #[test]
    fn timestamp_encoding() {
        let original = TimeStamp::new();

        let encoding = minicbor::to_vec(original.clone()).unwrap();
        let decode: TimeStamp<Utc> = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn offer_encoding_round_trip() {
        let offer = draft()
            .build("user1seller", Category::Fournisseur, TimeStamp::new())
            .unwrap();

        let bytes = minicbor::to_vec(&offer).unwrap();
        let back: Offer = minicbor::decode(&bytes).unwrap();
        assert_eq!(offer, back);
    }

    #[test]
    fn valid_draft_builds_active_offer() {
        let offer = draft()
            .build("user1seller", Category::Fournisseur, TimeStamp::new())
            .unwrap();

        assert_eq!(offer.status, OfferStatus::Active);
        assert_eq!(offer.target_category, Category::Fournisseur);
        assert!(offer.id.starts_with("offer1"));
        assert!(offer.current_bid.is_none());
    }

    #[test]
    fn draft_rejects_missing_title() {
        let res = OfferDraft::new()
            .set_base_price(100)
            .set_min_quantity(1)
            .set_available_quantity(10)
            .set_offer_type(OfferType::Negotiable)
            .build("user1seller", Category::Fournisseur, TimeStamp::new());
        assert!(matches!(res, Err(MarketError::InvalidDraft(_))));
    }

    #[test]
    fn draft_rejects_zero_price_and_quantities() {
        let res = draft()
            .set_base_price(0)
            .build("user1seller", Category::Fournisseur, TimeStamp::new());
        assert!(matches!(res, Err(MarketError::InvalidDraft(_))));

        let res = draft()
            .set_min_quantity(0)
            .build("user1seller", Category::Fournisseur, TimeStamp::new());
        assert!(matches!(res, Err(MarketError::InvalidDraft(_))));

        let res = draft()
            .set_available_quantity(5)
            .build("user1seller", Category::Fournisseur, TimeStamp::new());
        assert!(matches!(res, Err(MarketError::InvalidDraft(_))));
    }

    #[test]
    fn auction_draft_requires_a_forward_window() {
        let res = draft()
            .set_offer_type(OfferType::Auction)
            .build("user1seller", Category::Fournisseur, TimeStamp::new());
        assert!(matches!(res, Err(MarketError::InvalidDraft(_))));

        let starts = TimeStamp::new_with(2026, 8, 1, 12, 0, 0);
        let ends = TimeStamp::new_with(2026, 8, 1, 11, 0, 0);
        let res = draft()
            .set_offer_type(OfferType::Auction)
            .set_auction_window(starts, ends)
            .build("user1seller", Category::Fournisseur, TimeStamp::new());
        assert!(matches!(res, Err(MarketError::InvalidDraft(_))));
    }

    #[test]
    fn record_bid_is_monotonic() {
        let mut offer = draft()
            .build("user1seller", Category::Fournisseur, TimeStamp::new())
            .unwrap();

        assert!(offer.record_bid(1_000, "user1alice"));
        assert!(!offer.record_bid(1_000, "user1bob")); // ties are not raises
        assert!(!offer.record_bid(900, "user1bob"));
        assert!(offer.record_bid(1_100, "user1bob"));

        assert_eq!(offer.current_bid, Some(1_100));
        assert_eq!(offer.current_bidder.as_deref(), Some("user1bob"));
    }

    #[test]
    fn expiry_window_checks() {
        let starts = TimeStamp::new_with(2026, 8, 1, 10, 0, 0);
        let ends = TimeStamp::new_with(2026, 8, 1, 12, 0, 0);
        let offer = draft()
            .set_offer_type(OfferType::Auction)
            .set_auction_window(starts, ends)
            .build("user1seller", Category::Fournisseur, TimeStamp::new())
            .unwrap();

        let before = TimeStamp::new_with(2026, 8, 1, 11, 0, 0);
        let after = TimeStamp::new_with(2026, 8, 1, 12, 30, 0);

        assert!(!offer.has_ended(&before));
        assert!(offer.has_ended(&after));
        assert!(offer.ends_within(&before, Duration::hours(2)));
        assert!(!offer.ends_within(&before, Duration::minutes(10)));
    }
}
