//! Property-based tests for offer draft validation and auction lead
//! bookkeeping
//!
//! These use the proptest crate to verify invariants across randomly
//! generated inputs rather than hand-picked cases: any well-formed draft
//! must build, any malformed draft must be refused, and the auction lead
//! must track the running maximum of the bids it accepted.

use chrono::Duration;
use proptest::prelude::*;

use negoce::category::Category;
use negoce::error::MarketError;
use negoce::offer::{OfferDraft, OfferStatus, OfferType, TimeStamp};

// PROPERTY TEST STRATEGIES

/// Strategy for non-empty printable titles
fn title_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,40}".prop_filter("titles must not be blank", |s| !s.trim().is_empty())
}

/// Strategy for positive amounts (1 to 100_000_000)
fn amount_strategy() -> impl Strategy<Value = u64> {
    1u64..=100_000_000u64
}

/// Strategy for a coherent (min_quantity, available_quantity) pair
fn quantity_pair_strategy() -> impl Strategy<Value = (u64, u64)> {
    (1u64..=1_000u64, 0u64..=10_000u64).prop_map(|(min, extra)| (min, min + extra))
}

/// Strategy for a forward auction window anchored at a fixed date
fn auction_window_strategy() -> impl Strategy<Value = (TimeStamp<chrono::Utc>, TimeStamp<chrono::Utc>)>
{
    (1i64..=240i64).prop_map(|hours| {
        let starts = TimeStamp::new_with(2026, 8, 1, 9, 0, 0);
        let ends = starts.offset(Duration::hours(hours));
        (starts, ends)
    })
}

/// Strategy for a sequence of (bidder index, amount) submissions
fn bid_sequence_strategy() -> impl Strategy<Value = Vec<(usize, u64)>> {
    prop::collection::vec((0usize..4, 1u64..=50_000u64), 1..60)
}

// PROPERTY TESTS

proptest! {
    /// Property: every fully-populated negotiable draft with positive
    /// price and coherent quantities builds an active offer targeting
    /// the seller's buyer category.
    #[test]
    fn prop_valid_negotiable_drafts_always_build(
        title in title_strategy(),
        price in amount_strategy(),
        (min_quantity, available) in quantity_pair_strategy(),
    ) {
        let offer = OfferDraft::new()
            .set_title(&title)
            .set_base_price(price)
            .set_min_quantity(min_quantity)
            .set_available_quantity(available)
            .set_offer_type(OfferType::Negotiable)
            .build("user1seller", Category::Fournisseur, TimeStamp::new())
            .expect("well-formed draft must build");

        prop_assert_eq!(offer.status, OfferStatus::Active);
        prop_assert_eq!(offer.target_category, Category::Fournisseur);
        prop_assert_eq!(offer.min_quantity, min_quantity);
        prop_assert!(offer.available_quantity >= offer.min_quantity);
        prop_assert!(offer.current_bid.is_none());
    }

    /// Property: every fully-populated auction draft with a forward
    /// window builds, and the window survives the build unchanged.
    #[test]
    fn prop_valid_auction_drafts_always_build(
        title in title_strategy(),
        price in amount_strategy(),
        (min_quantity, available) in quantity_pair_strategy(),
        (starts, ends) in auction_window_strategy(),
    ) {
        let offer = OfferDraft::new()
            .set_title(&title)
            .set_base_price(price)
            .set_min_quantity(min_quantity)
            .set_available_quantity(available)
            .set_offer_type(OfferType::Auction)
            .set_auction_window(starts.clone(), ends.clone())
            .build("user1seller", Category::Grossiste, TimeStamp::new())
            .expect("well-formed auction draft must build");

        let window = offer.auction.expect("auction keeps its window");
        prop_assert_eq!(window.starts_at, starts);
        prop_assert_eq!(window.ends_at, ends);
    }

    /// Property: a zero price is always refused, whatever the rest of the
    /// draft looks like.
    #[test]
    fn prop_zero_price_always_fails(
        title in title_strategy(),
        (min_quantity, available) in quantity_pair_strategy(),
    ) {
        let res = OfferDraft::new()
            .set_title(&title)
            .set_base_price(0)
            .set_min_quantity(min_quantity)
            .set_available_quantity(available)
            .set_offer_type(OfferType::Negotiable)
            .build("user1seller", Category::Fournisseur, TimeStamp::new());

        prop_assert!(matches!(res, Err(MarketError::InvalidDraft(_))));
    }

    /// Property: available quantity below the minimum order quantity is
    /// always refused.
    #[test]
    fn prop_short_stock_always_fails(
        title in title_strategy(),
        price in amount_strategy(),
        min_quantity in 2u64..=1_000u64,
        shortfall in 1u64..=1_000u64,
    ) {
        let available = min_quantity.saturating_sub(shortfall.min(min_quantity));
        let res = OfferDraft::new()
            .set_title(&title)
            .set_base_price(price)
            .set_min_quantity(min_quantity)
            .set_available_quantity(available)
            .set_offer_type(OfferType::Negotiable)
            .build("user1seller", Category::Fournisseur, TimeStamp::new());

        prop_assert!(matches!(res, Err(MarketError::InvalidDraft(_))));
    }

    /// Property: a backwards auction window is always refused.
    #[test]
    fn prop_backwards_window_always_fails(
        title in title_strategy(),
        price in amount_strategy(),
        (min_quantity, available) in quantity_pair_strategy(),
        hours in 0i64..=240i64,
    ) {
        let ends = TimeStamp::new_with(2026, 8, 1, 9, 0, 0);
        let starts = ends.offset(Duration::hours(hours));
        let res = OfferDraft::new()
            .set_title(&title)
            .set_base_price(price)
            .set_min_quantity(min_quantity)
            .set_available_quantity(available)
            .set_offer_type(OfferType::Auction)
            .set_auction_window(starts, ends)
            .build("user1seller", Category::Grossiste, TimeStamp::new());

        prop_assert!(matches!(res, Err(MarketError::InvalidDraft(_))));
    }

    /// Property: across any sequence of bids, the recorded lead equals the
    /// running maximum of the accepted ones, and a bid is accepted exactly
    /// when it strictly beats the lead at that moment.
    #[test]
    fn prop_auction_lead_is_the_running_maximum(bids in bid_sequence_strategy()) {
        let bidders = ["user1a", "user1b", "user1c", "user1d"];
        let mut offer = OfferDraft::new()
            .set_title("Property lot")
            .set_base_price(1_000)
            .set_min_quantity(1)
            .set_available_quantity(100)
            .set_offer_type(OfferType::Auction)
            .set_auction_window(
                TimeStamp::new_with(2026, 8, 1, 9, 0, 0),
                TimeStamp::new_with(2026, 8, 2, 9, 0, 0),
            )
            .build("user1seller", Category::Grossiste, TimeStamp::new())
            .unwrap();

        let mut high: Option<(u64, usize)> = None;
        for (bidder, amount) in bids {
            let should_win = match high {
                Some((lead, _)) => amount > lead,
                None => true,
            };
            let won = offer.record_bid(amount, bidders[bidder]);
            prop_assert_eq!(won, should_win, "lead must move iff the bid strictly beats it");
            if should_win {
                high = Some((amount, bidder));
            }
            // the lead never moves backwards
            prop_assert_eq!(offer.current_bid, high.map(|(a, _)| a));
        }
        if let Some((amount, bidder)) = high {
            prop_assert_eq!(offer.current_bid, Some(amount));
            prop_assert_eq!(offer.current_bidder.as_deref(), Some(bidders[bidder]));
        }
    }
}
