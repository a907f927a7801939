//! Offer persistence over a sled tree

use sled::transaction::TransactionalTree;

use crate::category::Category;
use crate::error::{tx_abort, MarketError, Result, TxResult};
use crate::offer::{Offer, OfferType};

const TREE_NAME: &str = "offers";

/// Owns the `offers` tree. Rows are keyed by offer id and hold
/// minicbor-encoded [`Offer`] values. All writes that depend on a prior
/// read go through the resolver's transactions; the plain methods here are
/// single-key reads and scans.
pub struct OfferStore {
    tree: sled::Tree,
}

pub(crate) fn encode_offer(offer: &Offer) -> Result<Vec<u8>> {
    Ok(minicbor::to_vec(offer)?)
}

pub(crate) fn decode_offer(bytes: &[u8]) -> Result<Offer> {
    Ok(minicbor::decode(bytes)?)
}

impl OfferStore {
    pub fn open(db: &sled::Db) -> Result<Self> {
        Ok(Self {
            tree: db.open_tree(TREE_NAME)?,
        })
    }

    pub(crate) fn tree(&self) -> &sled::Tree {
        &self.tree
    }

    /// Insert a freshly built offer. Single-key write, needs no transaction.
    pub fn insert(&self, offer: &Offer) -> Result<()> {
        self.tree.insert(offer.id.as_bytes(), encode_offer(offer)?)?;
        Ok(())
    }

    pub fn try_get(&self, id: &str) -> Result<Option<Offer>> {
        match self.tree.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(decode_offer(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get(&self, id: &str) -> Result<Offer> {
        self.try_get(id)?
            .ok_or_else(|| MarketError::OfferNotFound(id.to_string()))
    }

    /// Active offers targeted at a category the viewer may buy in, filtered
    /// and sorted for the listing screens.
    pub fn list_visible(
        &self,
        viewer: Category,
        filters: &OfferFilters,
        sort: SortKey,
    ) -> Result<Vec<Offer>> {
        let targets = viewer.visible_targets();
        let mut offers = Vec::new();
        for entry in self.tree.iter() {
            let (_, bytes) = entry?;
            let offer = decode_offer(&bytes)?;
            if offer.is_active()
                && targets.contains(&offer.target_category)
                && filters.matches(&offer)
            {
                offers.push(offer);
            }
        }
        sort.apply(&mut offers);
        Ok(offers)
    }

    /// Every offer a seller has posted, any status. Seller dashboard view.
    pub fn list_for_seller(&self, seller_id: &str) -> Result<Vec<Offer>> {
        let mut offers = Vec::new();
        for entry in self.tree.iter() {
            let (_, bytes) = entry?;
            let offer = decode_offer(&bytes)?;
            if offer.seller_id == seller_id {
                offers.push(offer);
            }
        }
        SortKey::Newest.apply(&mut offers);
        Ok(offers)
    }

    // Transactional row access, used by the resolver.

    pub(crate) fn read_tx(tree: &TransactionalTree, id: &str) -> TxResult<Option<Offer>> {
        match tree.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(tx_abort(decode_offer(&bytes))?)),
            None => Ok(None),
        }
    }

    pub(crate) fn write_tx(tree: &TransactionalTree, offer: &Offer) -> TxResult<()> {
        tree.insert(offer.id.as_bytes(), tx_abort(encode_offer(offer))?)?;
        Ok(())
    }

    pub(crate) fn remove_tx(tree: &TransactionalTree, id: &str) -> TxResult<()> {
        tree.remove(id.as_bytes())?;
        Ok(())
    }
}

/// Optional listing filters. All bounds are inclusive; `search` is a
/// case-insensitive substring match over title and description.
#[derive(Debug, Default, Clone)]
pub struct OfferFilters {
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub min_quantity: Option<u64>,
    pub max_quantity: Option<u64>,
    pub offer_type: Option<OfferType>,
    pub search: Option<String>,
}

impl OfferFilters {
    pub fn matches(&self, offer: &Offer) -> bool {
        if let Some(min) = self.min_price {
            if offer.base_price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if offer.base_price > max {
                return false;
            }
        }
        if let Some(min) = self.min_quantity {
            if offer.available_quantity < min {
                return false;
            }
        }
        if let Some(max) = self.max_quantity {
            if offer.available_quantity > max {
                return false;
            }
        }
        if let Some(wanted) = self.offer_type {
            if offer.offer_type != wanted {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let haystack = format!(
                "{} {}",
                offer.title.to_lowercase(),
                offer.description.to_lowercase()
            );
            if !haystack.contains(&needle) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Most recently created first.
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    /// Soonest auction end first; offers without a window sort last.
    EndingSoon,
}

impl SortKey {
    fn apply(self, offers: &mut [Offer]) {
        match self {
            SortKey::Newest => offers.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            }),
            SortKey::PriceAsc => offers.sort_by(|a, b| {
                a.base_price
                    .cmp(&b.base_price)
                    .then_with(|| a.id.cmp(&b.id))
            }),
            SortKey::PriceDesc => offers.sort_by(|a, b| {
                b.base_price
                    .cmp(&a.base_price)
                    .then_with(|| a.id.cmp(&b.id))
            }),
            SortKey::EndingSoon => offers.sort_by(|a, b| match (a.auction_ends(), b.auction_ends())
            {
                (Some(x), Some(y)) => x.cmp(y).then_with(|| a.id.cmp(&b.id)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.id.cmp(&b.id),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offer::{OfferDraft, TimeStamp};

    fn offer(title: &str, price: u64, quantity: u64) -> Offer {
        OfferDraft::new()
            .set_title(title)
            .set_description("bulk lot")
            .set_base_price(price)
            .set_min_quantity(1)
            .set_available_quantity(quantity)
            .set_offer_type(OfferType::Negotiable)
            .build("user1seller", Category::Fournisseur, TimeStamp::new())
            .unwrap()
    }

    #[test]
    fn filters_on_price_and_quantity() {
        let cheap = offer("rice", 100, 50);
        let pricey = offer("saffron", 9_000, 5);

        let filters = OfferFilters {
            min_price: Some(500),
            ..Default::default()
        };
        assert!(!filters.matches(&cheap));
        assert!(filters.matches(&pricey));

        let filters = OfferFilters {
            min_quantity: Some(10),
            max_quantity: Some(100),
            ..Default::default()
        };
        assert!(filters.matches(&cheap));
        assert!(!filters.matches(&pricey));
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let o = offer("Pallet of Olive Oil", 4_500, 40);

        let filters = OfferFilters {
            search: Some("OLIVE".into()),
            ..Default::default()
        };
        assert!(filters.matches(&o));

        let filters = OfferFilters {
            search: Some("bulk".into()),
            ..Default::default()
        };
        assert!(filters.matches(&o));

        let filters = OfferFilters {
            search: Some("anchovies".into()),
            ..Default::default()
        };
        assert!(!filters.matches(&o));
    }

    #[test]
    fn price_sorts() {
        let mut offers = vec![offer("b", 200, 10), offer("a", 100, 10), offer("c", 300, 10)];
        SortKey::PriceAsc.apply(&mut offers);
        let prices: Vec<u64> = offers.iter().map(|o| o.base_price).collect();
        assert_eq!(prices, vec![100, 200, 300]);

        SortKey::PriceDesc.apply(&mut offers);
        let prices: Vec<u64> = offers.iter().map(|o| o.base_price).collect();
        assert_eq!(prices, vec![300, 200, 100]);
    }

    #[test]
    fn ending_soon_puts_windowless_offers_last() {
        let negotiable = offer("no window", 100, 10);
        let mut late = offer("late", 100, 10);
        late.offer_type = OfferType::Auction;
        late.auction = Some(crate::offer::AuctionWindow {
            starts_at: TimeStamp::new_with(2026, 8, 1, 0, 0, 0),
            ends_at: TimeStamp::new_with(2026, 8, 20, 0, 0, 0),
        });
        let mut soon = offer("soon", 100, 10);
        soon.offer_type = OfferType::Auction;
        soon.auction = Some(crate::offer::AuctionWindow {
            starts_at: TimeStamp::new_with(2026, 8, 1, 0, 0, 0),
            ends_at: TimeStamp::new_with(2026, 8, 10, 0, 0, 0),
        });

        let mut offers = vec![negotiable, late, soon];
        SortKey::EndingSoon.apply(&mut offers);
        let titles: Vec<&str> = offers.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["soon", "late", "no window"]);
    }
}
