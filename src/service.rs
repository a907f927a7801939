//! Service layer API for offer and negotiation workflow operations
//!
//! Every mutation is a single sled transaction that reads and writes the
//! offer row, so all work against one offer serializes on that row while
//! unrelated offers proceed independently. Notifications are derived from
//! the transaction outcome and emitted only after commit.

use std::sync::Arc;

use chrono::{Duration, Utc};
use sled::Transactional;
use sled::transaction::{TransactionError, TransactionalTree, abort};
use tracing::{debug, error, info, warn};

use crate::category::{Actor, Category};
use crate::error::{MarketError, Result, TxResult, tx_abort};
use crate::notify::{self, NotificationSink, Notifier};
use crate::offer::{Offer, OfferDraft, OfferStatus, OfferType, TimeStamp};
use crate::offer_store::{OfferFilters, OfferStore, SortKey};
use crate::response::{Response, ResponseStatus, ResponseType};
use crate::response_store::ResponseStore;
use crate::utils;

/// Seller-editable fields of a live offer. Pricing, quantities, type and
/// the auction window are fixed at creation.
#[derive(Debug, Default, Clone)]
pub struct OfferPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

/// Outcome of one offer settled by the expiry sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledOffer {
    pub offer_id: String,
    pub outcome: SweepOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    Sold { buyer_id: String, amount: u64 },
    Expired,
}

pub struct MarketService {
    offers: OfferStore,
    responses: ResponseStore,
    notifier: Notifier,
    expiry_warning: Duration,
}

/// A settled offer with the rows the settlement touched; feeds the
/// post-commit notifications.
struct Settlement {
    offer: Offer,
    winner: Response,
    rejected: Vec<Response>,
}

enum SettleReport {
    Sold(Settlement),
    Expired {
        offer: Offer,
        rejected: Vec<Response>,
    },
}

fn commit<T>(r: std::result::Result<T, TransactionError<MarketError>>) -> Result<T> {
    match r {
        Ok(v) => Ok(v),
        Err(TransactionError::Abort(e)) => Err(e),
        Err(TransactionError::Storage(e)) => Err(MarketError::Storage(e)),
    }
}

fn require_offer(tree: &TransactionalTree, id: &str) -> TxResult<Offer> {
    match OfferStore::read_tx(tree, id)? {
        Some(offer) => Ok(offer),
        None => abort(MarketError::OfferNotFound(id.to_string())),
    }
}

/// Reject every open (pending or outbid) response on an offer, skipping
/// the winner when there is one, and drop the open set. After a
/// settlement no response is left in a non-terminal state. Returns the
/// rows that were rejected.
fn reject_open_responses(
    tree: &TransactionalTree,
    offer_id: &str,
    winner_id: Option<&str>,
    now: &TimeStamp<Utc>,
) -> TxResult<Vec<Response>> {
    let set = ResponseStore::open_set_tx(tree, offer_id)?;
    let mut rejected = Vec::new();
    for entry in &set.entries {
        if Some(entry.response_id.as_str()) == winner_id {
            continue;
        }
        if let Some(mut response) = ResponseStore::read_row_tx(tree, offer_id, &entry.response_id)?
        {
            if !response.status.is_terminal() {
                response.status = ResponseStatus::Rejected;
                response.updated_at = now.clone();
                ResponseStore::write_row_tx(tree, &response)?;
                rejected.push(response);
            }
        }
    }
    ResponseStore::clear_open_set_tx(tree, offer_id)?;
    Ok(rejected)
}

/// Withdraw every open (pending or outbid) response; used when the offer
/// itself goes away so no live row is left pointing at a gone offer.
fn withdraw_open_responses(
    tree: &TransactionalTree,
    offer_id: &str,
    now: &TimeStamp<Utc>,
) -> TxResult<Vec<Response>> {
    let set = ResponseStore::open_set_tx(tree, offer_id)?;
    let mut withdrawn = Vec::new();
    for entry in &set.entries {
        if let Some(mut response) = ResponseStore::read_row_tx(tree, offer_id, &entry.response_id)?
        {
            if !response.status.is_terminal() {
                response.status = ResponseStatus::Withdrawn;
                response.updated_at = now.clone();
                ResponseStore::write_row_tx(tree, &response)?;
                withdrawn.push(response);
            }
        }
    }
    ResponseStore::clear_open_set_tx(tree, offer_id)?;
    Ok(withdrawn)
}

impl MarketService {
    pub fn new(db: Arc<sled::Db>, sink: Arc<dyn NotificationSink>) -> Result<Self> {
        Ok(Self {
            offers: OfferStore::open(&db)?,
            responses: ResponseStore::open(&db)?,
            notifier: Notifier::new(sink),
            expiry_warning: Duration::hours(1),
        })
    }

    /// How long before an auction's end the expiring-soon notification is
    /// generated by the sweep.
    pub fn with_expiry_warning(mut self, window: Duration) -> Self {
        self.expiry_warning = window;
        self
    }

    pub fn offers(&self) -> &OfferStore {
        &self.offers
    }

    pub fn responses(&self) -> &ResponseStore {
        &self.responses
    }

    // Queries

    pub fn get_offer(&self, offer_id: &str) -> Result<Offer> {
        self.offers.get(offer_id)
    }

    pub fn list_visible_offers(
        &self,
        viewer: Category,
        filters: &OfferFilters,
        sort: SortKey,
    ) -> Result<Vec<Offer>> {
        self.offers.list_visible(viewer, filters, sort)
    }

    pub fn list_offers_for_seller(&self, actor: &Actor) -> Result<Vec<Offer>> {
        self.offers.list_for_seller(&actor.id)
    }

    /// Responses on one offer, any status. Restricted to the offer's seller.
    pub fn list_responses_for_offer(&self, actor: &Actor, offer_id: &str) -> Result<Vec<Response>> {
        let offer = self.offers.get(offer_id)?;
        if offer.seller_id != actor.id {
            return Err(MarketError::Unauthorized);
        }
        self.responses.list_for_offer(offer_id)
    }

    /// Everything buyers have sent against the seller's offers.
    pub fn list_responses_for_seller(&self, actor: &Actor) -> Result<Vec<Response>> {
        self.responses.list_for_seller(&actor.id, &self.offers)
    }

    /// The buyer's own submissions across all offers.
    pub fn list_responses_for_buyer(&self, actor: &Actor) -> Result<Vec<Response>> {
        self.responses.list_for_buyer(&actor.id)
    }

    // Offer mutations

    pub fn create_offer(&self, actor: &Actor, draft: OfferDraft) -> Result<Offer> {
        let target = actor
            .category
            .selling_target()
            .ok_or(MarketError::InvalidCategory(actor.category))?;

        let offer = draft.build(&actor.id, target, TimeStamp::new())?;
        self.offers.insert(&offer)?;

        info!(offer_id = %offer.id, seller = %actor.id, target = ?target, "offer created");
        self.notifier.emit(notify::new_offer(&offer));
        Ok(offer)
    }

    pub fn update_offer(&self, actor: &Actor, offer_id: &str, patch: OfferPatch) -> Result<Offer> {
        let now = TimeStamp::new();
        let offer = commit(self.offers.tree().transaction(|tree| {
            let mut offer = require_offer(tree, offer_id)?;
            if offer.seller_id != actor.id {
                return abort(MarketError::Unauthorized);
            }
            if !offer.is_active() {
                return abort(MarketError::OfferNotActive(offer.status));
            }
            if let Some(title) = &patch.title {
                if title.trim().is_empty() {
                    return abort(MarketError::InvalidDraft("title is required".into()));
                }
                offer.title = title.clone();
            }
            if let Some(description) = &patch.description {
                offer.description = description.clone();
            }
            if let Some(images) = &patch.images {
                offer.images = images.clone();
            }
            if let Some(tags) = &patch.tags {
                offer.tags = tags.clone();
            }
            offer.updated_at = now.clone();
            OfferStore::write_tx(tree, &offer)?;
            Ok(offer)
        }))?;

        info!(offer_id = %offer.id, seller = %actor.id, "offer updated");
        Ok(offer)
    }

    /// Close an active offer. Remaining pending responses are rejected in
    /// the same transaction so no buyer is left waiting on a dead offer.
    pub fn close_offer(&self, actor: &Actor, offer_id: &str) -> Result<()> {
        let now = TimeStamp::new();
        let (offer, rejected) = commit(
            (self.offers.tree(), self.responses.tree()).transaction(|(offers_t, responses_t)| {
                let mut offer = require_offer(offers_t, offer_id)?;
                if offer.seller_id != actor.id {
                    return abort(MarketError::Unauthorized);
                }
                if !offer.is_active() {
                    return abort(MarketError::OfferNotActive(offer.status));
                }
                let rejected = reject_open_responses(responses_t, offer_id, None, &now)?;
                offer.status = OfferStatus::Closed;
                offer.updated_at = now.clone();
                OfferStore::write_tx(offers_t, &offer)?;
                Ok((offer, rejected))
            }),
        )?;

        info!(offer_id = %offer.id, rejected = rejected.len(), "offer closed");
        self.notifier
            .emit_all(rejected.iter().map(|r| notify::response_rejected(&offer, r)));
        Ok(())
    }

    /// Hard delete, owner only, while still active. Open responses are
    /// withdrawn in the same transaction rather than orphaned.
    pub fn delete_offer(&self, actor: &Actor, offer_id: &str) -> Result<()> {
        let now = TimeStamp::new();
        let withdrawn = commit(
            (self.offers.tree(), self.responses.tree()).transaction(|(offers_t, responses_t)| {
                let offer = require_offer(offers_t, offer_id)?;
                if offer.seller_id != actor.id {
                    return abort(MarketError::Unauthorized);
                }
                if !offer.is_active() {
                    return abort(MarketError::OfferNotActive(offer.status));
                }
                let withdrawn = withdraw_open_responses(responses_t, offer_id, &now)?;
                OfferStore::remove_tx(offers_t, offer_id)?;
                Ok(withdrawn)
            }),
        )?;

        info!(offer_id = %offer_id, withdrawn = withdrawn.len(), "offer deleted");
        Ok(())
    }

    // Response mutations

    /// Create or update the buyer's single open response on an offer. For
    /// bids this also moves the auction lead and pushes the previous
    /// leader out, all inside one transaction on the offer row.
    pub fn submit_response(
        &self,
        actor: &Actor,
        offer_id: &str,
        response_type: ResponseType,
        amount: u64,
        quantity: u64,
        message: Option<String>,
    ) -> Result<Response> {
        if !actor.category.can_buy() {
            return Err(MarketError::InvalidCategory(actor.category));
        }
        if amount == 0 {
            return Err(MarketError::InvalidAmount);
        }

        let now = TimeStamp::new();
        let (offer, response, outbid) = commit(
            (self.offers.tree(), self.responses.tree()).transaction(|(offers_t, responses_t)| {
                let mut offer = require_offer(offers_t, offer_id)?;
                if offer.seller_id == actor.id {
                    return abort(MarketError::Unauthorized);
                }
                if offer.target_category != actor.category {
                    return abort(MarketError::InvalidCategory(actor.category));
                }
                if !offer.is_active() {
                    return abort(MarketError::OfferNotActive(offer.status));
                }
                if offer.has_ended(&now) {
                    return abort(MarketError::OfferExpired);
                }
                let expected = match offer.offer_type {
                    OfferType::Auction => ResponseType::Bid,
                    OfferType::Negotiable => ResponseType::Negotiation,
                };
                if response_type != expected {
                    return abort(MarketError::InvalidResponseType {
                        response: response_type,
                        offer: offer.offer_type,
                    });
                }
                if quantity < offer.min_quantity || quantity > offer.available_quantity {
                    return abort(MarketError::InvalidQuantity {
                        got: quantity,
                        min: offer.min_quantity,
                        max: offer.available_quantity,
                    });
                }
                if response_type == ResponseType::Bid {
                    if let Some(current) = offer.current_bid {
                        if amount <= current {
                            return abort(MarketError::BidTooLow { amount, current });
                        }
                    }
                }

                // upsert: one open row per (offer, buyer)
                let mut set = ResponseStore::open_set_tx(responses_t, offer_id)?;
                let response = match set.entry_for(&actor.id) {
                    Some(entry) => {
                        let Some(mut existing) =
                            ResponseStore::read_row_tx(responses_t, offer_id, &entry.response_id)?
                        else {
                            return abort(MarketError::Internal(format!(
                                "open index points at missing response {}",
                                entry.response_id
                            )));
                        };
                        existing.resubmit(amount, quantity, message.clone(), now.clone());
                        existing
                    }
                    None => {
                        let id = tx_abort(utils::new_response_id())?;
                        let fresh = Response::new(
                            id,
                            offer_id,
                            &actor.id,
                            response_type,
                            amount,
                            quantity,
                            message.clone(),
                            now.clone(),
                        );
                        set.upsert(&actor.id, &fresh.id);
                        fresh
                    }
                };
                ResponseStore::write_row_tx(responses_t, &response)?;

                // a winning bid takes the lead; the previous leader is outbid
                let mut outbid = None;
                if response_type == ResponseType::Bid {
                    let previous = offer.current_bidder.clone();
                    if offer.record_bid(amount, &actor.id) {
                        if let Some(prev_buyer) = previous.filter(|p| *p != actor.id) {
                            if let Some(entry) = set.entry_for(&prev_buyer) {
                                if let Some(mut prev) = ResponseStore::read_row_tx(
                                    responses_t,
                                    offer_id,
                                    &entry.response_id,
                                )? {
                                    if prev.is_pending() {
                                        prev.status = ResponseStatus::Outbid;
                                        prev.updated_at = now.clone();
                                        ResponseStore::write_row_tx(responses_t, &prev)?;
                                        outbid = Some(prev);
                                    }
                                }
                            }
                        }
                    }
                }
                ResponseStore::write_open_set_tx(responses_t, offer_id, &set)?;

                offer.updated_at = now.clone();
                OfferStore::write_tx(offers_t, &offer)?;

                Ok((offer, response, outbid))
            }),
        )?;

        info!(
            offer_id = %offer.id,
            buyer = %actor.id,
            response_id = %response.id,
            kind = ?response_type,
            amount,
            quantity,
            "response submitted"
        );
        if let Some(loser) = &outbid {
            self.notifier.emit(notify::outbid(&offer, loser, amount));
        }
        Ok(response)
    }

    /// Accept one pending response: it wins, the offer is sold, and every
    /// other pending response on the offer is rejected — atomically.
    /// Retrying against an already settled response reports
    /// `ResponseNotPending` and changes nothing.
    pub fn accept_response(&self, actor: &Actor, response_id: &str) -> Result<()> {
        let now = TimeStamp::new();
        let settlement = commit(
            (self.offers.tree(), self.responses.tree()).transaction(|(offers_t, responses_t)| {
                let Some(offer_id) = ResponseStore::offer_of_tx(responses_t, response_id)? else {
                    return abort(MarketError::ResponseNotFound(response_id.to_string()));
                };
                let mut offer = require_offer(offers_t, &offer_id)?;
                if offer.seller_id != actor.id {
                    return abort(MarketError::Unauthorized);
                }
                let Some(mut winner) =
                    ResponseStore::read_row_tx(responses_t, &offer_id, response_id)?
                else {
                    return abort(MarketError::ResponseNotFound(response_id.to_string()));
                };
                if !winner.is_pending() {
                    return abort(MarketError::ResponseNotPending(winner.status));
                }
                if !offer.is_active() {
                    return abort(MarketError::OfferNotActive(offer.status));
                }

                winner.status = ResponseStatus::Accepted;
                winner.updated_at = now.clone();
                ResponseStore::write_row_tx(responses_t, &winner)?;

                let rejected = reject_open_responses(responses_t, &offer_id, Some(&winner.id), &now)?;

                offer.status = OfferStatus::Sold;
                offer.updated_at = now.clone();
                OfferStore::write_tx(offers_t, &offer)?;

                Ok(Settlement {
                    offer,
                    winner,
                    rejected,
                })
            }),
        )?;

        info!(
            offer_id = %settlement.offer.id,
            winner = %settlement.winner.buyer_id,
            rejected = settlement.rejected.len(),
            "response accepted, offer sold"
        );
        self.emit_settlement(&settlement);
        Ok(())
    }

    /// Decline one pending response. The offer stays active so another
    /// response can still be accepted later.
    pub fn reject_response(&self, actor: &Actor, response_id: &str) -> Result<()> {
        let now = TimeStamp::new();
        let (offer, response) = commit(
            (self.offers.tree(), self.responses.tree()).transaction(|(offers_t, responses_t)| {
                let Some(offer_id) = ResponseStore::offer_of_tx(responses_t, response_id)? else {
                    return abort(MarketError::ResponseNotFound(response_id.to_string()));
                };
                let offer = require_offer(offers_t, &offer_id)?;
                if offer.seller_id != actor.id {
                    return abort(MarketError::Unauthorized);
                }
                let Some(mut response) =
                    ResponseStore::read_row_tx(responses_t, &offer_id, response_id)?
                else {
                    return abort(MarketError::ResponseNotFound(response_id.to_string()));
                };
                if !response.is_pending() {
                    return abort(MarketError::ResponseNotPending(response.status));
                }

                response.status = ResponseStatus::Rejected;
                response.updated_at = now.clone();
                ResponseStore::write_row_tx(responses_t, &response)?;

                let mut set = ResponseStore::open_set_tx(responses_t, &offer_id)?;
                set.remove_buyer(&response.buyer_id);
                ResponseStore::write_open_set_tx(responses_t, &offer_id, &set)?;

                Ok((offer, response))
            }),
        )?;

        info!(offer_id = %offer.id, response_id = %response.id, "response rejected");
        self.notifier.emit(notify::response_rejected(&offer, &response));
        Ok(())
    }

    /// Buyer-initiated cancellation of their own pending response.
    pub fn withdraw_response(&self, actor: &Actor, response_id: &str) -> Result<()> {
        let now = TimeStamp::new();
        let response = commit(self.responses.tree().transaction(|responses_t| {
            let Some(offer_id) = ResponseStore::offer_of_tx(responses_t, response_id)? else {
                return abort(MarketError::ResponseNotFound(response_id.to_string()));
            };
            let Some(mut response) =
                ResponseStore::read_row_tx(responses_t, &offer_id, response_id)?
            else {
                return abort(MarketError::ResponseNotFound(response_id.to_string()));
            };
            if response.buyer_id != actor.id {
                return abort(MarketError::Unauthorized);
            }
            if !response.is_pending() {
                return abort(MarketError::ResponseNotPending(response.status));
            }

            response.status = ResponseStatus::Withdrawn;
            response.updated_at = now.clone();
            ResponseStore::write_row_tx(responses_t, &response)?;

            let mut set = ResponseStore::open_set_tx(responses_t, &offer_id)?;
            set.remove_buyer(&response.buyer_id);
            ResponseStore::write_open_set_tx(responses_t, &offer_id, &set)?;

            Ok(response)
        }))?;

        info!(offer_id = %response.offer_id, response_id = %response.id, "response withdrawn");
        Ok(())
    }

    // Expiry sweep

    /// Settle every auction whose window has elapsed: the leading bid wins
    /// with full accept-cascade semantics, an auction without bids expires.
    /// Safe to run repeatedly and concurrently; offers another caller
    /// already settled are skipped, and one offer failing does not stop
    /// the pass. Also generates the one-shot expiring-soon notifications
    /// for auctions inside the warning window.
    pub fn sweep_expired_auctions(&self, now: TimeStamp<Utc>) -> Result<Vec<SettledOffer>> {
        let mut settled = Vec::new();

        for entry in self.offers.tree().iter() {
            let (_, bytes) = entry?;
            let offer = match crate::offer_store::decode_offer(&bytes) {
                Ok(offer) => offer,
                Err(e) => {
                    error!(error = %e, "skipping undecodable offer row in sweep");
                    continue;
                }
            };
            if !offer.is_auction() || !offer.is_active() {
                continue;
            }

            if offer.has_ended(&now) {
                match self.settle_expired(&offer.id, &now) {
                    Ok(Some(SettleReport::Sold(settlement))) => {
                        info!(
                            offer_id = %settlement.offer.id,
                            winner = %settlement.winner.buyer_id,
                            amount = settlement.winner.amount,
                            "expired auction settled to the leading bid"
                        );
                        self.emit_settlement(&settlement);
                        settled.push(SettledOffer {
                            offer_id: settlement.offer.id.clone(),
                            outcome: SweepOutcome::Sold {
                                buyer_id: settlement.winner.buyer_id.clone(),
                                amount: settlement.winner.amount,
                            },
                        });
                    }
                    Ok(Some(SettleReport::Expired { offer, rejected })) => {
                        if offer.current_bidder.is_some() {
                            warn!(
                                offer_id = %offer.id,
                                "leading bid no longer pending at expiry, auction expired unsold"
                            );
                        }
                        info!(offer_id = %offer.id, "auction expired without a winner");
                        self.notifier
                            .emit_all(rejected.iter().map(|r| notify::response_rejected(&offer, r)));
                        self.notifier.emit(notify::expired(&offer));
                        settled.push(SettledOffer {
                            offer_id: offer.id.clone(),
                            outcome: SweepOutcome::Expired,
                        });
                    }
                    // someone else settled it between the scan and our transaction
                    Ok(None) => debug!(offer_id = %offer.id, "auction already settled, skipping"),
                    Err(e) => {
                        error!(offer_id = %offer.id, error = %e, "failed to settle expired auction");
                    }
                }
            } else if !offer.closing_soon_notified && offer.ends_within(&now, self.expiry_warning) {
                match self.mark_closing_soon(&offer.id, &now) {
                    Ok(Some(offer)) => {
                        self.notifier
                            .emit(notify::expiring_soon(&offer, &offer.seller_id));
                        if let Some(bidder) = &offer.current_bidder {
                            self.notifier.emit(notify::expiring_soon(&offer, bidder));
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(offer_id = %offer.id, error = %e, "failed to flag auction as closing soon");
                    }
                }
            }
        }

        Ok(settled)
    }

    fn settle_expired(&self, offer_id: &str, now: &TimeStamp<Utc>) -> Result<Option<SettleReport>> {
        commit(
            (self.offers.tree(), self.responses.tree()).transaction(|(offers_t, responses_t)| {
                let Some(mut offer) = OfferStore::read_tx(offers_t, offer_id)? else {
                    return Ok(None);
                };
                // idempotence: anything no longer active-and-elapsed was
                // handled by a concurrent accept or an earlier sweep
                if !offer.is_active() || !offer.has_ended(now) {
                    return Ok(None);
                }

                let set = ResponseStore::open_set_tx(responses_t, offer_id)?;
                let winner_row = match offer.current_bidder.as_deref() {
                    Some(buyer) => match set.entry_for(buyer) {
                        Some(entry) => {
                            ResponseStore::read_row_tx(responses_t, offer_id, &entry.response_id)?
                                .filter(|r| r.is_pending())
                        }
                        None => None,
                    },
                    None => None,
                };

                match winner_row {
                    Some(mut winner) => {
                        winner.status = ResponseStatus::Accepted;
                        winner.updated_at = now.clone();
                        ResponseStore::write_row_tx(responses_t, &winner)?;

                        let rejected =
                            reject_open_responses(responses_t, offer_id, Some(&winner.id), now)?;

                        offer.status = OfferStatus::Sold;
                        offer.updated_at = now.clone();
                        OfferStore::write_tx(offers_t, &offer)?;

                        Ok(Some(SettleReport::Sold(Settlement {
                            offer,
                            winner,
                            rejected,
                        })))
                    }
                    None => {
                        let rejected = reject_open_responses(responses_t, offer_id, None, now)?;

                        offer.status = OfferStatus::Expired;
                        offer.updated_at = now.clone();
                        OfferStore::write_tx(offers_t, &offer)?;

                        Ok(Some(SettleReport::Expired { offer, rejected }))
                    }
                }
            }),
        )
    }

    fn mark_closing_soon(&self, offer_id: &str, now: &TimeStamp<Utc>) -> Result<Option<Offer>> {
        let warning = self.expiry_warning;
        commit(self.offers.tree().transaction(|tree| {
            let Some(mut offer) = OfferStore::read_tx(tree, offer_id)? else {
                return Ok(None);
            };
            if !offer.is_active() || offer.closing_soon_notified || !offer.ends_within(now, warning)
            {
                return Ok(None);
            }
            offer.closing_soon_notified = true;
            offer.updated_at = now.clone();
            OfferStore::write_tx(tree, &offer)?;
            Ok(Some(offer))
        }))
    }

    fn emit_settlement(&self, settlement: &Settlement) {
        self.notifier.emit(notify::response_accepted(
            &settlement.offer,
            &settlement.winner,
        ));
        self.notifier.emit_all(
            settlement
                .rejected
                .iter()
                .map(|r| notify::response_rejected(&settlement.offer, r)),
        );
    }
}
