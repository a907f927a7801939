//! Notification generation
//!
//! The engine only decides what to say and to whom. Delivery is a
//! collaborator behind [`NotificationSink`], and a sink failure must never
//! fail the state transition that produced the notification, so the
//! [`Notifier`] logs and swallows every delivery error.

use std::sync::{Arc, Mutex};

use crate::category::Category;
use crate::offer::Offer;
use crate::response::Response;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    User(String),
    /// Fan-out to every buyer of a category; expansion happens downstream.
    BuyerCategory(Category),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    NewOffer,
    Outbid,
    ResponseAccepted,
    ResponseRejected,
    AuctionExpiringSoon,
    AuctionExpired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: Recipient,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub offer_id: String,
    pub response_id: Option<String>,
}

/// Delivery boundary. Implementations push, store, or drop; the engine
/// does not care.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: Notification) -> anyhow::Result<()>;
}

/// Discards everything.
pub struct NullSink;

impl NotificationSink for NullSink {
    fn deliver(&self, _notification: Notification) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Collects notifications in memory. Useful for tests and demos.
#[derive(Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut self.delivered.lock().unwrap())
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap().clone()
    }
}

impl NotificationSink for MemorySink {
    fn deliver(&self, notification: Notification) -> anyhow::Result<()> {
        self.delivered.lock().unwrap().push(notification);
        Ok(())
    }
}

pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Fire-and-forget: a failing sink is logged, never propagated.
    pub fn emit(&self, notification: Notification) {
        let kind = notification.kind;
        let offer_id = notification.offer_id.clone();
        if let Err(e) = self.sink.deliver(notification) {
            tracing::warn!(?kind, %offer_id, error = %e, "notification delivery failed");
        }
    }

    pub fn emit_all(&self, notifications: impl IntoIterator<Item = Notification>) {
        for n in notifications {
            self.emit(n);
        }
    }
}

// Derivation: one constructor per state transition.

pub fn new_offer(offer: &Offer) -> Notification {
    Notification {
        recipient: Recipient::BuyerCategory(offer.target_category),
        kind: NotificationKind::NewOffer,
        title: format!("New offer: {}", offer.title),
        body: format!(
            "A new bulk offer is available at {} per unit (minimum {} units).",
            offer.base_price, offer.min_quantity
        ),
        offer_id: offer.id.clone(),
        response_id: None,
    }
}

pub fn outbid(offer: &Offer, loser: &Response, new_amount: u64) -> Notification {
    Notification {
        recipient: Recipient::User(loser.buyer_id.clone()),
        kind: NotificationKind::Outbid,
        title: format!("You were outbid on {}", offer.title),
        body: format!(
            "Your bid of {} was beaten by a bid of {}. Raise to stay in the auction.",
            loser.amount, new_amount
        ),
        offer_id: offer.id.clone(),
        response_id: Some(loser.id.clone()),
    }
}

pub fn response_accepted(offer: &Offer, response: &Response) -> Notification {
    Notification {
        recipient: Recipient::User(response.buyer_id.clone()),
        kind: NotificationKind::ResponseAccepted,
        title: format!("Your offer on {} was accepted", offer.title),
        body: format!(
            "The seller accepted {} units at {} per unit.",
            response.quantity, response.amount
        ),
        offer_id: offer.id.clone(),
        response_id: Some(response.id.clone()),
    }
}

pub fn response_rejected(offer: &Offer, response: &Response) -> Notification {
    Notification {
        recipient: Recipient::User(response.buyer_id.clone()),
        kind: NotificationKind::ResponseRejected,
        title: format!("Your offer on {} was declined", offer.title),
        body: "The seller declined your proposal.".to_string(),
        offer_id: offer.id.clone(),
        response_id: Some(response.id.clone()),
    }
}

pub fn expiring_soon(offer: &Offer, recipient: &str) -> Notification {
    Notification {
        recipient: Recipient::User(recipient.to_string()),
        kind: NotificationKind::AuctionExpiringSoon,
        title: format!("Auction ending soon: {}", offer.title),
        body: "The auction window closes shortly.".to_string(),
        offer_id: offer.id.clone(),
        response_id: None,
    }
}

pub fn expired(offer: &Offer) -> Notification {
    Notification {
        recipient: Recipient::User(offer.seller_id.clone()),
        kind: NotificationKind::AuctionExpired,
        title: format!("Auction ended without a sale: {}", offer.title),
        body: "The auction window closed with no winning bid.".to_string(),
        offer_id: offer.id.clone(),
        response_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offer::{OfferDraft, OfferType, TimeStamp};

    struct FailingSink;

    impl NotificationSink for FailingSink {
        fn deliver(&self, _notification: Notification) -> anyhow::Result<()> {
            anyhow::bail!("delivery channel down")
        }
    }

    fn offer() -> Offer {
        OfferDraft::new()
            .set_title("Crates of tinned sardines")
            .set_base_price(750)
            .set_min_quantity(20)
            .set_available_quantity(600)
            .set_offer_type(OfferType::Negotiable)
            .build("user1seller", Category::Fournisseur, TimeStamp::new())
            .unwrap()
    }

    #[test]
    fn new_offer_targets_the_buyer_category() {
        let n = new_offer(&offer());
        assert_eq!(n.kind, NotificationKind::NewOffer);
        assert_eq!(n.recipient, Recipient::BuyerCategory(Category::Fournisseur));
        assert!(n.response_id.is_none());
    }

    #[test]
    fn expired_goes_to_the_seller() {
        let n = expired(&offer());
        assert_eq!(n.recipient, Recipient::User("user1seller".into()));
        assert_eq!(n.kind, NotificationKind::AuctionExpired);
    }

    #[test]
    fn sink_failures_are_swallowed() {
        let notifier = Notifier::new(Arc::new(FailingSink));
        // must not panic or propagate
        notifier.emit(new_offer(&offer()));
    }

    #[test]
    fn memory_sink_collects_in_order() {
        let sink = Arc::new(MemorySink::new());
        let notifier = Notifier::new(sink.clone());

        let o = offer();
        notifier.emit(new_offer(&o));
        notifier.emit(expired(&o));

        let seen = sink.take();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].kind, NotificationKind::NewOffer);
        assert_eq!(seen[1].kind, NotificationKind::AuctionExpired);
        assert!(sink.snapshot().is_empty());
    }
}
