//! Response entity: a buyer's bid or negotiation against an offer

use chrono::Utc;

use crate::offer::TimeStamp;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Competes on an auction offer; must beat the current lead.
    #[n(0)]
    Bid,
    /// Counter-proposal on a negotiable offer.
    #[n(1)]
    Negotiation,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    #[n(0)]
    Pending,
    #[n(1)]
    Accepted,
    #[n(2)]
    Rejected,
    /// Lost the auction lead. Not terminal: a raise returns the same row
    /// to `Pending`.
    #[n(3)]
    Outbid,
    #[n(4)]
    Withdrawn,
}

impl ResponseStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ResponseStatus::Accepted | ResponseStatus::Rejected | ResponseStatus::Withdrawn
        )
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Response {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub offer_id: String,
    #[n(2)]
    pub buyer_id: String,
    #[n(3)]
    pub response_type: ResponseType,
    #[n(4)]
    pub status: ResponseStatus,
    /// Proposed unit price in minor currency units.
    #[n(5)]
    pub amount: u64,
    #[n(6)]
    pub quantity: u64,
    #[n(7)]
    pub message: Option<String>,
    #[n(8)]
    pub created_at: TimeStamp<Utc>,
    #[n(9)]
    pub updated_at: TimeStamp<Utc>,
}

impl Response {
    pub fn new(
        id: String,
        offer_id: &str,
        buyer_id: &str,
        response_type: ResponseType,
        amount: u64,
        quantity: u64,
        message: Option<String>,
        now: TimeStamp<Utc>,
    ) -> Self {
        Self {
            id,
            offer_id: offer_id.to_string(),
            buyer_id: buyer_id.to_string(),
            response_type,
            status: ResponseStatus::Pending,
            amount,
            quantity,
            message,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ResponseStatus::Pending
    }

    /// In-place update of an open (pending or outbid) response: same row,
    /// new terms, back to `Pending`.
    pub fn resubmit(
        &mut self,
        amount: u64,
        quantity: u64,
        message: Option<String>,
        now: TimeStamp<Utc>,
    ) {
        debug_assert!(!self.status.is_terminal());
        self.amount = amount;
        self.quantity = quantity;
        self.message = message;
        self.status = ResponseStatus::Pending;
        self.updated_at = now;
    }
}
