//! Error taxonomy for the offer and negotiation engine

use crate::category::Category;
use crate::offer::{OfferStatus, OfferType};
use crate::response::{ResponseStatus, ResponseType};

#[derive(thiserror::Error, Debug)]
pub enum MarketError {
    // Authorization and lookup failures
    #[error("actor is not permitted to perform this operation")]
    Unauthorized,

    #[error("offer not found: {0}")]
    OfferNotFound(String),

    #[error("response not found: {0}")]
    ResponseNotFound(String),

    // State failures
    #[error("offer is no longer active (status: {0:?})")]
    OfferNotActive(OfferStatus),

    #[error("auction has already ended")]
    OfferExpired,

    #[error("response is not pending (status: {0:?})")]
    ResponseNotPending(ResponseStatus),

    // Request validation failures
    #[error("quantity {got} is outside the offer bounds {min}..={max}")]
    InvalidQuantity { got: u64, min: u64, max: u64 },

    #[error("bid of {amount} does not beat the current lead of {current}")]
    BidTooLow { amount: u64, current: u64 },

    #[error("amount must be positive")]
    InvalidAmount,

    #[error("category {0:?} may not perform this operation")]
    InvalidCategory(Category),

    #[error("invalid offer draft: {0}")]
    InvalidDraft(String),

    #[error("a {response:?} response is not valid against a {offer:?} offer")]
    InvalidResponseType {
        response: ResponseType,
        offer: OfferType,
    },

    // A conflicting concurrent write was detected and retries were
    // exhausted. Callers may retry the whole operation.
    #[error("conflicting concurrent write, retry the operation")]
    Conflict,

    // Storage and codec failures
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("decode error: {0}")]
    Decode(#[from] minicbor::decode::Error),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl<E: std::fmt::Display> From<minicbor::encode::Error<E>> for MarketError {
    fn from(e: minicbor::encode::Error<E>) -> Self {
        MarketError::Encode(e.to_string())
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// Result type used inside sled transaction closures. Aborting with a
/// `MarketError` rolls the whole transaction back.
pub(crate) type TxResult<T> =
    std::result::Result<T, sled::transaction::ConflictableTransactionError<MarketError>>;

/// Lift an engine error into a transaction abort.
pub(crate) fn tx_abort<T>(r: Result<T>) -> TxResult<T> {
    r.map_err(sled::transaction::ConflictableTransactionError::Abort)
}
