//! B2B bulk offer and negotiation engine
//!
//! Wholesale sellers post bulk offers, buyers answer with bids or
//! negotiated counter-proposals, and [`service::MarketService`] resolves
//! exactly one winner per offer. Auctions self-terminate through the
//! [`sweeper`] background pass. Everything around this engine (catalog,
//! cart, authentication, delivery of notifications) is a collaborator
//! behind the traits and identity arguments in these modules.

pub mod category;
pub mod error;
pub mod notify;
pub mod offer;
pub mod offer_store;
pub mod response;
pub mod response_store;
pub mod service;
pub mod sweeper;
pub mod utils;
