//! Identifier helpers

use bech32::Bech32m;
use uuid7::uuid7;

use crate::error::{MarketError, Result};

pub const OFFER_HRP: &str = "offer";
pub const RESPONSE_HRP: &str = "rsp";
pub const USER_HRP: &str = "user";

// construct a unique id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> Result<String> {
    let hrp = bech32::Hrp::parse(hrp).map_err(|e| MarketError::Internal(e.to_string()))?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())
        .map_err(|e| MarketError::Internal(e.to_string()))?;
    Ok(encode)
}

pub fn new_offer_id() -> Result<String> {
    new_uuid_to_bech32(OFFER_HRP)
}

pub fn new_response_id() -> Result<String> {
    new_uuid_to_bech32(RESPONSE_HRP)
}

pub fn new_user_id() -> Result<String> {
    new_uuid_to_bech32(USER_HRP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_their_prefix() {
        assert!(new_offer_id().unwrap().starts_with("offer1"));
        assert!(new_response_id().unwrap().starts_with("rsp1"));
        assert!(new_user_id().unwrap().starts_with("user1"));
    }

    #[test]
    fn ids_are_unique() {
        let a = new_offer_id().unwrap();
        let b = new_offer_id().unwrap();
        assert_ne!(a, b);
    }
}
