//! Response persistence over a sled tree
//!
//! One tree, three key namespaces:
//!
//!   r/{offer_id}/{response_id}  -> Response row
//!   i/{response_id}             -> owning offer id
//!   o/{offer_id}                -> open-response set for the offer
//!
//! The open set maps each buyer to their single live (pending or outbid)
//! response. It is read and written inside the same transaction as the
//! rows it points at, which is what enforces the one-open-response-per-
//! buyer rule without a check-then-act window, and it gives the resolver
//! the full set of live rows for cascades without scanning mid-transaction.

use sled::transaction::TransactionalTree;

use crate::error::{tx_abort, MarketError, Result, TxResult};
use crate::offer_store::OfferStore;
use crate::response::Response;

const TREE_NAME: &str = "responses";

pub struct ResponseStore {
    tree: sled::Tree,
}

fn row_key(offer_id: &str, response_id: &str) -> String {
    format!("r/{offer_id}/{response_id}")
}

fn ptr_key(response_id: &str) -> String {
    format!("i/{response_id}")
}

fn open_key(offer_id: &str) -> String {
    format!("o/{offer_id}")
}

fn encode_response(response: &Response) -> Result<Vec<u8>> {
    Ok(minicbor::to_vec(response)?)
}

fn decode_response(bytes: &[u8]) -> Result<Response> {
    Ok(minicbor::decode(bytes)?)
}

/// The live (pending or outbid) responses of one offer, keyed by buyer.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct OpenSet {
    #[n(0)]
    pub entries: Vec<OpenEntry>,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub(crate) struct OpenEntry {
    #[n(0)]
    pub buyer_id: String,
    #[n(1)]
    pub response_id: String,
}

impl OpenSet {
    pub fn entry_for(&self, buyer_id: &str) -> Option<&OpenEntry> {
        self.entries.iter().find(|e| e.buyer_id == buyer_id)
    }

    pub fn upsert(&mut self, buyer_id: &str, response_id: &str) {
        match self.entries.iter_mut().find(|e| e.buyer_id == buyer_id) {
            Some(entry) => entry.response_id = response_id.to_string(),
            None => self.entries.push(OpenEntry {
                buyer_id: buyer_id.to_string(),
                response_id: response_id.to_string(),
            }),
        }
    }

    pub fn remove_buyer(&mut self, buyer_id: &str) {
        self.entries.retain(|e| e.buyer_id != buyer_id);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResponseStore {
    pub fn open(db: &sled::Db) -> Result<Self> {
        Ok(Self {
            tree: db.open_tree(TREE_NAME)?,
        })
    }

    pub(crate) fn tree(&self) -> &sled::Tree {
        &self.tree
    }

    pub fn try_get(&self, response_id: &str) -> Result<Option<Response>> {
        let Some(offer_id) = self.tree.get(ptr_key(response_id).as_bytes())? else {
            return Ok(None);
        };
        let offer_id = String::from_utf8_lossy(&offer_id).into_owned();
        match self.tree.get(row_key(&offer_id, response_id).as_bytes())? {
            Some(bytes) => Ok(Some(decode_response(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get(&self, response_id: &str) -> Result<Response> {
        self.try_get(response_id)?
            .ok_or_else(|| MarketError::ResponseNotFound(response_id.to_string()))
    }

    /// Every response submitted against an offer, any status.
    pub fn list_for_offer(&self, offer_id: &str) -> Result<Vec<Response>> {
        let prefix = format!("r/{offer_id}/");
        let mut responses = Vec::new();
        for entry in self.tree.scan_prefix(prefix.as_bytes()) {
            let (_, bytes) = entry?;
            responses.push(decode_response(&bytes)?);
        }
        responses.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(responses)
    }

    /// Every response a buyer has submitted, across all offers.
    pub fn list_for_buyer(&self, buyer_id: &str) -> Result<Vec<Response>> {
        let mut responses = Vec::new();
        for entry in self.tree.scan_prefix(b"r/") {
            let (_, bytes) = entry?;
            let response = decode_response(&bytes)?;
            if response.buyer_id == buyer_id {
                responses.push(response);
            }
        }
        responses.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(responses)
    }

    /// Every response across all of a seller's offers. The "orders and bids
    /// received" view.
    pub fn list_for_seller(&self, seller_id: &str, offers: &OfferStore) -> Result<Vec<Response>> {
        let mut responses = Vec::new();
        for offer in offers.list_for_seller(seller_id)? {
            responses.extend(self.list_for_offer(&offer.id)?);
        }
        responses.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(responses)
    }

    // Transactional access, used by the resolver.

    pub(crate) fn offer_of_tx(tree: &TransactionalTree, response_id: &str) -> TxResult<Option<String>> {
        Ok(tree
            .get(ptr_key(response_id).as_bytes())?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    pub(crate) fn read_row_tx(
        tree: &TransactionalTree,
        offer_id: &str,
        response_id: &str,
    ) -> TxResult<Option<Response>> {
        match tree.get(row_key(offer_id, response_id).as_bytes())? {
            Some(bytes) => Ok(Some(tx_abort(decode_response(&bytes))?)),
            None => Ok(None),
        }
    }

    /// Write a response row and its id pointer.
    pub(crate) fn write_row_tx(tree: &TransactionalTree, response: &Response) -> TxResult<()> {
        tree.insert(
            row_key(&response.offer_id, &response.id).as_bytes(),
            tx_abort(encode_response(response))?,
        )?;
        tree.insert(
            ptr_key(&response.id).as_bytes(),
            response.offer_id.as_bytes(),
        )?;
        Ok(())
    }

    pub(crate) fn open_set_tx(tree: &TransactionalTree, offer_id: &str) -> TxResult<OpenSet> {
        match tree.get(open_key(offer_id).as_bytes())? {
            Some(bytes) => tx_abort(minicbor::decode(&bytes).map_err(MarketError::from)),
            None => Ok(OpenSet::default()),
        }
    }

    pub(crate) fn write_open_set_tx(
        tree: &TransactionalTree,
        offer_id: &str,
        set: &OpenSet,
    ) -> TxResult<()> {
        if set.is_empty() {
            tree.remove(open_key(offer_id).as_bytes())?;
        } else {
            tree.insert(
                open_key(offer_id).as_bytes(),
                tx_abort(minicbor::to_vec(set).map_err(MarketError::from))?,
            )?;
        }
        Ok(())
    }

    pub(crate) fn clear_open_set_tx(tree: &TransactionalTree, offer_id: &str) -> TxResult<()> {
        tree.remove(open_key(offer_id).as_bytes())?;
        Ok(())
    }
}
