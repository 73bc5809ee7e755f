use crate::error::Result;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 of `data` as lowercase hex.
pub fn digest_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// One entry of the ledger.
///
/// Field declaration order is part of the canonical encoding; reordering the
/// fields changes every hash computed from a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub timestamp: String,
    /// Digest of the predecessor's canonical encoding, or of the genesis
    /// secret for the first block.
    pub link_hash: String,
}

impl Block {
    /// Deterministic encoding used as hash input: compact JSON over all
    /// fields, `link_hash` included.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// The `link_hash` the block following this one must carry.
    pub fn hash(&self) -> Result<String> {
        Ok(digest_hex(&self.canonical_bytes()?))
    }
}

/// Shared constant seeding the first block's `link_hash`.
#[derive(Clone, PartialEq, Eq)]
pub struct GenesisSecret(String);

impl GenesisSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        GenesisSecret(secret.into())
    }

    /// 32 random bytes, hex encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        GenesisSecret(hex::encode(bytes))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Expected `link_hash` of block 0.
    pub fn link_hash(&self) -> String {
        digest_hex(self.0.as_bytes())
    }
}

impl fmt::Debug for GenesisSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GenesisSecret(<redacted>)")
    }
}

/// Ordered block sequence. The index is the only notion of order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain {
    pub blocks: Vec<Block>,
}

impl Chain {
    pub fn new(blocks: Vec<Block>) -> Self {
        Chain { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn tail(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    /// Blocks `0..=index`, clamped to the chain length.
    pub fn prefix(&self, index: usize) -> &[Block] {
        let end = (index + 1).min(self.blocks.len());
        &self.blocks[..end]
    }

    /// `link_hash` for a block appended right now: the tail's digest, or the
    /// genesis digest on an empty chain.
    pub fn next_link_hash(&self, genesis: &GenesisSecret) -> Result<String> {
        match self.tail() {
            Some(tail) => tail.hash(),
            None => Ok(genesis.link_hash()),
        }
    }

    pub(crate) fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }
}
