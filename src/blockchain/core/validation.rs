use crate::blockchain::core::chain::{Block, GenesisSecret};
use crate::error::{ChainError, Result};
use serde::Serialize;
use std::fmt;

/// First position where a recomputed link does not match the stored one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub index: usize,
    pub block_id: String,
    pub expected: String,
    pub found: String,
}

impl fmt::Display for BrokenLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hash link broken at index {} (block {}): expected {}, found {}",
            self.index, self.block_id, self.expected, self.found
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verification {
    Intact { length: usize },
    Broken(BrokenLink),
}

impl Verification {
    pub fn is_intact(&self) -> bool {
        matches!(self, Verification::Intact { .. })
    }

    pub fn broken_link(&self) -> Option<&BrokenLink> {
        match self {
            Verification::Broken(link) => Some(link),
            Verification::Intact { .. } => None,
        }
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            Verification::Intact { .. } => Ok(()),
            Verification::Broken(link) => Err(ChainError::IntegrityError(link)),
        }
    }
}

/// Recomputes hash links over a block sequence.
///
/// Built from a genesis secret, block 0 must carry the genesis digest. A
/// links-only verifier checks pairwise links from index 1 onward and accepts
/// any first block.
#[derive(Debug, Clone)]
pub struct ChainVerifier {
    genesis_link: Option<String>,
}

impl ChainVerifier {
    pub fn new(genesis: &GenesisSecret) -> Self {
        ChainVerifier {
            genesis_link: Some(genesis.link_hash()),
        }
    }

    pub fn links_only() -> Self {
        ChainVerifier { genesis_link: None }
    }

    /// Stops at the first mismatch. A mismatch is a `Broken` outcome, not an
    /// error; only encoding failures propagate.
    pub fn verify(&self, blocks: &[Block]) -> Result<Verification> {
        if let (Some(expected), Some(first)) = (&self.genesis_link, blocks.first()) {
            if &first.link_hash != expected {
                return Ok(Verification::Broken(BrokenLink {
                    index: 0,
                    block_id: first.id.clone(),
                    expected: expected.clone(),
                    found: first.link_hash.clone(),
                }));
            }
        }

        for (i, pair) in blocks.windows(2).enumerate() {
            let expected = pair[0].hash()?;
            if pair[1].link_hash != expected {
                return Ok(Verification::Broken(BrokenLink {
                    index: i + 1,
                    block_id: pair[1].id.clone(),
                    expected,
                    found: pair[1].link_hash.clone(),
                }));
            }
        }

        Ok(Verification::Intact {
            length: blocks.len(),
        })
    }
}
