use crate::blockchain::core::chain::{Block, Chain, GenesisSecret};
use crate::blockchain::core::validation::{ChainVerifier, Verification};
use crate::clock::{SystemClock, TimestampSource};
use crate::error::{ChainError, Result};
use crate::persistence::Persistence;
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Append, lookup and verification over a single store.
///
/// Appends are serialized through an internal mutex and, for stores that
/// support it, the store's cross-process writer lock.
pub struct Ledger {
    store: Box<dyn Persistence>,
    genesis: GenesisSecret,
    verifier: ChainVerifier,
    clock: Box<dyn TimestampSource>,
    append_lock: Mutex<()>,
}

impl Ledger {
    pub fn new(store: Box<dyn Persistence>, genesis: GenesisSecret) -> Self {
        Self::with_clock(store, genesis, Box::new(SystemClock))
    }

    pub fn with_clock(
        store: Box<dyn Persistence>,
        genesis: GenesisSecret,
        clock: Box<dyn TimestampSource>,
    ) -> Self {
        let verifier = ChainVerifier::new(&genesis);
        Ledger {
            store,
            genesis,
            verifier,
            clock,
            append_lock: Mutex::new(()),
        }
    }

    /// Whole chain as currently persisted.
    pub fn load(&self) -> Chain {
        self.store.load()
    }

    /// Appends a block linked to the current tail and persists the chain.
    ///
    /// Load, tail digest, push and save happen under the append lock and the
    /// store lock with no suspension point in between. If the save fails
    /// nothing is appended.
    pub fn append(&self, name: &str, amount: f64) -> Result<Block> {
        if !amount.is_finite() {
            return Err(ChainError::InvalidInput(format!(
                "amount must be a finite number, got {}",
                amount
            )));
        }

        let _guard = self.append_lock.lock();
        let _store_lock = self.store.lock()?;

        let mut chain = self.store.load();
        let link_hash = chain.next_link_hash(&self.genesis)?;

        let id = loop {
            let candidate = Uuid::new_v4().to_string();
            if chain.position(&candidate).is_none() {
                break candidate;
            }
        };

        let block = Block {
            id,
            name: name.to_string(),
            amount,
            timestamp: self.clock.now(),
            link_hash,
        };

        chain.push(block.clone());
        self.store.save(&chain)?;

        info!(
            id = %block.id,
            index = chain.len() - 1,
            link_hash = %block.link_hash,
            "ledger.append"
        );
        Ok(block)
    }

    /// Verifies the whole persisted chain.
    pub fn verify(&self) -> Result<Verification> {
        let chain = self.store.load();
        let result = self.verifier.verify(&chain.blocks)?;
        if let Some(link) = result.broken_link() {
            warn!(index = link.index, block_id = %link.block_id, "ledger.verify failed");
        } else {
            debug!(length = chain.len(), "ledger.verify ok");
        }
        Ok(result)
    }

    /// Returns the block with `id` once every block up to and including it
    /// verifies. Later blocks are not checked.
    pub fn find(&self, id: &str) -> Result<Block> {
        let chain = self.store.load();
        let index = chain
            .position(id)
            .ok_or_else(|| ChainError::NotFound(id.to_string()))?;

        let result = self.verifier.verify(chain.prefix(index))?;
        if let Verification::Broken(link) = result {
            warn!(id = %id, index = link.index, "ledger.find refused: prefix does not verify");
            return Err(ChainError::IntegrityError(link));
        }

        Ok(chain.blocks[index].clone())
    }

    pub fn tail(&self) -> Option<Block> {
        self.store.load().tail().cloned()
    }

    pub fn len(&self) -> usize {
        self.store.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::persistence::InMemoryPersistence;
    use std::collections::HashSet;

    const TS: &str = "2024-05-01T12:00:00.000Z";

    fn ledger_with(store: InMemoryPersistence) -> Ledger {
        Ledger::with_clock(
            Box::new(store),
            GenesisSecret::new("test-secret"),
            Box::new(FixedClock(TS.to_string())),
        )
    }

    /// Store whose writes always fail.
    struct ReadOnlyStore(InMemoryPersistence);

    impl Persistence for ReadOnlyStore {
        fn load(&self) -> Chain {
            self.0.load()
        }

        fn save(&self, _chain: &Chain) -> Result<()> {
            Err(ChainError::IoError("disk is read-only".to_string()))
        }
    }

    #[test]
    fn test_two_block_scenario() {
        let ledger = ledger_with(InMemoryPersistence::new());
        let a = ledger.append("A", 10.0).unwrap();
        let b = ledger.append("B", 20.0).unwrap();

        let chain = ledger.load();
        assert_eq!(chain.len(), 2);
        assert_eq!(a.link_hash, GenesisSecret::new("test-secret").link_hash());
        assert_eq!(b.link_hash, a.hash().unwrap());
        assert_eq!(a.timestamp, TS);
        assert!(ledger.verify().unwrap().is_intact());
    }

    #[test]
    fn test_append_then_load_tail() {
        let ledger = ledger_with(InMemoryPersistence::new());
        ledger.append("first", 1.0).unwrap();
        let appended = ledger.append("second", 2.5).unwrap();
        assert_eq!(ledger.load().tail(), Some(&appended));
        assert_eq!(ledger.tail(), Some(appended));
    }

    #[test]
    fn test_ids_are_unique() {
        let ledger = ledger_with(InMemoryPersistence::new());
        let ids: HashSet<String> = (0..25)
            .map(|i| ledger.append("donor", i as f64).unwrap().id)
            .collect();
        assert_eq!(ids.len(), 25);
    }

    #[test]
    fn test_rejects_non_finite_amount() {
        let ledger = ledger_with(InMemoryPersistence::new());
        for amount in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                ledger.append("x", amount),
                Err(ChainError::InvalidInput(_))
            ));
        }
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_failed_save_appends_nothing() {
        let inner = InMemoryPersistence::new();
        let ledger = Ledger::new(
            Box::new(ReadOnlyStore(inner.clone())),
            GenesisSecret::new("test-secret"),
        );
        let err = ledger.append("A", 10.0).unwrap_err();
        assert!(matches!(err, ChainError::IoError(_)));
        assert!(inner.load().is_empty());
        assert_eq!(ledger.len(), 0);
    }

    /// Store whose writer lock is never granted.
    struct ContendedStore(InMemoryPersistence);

    impl Persistence for ContendedStore {
        fn load(&self) -> Chain {
            self.0.load()
        }

        fn save(&self, chain: &Chain) -> Result<()> {
            self.0.save(chain)
        }

        fn lock(&self) -> Result<crate::persistence::StoreLock> {
            Err(ChainError::IoError("lock unavailable".to_string()))
        }
    }

    #[test]
    fn test_append_requires_store_lock() {
        let inner = InMemoryPersistence::new();
        let ledger = Ledger::new(
            Box::new(ContendedStore(inner.clone())),
            GenesisSecret::new("test-secret"),
        );
        assert!(matches!(ledger.append("A", 1.0), Err(ChainError::IoError(_))));
        assert!(inner.load().is_empty());
    }

    #[test]
    fn test_find_existing_block() {
        let ledger = ledger_with(InMemoryPersistence::new());
        ledger.append("A", 1.0).unwrap();
        let b = ledger.append("B", 2.0).unwrap();
        ledger.append("C", 3.0).unwrap();
        assert_eq!(ledger.find(&b.id).unwrap(), b);
    }

    #[test]
    fn test_find_missing_block() {
        let ledger = ledger_with(InMemoryPersistence::new());
        ledger.append("A", 1.0).unwrap();
        assert_eq!(
            ledger.find("no-such-id").unwrap_err(),
            ChainError::NotFound("no-such-id".to_string())
        );
    }

    #[test]
    fn test_find_fails_closed_on_tampered_prefix() {
        let store = InMemoryPersistence::new();
        let ledger = ledger_with(store.clone());
        ledger.append("A", 1.0).unwrap();
        ledger.append("B", 2.0).unwrap();
        let c = ledger.append("C", 3.0).unwrap();

        let mut chain = store.load();
        chain.blocks[0].amount = 100.0;
        store.save(&chain).unwrap();

        match ledger.find(&c.id) {
            Err(ChainError::IntegrityError(link)) => assert_eq!(link.index, 1),
            other => panic!("expected integrity error, got {:?}", other),
        }
    }

    #[test]
    fn test_find_ignores_tampering_after_target() {
        let store = InMemoryPersistence::new();
        let ledger = ledger_with(store.clone());
        let a = ledger.append("A", 1.0).unwrap();
        ledger.append("B", 2.0).unwrap();
        ledger.append("C", 3.0).unwrap();

        let mut chain = store.load();
        chain.blocks[1].name = "changed".to_string();
        store.save(&chain).unwrap();

        assert_eq!(ledger.find(&a.id).unwrap(), a);
        assert!(!ledger.verify().unwrap().is_intact());
    }

    #[test]
    fn test_chain_from_other_secret_fails_verification() {
        let store = InMemoryPersistence::new();
        let first = ledger_with(store.clone());
        let a = first.append("A", 1.0).unwrap();

        let other = Ledger::new(Box::new(store), GenesisSecret::new("other-secret"));
        assert_eq!(other.verify().unwrap().broken_link().unwrap().index, 0);
        assert!(matches!(other.find(&a.id), Err(ChainError::IntegrityError(_))));
    }
}
