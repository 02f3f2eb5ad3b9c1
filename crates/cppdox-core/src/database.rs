//! Concurrent symbol tables keyed by [`SymbolId`].

use crate::ids::SymbolId;
use crate::symbols::{AliasSymbol, EnumSymbol, FunctionSymbol, NamespaceSymbol, RecordSymbol};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

/// A concurrent append/update table of symbols.
///
/// Workers race through the `contains` / `reserve` / `update` protocol: the
/// worker that wins the reservation for an ID publishes its extraction
/// result, losers skip silently. `num_matches` counts every candidate an
/// extractor considered, accepted or not, so it exceeds the entry count.
#[derive(Debug, Default)]
pub struct Database<T> {
    entries: RwLock<HashMap<SymbolId, T>>,
    num_matches: AtomicU64,
}

impl<T: Default> Database<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            num_matches: AtomicU64::new(0),
        }
    }

    /// Record that an extractor considered one more candidate of this kind.
    pub fn count_match(&self) {
        self.num_matches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn num_matches(&self) -> u64 {
        self.num_matches.load(Ordering::Relaxed)
    }

    pub fn contains(&self, id: SymbolId) -> bool {
        self.read().contains_key(&id)
    }

    /// Reserve a slot for `id` with an empty placeholder.
    ///
    /// Returns `true` when the caller won the reservation and must follow up
    /// with [`update`](Self::update), `false` when the ID was already taken.
    pub fn reserve(&self, id: SymbolId) -> bool {
        let mut entries = self.write();
        if entries.contains_key(&id) {
            return false;
        }
        entries.insert(id, T::default());
        true
    }

    /// Store the extracted symbol for a previously reserved ID.
    pub fn update(&self, id: SymbolId, value: T) {
        self.write().insert(id, value);
    }

    pub fn get(&self, id: SymbolId) -> Option<T>
    where
        T: Clone,
    {
        self.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn ids(&self) -> Vec<SymbolId> {
        self.read().keys().copied().collect()
    }

    /// Shared view of the stored entries.
    pub fn entries(&self) -> RwLockReadGuard<'_, HashMap<SymbolId, T>> {
        self.read()
    }

    /// Exclusive access for the single-threaded post-passes.
    pub fn entries_mut(&mut self) -> &mut HashMap<SymbolId, T> {
        self.entries
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<SymbolId, T>> {
        // A poisoned lock only means a worker panicked mid-insert; the map
        // itself is still usable and the run continues with what it has.
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<SymbolId, T>> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// The finished catalog: one database per documentable kind.
#[derive(Debug, Default)]
pub struct Index {
    pub functions: Database<FunctionSymbol>,
    pub records: Database<RecordSymbol>,
    pub enums: Database<EnumSymbol>,
    pub namespaces: Database<NamespaceSymbol>,
    pub aliases: Database<AliasSymbol>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_gates_duplicates() {
        let db: Database<FunctionSymbol> = Database::new();
        let id = SymbolId::from_usr("c:F:f()");
        assert!(!db.contains(id));
        assert!(db.reserve(id));
        assert!(!db.reserve(id), "second reservation must lose");
        assert!(db.contains(id));
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn update_replaces_placeholder() {
        let db: Database<FunctionSymbol> = Database::new();
        let id = SymbolId::from_usr("c:F:g()");
        assert!(db.reserve(id));
        let mut f = FunctionSymbol::default();
        f.info.id = id;
        f.info.name = "g".into();
        db.update(id, f);
        assert_eq!(db.get(id).unwrap().info.name, "g");
    }

    #[test]
    fn match_counter_is_independent_of_entries() {
        let db: Database<FunctionSymbol> = Database::new();
        db.count_match();
        db.count_match();
        db.count_match();
        let id = SymbolId::from_usr("c:F:h()");
        db.reserve(id);
        assert_eq!(db.num_matches(), 3);
        assert_eq!(db.len(), 1);
        assert!(db.num_matches() >= db.len() as u64);
    }

    #[test]
    fn concurrent_reservation_has_one_winner() {
        let db: std::sync::Arc<Database<FunctionSymbol>> = std::sync::Arc::new(Database::new());
        let id = SymbolId::from_usr("c:F:raced()");
        let mut handles = Vec::new();
        for _ in 0..8 {
            let db = db.clone();
            handles.push(std::thread::spawn(move || db.reserve(id)));
        }
        let winners: usize = handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();
        assert_eq!(winners, 1);
        assert_eq!(db.len(), 1);
    }
}
