//! # Entity Store
//!
//! Arena-style tables, one per entity kind: an id → record map plus a
//! next-id counter. Ids start at 0, increase by one per insert and are
//! never reused. Records are never removed.

use super::entities::{Application, Bounty, ReputationRecord, Submission, UserProfile};
use super::value_objects::{Address, ProfileId};
use crate::errors::{EntityKind, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// TABLE
// =============================================================================

/// One entity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table<E> {
    kind: EntityKind,
    rows: BTreeMap<u64, E>,
    next_id: u64,
}

impl<E> Table<E> {
    /// Empty table for `kind`.
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            rows: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Id the next insert will receive.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Insert a record built from its assigned id.
    pub fn insert_with(&mut self, build: impl FnOnce(u64) -> E) -> u64 {
        let id = self.next_id;
        self.rows.insert(id, build(id));
        self.next_id += 1;
        id
    }

    /// Look up a record.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&E> {
        self.rows.get(&id)
    }

    /// Look up a record, failing with `NotFound`.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if `id` was never assigned.
    pub fn fetch(&self, id: u64) -> Result<&E, StoreError> {
        self.rows.get(&id).ok_or(StoreError::NotFound {
            kind: self.kind,
            id,
        })
    }

    /// Apply `mutate` to a record.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if `id` was never assigned; nothing is
    /// mutated in that case.
    pub fn update<R>(&mut self, id: u64, mutate: impl FnOnce(&mut E) -> R) -> Result<R, StoreError> {
        let kind = self.kind;
        self.rows
            .get_mut(&id)
            .map(mutate)
            .ok_or(StoreError::NotFound { kind, id })
    }

    /// Records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.rows.values()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check the counter is ahead of every stored id.
    ///
    /// # Errors
    ///
    /// Describes the first id at or past the counter.
    pub fn check_counter(&self) -> Result<(), String> {
        match self.rows.keys().next_back() {
            Some(&max) if max >= self.next_id => Err(format!(
                "{} id {max} not below counter {}",
                self.kind, self.next_id
            )),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// ENTITY STORE
// =============================================================================

/// All entity tables plus the profile identity index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStore {
    /// Bounties.
    pub bounties: Table<Bounty>,
    /// Applications.
    pub applications: Table<Application>,
    /// Submissions.
    pub submissions: Table<Submission>,
    /// Profiles.
    pub profiles: Table<UserProfile>,
    profile_index: HashMap<Address, ProfileId>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bounties: Table::new(EntityKind::Bounty),
            applications: Table::new(EntityKind::Application),
            submissions: Table::new(EntityKind::Submission),
            profiles: Table::new(EntityKind::Profile),
            profile_index: HashMap::new(),
        }
    }

    /// Profile id registered for `identity`.
    #[must_use]
    pub fn profile_id(&self, identity: &Address) -> Option<ProfileId> {
        self.profile_index.get(identity).copied()
    }

    /// Profile registered for `identity`.
    #[must_use]
    pub fn profile(&self, identity: &Address) -> Option<&UserProfile> {
        self.profile_id(identity)
            .and_then(|id| self.profiles.get(id))
    }

    /// Insert a profile and index it by identity.
    ///
    /// Callers check for an existing profile first; a second insert for the
    /// same identity would shadow the first in the index.
    pub fn insert_profile(&mut self, build: impl FnOnce(ProfileId) -> UserProfile) -> ProfileId {
        let id = self.profiles.insert_with(build);
        if let Some(identity) = self.profiles.get(id).map(|p| p.identity) {
            self.profile_index.insert(identity, id);
        }
        id
    }

    /// Check the cross-table invariants a restored snapshot must satisfy.
    ///
    /// # Errors
    ///
    /// Describes the first violated invariant.
    pub fn check_integrity(&self) -> Result<(), String> {
        self.bounties.check_counter()?;
        self.applications.check_counter()?;
        self.submissions.check_counter()?;
        self.profiles.check_counter()?;

        for app in self.applications.iter() {
            if self.bounties.get(app.bounty_id).is_none() {
                return Err(format!(
                    "application {} references missing bounty {}",
                    app.id, app.bounty_id
                ));
            }
        }
        for sub in self.submissions.iter() {
            if self.applications.get(sub.application_id).is_none() {
                return Err(format!(
                    "submission {} references missing application {}",
                    sub.id, sub.application_id
                ));
            }
        }
        if self.profile_index.len() != self.profiles.len() {
            return Err("profile index out of sync with profile table".into());
        }
        for (identity, id) in &self.profile_index {
            if self.profiles.get(*id).map(|p| p.identity) != Some(*identity) {
                return Err(format!("profile index entry {identity} -> {id} is stale"));
            }
        }
        Ok(())
    }
}

// =============================================================================
// REPUTATION LEDGER
// =============================================================================

/// Per-identity encrypted reputation. Writes replace the record wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationLedger {
    records: HashMap<Address, ReputationRecord>,
}

impl ReputationLedger {
    /// Replace the record for `identity`, returning the previous one.
    pub fn upsert(&mut self, identity: Address, record: ReputationRecord) -> Option<ReputationRecord> {
        self.records.insert(identity, record)
    }

    /// Current record for `identity`.
    #[must_use]
    pub fn get(&self, identity: &Address) -> Option<&ReputationRecord> {
        self.records.get(identity)
    }

    /// Number of identities with a record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no identity has a record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ReputationSource;
    use crate::domain::value_objects::{EncryptedValue, Proof};

    fn profile(id: ProfileId, identity: Address) -> UserProfile {
        UserProfile {
            id,
            identity,
            profile_hash: "ipfs://profile".into(),
            skill: EncryptedValue::new(vec![7]),
            proof: Proof::new(vec![1]),
            is_verified: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_ids_are_sequential_from_zero() {
        let mut table: Table<&str> = Table::new(EntityKind::Bounty);
        assert_eq!(table.insert_with(|_| "a"), 0);
        assert_eq!(table.insert_with(|_| "b"), 1);
        assert_eq!(table.next_id(), 2);
        assert_eq!(table.get(1), Some(&"b"));
    }

    #[test]
    fn test_builder_sees_assigned_id() {
        let mut table: Table<u64> = Table::new(EntityKind::Submission);
        table.insert_with(|id| id * 10);
        table.insert_with(|id| id * 10);
        assert_eq!(table.get(1), Some(&10));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let mut table: Table<u32> = Table::new(EntityKind::Application);
        let err = table.update(4, |v| *v += 1).unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                kind: EntityKind::Application,
                id: 4
            }
        );
        assert_eq!(table.next_id(), 0);
    }

    #[test]
    fn test_update_applies_mutation() {
        let mut table: Table<u32> = Table::new(EntityKind::Application);
        table.insert_with(|_| 1);
        let doubled = table
            .update(0, |v| {
                *v *= 2;
                *v
            })
            .unwrap();
        assert_eq!(doubled, 2);
        assert_eq!(table.fetch(0), Ok(&2));
    }

    #[test]
    fn test_profile_index() {
        let mut store = EntityStore::new();
        let alice = Address::new([1; 20]);
        let id = store.insert_profile(|id| profile(id, alice));
        assert_eq!(store.profile_id(&alice), Some(id));
        assert_eq!(store.profile(&alice).map(|p| p.id), Some(0));
        assert!(store.profile(&Address::new([2; 20])).is_none());
        assert!(store.check_integrity().is_ok());
    }

    #[test]
    fn test_integrity_detects_unindexed_profile() {
        let mut store = EntityStore::new();
        store.profiles.insert_with(|id| profile(id, Address::new([3; 20])));
        assert!(store.check_integrity().is_err());
    }

    #[test]
    fn test_ledger_upsert_replaces() {
        let mut ledger = ReputationLedger::default();
        let who = Address::new([9; 20]);
        let record = |b: u8| ReputationRecord {
            value: EncryptedValue::new(vec![b]),
            proof: Proof::new(vec![b]),
            updated_at: u64::from(b),
            source: ReputationSource::Verifier,
        };
        assert!(ledger.upsert(who, record(1)).is_none());
        let previous = ledger.upsert(who, record(2)).unwrap();
        assert_eq!(previous.value.as_bytes(), &[1]);
        assert_eq!(ledger.get(&who).unwrap().value.as_bytes(), &[2]);
        assert_eq!(ledger.len(), 1);
    }
}
