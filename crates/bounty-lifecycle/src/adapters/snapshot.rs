//! # File Snapshots
//!
//! Persists a [`BoardSnapshot`] so a restarted engine resumes with the same
//! records and id counters.
//!
//! Format: `[MAGIC (7 bytes)][VERSION (1 byte)][bincode payload]`.
//! Writes go to a sibling temp file that is renamed over the target, so a
//! crash mid-write leaves the previous snapshot intact.

use crate::errors::SnapshotError;
use crate::ports::outbound::SnapshotStore;
use crate::service::BoardSnapshot;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Magic bytes for snapshot files.
const SNAPSHOT_MAGIC: &[u8; 7] = b"CBBSNAP";

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u8 = 1;

/// Snapshot store backed by one file.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Store reading and writing `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encode a snapshot with header.
    ///
    /// # Errors
    ///
    /// `SnapshotError::Codec` if encoding fails.
    pub fn encode(snapshot: &BoardSnapshot) -> Result<Vec<u8>, SnapshotError> {
        let payload =
            bincode::serialize(snapshot).map_err(|e| SnapshotError::Codec(e.to_string()))?;
        let mut buf = Vec::with_capacity(SNAPSHOT_MAGIC.len() + 1 + payload.len());
        buf.extend_from_slice(SNAPSHOT_MAGIC);
        buf.push(SNAPSHOT_VERSION);
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Decode and integrity-check a snapshot.
    ///
    /// # Errors
    ///
    /// `BadMagic`, `UnsupportedVersion`, `Codec` or `Corrupt`.
    pub fn decode(data: &[u8]) -> Result<BoardSnapshot, SnapshotError> {
        let header = SNAPSHOT_MAGIC.len();
        if data.len() <= header || &data[..header] != SNAPSHOT_MAGIC {
            return Err(SnapshotError::BadMagic);
        }
        let version = data[header];
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let snapshot: BoardSnapshot = bincode::deserialize(&data[header + 1..])
            .map_err(|e| SnapshotError::Codec(e.to_string()))?;
        snapshot.check().map_err(SnapshotError::Corrupt)?;
        Ok(snapshot)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, snapshot: &BoardSnapshot) -> Result<(), SnapshotError> {
        let bytes = Self::encode(snapshot)?;
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        info!(
            path = %self.path.display(),
            bytes = bytes.len(),
            bounties = snapshot.store.bounties.len(),
            "Snapshot saved"
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<BoardSnapshot>, SnapshotError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No snapshot present");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot = Self::decode(&data)?;
        info!(
            path = %self.path.display(),
            bounties = snapshot.store.bounties.len(),
            "Snapshot loaded"
        );
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::Roles;
    use crate::domain::store::{EntityStore, ReputationLedger};
    use crate::domain::value_objects::Address;

    fn empty_snapshot() -> BoardSnapshot {
        BoardSnapshot {
            roles: Roles {
                owner: Address::new([1; 20]),
                verifier: Address::new([2; 20]),
            },
            store: EntityStore::new(),
            ledger: ReputationLedger::default(),
            taken_at: 42,
        }
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("board.snap"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("board.snap"));
        store.save(&empty_snapshot()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, empty_snapshot());
        assert!(!dir.path().join("board.tmp").exists());
    }

    #[test]
    fn test_bad_magic_rejected() {
        assert!(matches!(
            FileSnapshotStore::decode(b"NOTASNAPSHOT"),
            Err(SnapshotError::BadMagic)
        ));
    }

    #[test]
    fn test_future_version_rejected() {
        let mut bytes = FileSnapshotStore::encode(&empty_snapshot()).unwrap();
        bytes[SNAPSHOT_MAGIC.len()] = SNAPSHOT_VERSION + 1;
        assert!(matches!(
            FileSnapshotStore::decode(&bytes),
            Err(SnapshotError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let bytes = FileSnapshotStore::encode(&empty_snapshot()).unwrap();
        let truncated = &bytes[..bytes.len() - 4];
        assert!(matches!(
            FileSnapshotStore::decode(truncated),
            Err(SnapshotError::Codec(_))
        ));
    }
}
