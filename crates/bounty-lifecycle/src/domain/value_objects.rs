//! # Value Objects
//!
//! Immutable domain primitives: identities, handles, ciphertexts and the
//! small bounded enumerations carried by a bounty.

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, DeserializeFromStr, SerializeDisplay};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Unix time in seconds.
pub type Timestamp = u64;

/// Bounty identifier.
pub type BountyId = u64;

/// Application identifier.
pub type ApplicationId = u64;

/// Submission identifier.
pub type SubmissionId = u64;

/// Profile identifier.
pub type ProfileId = u64;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte account identity.
///
/// Serialized as a `0x`-prefixed hex string.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, SerializeDisplay, DeserializeFromStr,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(slice).ok().map(Self)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Abbreviated form for log lines (`0x1234abcd...eeff`).
    #[must_use]
    pub fn short(&self) -> String {
        format!("0x{}...{}", hex::encode(&self.0[..4]), hex::encode(&self.0[18..]))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Error parsing an [`Address`] or [`Hash`] from hex.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseHexError {
    /// Not valid hex.
    #[error("invalid hex: {0}")]
    Hex(String),
    /// Decoded to the wrong number of bytes.
    #[error("expected {expected} bytes, got {actual}")]
    Length {
        /// Required length.
        expected: usize,
        /// Decoded length.
        actual: usize,
    },
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], ParseHexError> {
    let raw = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(raw).map_err(|e| ParseHexError::Hex(e.to_string()))?;
    let actual = bytes.len();
    <[u8; N]>::try_from(bytes).map_err(|_| ParseHexError::Length {
        expected: N,
        actual,
    })
}

impl FromStr for Address {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<20>(s).map(Self)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

// =============================================================================
// HASH (32 bytes)
// =============================================================================

/// A 32-byte Keccak-256 digest.
///
/// Used as the public handle of an encrypted field: readers get the
/// handle, never the ciphertext.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, SerializeDisplay, DeserializeFromStr)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The zero hash.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}...", hex::encode(&self.0[..6]))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Hash {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<32>(s).map(Self)
    }
}

/// Keccak-256 over the concatenation of `parts`.
#[must_use]
pub fn keccak256(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    Hash(hasher.finalize().into())
}

// =============================================================================
// ENCRYPTED VALUES
// =============================================================================

/// Opaque ciphertext of a single confidential field.
///
/// The engine only checks presence and size; everything else is the
/// cryptographic collaborator's business.
#[serde_as]
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedValue(#[serde_as(as = "Hex")] pub Vec<u8>);

impl EncryptedValue {
    /// Wrap ciphertext bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Public handle (Keccak-256 of the ciphertext).
    #[must_use]
    pub fn handle(&self) -> Hash {
        keccak256(&[self.0.as_slice()])
    }

    /// Ciphertext bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Ciphertext length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the ciphertext is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for EncryptedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptedValue({} bytes, {:?})", self.0.len(), self.handle())
    }
}

/// Opaque validity proof accompanying one or more ciphertexts.
#[serde_as]
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proof(#[serde_as(as = "Hex")] pub Vec<u8>);

impl Proof {
    /// Wrap proof bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Proof bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Proof length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the proof is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Proof({} bytes)", self.0.len())
    }
}

/// A batch of ciphertexts submitted together under one proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedInput {
    /// Ciphertexts in operation-defined order.
    pub values: Vec<EncryptedValue>,
    /// Proof covering every value.
    pub proof: Proof,
}

impl EncryptedInput {
    /// Input carrying a single ciphertext.
    #[must_use]
    pub fn single(value: EncryptedValue, proof: Proof) -> Self {
        Self {
            values: vec![value],
            proof,
        }
    }

    /// Input carrying several ciphertexts.
    #[must_use]
    pub fn new(values: Vec<EncryptedValue>, proof: Proof) -> Self {
        Self { values, proof }
    }
}

// =============================================================================
// DIFFICULTY
// =============================================================================

/// Bounty difficulty level, 1 (trivial) through 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

/// Display grouping of difficulty levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyBand {
    /// Levels 1-3.
    Easy,
    /// Levels 4-6.
    Medium,
    /// Levels 7-10.
    Hard,
}

impl Difficulty {
    /// Lowest level.
    pub const MIN: u8 = 1;
    /// Highest level.
    pub const MAX: u8 = 10;

    /// Validate a raw level.
    ///
    /// # Errors
    ///
    /// Returns the raw value back when it is outside `1..=10`.
    pub const fn new(level: u8) -> Result<Self, u8> {
        if level >= Self::MIN && level <= Self::MAX {
            Ok(Self(level))
        } else {
            Err(level)
        }
    }

    /// Raw level.
    #[must_use]
    pub const fn level(self) -> u8 {
        self.0
    }

    /// Display band.
    #[must_use]
    pub const fn band(self) -> DifficultyBand {
        match self.0 {
            0..=3 => DifficultyBand::Easy,
            4..=6 => DifficultyBand::Medium,
            _ => DifficultyBand::Hard,
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level).map_err(|l| format!("difficulty {l} outside 1..=10"))
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> Self {
        d.0
    }
}

// =============================================================================
// CATEGORY
// =============================================================================

/// Bounty category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Category {
    /// Security reviews and audits.
    SecurityAuditing = 0,
    /// Frontend work.
    FrontendDevelopment = 1,
    /// Backend work.
    BackendDevelopment = 2,
    /// Research and strategy.
    ResearchStrategy = 3,
    /// Marketing and growth.
    MarketingGrowth = 4,
    /// Cryptography.
    Cryptography = 5,
    /// Community and support.
    CommunitySupport = 6,
    /// Design and UX.
    DesignUx = 7,
}

impl Category {
    /// All categories in code order.
    pub const ALL: [Self; 8] = [
        Self::SecurityAuditing,
        Self::FrontendDevelopment,
        Self::BackendDevelopment,
        Self::ResearchStrategy,
        Self::MarketingGrowth,
        Self::Cryptography,
        Self::CommunitySupport,
        Self::DesignUx,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SecurityAuditing => "Security & Auditing",
            Self::FrontendDevelopment => "Frontend Development",
            Self::BackendDevelopment => "Backend Development",
            Self::ResearchStrategy => "Research & Strategy",
            Self::MarketingGrowth => "Marketing & Growth",
            Self::Cryptography => "Cryptography",
            Self::CommunitySupport => "Community & Support",
            Self::DesignUx => "Design & UX",
        }
    }
}

impl TryFrom<u8> for Category {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or_else(|| format!("category code {code} outside 0..=7"))
    }
}

impl From<Category> for u8 {
    fn from(c: Category) -> Self {
        c as u8
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address::new([0xab; 20]);
        let text = addr.to_string();
        assert!(text.starts_with("0xabab"));
        assert_eq!(text.len(), 42);
        assert_eq!(text.parse::<Address>().unwrap(), addr);
        assert_eq!(
            text.trim_start_matches("0x").parse::<Address>().unwrap(),
            addr
        );
    }

    #[test]
    fn test_address_parse_rejects_wrong_length() {
        assert_eq!(
            "0x1234".parse::<Address>(),
            Err(ParseHexError::Length {
                expected: 20,
                actual: 2
            })
        );
        assert!(matches!(
            "0xzz".parse::<Address>(),
            Err(ParseHexError::Hex(_))
        ));
    }

    #[test]
    fn test_address_serde_as_string() {
        let addr = Address::new([1; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{addr}\""));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_handle_is_keccak_of_ciphertext() {
        let value = EncryptedValue::new(vec![1, 2, 3]);
        assert_eq!(value.handle(), keccak256(&[&[1u8, 2, 3][..]]));
        assert_ne!(value.handle(), EncryptedValue::new(vec![1, 2, 4]).handle());
    }

    #[test]
    fn test_keccak_empty_vector() {
        // Well-known Keccak-256 of the empty string.
        assert_eq!(
            keccak256(&[]).to_string(),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_encrypted_value_serializes_hex() {
        let value = EncryptedValue::new(vec![0xde, 0xad]);
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"dead\"");
    }

    #[test]
    fn test_difficulty_bounds_and_bands() {
        assert!(Difficulty::new(0).is_err());
        assert!(Difficulty::new(11).is_err());
        assert_eq!(Difficulty::new(3).unwrap().band(), DifficultyBand::Easy);
        assert_eq!(Difficulty::new(4).unwrap().band(), DifficultyBand::Medium);
        assert_eq!(Difficulty::new(6).unwrap().band(), DifficultyBand::Medium);
        assert_eq!(Difficulty::new(10).unwrap().band(), DifficultyBand::Hard);
    }

    #[test]
    fn test_difficulty_serde_validates() {
        assert!(serde_json::from_str::<Difficulty>("12").is_err());
        assert_eq!(serde_json::from_str::<Difficulty>("7").unwrap().level(), 7);
    }

    #[test]
    fn test_category_codes() {
        assert_eq!(Category::try_from(0).unwrap(), Category::SecurityAuditing);
        assert_eq!(Category::try_from(7).unwrap(), Category::DesignUx);
        assert!(Category::try_from(8).is_err());
        assert_eq!(u8::from(Category::Cryptography), 5);
        assert_eq!(Category::DesignUx.to_string(), "Design & UX");
    }
}
