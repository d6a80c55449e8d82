//! Hash-binding cryptographic collaborator.
//!
//! Stands in for a homomorphic-encryption stack in single-process
//! deployments and tests. A proof is the Keccak-256 of the submitter and
//! the length-prefixed ciphertexts, so a proof produced for one identity
//! or one set of values does not validate any other. Reputation accrual
//! chains the previous ciphertext with the quality score.

use crate::domain::entities::ReputationRecord;
use crate::domain::value_objects::{keccak256, Address, EncryptedInput, EncryptedValue, Proof};
use crate::ports::outbound::{ConfidentialCompute, CryptoError};
use tracing::debug;

const PROOF_DOMAIN: &[u8] = b"cbb.input-proof.v1";
const ACCRUE_DOMAIN: &[u8] = b"cbb.reputation-accrue.v1";
const ACCRUE_PROOF_DOMAIN: &[u8] = b"cbb.reputation-proof.v1";

/// Collaborator whose proofs are hash commitments.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashBindingCompute;

impl HashBindingCompute {
    /// Proof binding `values` to `submitter`.
    #[must_use]
    pub fn prove(submitter: &Address, values: &[EncryptedValue]) -> Proof {
        let mut parts: Vec<Vec<u8>> = Vec::with_capacity(values.len() * 2 + 2);
        parts.push(PROOF_DOMAIN.to_vec());
        parts.push(submitter.as_bytes().to_vec());
        for value in values {
            parts.push((value.len() as u64).to_le_bytes().to_vec());
            parts.push(value.as_bytes().to_vec());
        }
        let slices: Vec<&[u8]> = parts.iter().map(Vec::as_slice).collect();
        Proof::new(keccak256(&slices).as_bytes().to_vec())
    }

    /// Input carrying `values` with a proof bound to `submitter`.
    #[must_use]
    pub fn seal(submitter: &Address, values: Vec<EncryptedValue>) -> EncryptedInput {
        let proof = Self::prove(submitter, &values);
        EncryptedInput::new(values, proof)
    }
}

impl ConfidentialCompute for HashBindingCompute {
    fn verify_input(&self, submitter: &Address, input: &EncryptedInput) -> Result<(), CryptoError> {
        let expected = Self::prove(submitter, &input.values);
        if expected == input.proof {
            Ok(())
        } else {
            debug!(submitter = %submitter.short(), "Proof does not bind input");
            Err(CryptoError::ProofRejected(
                "proof does not bind the ciphertexts to the submitter".into(),
            ))
        }
    }

    fn accrue_reputation(
        &self,
        current: Option<&ReputationRecord>,
        quality: &EncryptedValue,
    ) -> Result<(EncryptedValue, Proof), CryptoError> {
        let previous = current.map_or(&[][..], |r| r.value.as_bytes());
        let value = EncryptedValue::new(
            keccak256(&[ACCRUE_DOMAIN, previous, quality.as_bytes()])
                .as_bytes()
                .to_vec(),
        );
        let proof = Proof::new(
            keccak256(&[ACCRUE_PROOF_DOMAIN, value.as_bytes()])
                .as_bytes()
                .to_vec(),
        );
        Ok((value, proof))
    }
}
