//! Opaque references to values encrypted under the MXE cluster key.
//!
//! The engine never looks inside a handle. It only routes handles to the
//! confidential-compute backend and the decryption oracle.

use anchor_lang::prelude::*;
use std::fmt;

/// Identifier the decryption oracle assigns to a queued request.
pub type RequestId = u64;

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CiphertextHandle {
    bytes: [u8; 32],
}

impl CiphertextHandle {
    pub const LEN: usize = 32;

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.bytes
    }
}

impl fmt::Debug for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CiphertextHandle(")?;
        for b in &self.bytes[..4] {
            write!(f, "{:02x}", b)?;
        }
        write!(f, "..)")
    }
}

/// A participant's encrypted submission: the vote, one handle per declared
/// metadata field, and the input proof binding the handles to the submitter.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct EncryptedEntry {
    pub vote: CiphertextHandle,
    pub metadata: Vec<CiphertextHandle>,
    pub input_proof: Vec<u8>,
}

impl EncryptedEntry {
    /// All handles covered by the input proof, vote first.
    pub fn handles(&self) -> Vec<CiphertextHandle> {
        let mut handles = Vec::with_capacity(1 + self.metadata.len());
        handles.push(self.vote);
        handles.extend_from_slice(&self.metadata);
        handles
    }
}
