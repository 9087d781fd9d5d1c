//! Collaborators the engine calls through narrow interfaces.

use anchor_lang::prelude::*;

use crate::ciphertext::{CiphertextHandle, RequestId};
use crate::state::{ConstraintOperator, MetadataType, MetadataValue};

/// Homomorphic primitives of the confidential-compute backend.
///
/// Every method works on ciphertext handles and returns a new handle; the
/// engine never sees a plaintext.
pub trait ConfidentialCompute {
    /// Checks the input proof binding `handles` to `owner`.
    fn verify_inputs(
        &mut self,
        owner: &Pubkey,
        handles: &[CiphertextHandle],
        proof: &[u8],
    ) -> Result<()>;

    /// Checks that `handle` encrypts a value of type `kind`.
    fn check_type(&self, handle: &CiphertextHandle, kind: MetadataType) -> Result<()>;

    /// Trivial encryption of a public boolean.
    fn constant_bool(&mut self, value: bool) -> Result<CiphertextHandle>;

    /// Encrypted boolean `handle <operator> bound`.
    fn compare(
        &mut self,
        handle: &CiphertextHandle,
        operator: ConstraintOperator,
        bound: &MetadataValue,
    ) -> Result<CiphertextHandle>;

    fn and(&mut self, lhs: &CiphertextHandle, rhs: &CiphertextHandle) -> Result<CiphertextHandle>;

    /// Number of true bits.
    fn sum(&mut self, bits: &[CiphertextHandle]) -> Result<CiphertextHandle>;

    /// Sum of `values[i]` over the indices where `selectors[i]` is true.
    fn select_sum(
        &mut self,
        values: &[CiphertextHandle],
        selectors: &[CiphertextHandle],
    ) -> Result<CiphertextHandle>;
}

/// Asynchronous decryption service.
///
/// A successful request is answered later, zero or more times, through
/// [`crate::ConfidentialSurvey::on_decrypted`].
pub trait DecryptionOracle {
    fn request_decrypt(&mut self, ciphertexts: &[CiphertextHandle]) -> Result<RequestId>;
}

pub trait TimeSource {
    fn unix_timestamp(&self) -> Result<i64>;
}

/// Reads the cluster clock sysvar.
#[derive(Clone, Copy, Debug, Default)]
pub struct SysvarClock;

impl TimeSource for SysvarClock {
    fn unix_timestamp(&self) -> Result<i64> {
        Ok(Clock::get()?.unix_timestamp)
    }
}
