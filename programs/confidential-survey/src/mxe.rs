//! Decryption requests packed for the Arcium MXE.
//!
//! Each request becomes a queued `decrypt_aggregate` computation whose
//! arguments reference the aggregate ciphertexts. A relayer drains the queue,
//! submits the computations, and feeds the callbacks back through
//! [`crate::ConfidentialSurvey::on_decrypted`].

use anchor_lang::prelude::*;
use arcium_client::idl::arcium::types::{ArgumentList, ArgumentRef};
use arcium_client::pda::comp_def_offset;
use std::fmt;

use crate::backend::DecryptionOracle;
use crate::ciphertext::{CiphertextHandle, RequestId};
use crate::constants::DECRYPT_AGGREGATE_COMP;
use crate::error::SurveyError;

/// Aggregates are counts and sums, decrypted as u64.
fn build_args_for_decrypt(ciphertexts: &[CiphertextHandle]) -> ArgumentList {
    let mut args = ArgumentList {
        args: Vec::new(),
        byte_arrays: Vec::new(),
        plaintext_numbers: Vec::new(),
        values_128_bit: Vec::new(),
        accounts: Vec::new(),
    };

    for ciphertext in ciphertexts {
        args.args
            .push(ArgumentRef::EncryptedU64(args.byte_arrays.len() as u8));
        args.byte_arrays.push(ciphertext.to_bytes());
    }

    args
}

pub struct QueuedComputation {
    pub computation_offset: u64,
    pub comp_def_offset: u32,
    pub args: ArgumentList,
}

impl fmt::Debug for QueuedComputation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedComputation")
            .field("computation_offset", &self.computation_offset)
            .field("comp_def_offset", &self.comp_def_offset)
            .field("ciphertexts", &self.args.byte_arrays.len())
            .finish()
    }
}

/// [`DecryptionOracle`] that queues MXE computations; the computation offset
/// doubles as the request id.
#[derive(Debug)]
pub struct MxeDecryptionQueue {
    next_offset: u64,
    queue: Vec<QueuedComputation>,
}

impl MxeDecryptionQueue {
    /// Argument indices are single bytes.
    pub const MAX_CIPHERTEXTS: usize = u8::MAX as usize;

    pub fn new(first_offset: u64) -> Self {
        Self {
            next_offset: first_offset,
            queue: Vec::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn drain(&mut self) -> Vec<QueuedComputation> {
        std::mem::take(&mut self.queue)
    }
}

impl DecryptionOracle for MxeDecryptionQueue {
    fn request_decrypt(&mut self, ciphertexts: &[CiphertextHandle]) -> Result<RequestId> {
        require!(
            !ciphertexts.is_empty() && ciphertexts.len() <= Self::MAX_CIPHERTEXTS,
            SurveyError::DecryptionRequestFailed
        );

        let computation_offset = self.next_offset;
        self.next_offset = self
            .next_offset
            .checked_add(1)
            .ok_or(SurveyError::ArithmeticOverflow)?;

        self.queue.push(QueuedComputation {
            computation_offset,
            comp_def_offset: comp_def_offset(DECRYPT_AGGREGATE_COMP),
            args: build_args_for_decrypt(ciphertexts),
        });
        msg!(
            "Queued {} with {} ciphertexts at offset {}",
            DECRYPT_AGGREGATE_COMP,
            ciphertexts.len(),
            computation_offset
        );
        Ok(computation_offset)
    }
}
