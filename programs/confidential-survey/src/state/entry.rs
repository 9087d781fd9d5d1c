use anchor_lang::prelude::*;

use crate::ciphertext::CiphertextHandle;
use crate::constants::{ENTRY_SEED, MAX_METADATA_FIELDS};

/// One participant's admitted submission. Never mutated after admission.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct Entry {
    pub survey_id: u64,
    pub participant: Pubkey,
    /// Encrypted contribution to the tally (a 0/1 bit for polling surveys)
    pub vote: CiphertextHandle,
    #[max_len(MAX_METADATA_FIELDS)]
    pub metadata: Vec<CiphertextHandle>,
    /// Encrypted AND of the survey's admission constraints
    pub validity: CiphertextHandle,
    pub created_at: i64,
}

impl Entry {
    /// PDA of the entry record, unique per (survey, participant).
    pub fn address(survey_id: u64, participant: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[ENTRY_SEED, &survey_id.to_le_bytes(), participant.as_ref()],
            &crate::ID,
        )
        .0
    }
}
