use anchor_lang::prelude::*;

use crate::constants::{MAX_CONSTRAINTS_PER_FIELD, MAX_METADATA_FIELDS, QUERY_SEED};
use crate::state::Constraint;

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryStatus {
    Draft,
    AwaitingOracle { request_id: u64 },
    Completed,
}

/// A filtered re-aggregation over a revealed survey's entries.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct QueryData {
    pub survey_id: u64,
    /// Selection filters, one AND-chain per metadata field
    #[max_len(MAX_METADATA_FIELDS, MAX_CONSTRAINTS_PER_FIELD)]
    pub filters: Vec<Vec<Constraint>>,
    pub status: QueryStatus,
    pub is_valid: bool,
    pub final_selected_count: u64,
    final_result: u64,
}

impl QueryData {
    pub(crate) fn new(survey_id: u64, filters: Vec<Vec<Constraint>>) -> Self {
        Self {
            survey_id,
            filters,
            status: QueryStatus::Draft,
            is_valid: false,
            final_selected_count: 0,
            final_result: 0,
        }
    }

    pub fn address(query_id: u64) -> Pubkey {
        Pubkey::find_program_address(&[QUERY_SEED, &query_id.to_le_bytes()], &crate::ID).0
    }

    pub fn is_completed(&self) -> bool {
        self.status == QueryStatus::Completed
    }

    /// Aggregate over the selected entries. Withheld unless the selection
    /// reached the survey's response threshold.
    pub fn result(&self) -> Option<u64> {
        (self.is_completed() && self.is_valid).then_some(self.final_result)
    }

    pub(crate) fn complete(&mut self, selected: u64, result: u64, threshold: u64) {
        self.final_selected_count = selected;
        self.final_result = result;
        self.is_valid = selected >= threshold;
        self.status = QueryStatus::Completed;
    }
}
