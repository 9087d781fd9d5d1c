use anchor_lang::prelude::*;

use crate::constants::*;
use crate::state::Constraint;

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurveyType {
    /// Yes/no question; the result counts the "yes" entries.
    Polling,
    /// Numeric answer; the result sums the submitted values.
    Benchmark,
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataType {
    Boolean,
    Uint256,
}

/// Survey configuration, immutable once created.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct SurveyParams {
    #[max_len(MAX_PROMPT_LEN)]
    pub survey_prompt: String,
    pub survey_type: SurveyType,
    pub is_whitelisted: bool,
    pub whitelist_root_hash: [u8; 32],
    pub survey_end_time: i64,
    pub min_response_threshold: u64,
    #[max_len(MAX_METADATA_FIELDS, MAX_METADATA_NAME_LEN)]
    pub metadata_names: Vec<String>,
    #[max_len(MAX_METADATA_FIELDS)]
    pub metadata_types: Vec<MetadataType>,
    /// Admission rules, one list per metadata field.
    #[max_len(MAX_METADATA_FIELDS, MAX_CONSTRAINTS_PER_FIELD)]
    pub constraints: Vec<Vec<Constraint>>,
}

impl SurveyParams {
    pub fn polling(prompt: impl Into<String>, survey_end_time: i64, threshold: u64) -> Self {
        Self {
            survey_prompt: prompt.into(),
            survey_type: SurveyType::Polling,
            is_whitelisted: false,
            whitelist_root_hash: [0u8; 32],
            survey_end_time,
            min_response_threshold: threshold,
            metadata_names: Vec::new(),
            metadata_types: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, name: impl Into<String>, kind: MetadataType) -> Self {
        self.metadata_names.push(name.into());
        self.metadata_types.push(kind);
        self
    }

    pub fn with_whitelist(mut self, root: [u8; 32]) -> Self {
        self.is_whitelisted = true;
        self.whitelist_root_hash = root;
        self
    }

    pub fn metadata_len(&self) -> usize {
        self.metadata_types.len()
    }

    /// Admission rules for field `index`; empty when the field is unconstrained.
    pub fn field_constraints(&self, index: usize) -> &[Constraint] {
        self.constraints.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealStatus {
    Open,
    AwaitingOracle { request_id: u64 },
    Completed,
}

/// Aggregate state of one survey. Starts zeroed and `Open`.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct SurveyData {
    pub current_participants: u64,
    pub status: RevealStatus,
    pub is_valid: bool,
    final_result: u64,
}

impl Default for SurveyData {
    fn default() -> Self {
        Self {
            current_participants: 0,
            status: RevealStatus::Open,
            is_valid: false,
            final_result: 0,
        }
    }
}

impl SurveyData {
    pub fn address(survey_id: u64) -> Pubkey {
        Pubkey::find_program_address(&[SURVEY_SEED, &survey_id.to_le_bytes()], &crate::ID).0
    }

    pub fn is_completed(&self) -> bool {
        self.status == RevealStatus::Completed
    }

    pub fn is_open(&self) -> bool {
        self.status == RevealStatus::Open
    }

    /// Revealed tally; `None` until completed, and for surveys under threshold.
    pub fn final_result(&self) -> Option<u64> {
        (self.is_completed() && self.is_valid).then_some(self.final_result)
    }

    pub(crate) fn complete(&mut self, tally: u64, participants: u64, threshold: u64) {
        self.current_participants = participants;
        self.is_valid = participants >= threshold;
        self.final_result = tally;
        self.status = RevealStatus::Completed;
    }
}
