use anchor_lang::prelude::*;

#[event]
pub struct SurveyCreated {
    pub survey_id: u64,
    pub is_whitelisted: bool,
    pub survey_end_time: i64,
    pub min_response_threshold: u64,
}

#[event]
pub struct EntrySubmitted {
    pub survey_id: u64,
    pub participant: Pubkey,
    pub current_participants: u64,
}

#[event]
pub struct RevealRequested {
    pub survey_id: u64,
    pub request_id: u64,
}

#[event]
pub struct ResultsRevealed {
    pub survey_id: u64,
    pub participants: u64,
    pub is_valid: bool,
    /// Zero when the survey is under threshold
    pub final_result: u64,
}

#[event]
pub struct QueryCreated {
    pub query_id: u64,
    pub survey_id: u64,
}

#[event]
pub struct QueryExecuted {
    pub query_id: u64,
    pub request_id: u64,
}

#[event]
pub struct QueryResolved {
    pub query_id: u64,
    pub selected_count: u64,
    pub is_valid: bool,
    /// Zero when the selection is under threshold
    pub result: u64,
}
