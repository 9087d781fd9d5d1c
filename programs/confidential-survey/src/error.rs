use anchor_lang::prelude::*;

#[error_code]
pub enum SurveyError {
    // InvalidSurveyParameter family: one variant per offending field
    #[msg("Invalid survey parameter: prompt")]
    InvalidSurveyPrompt,
    #[msg("Invalid survey parameter: whitelist root hash")]
    InvalidWhitelistRoot,
    #[msg("Invalid survey parameter: survey end time")]
    InvalidSurveyEndTime,
    #[msg("Invalid survey parameter: minimum response threshold")]
    InvalidResponseThreshold,
    #[msg("Invalid survey parameter: metadata names/types")]
    InvalidMetadataDeclaration,
    #[msg("Invalid survey parameter: constraints")]
    InvalidConstraint,

    #[msg("Survey is closed")]
    SurveyClosed,
    #[msg("Already voted")]
    AlreadyVoted,
    #[msg("Participant is not whitelisted")]
    NotWhitelisted,
    #[msg("Metadata count does not match the survey declaration")]
    MetadataArityMismatch,
    #[msg("Ciphertext input proof rejected")]
    InvalidCiphertext,
    #[msg("Ciphertext type does not match the survey declaration")]
    MetadataTypeMismatch,

    #[msg("Reveal already requested")]
    RevealAlreadyRequested,
    #[msg("Survey end time not reached yet")]
    ThresholdNotYetEvaluable,
    #[msg("No decryption pending for this survey or query")]
    NoPendingDecryption,
    #[msg("Decryption response has the wrong shape")]
    MalformedDecryption,
    #[msg("Decryption request could not be queued")]
    DecryptionRequestFailed,

    #[msg("Query requires a completed and valid survey")]
    QueryNotAllowed,
    #[msg("Query filter does not match the survey metadata")]
    InvalidQueryFilter,
    #[msg("Query already executed")]
    QueryAlreadyExecuted,

    #[msg("Unknown survey or query")]
    UnknownSurveyOrQuery,
    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
}

impl SurveyError {
    /// Name of the survey parameter an `InvalidSurveyParameter` error refers to.
    pub fn survey_parameter(&self) -> Option<&'static str> {
        match self {
            SurveyError::InvalidSurveyPrompt => Some("survey_prompt"),
            SurveyError::InvalidWhitelistRoot => Some("whitelist_root_hash"),
            SurveyError::InvalidSurveyEndTime => Some("survey_end_time"),
            SurveyError::InvalidResponseThreshold => Some("min_response_threshold"),
            SurveyError::InvalidMetadataDeclaration => Some("metadata_types"),
            SurveyError::InvalidConstraint => Some("constraints"),
            _ => None,
        }
    }
}
