// ==================== SEEDS ====================

/// Seeds for PDA derivation of the ledger records
pub const SURVEY_SEED: &[u8] = b"survey";
pub const ENTRY_SEED: &[u8] = b"entry";
pub const QUERY_SEED: &[u8] = b"query";

/// Computation definition name (must match the MXE circuit)
pub const DECRYPT_AGGREGATE_COMP: &str = "decrypt_aggregate";

// ==================== LIMITS ====================

pub const MAX_PROMPT_LEN: usize = 256;
/// Same cap as the survey creation form.
pub const MAX_METADATA_FIELDS: usize = 5;
pub const MAX_METADATA_NAME_LEN: usize = 32;
pub const MAX_CONSTRAINTS_PER_FIELD: usize = 4;
/// Enough for 2^32 whitelisted participants.
pub const MAX_WHITELIST_PROOF_LEN: usize = 32;

/// Encoded constraint bounds are single 32-byte words.
pub const ENCODED_WORD_LEN: usize = 32;
