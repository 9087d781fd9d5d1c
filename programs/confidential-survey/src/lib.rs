//! Confidential Surveys - Solana Anchor state with Arcium MXE decryption
//!
//! Participants submit encrypted votes and metadata; aggregates are only
//! decrypted, through the MXE, once the survey closes, and are only reported
//! when enough participants contributed.

// Anchor macros emit cfgs for features this crate does not declare
#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;

pub mod backend;
pub mod ciphertext;
pub mod constants;
pub mod dev;
pub mod error;
pub mod events;
pub mod ledger;
pub mod mxe;
pub mod query;
pub mod registry;
pub mod reveal;
pub mod state;
pub mod whitelist;

pub use backend::{ConfidentialCompute, DecryptionOracle, SysvarClock, TimeSource};
pub use ciphertext::{CiphertextHandle, EncryptedEntry, RequestId};
pub use error::SurveyError;
pub use state::{
    Constraint, ConstraintOperator, Entry, MetadataType, MetadataValue, QueryData, QueryStatus,
    RevealStatus, SurveyData, SurveyParams, SurveyType,
};

use ledger::EntryLedger;
use query::QueryEngine;
use registry::SurveyRegistry;
use reveal::RevealCoordinator;

declare_id!("D86gLK1s4KUJxKMUXuDiA4qTw3HerQUWRUmDXpwb6iTq");

/// The survey engine: registry, ledger and both reveal state machines,
/// wired to a confidential-compute backend, a decryption oracle and a clock.
///
/// Every operation either succeeds with its documented effect or returns one
/// [`SurveyError`] and leaves state untouched.
pub struct ConfidentialSurvey<B, O, T> {
    backend: B,
    oracle: O,
    clock: T,
    registry: SurveyRegistry,
    ledger: EntryLedger,
    reveals: RevealCoordinator,
    queries: QueryEngine,
}

impl<B, O, T> ConfidentialSurvey<B, O, T>
where
    B: ConfidentialCompute,
    O: DecryptionOracle,
    T: TimeSource,
{
    pub fn new(backend: B, oracle: O, clock: T) -> Self {
        Self {
            backend,
            oracle,
            clock,
            registry: SurveyRegistry::default(),
            ledger: EntryLedger::default(),
            reveals: RevealCoordinator::default(),
            queries: QueryEngine::default(),
        }
    }

    // ==================== SURVEYS ====================

    pub fn create_survey(&mut self, params: SurveyParams) -> Result<u64> {
        let now = self.clock.unix_timestamp()?;
        self.registry.create(params, now)
    }

    pub fn survey_params(&self, survey_id: u64) -> Result<&SurveyParams> {
        self.registry.params(survey_id)
    }

    pub fn survey_data(&self, survey_id: u64) -> Result<&SurveyData> {
        self.registry.data(survey_id)
    }

    pub fn survey_details(&self, survey_id: u64) -> Result<(&SurveyParams, &SurveyData)> {
        self.registry.details(survey_id)
    }

    pub fn last_survey_id(&self) -> u64 {
        self.registry.last_survey_id()
    }

    // ==================== ENTRIES ====================

    /// Submits to a survey without a whitelist.
    pub fn submit_entry(
        &mut self,
        survey_id: u64,
        participant: Pubkey,
        input: EncryptedEntry,
    ) -> Result<u64> {
        let now = self.clock.unix_timestamp()?;
        self.ledger.submit(
            &mut self.registry,
            &mut self.backend,
            now,
            survey_id,
            participant,
            input,
            None,
        )
    }

    /// Submits with a Merkle proof of whitelist membership.
    pub fn submit_whitelisted_entry(
        &mut self,
        survey_id: u64,
        participant: Pubkey,
        input: EncryptedEntry,
        proof: &[[u8; 32]],
    ) -> Result<u64> {
        let now = self.clock.unix_timestamp()?;
        self.ledger.submit(
            &mut self.registry,
            &mut self.backend,
            now,
            survey_id,
            participant,
            input,
            Some(proof),
        )
    }

    pub fn has_voted(&self, survey_id: u64, participant: &Pubkey) -> bool {
        self.ledger.has_voted(survey_id, participant)
    }

    pub fn entry(&self, survey_id: u64, participant: &Pubkey) -> Option<&Entry> {
        self.ledger.entry(survey_id, participant)
    }

    pub fn entry_count(&self, survey_id: u64) -> usize {
        self.ledger.entry_count(survey_id)
    }

    // ==================== REVEAL ====================

    /// Asks the oracle to decrypt the survey's tally and participant count.
    /// Returns immediately; poll [`SurveyData::is_completed`].
    pub fn request_reveal(&mut self, survey_id: u64) -> Result<RequestId> {
        let now = self.clock.unix_timestamp()?;
        self.reveals.request_reveal(
            &mut self.registry,
            &self.ledger,
            &mut self.backend,
            &mut self.oracle,
            now,
            survey_id,
        )
    }

    pub fn reveal_results(&mut self, survey_id: u64) -> Result<RequestId> {
        self.request_reveal(survey_id)
    }

    pub(crate) fn reveal_callback(
        &mut self,
        survey_id: u64,
        tally: u64,
        participants: u64,
    ) -> Result<()> {
        self.reveals
            .reveal_callback(&mut self.registry, &self.ledger, survey_id, tally, participants)
    }

    // ==================== QUERIES ====================

    pub fn create_query(&mut self, survey_id: u64, filters: Vec<Vec<Constraint>>) -> Result<u64> {
        self.queries.create_query(&self.registry, survey_id, filters)
    }

    pub fn execute_query(&mut self, query_id: u64) -> Result<RequestId> {
        self.queries.execute_query(
            &self.registry,
            &self.ledger,
            &mut self.backend,
            &mut self.oracle,
            query_id,
        )
    }

    pub(crate) fn query_callback(
        &mut self,
        query_id: u64,
        selected_count: u64,
        result: u64,
    ) -> Result<()> {
        self.queries
            .query_callback(&self.registry, &self.ledger, query_id, selected_count, result)
    }

    pub fn query_data(&self, query_id: u64) -> Result<&QueryData> {
        self.queries.query_data(query_id)
    }

    pub fn last_query_id(&self) -> u64 {
        self.queries.last_query_id()
    }

    // ==================== ORACLE ====================

    /// Delivery of decrypted plaintexts for `request_id`. Safe to replay.
    /// The only way results enter the engine.
    pub fn on_decrypted(&mut self, request_id: RequestId, plaintexts: &[u64]) -> Result<()> {
        let [first, second] = plaintexts else {
            return err!(SurveyError::MalformedDecryption);
        };
        if let Some(survey_id) = self.reveals.survey_for(request_id) {
            return self.reveal_callback(survey_id, *first, *second);
        }
        if let Some(query_id) = self.queries.query_for(request_id) {
            return self.query_callback(query_id, *first, *second);
        }
        err!(SurveyError::UnknownSurveyOrQuery)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }
}
