//! Post-hoc filtered aggregates over a revealed survey.
//!
//! Query state machine: `Draft -> AwaitingOracle -> Completed`. Filters are
//! evaluated homomorphically per entry; only the selected count and the
//! aggregate over the selection are ever decrypted, and the aggregate is
//! withheld when the selection is smaller than the survey's threshold.

use anchor_lang::prelude::*;
use std::collections::BTreeMap;

use crate::backend::{ConfidentialCompute, DecryptionOracle};
use crate::ciphertext::{CiphertextHandle, RequestId};
use crate::constants::MAX_CONSTRAINTS_PER_FIELD;
use crate::error::SurveyError;
use crate::events::{QueryCreated, QueryExecuted, QueryResolved};
use crate::ledger::EntryLedger;
use crate::registry::SurveyRegistry;
use crate::state::{constraints_fit, Constraint, Entry, MetadataType, QueryData, QueryStatus};

#[derive(Debug, Default)]
pub struct QueryEngine {
    queries: Vec<QueryData>,
    requests: BTreeMap<RequestId, u64>,
}

impl QueryEngine {
    pub fn create_query(
        &mut self,
        registry: &SurveyRegistry,
        survey_id: u64,
        filters: Vec<Vec<Constraint>>,
    ) -> Result<u64> {
        let (params, data) = registry.details(survey_id)?;
        require!(
            data.is_completed() && data.is_valid,
            SurveyError::QueryNotAllowed
        );
        require!(
            constraints_fit(&filters, &params.metadata_types, MAX_CONSTRAINTS_PER_FIELD),
            SurveyError::InvalidQueryFilter
        );

        let query_id = self.queries.len() as u64;
        self.queries.push(QueryData::new(survey_id, filters));

        emit!(QueryCreated {
            query_id,
            survey_id,
        });
        msg!("Query {} created on survey {}", query_id, survey_id);
        Ok(query_id)
    }

    pub fn execute_query<B: ConfidentialCompute, O: DecryptionOracle>(
        &mut self,
        registry: &SurveyRegistry,
        ledger: &EntryLedger,
        backend: &mut B,
        oracle: &mut O,
        query_id: u64,
    ) -> Result<RequestId> {
        let query = self.get(query_id)?;
        require!(
            query.status == QueryStatus::Draft,
            SurveyError::QueryAlreadyExecuted
        );
        let params = registry.params(query.survey_id)?;

        let entries = ledger.entries(query.survey_id);
        let mut votes = Vec::with_capacity(entries.len());
        let mut selectors = Vec::with_capacity(entries.len());
        for entry in entries {
            selectors.push(select_entry(
                backend,
                entry,
                &query.filters,
                &params.metadata_types,
            )?);
            votes.push(entry.vote);
        }
        let selected = backend.sum(&selectors)?;
        let aggregate = backend.select_sum(&votes, &selectors)?;

        let request_id = oracle.request_decrypt(&[selected, aggregate])?;

        self.get_mut(query_id)?.status = QueryStatus::AwaitingOracle { request_id };
        self.requests.insert(request_id, query_id);

        emit!(QueryExecuted {
            query_id,
            request_id,
        });
        msg!("Query {} submitted for decryption, request {}", query_id, request_id);
        Ok(request_id)
    }

    /// Applies the decrypted selection size and aggregate.
    pub(crate) fn query_callback(
        &mut self,
        registry: &SurveyRegistry,
        ledger: &EntryLedger,
        query_id: u64,
        selected_count: u64,
        result: u64,
    ) -> Result<()> {
        let survey_id = self.get(query_id)?.survey_id;
        let threshold = registry.params(survey_id)?.min_response_threshold;
        let stored = ledger.entry_count(survey_id) as u64;

        let query = self.get_mut(query_id)?;
        match query.status {
            QueryStatus::Completed => {
                msg!("Query {} already resolved, ignoring callback", query_id);
                return Ok(());
            }
            QueryStatus::Draft => return err!(SurveyError::NoPendingDecryption),
            QueryStatus::AwaitingOracle { .. } => {}
        }
        require!(selected_count <= stored, SurveyError::MalformedDecryption);

        query.complete(selected_count, result, threshold);

        emit!(QueryResolved {
            query_id,
            selected_count,
            is_valid: query.is_valid,
            result: query.result().unwrap_or(0),
        });
        msg!(
            "Query {} resolved: {} selected, valid = {}",
            query_id,
            selected_count,
            query.is_valid
        );
        Ok(())
    }

    pub fn query_data(&self, query_id: u64) -> Result<&QueryData> {
        self.get(query_id)
    }

    pub fn last_query_id(&self) -> u64 {
        self.queries.len() as u64
    }

    /// Query waiting on `request_id`, if it is a query request.
    pub fn query_for(&self, request_id: RequestId) -> Option<u64> {
        self.requests.get(&request_id).copied()
    }

    fn get(&self, query_id: u64) -> Result<&QueryData> {
        usize::try_from(query_id)
            .ok()
            .and_then(|i| self.queries.get(i))
            .ok_or_else(|| error!(SurveyError::UnknownSurveyOrQuery))
    }

    fn get_mut(&mut self, query_id: u64) -> Result<&mut QueryData> {
        usize::try_from(query_id)
            .ok()
            .and_then(|i| self.queries.get_mut(i))
            .ok_or_else(|| error!(SurveyError::UnknownSurveyOrQuery))
    }
}

/// Encrypted inclusion bit: the entry passed admission and every filter holds.
fn select_entry<B: ConfidentialCompute>(
    backend: &mut B,
    entry: &Entry,
    filters: &[Vec<Constraint>],
    types: &[MetadataType],
) -> Result<CiphertextHandle> {
    let mut selector = entry.validity;
    for ((chain, handle), kind) in filters.iter().zip(&entry.metadata).zip(types) {
        for filter in chain {
            let bound = filter
                .decode_for(*kind)
                .ok_or(SurveyError::InvalidQueryFilter)?;
            let bit = backend.compare(handle, filter.operator, &bound)?;
            selector = backend.and(&selector, &bit)?;
        }
    }
    Ok(selector)
}
