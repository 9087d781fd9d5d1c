//! Reveal state machine: `Open -> AwaitingOracle -> Completed`.
//!
//! `Completed` is terminal. A reveal is requested at most once per survey,
//! and the oracle callback only takes effect the first time it lands.

use anchor_lang::prelude::*;
use std::collections::BTreeMap;

use crate::backend::{ConfidentialCompute, DecryptionOracle};
use crate::ciphertext::RequestId;
use crate::error::SurveyError;
use crate::events::{ResultsRevealed, RevealRequested};
use crate::ledger::EntryLedger;
use crate::registry::SurveyRegistry;
use crate::state::RevealStatus;

#[derive(Debug, Default)]
pub struct RevealCoordinator {
    requests: BTreeMap<RequestId, u64>,
}

impl RevealCoordinator {
    pub fn request_reveal<B: ConfidentialCompute, O: DecryptionOracle>(
        &mut self,
        registry: &mut SurveyRegistry,
        ledger: &EntryLedger,
        backend: &mut B,
        oracle: &mut O,
        now: i64,
        survey_id: u64,
    ) -> Result<RequestId> {
        let (params, data) = registry.details(survey_id)?;
        require!(data.is_open(), SurveyError::RevealAlreadyRequested);
        require!(
            now >= params.survey_end_time,
            SurveyError::ThresholdNotYetEvaluable
        );

        let entries = ledger.entries(survey_id);
        let votes: Vec<_> = entries.iter().map(|e| e.vote).collect();
        let validity: Vec<_> = entries.iter().map(|e| e.validity).collect();
        let tally = backend.select_sum(&votes, &validity)?;
        let participants = backend.sum(&validity)?;

        // Nothing changes unless the oracle accepted the request
        let request_id = oracle.request_decrypt(&[tally, participants])?;

        registry.data_mut(survey_id)?.status = RevealStatus::AwaitingOracle { request_id };
        self.requests.insert(request_id, survey_id);

        emit!(RevealRequested {
            survey_id,
            request_id,
        });
        msg!(
            "Reveal requested for survey {} ({} entries), request {}",
            survey_id,
            entries.len(),
            request_id
        );
        Ok(request_id)
    }

    /// Applies the decrypted tally and participant count.
    pub(crate) fn reveal_callback(
        &self,
        registry: &mut SurveyRegistry,
        ledger: &EntryLedger,
        survey_id: u64,
        tally: u64,
        participants: u64,
    ) -> Result<()> {
        let threshold = registry.params(survey_id)?.min_response_threshold;
        let stored = ledger.entry_count(survey_id) as u64;
        let data = registry.data_mut(survey_id)?;
        match data.status {
            RevealStatus::Completed => {
                msg!("Survey {} already revealed, ignoring callback", survey_id);
                return Ok(());
            }
            RevealStatus::Open => return err!(SurveyError::NoPendingDecryption),
            RevealStatus::AwaitingOracle { .. } => {}
        }
        require!(participants <= stored, SurveyError::MalformedDecryption);

        data.complete(tally, participants, threshold);

        emit!(ResultsRevealed {
            survey_id,
            participants,
            is_valid: data.is_valid,
            final_result: data.final_result().unwrap_or(0),
        });
        msg!(
            "Survey {} revealed: {} participants, valid = {}",
            survey_id,
            participants,
            data.is_valid
        );
        Ok(())
    }

    /// Survey waiting on `request_id`, if it is a reveal request.
    pub fn survey_for(&self, request_id: RequestId) -> Option<u64> {
        self.requests.get(&request_id).copied()
    }
}
