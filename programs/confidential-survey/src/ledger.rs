use anchor_lang::prelude::*;
use std::collections::BTreeMap;

use crate::backend::ConfidentialCompute;
use crate::ciphertext::{CiphertextHandle, EncryptedEntry};
use crate::error::SurveyError;
use crate::events::EntrySubmitted;
use crate::registry::SurveyRegistry;
use crate::state::{
    ConstraintOperator, Entry, MetadataType, MetadataValue, SurveyParams, SurveyType,
};
use crate::whitelist;

#[derive(Debug, Default)]
struct SurveyEntries {
    entries: Vec<Entry>,
    by_participant: BTreeMap<Pubkey, usize>,
}

/// Append-only store of admitted entries, one per (survey, participant).
#[derive(Debug, Default)]
pub struct EntryLedger {
    surveys: BTreeMap<u64, SurveyEntries>,
}

impl EntryLedger {
    /// Admits an encrypted entry. All checks and backend evaluation run
    /// before anything is stored.
    pub fn submit<B: ConfidentialCompute>(
        &mut self,
        registry: &mut SurveyRegistry,
        backend: &mut B,
        now: i64,
        survey_id: u64,
        participant: Pubkey,
        input: EncryptedEntry,
        whitelist_proof: Option<&[[u8; 32]]>,
    ) -> Result<u64> {
        let (params, data) = registry.details(survey_id)?;

        require!(
            data.is_open() && now < params.survey_end_time,
            SurveyError::SurveyClosed
        );
        require!(
            !self.has_voted(survey_id, &participant),
            SurveyError::AlreadyVoted
        );
        if params.is_whitelisted {
            let authorized = whitelist_proof.is_some_and(|proof| {
                whitelist::verify(&params.whitelist_root_hash, &participant, proof)
            });
            require!(authorized, SurveyError::NotWhitelisted);
        }
        require!(
            input.metadata.len() == params.metadata_len(),
            SurveyError::MetadataArityMismatch
        );
        let current_participants = data
            .current_participants
            .checked_add(1)
            .ok_or(SurveyError::ArithmeticOverflow)?;

        backend
            .verify_inputs(&participant, &input.handles(), &input.input_proof)
            .map_err(|_| error!(SurveyError::InvalidCiphertext))?;
        check_types(backend, params, &input)?;
        let validity = evaluate_admission(backend, params, &input.metadata)?;
        let vote = match params.survey_type {
            // Any non-zero answer counts as a single "yes"
            SurveyType::Polling => backend.compare(
                &input.vote,
                ConstraintOperator::DifferentTo,
                &MetadataValue::from_u64(0),
            )?,
            SurveyType::Benchmark => input.vote,
        };

        let entry = Entry {
            survey_id,
            participant,
            vote,
            metadata: input.metadata,
            validity,
            created_at: now,
        };
        let slot = self.surveys.entry(survey_id).or_default();
        slot.by_participant.insert(participant, slot.entries.len());
        slot.entries.push(entry);

        registry.data_mut(survey_id)?.current_participants = current_participants;

        emit!(EntrySubmitted {
            survey_id,
            participant,
            current_participants,
        });
        msg!("Entry recorded for survey {}", survey_id);

        Ok(current_participants)
    }

    pub fn has_voted(&self, survey_id: u64, participant: &Pubkey) -> bool {
        self.surveys
            .get(&survey_id)
            .is_some_and(|s| s.by_participant.contains_key(participant))
    }

    pub fn entry(&self, survey_id: u64, participant: &Pubkey) -> Option<&Entry> {
        let slot = self.surveys.get(&survey_id)?;
        slot.by_participant
            .get(participant)
            .and_then(|i| slot.entries.get(*i))
    }

    pub fn entries(&self, survey_id: u64) -> &[Entry] {
        self.surveys
            .get(&survey_id)
            .map(|s| s.entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn entry_count(&self, survey_id: u64) -> usize {
        self.entries(survey_id).len()
    }
}

/// Votes are numeric and each metadata handle must carry its declared type.
fn check_types<B: ConfidentialCompute>(
    backend: &B,
    params: &SurveyParams,
    input: &EncryptedEntry,
) -> Result<()> {
    let declared = std::iter::once(&MetadataType::Uint256).chain(&params.metadata_types);
    for (handle, kind) in std::iter::once(&input.vote).chain(&input.metadata).zip(declared) {
        backend
            .check_type(handle, *kind)
            .map_err(|_| error!(SurveyError::MetadataTypeMismatch))?;
    }
    Ok(())
}

/// Encrypted AND of every admission constraint over the entry's metadata.
fn evaluate_admission<B: ConfidentialCompute>(
    backend: &mut B,
    params: &SurveyParams,
    metadata: &[CiphertextHandle],
) -> Result<CiphertextHandle> {
    let mut validity: Option<CiphertextHandle> = None;
    for (index, (handle, kind)) in metadata.iter().zip(&params.metadata_types).enumerate() {
        for constraint in params.field_constraints(index) {
            let bound = constraint
                .decode_for(*kind)
                .ok_or(SurveyError::InvalidConstraint)?;
            let bit = backend.compare(handle, constraint.operator, &bound)?;
            validity = Some(match validity {
                Some(acc) => backend.and(&acc, &bit)?,
                None => bit,
            });
        }
    }
    match validity {
        Some(bit) => Ok(bit),
        None => backend.constant_bool(true),
    }
}
