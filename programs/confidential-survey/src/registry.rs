use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::SurveyError;
use crate::events::SurveyCreated;
use crate::state::{constraints_fit, SurveyData, SurveyParams};

/// Owns every survey's configuration and aggregate state.
#[derive(Debug, Default)]
pub struct SurveyRegistry {
    surveys: Vec<(SurveyParams, SurveyData)>,
}

impl SurveyRegistry {
    /// Validates `params` and stores a new survey. Nothing is stored on failure.
    pub fn create(&mut self, params: SurveyParams, now: i64) -> Result<u64> {
        validate_params(&params, now)?;

        let survey_id = self.surveys.len() as u64;
        emit!(SurveyCreated {
            survey_id,
            is_whitelisted: params.is_whitelisted,
            survey_end_time: params.survey_end_time,
            min_response_threshold: params.min_response_threshold,
        });
        msg!(
            "Survey {} created, threshold {}, ends at {}",
            survey_id,
            params.min_response_threshold,
            params.survey_end_time
        );

        self.surveys.push((params, SurveyData::default()));
        Ok(survey_id)
    }

    /// Number of surveys created so far; ids run from 0 to this value.
    pub fn last_survey_id(&self) -> u64 {
        self.surveys.len() as u64
    }

    pub fn params(&self, survey_id: u64) -> Result<&SurveyParams> {
        self.get(survey_id).map(|(params, _)| params)
    }

    pub fn data(&self, survey_id: u64) -> Result<&SurveyData> {
        self.get(survey_id).map(|(_, data)| data)
    }

    pub fn details(&self, survey_id: u64) -> Result<(&SurveyParams, &SurveyData)> {
        self.get(survey_id).map(|(params, data)| (params, data))
    }

    pub(crate) fn data_mut(&mut self, survey_id: u64) -> Result<&mut SurveyData> {
        usize::try_from(survey_id)
            .ok()
            .and_then(|i| self.surveys.get_mut(i))
            .map(|(_, data)| data)
            .ok_or_else(|| error!(SurveyError::UnknownSurveyOrQuery))
    }

    fn get(&self, survey_id: u64) -> Result<&(SurveyParams, SurveyData)> {
        usize::try_from(survey_id)
            .ok()
            .and_then(|i| self.surveys.get(i))
            .ok_or_else(|| error!(SurveyError::UnknownSurveyOrQuery))
    }
}

fn validate_params(params: &SurveyParams, now: i64) -> Result<()> {
    require!(
        !params.survey_prompt.is_empty() && params.survey_prompt.len() <= MAX_PROMPT_LEN,
        SurveyError::InvalidSurveyPrompt
    );
    require!(
        !params.is_whitelisted || params.whitelist_root_hash != [0u8; 32],
        SurveyError::InvalidWhitelistRoot
    );
    require!(params.survey_end_time > now, SurveyError::InvalidSurveyEndTime);
    require!(
        params.min_response_threshold >= 1,
        SurveyError::InvalidResponseThreshold
    );
    require!(
        params.metadata_names.len() == params.metadata_types.len()
            && params.metadata_types.len() <= MAX_METADATA_FIELDS
            && params
                .metadata_names
                .iter()
                .all(|name| !name.is_empty() && name.len() <= MAX_METADATA_NAME_LEN),
        SurveyError::InvalidMetadataDeclaration
    );
    require!(
        constraints_fit(
            &params.constraints,
            &params.metadata_types,
            MAX_CONSTRAINTS_PER_FIELD
        ),
        SurveyError::InvalidConstraint
    );
    Ok(())
}
