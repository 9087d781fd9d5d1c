use anchor_lang::prelude::*;

use crate::constants::ENCODED_WORD_LEN;
use crate::state::MetadataType;

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintOperator {
    LargerThan,
    SmallerThan,
    EqualTo,
    DifferentTo,
}

impl ConstraintOperator {
    pub fn is_ordering(&self) -> bool {
        matches!(self, ConstraintOperator::LargerThan | ConstraintOperator::SmallerThan)
    }
}

/// Comparison against an encoded bound. Used both as an admission rule on a
/// survey and as a selection filter on a query.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub operator: ConstraintOperator,
    /// 32-byte big-endian word
    #[max_len(ENCODED_WORD_LEN)]
    pub value: Vec<u8>,
}

impl Constraint {
    pub fn new(operator: ConstraintOperator, value: Vec<u8>) -> Self {
        Self { operator, value }
    }

    pub fn uint(operator: ConstraintOperator, value: u64) -> Self {
        Self::new(operator, MetadataValue::from_u64(value).encode().to_vec())
    }

    pub fn boolean(operator: ConstraintOperator, value: bool) -> Self {
        Self::new(operator, MetadataValue::Boolean(value).encode().to_vec())
    }

    /// Decodes the bound as `kind`, rejecting operators the type cannot support.
    pub fn decode_for(&self, kind: MetadataType) -> Option<MetadataValue> {
        let value = MetadataValue::decode(kind, &self.value)?;
        if kind == MetadataType::Boolean && self.operator.is_ordering() {
            return None;
        }
        Some(value)
    }
}

/// A decoded plaintext bound. Never holds participant data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataValue {
    Boolean(bool),
    Uint256([u8; 32]),
}

impl MetadataValue {
    pub fn from_u64(value: u64) -> Self {
        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&value.to_be_bytes());
        MetadataValue::Uint256(word)
    }

    pub fn kind(&self) -> MetadataType {
        match self {
            MetadataValue::Boolean(_) => MetadataType::Boolean,
            MetadataValue::Uint256(_) => MetadataType::Uint256,
        }
    }

    pub fn encode(&self) -> [u8; 32] {
        match self {
            MetadataValue::Boolean(b) => {
                let mut word = [0u8; 32];
                word[31] = *b as u8;
                word
            }
            MetadataValue::Uint256(word) => *word,
        }
    }

    pub fn decode(kind: MetadataType, bytes: &[u8]) -> Option<Self> {
        let word: [u8; 32] = bytes.try_into().ok()?;
        match kind {
            MetadataType::Boolean => {
                if word[..31].iter().any(|b| *b != 0) {
                    return None;
                }
                match word[31] {
                    0 => Some(MetadataValue::Boolean(false)),
                    1 => Some(MetadataValue::Boolean(true)),
                    _ => None,
                }
            }
            MetadataType::Uint256 => Some(MetadataValue::Uint256(word)),
        }
    }
}

/// Checks a per-field constraint table against the declared metadata types.
/// A shorter table leaves the trailing fields unconstrained.
pub fn constraints_fit(
    table: &[Vec<Constraint>],
    types: &[MetadataType],
    max_per_field: usize,
) -> bool {
    if table.len() > types.len() {
        return false;
    }
    table.iter().zip(types).all(|(constraints, kind)| {
        constraints.len() <= max_per_field
            && constraints.iter().all(|c| c.decode_for(*kind).is_some())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint_bound_round_trips_through_word() {
        let c = Constraint::uint(ConstraintOperator::LargerThan, 50);
        assert_eq!(c.value.len(), 32);
        assert_eq!(
            c.decode_for(MetadataType::Uint256),
            Some(MetadataValue::from_u64(50))
        );
    }

    #[test]
    fn test_boolean_bound_rejects_non_bit_words() {
        let mut word = [0u8; 32];
        word[31] = 2;
        assert_eq!(MetadataValue::decode(MetadataType::Boolean, &word), None);

        word[31] = 1;
        word[0] = 1;
        assert_eq!(MetadataValue::decode(MetadataType::Boolean, &word), None);
    }

    #[test]
    fn test_short_encoding_is_rejected() {
        let c = Constraint::new(ConstraintOperator::EqualTo, vec![0u8; 31]);
        assert_eq!(c.decode_for(MetadataType::Uint256), None);
    }

    #[test]
    fn test_boolean_field_rejects_ordering_operator() {
        let c = Constraint::boolean(ConstraintOperator::LargerThan, true);
        assert_eq!(c.decode_for(MetadataType::Boolean), None);

        let c = Constraint::boolean(ConstraintOperator::DifferentTo, true);
        assert_eq!(
            c.decode_for(MetadataType::Boolean),
            Some(MetadataValue::Boolean(true))
        );
    }

    #[test]
    fn test_constraints_fit_checks_table_shape() {
        let types = [MetadataType::Uint256, MetadataType::Boolean];
        let ok = vec![vec![Constraint::uint(ConstraintOperator::SmallerThan, 99)]];
        assert!(constraints_fit(&ok, &types, 4));

        let too_many_fields = vec![vec![], vec![], vec![]];
        assert!(!constraints_fit(&too_many_fields, &types, 4));

        let wrong_type = vec![vec![], vec![Constraint::uint(ConstraintOperator::EqualTo, 7)]];
        assert!(!constraints_fit(&wrong_type, &types, 4));
    }
}
