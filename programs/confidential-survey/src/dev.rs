// ==================== DEV MODE ====================
// Cleartext stand-ins for the MXE cluster, used on devnet and in tests.
// The survey engine drives them through the same traits as the real
// backend; only these types ever hold plaintext.

use anchor_lang::prelude::*;
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::backend::{ConfidentialCompute, DecryptionOracle, TimeSource};
use crate::ciphertext::{CiphertextHandle, EncryptedEntry, RequestId};
use crate::error::SurveyError;
use crate::state::{ConstraintOperator, MetadataType, MetadataValue};
use crate::whitelist::hashv;
use crate::ConfidentialSurvey;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Plaintext {
    Bool(bool),
    Uint([u8; 32]),
}

impl Plaintext {
    fn as_u64(&self) -> Result<u64> {
        match self {
            Plaintext::Bool(b) => Ok(*b as u64),
            // Words above u64 saturate
            Plaintext::Uint(word) if word[..24].iter().any(|b| *b != 0) => Ok(u64::MAX),
            Plaintext::Uint(word) => {
                let mut low = [0u8; 8];
                low.copy_from_slice(&word[24..]);
                Ok(u64::from_be_bytes(low))
            }
        }
    }

    fn kind(&self) -> MetadataType {
        match self {
            Plaintext::Bool(_) => MetadataType::Boolean,
            Plaintext::Uint(_) => MetadataType::Uint256,
        }
    }

    fn as_bool(&self) -> Result<bool> {
        match self {
            Plaintext::Bool(b) => Ok(*b),
            Plaintext::Uint(_) => err!(SurveyError::InvalidCiphertext),
        }
    }
}

/// Simulated confidential-compute backend keeping plaintexts in memory.
#[derive(Debug, Default)]
pub struct DevMxe {
    values: HashMap<CiphertextHandle, Plaintext>,
    owners: HashMap<CiphertextHandle, Pubkey>,
    counter: u64,
}

impl DevMxe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encrypt_bool(&mut self, owner: &Pubkey, value: bool) -> CiphertextHandle {
        self.encrypt_for(owner, Plaintext::Bool(value))
    }

    pub fn encrypt_u64(&mut self, owner: &Pubkey, value: u64) -> CiphertextHandle {
        self.encrypt_uint256(owner, MetadataValue::from_u64(value).encode())
    }

    pub fn encrypt_uint256(&mut self, owner: &Pubkey, word: [u8; 32]) -> CiphertextHandle {
        self.encrypt_for(owner, Plaintext::Uint(word))
    }

    /// Encrypts a full submission the way a participant's client would.
    pub fn encrypt_entry(
        &mut self,
        owner: &Pubkey,
        vote: u64,
        metadata: &[MetadataValue],
    ) -> EncryptedEntry {
        let vote = self.encrypt_u64(owner, vote);
        let metadata: Vec<_> = metadata
            .iter()
            .map(|value| match value {
                MetadataValue::Boolean(b) => self.encrypt_bool(owner, *b),
                MetadataValue::Uint256(word) => self.encrypt_uint256(owner, *word),
            })
            .collect();
        let mut handles = vec![vote];
        handles.extend_from_slice(&metadata);
        EncryptedEntry {
            vote,
            metadata,
            input_proof: input_proof(owner, &handles).to_vec(),
        }
    }

    pub fn decrypt(&self, handle: &CiphertextHandle) -> Result<u64> {
        self.plaintext(handle)?.as_u64()
    }

    fn encrypt_for(&mut self, owner: &Pubkey, value: Plaintext) -> CiphertextHandle {
        let handle = self.store(value);
        self.owners.insert(handle, *owner);
        handle
    }

    fn store(&mut self, value: Plaintext) -> CiphertextHandle {
        self.counter += 1;
        let counter = self.counter.to_le_bytes();
        let seed: [&[u8]; 2] = [b"dev-mxe", &counter];
        let handle = CiphertextHandle::from_bytes(hashv(&seed));
        self.values.insert(handle, value);
        handle
    }

    fn plaintext(&self, handle: &CiphertextHandle) -> Result<Plaintext> {
        self.values
            .get(handle)
            .copied()
            .ok_or_else(|| error!(SurveyError::InvalidCiphertext))
    }

    fn sum_where(
        &self,
        values: &[CiphertextHandle],
        selectors: &[CiphertextHandle],
    ) -> Result<u64> {
        require!(
            values.len() == selectors.len(),
            SurveyError::InvalidCiphertext
        );
        let mut total = 0u64;
        for (value, selector) in values.iter().zip(selectors) {
            if self.plaintext(selector)?.as_bool()? {
                total = total.saturating_add(self.plaintext(value)?.as_u64()?);
            }
        }
        Ok(total)
    }
}

fn input_proof(owner: &Pubkey, handles: &[CiphertextHandle]) -> [u8; 32] {
    let mut parts: Vec<&[u8]> = vec![owner.as_ref()];
    parts.extend(handles.iter().map(|h| h.as_bytes().as_ref()));
    hashv(&parts)
}

impl ConfidentialCompute for DevMxe {
    fn verify_inputs(
        &mut self,
        owner: &Pubkey,
        handles: &[CiphertextHandle],
        proof: &[u8],
    ) -> Result<()> {
        let owned = handles
            .iter()
            .all(|h| self.owners.get(h) == Some(owner));
        require!(
            owned && proof == input_proof(owner, handles).as_slice(),
            SurveyError::InvalidCiphertext
        );
        Ok(())
    }

    fn check_type(&self, handle: &CiphertextHandle, kind: MetadataType) -> Result<()> {
        require!(
            self.plaintext(handle)?.kind() == kind,
            SurveyError::InvalidCiphertext
        );
        Ok(())
    }

    fn constant_bool(&mut self, value: bool) -> Result<CiphertextHandle> {
        Ok(self.store(Plaintext::Bool(value)))
    }

    fn compare(
        &mut self,
        handle: &CiphertextHandle,
        operator: ConstraintOperator,
        bound: &MetadataValue,
    ) -> Result<CiphertextHandle> {
        let lhs = match self.plaintext(handle)? {
            Plaintext::Bool(b) => MetadataValue::Boolean(b),
            Plaintext::Uint(word) => MetadataValue::Uint256(word),
        };
        require!(lhs.kind() == bound.kind(), SurveyError::InvalidCiphertext);
        // Big-endian words order the same way as the numbers they encode
        let (l, r) = (lhs.encode(), bound.encode());
        let bit = match operator {
            ConstraintOperator::LargerThan => l > r,
            ConstraintOperator::SmallerThan => l < r,
            ConstraintOperator::EqualTo => l == r,
            ConstraintOperator::DifferentTo => l != r,
        };
        Ok(self.store(Plaintext::Bool(bit)))
    }

    fn and(&mut self, lhs: &CiphertextHandle, rhs: &CiphertextHandle) -> Result<CiphertextHandle> {
        let bit = self.plaintext(lhs)?.as_bool()? && self.plaintext(rhs)?.as_bool()?;
        Ok(self.store(Plaintext::Bool(bit)))
    }

    fn sum(&mut self, bits: &[CiphertextHandle]) -> Result<CiphertextHandle> {
        let mut count = 0u64;
        for bit in bits {
            count = count.saturating_add(self.plaintext(bit)?.as_bool()? as u64);
        }
        Ok(self.store(Plaintext::Uint(MetadataValue::from_u64(count).encode())))
    }

    fn select_sum(
        &mut self,
        values: &[CiphertextHandle],
        selectors: &[CiphertextHandle],
    ) -> Result<CiphertextHandle> {
        let total = self.sum_where(values, selectors)?;
        Ok(self.store(Plaintext::Uint(MetadataValue::from_u64(total).encode())))
    }
}

/// Simulated decryption oracle. Requests wait until settled.
#[derive(Debug, Default)]
pub struct DevOracle {
    next_request_id: RequestId,
    pending: BTreeMap<RequestId, Vec<CiphertextHandle>>,
    /// Refuse new requests, to simulate an unreachable cluster
    pub offline: bool,
}

impl DevOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> impl Iterator<Item = RequestId> + '_ {
        self.pending.keys().copied()
    }

    pub fn take_pending(&mut self) -> Vec<(RequestId, Vec<CiphertextHandle>)> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}

impl DecryptionOracle for DevOracle {
    fn request_decrypt(&mut self, ciphertexts: &[CiphertextHandle]) -> Result<RequestId> {
        require!(!self.offline, SurveyError::DecryptionRequestFailed);
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.pending.insert(request_id, ciphertexts.to_vec());
        Ok(request_id)
    }
}

/// Settable clock shared between the engine and whoever drives it.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn at(unix_timestamp: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(unix_timestamp)),
        }
    }

    pub fn set(&self, unix_timestamp: i64) {
        self.now.set(unix_timestamp);
    }

    pub fn advance(&self, seconds: i64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl TimeSource for ManualClock {
    fn unix_timestamp(&self) -> Result<i64> {
        Ok(self.now.get())
    }
}

impl<T: TimeSource> ConfidentialSurvey<DevMxe, DevOracle, T> {
    /// Decrypts and delivers every pending oracle request, like the MXE
    /// callback would. Returns the number of deliveries.
    pub fn settle_decryptions(&mut self) -> Result<usize> {
        let requests = self.oracle.take_pending();
        let delivered = requests.len();
        for (request_id, ciphertexts) in requests {
            let plaintexts = ciphertexts
                .iter()
                .map(|c| self.backend.decrypt(c))
                .collect::<Result<Vec<_>>>()?;
            self.on_decrypted(request_id, &plaintexts)?;
        }
        Ok(delivered)
    }
}
