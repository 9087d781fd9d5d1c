//! Merkle whitelist of authorized participants.
//!
//! Leaves and internal nodes are hashed under different prefixes so an
//! internal node can never be presented as a leaf. Pairs are hashed in sorted
//! order, which lets a proof be a plain list of siblings.

use anchor_lang::prelude::*;
use sha2::{Digest, Sha256};

use crate::constants::MAX_WHITELIST_PROOF_LEN;

const LEAF_PREFIX: &[u8] = &[0x00];
const NODE_PREFIX: &[u8] = &[0x01];

/// sha256 over the concatenation of `parts`.
pub(crate) fn hashv(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(*part);
    }
    hasher.finalize().into()
}

pub fn leaf_hash(member: &Pubkey) -> [u8; 32] {
    hashv(&[LEAF_PREFIX, member.as_ref()])
}

pub fn node_hash(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    hashv(&[NODE_PREFIX, lo.as_ref(), hi.as_ref()])
}

/// Returns true iff `proof` links `member` to `root`.
pub fn verify(root: &[u8; 32], member: &Pubkey, proof: &[[u8; 32]]) -> bool {
    if proof.len() > MAX_WHITELIST_PROOF_LEN {
        return false;
    }
    let computed = proof
        .iter()
        .fold(leaf_hash(member), |acc, sibling| node_hash(&acc, sibling));
    computed == *root
}

/// Builds the committed root and per-member proofs for a whitelist.
///
/// An odd node at the end of a level is carried up unchanged rather than
/// paired with itself.
#[derive(Clone, Debug)]
pub struct WhitelistTree {
    members: Vec<Pubkey>,
    levels: Vec<Vec<[u8; 32]>>,
}

impl WhitelistTree {
    pub fn new(members: &[Pubkey]) -> Option<Self> {
        if members.is_empty() {
            return None;
        }
        let mut level: Vec<[u8; 32]> = members.iter().map(leaf_hash).collect();
        let mut levels = Vec::new();
        while level.len() > 1 {
            let next = level
                .chunks(2)
                .filter_map(|pair| pair.iter().copied().reduce(|a, b| node_hash(&a, &b)))
                .collect();
            levels.push(std::mem::replace(&mut level, next));
        }
        levels.push(level);
        Some(Self {
            members: members.to_vec(),
            levels,
        })
    }

    pub fn root(&self) -> [u8; 32] {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or_default()
    }

    pub fn proof(&self, member: &Pubkey) -> Option<Vec<[u8; 32]>> {
        let mut index = self.members.iter().position(|m| m == member)?;
        let mut proof = Vec::new();
        for level in &self.levels[..self.levels.len() - 1] {
            if let Some(sibling) = level.get(index ^ 1) {
                proof.push(*sibling);
            }
            index /= 2;
        }
        Some(proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(n: usize) -> Vec<Pubkey> {
        (0..n).map(|_| Pubkey::new_unique()).collect()
    }

    #[test]
    fn test_every_member_verifies() {
        for n in 1..=7 {
            let members = members(n);
            let tree = WhitelistTree::new(&members).unwrap();
            for m in &members {
                let proof = tree.proof(m).unwrap();
                assert!(verify(&tree.root(), m, &proof), "n={} member failed", n);
            }
        }
    }

    #[test]
    fn test_single_member_root_is_leaf() {
        let members = members(1);
        let tree = WhitelistTree::new(&members).unwrap();
        assert_eq!(tree.root(), leaf_hash(&members[0]));
        assert!(tree.proof(&members[0]).unwrap().is_empty());
    }

    #[test]
    fn test_non_member_with_borrowed_proof_fails() {
        let members = members(4);
        let tree = WhitelistTree::new(&members).unwrap();
        let outsider = Pubkey::new_unique();

        assert!(tree.proof(&outsider).is_none());
        for m in &members {
            let proof = tree.proof(m).unwrap();
            assert!(!verify(&tree.root(), &outsider, &proof));
        }
    }

    #[test]
    fn test_member_against_other_root_fails() {
        let a = members(4);
        let b = members(4);
        let tree_a = WhitelistTree::new(&a).unwrap();
        let tree_b = WhitelistTree::new(&b).unwrap();
        let proof = tree_a.proof(&a[0]).unwrap();
        assert!(!verify(&tree_b.root(), &a[0], &proof));
    }

    #[test]
    fn test_internal_node_cannot_pose_as_leaf() {
        let members = members(4);
        let tree = WhitelistTree::new(&members).unwrap();
        // Parent of the first two leaves, reinterpreted as a pubkey
        let parent = node_hash(&leaf_hash(&members[0]), &leaf_hash(&members[1]));
        let fake_member = Pubkey::new_from_array(parent);
        let upper_sibling = node_hash(&leaf_hash(&members[2]), &leaf_hash(&members[3]));
        assert!(!verify(&tree.root(), &fake_member, &[upper_sibling]));
    }

    #[test]
    fn test_oversized_proof_is_rejected() {
        let members = members(2);
        let tree = WhitelistTree::new(&members).unwrap();
        let mut proof = tree.proof(&members[0]).unwrap();
        proof.resize(MAX_WHITELIST_PROOF_LEN + 1, [0u8; 32]);
        assert!(!verify(&tree.root(), &members[0], &proof));
    }

    #[test]
    fn test_empty_whitelist_has_no_tree() {
        assert!(WhitelistTree::new(&[]).is_none());
    }
}
