//! Incremental Poseidon Merkle tree and membership proofs

use alloy_primitives::U256;
use thiserror::Error;

use crate::poseidon::poseidon2;

/// Depth of the Semaphore group tree (2^20 members).
pub const TREE_DEPTH: usize = 20;

/// Widest tree this implementation builds.
pub const MAX_TREE_DEPTH: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MerkleError {
    #[error("The leaf does not exist in this tree")]
    LeafNotFound,

    #[error("The tree is full")]
    TreeFull,

    #[error("Tree depth must be between 1 and 32, got {0}")]
    InvalidDepth(usize),

    #[error("Leaf index {0} is out of range")]
    IndexOutOfRange(usize),
}

/// Membership proof for one leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    pub root: U256,
    pub leaf: U256,
    /// Sibling hashes from the leaf level up.
    pub siblings: Vec<U256>,
    /// 0 when the path node is a left child, 1 when it is a right child.
    pub path_indices: Vec<u8>,
}

impl MerkleProof {
    /// Recompute the root from the leaf and path.
    pub fn compute_root(&self) -> U256 {
        self.siblings
            .iter()
            .zip(&self.path_indices)
            .fold(self.leaf, |node, (sibling, index)| {
                if *index == 0 {
                    poseidon2(node, *sibling)
                } else {
                    poseidon2(*sibling, node)
                }
            })
    }

    pub fn verify(&self) -> bool {
        self.compute_root() == self.root
    }
}

/// Append-only binary tree; empty positions hold the level's zero hash.
#[derive(Debug, Clone)]
pub struct IncrementalMerkleTree {
    depth: usize,
    zeroes: Vec<U256>,
    /// `levels[0]` are the leaves, `levels[depth]` holds the root once
    /// something has been inserted.
    levels: Vec<Vec<U256>>,
}

impl IncrementalMerkleTree {
    pub fn new(depth: usize, zero_value: U256) -> Result<Self, MerkleError> {
        if depth == 0 || depth > MAX_TREE_DEPTH {
            return Err(MerkleError::InvalidDepth(depth));
        }

        let mut zeroes = Vec::with_capacity(depth + 1);
        zeroes.push(zero_value);
        for level in 0..depth {
            zeroes.push(poseidon2(zeroes[level], zeroes[level]));
        }

        Ok(Self {
            depth,
            zeroes,
            levels: vec![Vec::new(); depth + 1],
        })
    }

    pub fn len(&self) -> usize {
        self.levels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    pub fn capacity(&self) -> usize {
        1usize << self.depth
    }

    pub fn root(&self) -> U256 {
        self.levels[self.depth]
            .first()
            .copied()
            .unwrap_or(self.zeroes[self.depth])
    }

    pub fn index_of(&self, leaf: U256) -> Option<usize> {
        self.levels[0].iter().position(|l| *l == leaf)
    }

    /// Append a leaf and update the path above it.
    pub fn insert(&mut self, leaf: U256) -> Result<usize, MerkleError> {
        let position = self.len();
        if position >= self.capacity() {
            return Err(MerkleError::TreeFull);
        }

        self.levels[0].push(leaf);

        let mut index = position;
        let mut node = leaf;
        for level in 0..self.depth {
            node = if index % 2 == 0 {
                poseidon2(node, self.zeroes[level])
            } else {
                poseidon2(self.levels[level][index - 1], node)
            };
            index /= 2;

            let parents = &mut self.levels[level + 1];
            if index < parents.len() {
                parents[index] = node;
            } else {
                parents.push(node);
            }
        }

        Ok(position)
    }

    pub fn proof(&self, leaf_index: usize) -> Result<MerkleProof, MerkleError> {
        let leaf = *self.levels[0]
            .get(leaf_index)
            .ok_or(MerkleError::IndexOutOfRange(leaf_index))?;

        let mut siblings = Vec::with_capacity(self.depth);
        let mut path_indices = Vec::with_capacity(self.depth);
        let mut index = leaf_index;
        for level in 0..self.depth {
            let sibling = self.levels[level]
                .get(index ^ 1)
                .copied()
                .unwrap_or(self.zeroes[level]);
            siblings.push(sibling);
            path_indices.push((index & 1) as u8);
            index >>= 1;
        }

        Ok(MerkleProof {
            root: self.root(),
            leaf,
            siblings,
            path_indices,
        })
    }
}

/// Build a tree from the ordered `leaves` and prove membership of `leaf`.
pub fn generate_merkle_proof(
    depth: usize,
    zero_value: U256,
    leaves: &[U256],
    leaf: U256,
) -> Result<MerkleProof, MerkleError> {
    let mut tree = IncrementalMerkleTree::new(depth, zero_value)?;
    for value in leaves {
        tree.insert(*value)?;
    }

    let index = tree.index_of(leaf).ok_or(MerkleError::LeafNotFound)?;
    tree.proof(index)
}
