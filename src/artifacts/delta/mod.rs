//! Block-based delta codec
//!
//! A delta describes how to rebuild an updated byte sequence from a base one
//! using two instructions: copy a range of the base, or add literal bytes.
//!
//! ## Algorithm
//!
//! The base is split into fixed-size blocks (the last one may be shorter) and
//! each block is hashed. The updated sequence is split the same way; a block
//! whose hash is known becomes a `Copy`, anything else is buffered and emitted
//! as a single `Add` once the next match (or the end) is reached.
//!
//! Blocks are compared at fixed positions only. Inserting a single byte near
//! the start shifts every following block and defeats matching for all of
//! them. The codec detects change; it does not try to produce minimal diffs.
//!
//! Equal hashes are taken as equal blocks without comparing bytes.
//!
//! [`Delta::encode`] gives the compact byte form described in [`instruction`].
//! Staging logs its size for every changed file. [`Delta::decode`] reads it
//! back for callers that store deltas, and is the only source of
//! [`Error::InvalidInstruction`].

pub mod instruction;

pub use instruction::Instruction;

use crate::errors::{Error, Result};
use bytes::{Bytes, BytesMut};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Default block size (4 KiB)
pub const BLOCK_SIZE: usize = 4096;

/// Below this many bytes of base, hashing stays on the calling thread
const PARALLEL_HASH_THRESHOLD: usize = 64 * BLOCK_SIZE;

type BlockHash = [u8; 32];

/// Ordered list of instructions turning a base sequence into an updated one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    instructions: Vec<Instruction>,
}

impl Delta {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Delta { instructions }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of literal bytes carried by `Add` instructions
    pub fn added_bytes(&self) -> usize {
        self.instructions
            .iter()
            .map(|instruction| match instruction {
                Instruction::Add { data } => data.len(),
                Instruction::Copy { .. } => 0,
            })
            .sum()
    }

    /// Whether applying this delta to a base of `base_len` bytes yields the base itself
    ///
    /// True only for a run of `Copy` instructions, each reading from its own
    /// output position, that together cover the whole base.
    pub fn is_identity(&self, base_len: usize) -> bool {
        let mut position = 0;

        for instruction in &self.instructions {
            match instruction {
                Instruction::Copy { offset, length } if *offset == position => {
                    position += length;
                }
                _ => return false,
            }
        }

        position == base_len
    }

    pub fn encode(&self) -> Bytes {
        let mut buffer = BytesMut::new();
        for instruction in &self.instructions {
            instruction.encode_to(&mut buffer);
        }
        buffer.freeze()
    }

    pub fn decode(mut data: Bytes) -> Result<Self> {
        let mut instructions = Vec::new();
        while !data.is_empty() {
            instructions.push(Instruction::decode_from(&mut data)?);
        }
        Ok(Delta { instructions })
    }
}

impl<'d> IntoIterator for &'d Delta {
    type Item = &'d Instruction;
    type IntoIter = std::slice::Iter<'d, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

/// Computes and applies deltas for a given block size
#[derive(Debug, Clone, Copy)]
pub struct DeltaCodec {
    block_size: usize,
}

impl Default for DeltaCodec {
    fn default() -> Self {
        DeltaCodec {
            block_size: BLOCK_SIZE,
        }
    }
}

impl DeltaCodec {
    pub fn new(block_size: usize) -> Self {
        DeltaCodec { block_size }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Compute the delta rebuilding `updated` from `base`
    ///
    /// An empty base yields only `Add` instructions; an empty updated
    /// sequence yields an empty delta.
    pub fn compute(&self, base: &[u8], updated: &[u8]) -> Result<Delta> {
        if self.block_size == 0 {
            return Err(Error::InvalidInput("block size must be positive".to_string()));
        }

        // every base hash is known before the first lookup
        let base_hashes = hash_blocks(base, self.block_size);
        let mut offsets: HashMap<BlockHash, usize> = HashMap::with_capacity(base_hashes.len());
        for (index, hash) in base_hashes.iter().enumerate() {
            offsets.entry(*hash).or_insert(index * self.block_size);
        }

        let mut instructions = Vec::new();
        let mut literal = BytesMut::new();

        for (index, block) in updated.chunks(self.block_size).enumerate() {
            let hash = hash_block(block);

            // prefer the base block at the same position when several share a hash
            let matched = match base_hashes.get(index) {
                Some(aligned) if *aligned == hash => Some(index * self.block_size),
                _ => offsets.get(&hash).copied(),
            };

            match matched {
                Some(offset) => {
                    if !literal.is_empty() {
                        instructions.push(Instruction::Add {
                            data: literal.split().freeze(),
                        });
                    }
                    instructions.push(Instruction::Copy {
                        offset,
                        length: block.len(),
                    });
                }
                None => literal.extend_from_slice(block),
            }
        }

        if !literal.is_empty() {
            instructions.push(Instruction::Add {
                data: literal.freeze(),
            });
        }

        Ok(Delta { instructions })
    }

    /// Replay `delta` against `base`
    ///
    /// A `Copy` starting past the end of the base fails; one that merely runs
    /// past the end is clamped and copies fewer bytes than requested.
    pub fn apply(&self, base: &[u8], delta: &Delta) -> Result<Bytes> {
        let mut result = BytesMut::new();

        for instruction in delta {
            match instruction {
                Instruction::Copy { offset, length } => {
                    let start = *offset;
                    if start >= base.len() {
                        return Err(Error::OutOfBounds {
                            offset: start,
                            base_len: base.len(),
                        });
                    }
                    let end = start.saturating_add(*length).min(base.len());
                    result.extend_from_slice(&base[start..end]);
                }
                Instruction::Add { data } => result.extend_from_slice(data),
            }
        }

        Ok(result.freeze())
    }
}

fn hash_block(block: &[u8]) -> BlockHash {
    Sha256::digest(block).into()
}

fn hash_blocks(data: &[u8], block_size: usize) -> Vec<BlockHash> {
    if data.len() < PARALLEL_HASH_THRESHOLD {
        return data.chunks(block_size).map(hash_block).collect();
    }

    data.par_chunks(block_size).map(hash_block).collect()
}
