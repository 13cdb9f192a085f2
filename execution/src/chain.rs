//! Block-hash oracle.
//!
//! Settlement only needs two things from the host chain: the height of the last executed block
//! and the hash of a recent block. [`BlockHashes`] is that seam; [`BlockHistory`] is the
//! bounded in-process implementation driven by `state_transition`.

use std::collections::VecDeque;

use commonware_cryptography::sha256::Digest;
use wheelhouse_types::roulette::BLOCK_HASH_RETENTION;

/// Read access to recent block hashes.
pub trait BlockHashes {
    /// Height of the last executed block (0 before any block).
    fn height(&self) -> u64;

    /// Hash of block `height`.
    ///
    /// `None` for heights not yet executed and for heights that fell out of the retention
    /// window, measured from the block currently executing (`self.height() + 1`).
    fn block_hash(&self, height: u64) -> Option<Digest>;

    /// How many blocks back, counted from the executing block, hashes stay readable.
    fn retention(&self) -> u64;
}

/// Ring of the most recent block hashes.
#[derive(Clone, Debug)]
pub struct BlockHistory {
    retention: u64,
    height: u64,
    hashes: VecDeque<Digest>,
}

impl Default for BlockHistory {
    fn default() -> Self {
        Self::new(BLOCK_HASH_RETENTION)
    }
}

impl BlockHistory {
    pub fn new(retention: u64) -> Self {
        Self {
            retention: retention.max(1),
            height: 0,
            hashes: VecDeque::new(),
        }
    }

    pub fn retention(&self) -> u64 {
        self.retention
    }

    /// Height the next pushed block will take.
    pub fn next_height(&self) -> u64 {
        self.height + 1
    }

    /// Hash of the last executed block.
    pub fn tip(&self) -> Option<Digest> {
        self.hashes.back().copied()
    }

    /// Record the hash of the next block and return its height.
    pub fn push(&mut self, hash: Digest) -> u64 {
        self.height += 1;
        self.hashes.push_back(hash);
        // Anything older than `retention - 1` behind the tip is already unreadable from the
        // next executing block.
        while self.hashes.len() as u64 > self.retention {
            self.hashes.pop_front();
        }
        self.height
    }
}

impl BlockHashes for BlockHistory {
    fn height(&self) -> u64 {
        self.height
    }

    fn block_hash(&self, height: u64) -> Option<Digest> {
        if height == 0 || height > self.height {
            return None;
        }
        let executing = self.height + 1;
        if executing - height > self.retention {
            return None;
        }
        let behind_tip = (self.height - height) as usize;
        let index = self.hashes.len().checked_sub(1 + behind_tip)?;
        self.hashes.get(index).copied()
    }

    fn retention(&self) -> u64 {
        self.retention
    }
}
