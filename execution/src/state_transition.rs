//! Apply a block's transactions to state and extend the block-hash history.
//!
//! Block hashes chain from a fixed genesis: `sha256(parent || height || entropy)`. The entropy is
//! whatever the host supplies for the block (e.g. a consensus seed); settlement only ever sees
//! the resulting hash, and only once the block is final.

use crate::chain::{BlockHashes, BlockHistory};
use crate::config::Config;
use crate::{Layer, State};
use anyhow::Context as _;
use commonware_cryptography::{
    ed25519::PublicKey,
    sha256::{Digest, Sha256},
    Hasher,
};
use std::collections::BTreeMap;
use tracing::info;
use wheelhouse_types::execution::{Output, Transaction};

/// Parent of block 1.
pub const GENESIS: &[u8] = b"_WHEELHOUSE_GENESIS";

/// Result of executing a block
pub struct BlockResult {
    pub height: u64,
    pub block_hash: Digest,
    /// Events and included transactions, terminated by [`Output::Commit`].
    pub outputs: Vec<Output>,
    /// Map of public keys to their next expected nonce after processing
    pub processed_nonces: BTreeMap<PublicKey, u64>,
}

pub fn genesis_parent() -> Digest {
    Sha256::hash(GENESIS)
}

/// Hash of block `height` built on `parent`.
pub fn block_hash(parent: &Digest, height: u64, entropy: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(parent.as_ref());
    hasher.update(&height.to_be_bytes());
    hasher.update(entropy);
    hasher.finalize()
}

/// Execute the next block.
///
/// Transactions run against the history as it stood before this block, so nothing executed at
/// height `h` can read the hash of block `h`.
pub async fn execute_block<S: State>(
    state: &mut S,
    history: &mut BlockHistory,
    config: &Config,
    entropy: &[u8],
    transactions: Vec<Transaction>,
) -> anyhow::Result<BlockResult> {
    let height = history.next_height();
    let transaction_count = transactions.len();

    let (mut outputs, processed_nonces, changes) = {
        let mut layer = Layer::new(&*state, &*history, config)
            .with_context(|| format!("configure block (height={height})"))?;
        let (outputs, processed_nonces) = layer
            .execute(transactions)
            .await
            .with_context(|| format!("execute block (height={height})"))?;
        (outputs, processed_nonces, layer.commit())
    };
    state
        .apply(changes)
        .await
        .with_context(|| format!("apply state (height={height})"))?;

    let parent = history.tip().unwrap_or_else(genesis_parent);
    let block_hash = block_hash(&parent, height, entropy);
    let pushed = history.push(block_hash);
    debug_assert_eq!(pushed, height);
    outputs.push(Output::Commit { height, block_hash });

    info!(
        height,
        transactions = transaction_count,
        outputs = outputs.len(),
        last_executed = history.height(),
        "executed block"
    );
    Ok(BlockResult {
        height,
        block_hash,
        outputs,
        processed_nonces,
    })
}
