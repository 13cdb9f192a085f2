//! Fixtures for tests and simulations.

use crate::chain::BlockHistory;
use crate::state::{fund_account, Adb, Memory};
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    sha256::Sha256,
    Hasher, Signer,
};
use commonware_math::algebra::Random;
use commonware_runtime::{buffer::PoolRef, Clock, Metrics, Spawner, Storage};
use commonware_storage::{qmdb, translator::EightCap};
use commonware_utils::{NZUsize, NZU64};
use rand::{rngs::StdRng, SeedableRng};

/// Creates an account keypair for Ed25519 signatures used by players
pub fn create_account_keypair(seed: u64) -> (PrivateKey, PublicKey) {
    let mut rng = StdRng::seed_from_u64(seed);
    let private = PrivateKey::random(&mut rng);
    let public = private.public_key();
    (private, public)
}

/// Creates an in-memory state with each account funded.
pub async fn create_funded_state(accounts: &[(PublicKey, u64)]) -> Memory {
    let mut state = Memory::default();
    for (public, amount) in accounts {
        fund_account(&mut state, public, *amount)
            .await
            .expect("failed to fund account");
    }
    state
}

/// Push `blocks` synthetic block hashes onto `history`.
pub fn advance(history: &mut BlockHistory, blocks: u64) {
    for _ in 0..blocks {
        let height = history.next_height();
        history.push(Sha256::hash(&height.to_be_bytes()));
    }
}

/// Creates an authenticated state database for testing
pub async fn create_adb<E: Spawner + Metrics + Storage + Clock>(context: &E) -> Adb<E, EightCap> {
    let buffer_pool = PoolRef::new(NZUsize!(1024), NZUsize!(1024));
    Adb::init(
        context.with_label("state"),
        qmdb::any::VariableConfig {
            mmr_journal_partition: String::from("state-mmr-journal"),
            mmr_metadata_partition: String::from("state-mmr-metadata"),
            mmr_items_per_blob: NZU64!(1024),
            mmr_write_buffer: NZUsize!(1024),
            log_partition: String::from("state-log-journal"),
            log_items_per_blob: NZU64!(1024),
            log_write_buffer: NZUsize!(1024),
            log_compression: None,
            log_codec_config: (),
            translator: EightCap,
            thread_pool: None,
            buffer_pool,
        },
    )
    .await
    .expect("Failed to initialize state ADB")
}
