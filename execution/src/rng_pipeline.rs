//! Commit-reveal pipeline for wheel outcomes.
//!
//! ## Flow
//!
//! 1. **Commit** - The player publishes `sha256(secret)` alongside the wager.
//! 2. **Wait** - At least two blocks pass, so the block the outcome depends on did not exist
//!    when the wager was accepted.
//! 3. **Reveal** - The player discloses `secret`; anyone can check `sha256(secret) == commit`.
//! 4. **Spin** - The pocket is `sha256(secret || block_hash(commit_height + 1)) mod 37`.
//!
//! The player cannot choose a secret after seeing the block hash, and the block producer cannot
//! predict the outcome without the secret.

use commonware_cryptography::sha256::{Digest, Sha256};
use commonware_cryptography::Hasher;
use wheelhouse_types::roulette::{COMMITMENT_LEN, WHEEL_POCKETS};

/// A secret together with the commitment that binds it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitRevealPair {
    /// Published with the wager.
    pub commitment: [u8; COMMITMENT_LEN],
    /// Disclosed at reveal time.
    pub secret: [u8; COMMITMENT_LEN],
}

impl CommitRevealPair {
    pub fn from_secret(secret: [u8; COMMITMENT_LEN]) -> Self {
        Self {
            commitment: compute_commitment(&secret),
            secret,
        }
    }

    /// Verify that the commitment matches hash(secret).
    pub fn verify(&self) -> bool {
        verify_commitment(&self.commitment, &self.secret)
    }
}

/// Compute a commitment from a secret: `sha256(secret)`.
pub fn compute_commitment(secret: &[u8; COMMITMENT_LEN]) -> [u8; COMMITMENT_LEN] {
    Sha256::hash(secret).0
}

/// Returns `true` if `commitment == sha256(secret)`.
pub fn verify_commitment(commitment: &[u8; COMMITMENT_LEN], secret: &[u8; COMMITMENT_LEN]) -> bool {
    &compute_commitment(secret) == commitment
}

/// Derive the winning pocket from a revealed secret and the hash of the block after the wager.
///
/// The full 256-bit digest is read as a big-endian integer and reduced modulo 37.
pub fn derive_result(secret: &[u8; COMMITMENT_LEN], block_hash: &Digest) -> u8 {
    let mut hasher = Sha256::new();
    hasher.update(secret);
    hasher.update(block_hash.as_ref());
    reduce(&hasher.finalize().0, WHEEL_POCKETS)
}

/// Big-endian `bytes mod modulus`.
fn reduce(bytes: &[u8], modulus: u8) -> u8 {
    let modulus = modulus as u32;
    let remainder = bytes
        .iter()
        .fold(0u32, |acc, byte| (acc * 256 + *byte as u32) % modulus);
    remainder as u8
}

/// Deterministic per-wager secrets derived from one master secret.
///
/// Lets a client recover any past secret from `(master, index)` instead of storing each one.
#[derive(Clone)]
pub struct SecretChain {
    master_secret: [u8; COMMITMENT_LEN],
}

impl SecretChain {
    pub fn from_secret(master_secret: [u8; COMMITMENT_LEN]) -> Self {
        Self { master_secret }
    }

    pub fn secret(&self) -> &[u8; COMMITMENT_LEN] {
        &self.master_secret
    }

    /// Derive the secret for the wager at `index`.
    pub fn derive_secret(&self, index: u64) -> [u8; COMMITMENT_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(&self.master_secret);
        hasher.update(&index.to_be_bytes());
        hasher.finalize().0
    }

    pub fn generate(&self, index: u64) -> CommitRevealPair {
        CommitRevealPair::from_secret(self.derive_secret(index))
    }
}
