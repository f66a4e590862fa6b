use sha2::{Digest, Sha256};

/// Stable 32-bit bucket for a (user, experiment) pair.
///
/// Depends only on the two strings, so the bucket survives process restarts
/// and is identical on every server.
pub fn assignment_hash(user_id: &str, experiment_id: &str) -> u32 {
    let digest = Sha256::new()
        .chain_update(user_id.as_bytes())
        .chain_update(experiment_id.as_bytes())
        .finalize();
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}
