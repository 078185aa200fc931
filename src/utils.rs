use std::time::{SystemTime, UNIX_EPOCH};

use rand::distr::Alphanumeric;
use rand::Rng;

use crate::crypto::frame::RANDOM_LEN;

const NONCE_LEN: usize = 16;

/// Seconds since the Unix epoch, 0 if the clock is before it.
pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

pub(crate) fn random_prefix() -> [u8; RANDOM_LEN] {
    rand::random()
}

pub(crate) fn random_nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}
