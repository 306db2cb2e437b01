use chrono::Utc;
use rand::{distributions::Uniform, Rng};

pub const SHADOW_SUFFIX: &str = ".gz";

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_SUFFIX_LEN: usize = 16;

/// New storage key for an asset: base36 nanosecond timestamp, 16 random
/// base36 characters and the extension.
pub fn unique_basename(extension: &str) -> String {
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .map(|n| n.unsigned_abs())
        .unwrap_or_default();
    let mut rng = rand::thread_rng();
    let digits = Uniform::new(0, BASE36_DIGITS.len());
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| BASE36_DIGITS[rng.sample(digits)] as char)
        .collect();
    format!("{}{}.{}", to_base36(nanos), suffix, extension)
}

/// Key of the gzip compressed copy stored next to `key`
pub fn shadow(key: &str) -> String {
    format!("{}{}", key, SHADOW_SUFFIX)
}

pub fn public_uri(base_url: &str, basename: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), basename)
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36_DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.iter().rev().map(|&b| b as char).collect()
}
