use chrono::{DateTime, Utc};
use rand::Rng;

/// Characters used in the random suffix. Lookalikes (0/O, 1/I/L) are
/// excluded so references survive being read over the phone.
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTVWXYZ23456789";
const SUFFIX_LEN: usize = 6;

/// Generate an order reference like `CV-250704-X7KQ2M`: a fixed prefix,
/// the order date, and a random suffix.
pub fn order_reference(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("CV-{}-{}", now.format("%y%m%d"), suffix)
}
