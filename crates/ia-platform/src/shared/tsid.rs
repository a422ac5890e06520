//! Time-sorted identifiers
//!
//! Ids are 64-bit values rendered as 13 Crockford Base32 characters, so
//! they compare lexically in creation order. The upper 42 bits hold the
//! millisecond timestamp and the lower 22 bits a per-process sequence.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Crockford Base32 alphabet (no I, L, O, U)
const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const ENCODED_LEN: usize = 13;
const SEQUENCE_BITS: u32 = 22;
const TIMESTAMP_MASK: u64 = (1 << 42) - 1;

static LAST_ISSUED: AtomicU64 = AtomicU64::new(0);

/// Generator for process-unique, time-sorted ids
pub struct TsidGenerator;

impl TsidGenerator {
    /// Generate a new id, e.g. "0J5Q8X2D1M7ZK"
    pub fn generate() -> String {
        encode(next_value())
    }

    /// Generate an id with a readable prefix, e.g. "exec-0J5Q8X2D1M7ZK"
    pub fn generate_prefixed(prefix: &str) -> String {
        format!("{}-{}", prefix, Self::generate())
    }

    /// Whether `id` is a well-formed 13 character TSID
    pub fn is_valid(id: &str) -> bool {
        decode(id).is_some()
    }

    /// Millisecond timestamp embedded in `id`
    pub fn timestamp_millis(id: &str) -> Option<i64> {
        decode(id).map(|value| (value >> SEQUENCE_BITS) as i64)
    }
}

/// Next value, strictly greater than any value issued before in this process.
fn next_value() -> u64 {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let floor = (millis & TIMESTAMP_MASK) << SEQUENCE_BITS;

    let mut last = LAST_ISSUED.load(Ordering::Relaxed);
    loop {
        let candidate = floor.max(last + 1);
        match LAST_ISSUED.compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

fn encode(mut value: u64) -> String {
    let mut out = [b'0'; ENCODED_LEN];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(value & 0x1F) as usize];
        value >>= 5;
    }
    out.iter().map(|&b| b as char).collect()
}

fn decode(id: &str) -> Option<u64> {
    if id.len() != ENCODED_LEN {
        return None;
    }

    let mut value: u64 = 0;
    for (i, c) in id.chars().enumerate() {
        let digit = match c.to_ascii_uppercase() {
            c @ '0'..='9' => c as u64 - '0' as u64,
            'O' => 0,
            'I' | 'L' => 1,
            c @ 'A'..='H' => c as u64 - 'A' as u64 + 10,
            c @ 'J'..='K' => c as u64 - 'J' as u64 + 18,
            c @ 'M'..='N' => c as u64 - 'M' as u64 + 20,
            c @ 'P'..='T' => c as u64 - 'P' as u64 + 22,
            c @ 'V'..='Z' => c as u64 - 'V' as u64 + 27,
            _ => return None,
        };
        // 13 * 5 = 65 bits, the leading character only carries four
        if i == 0 && digit > 0xF {
            return None;
        }
        value = (value << 5) | digit;
    }
    Some(value)
}
