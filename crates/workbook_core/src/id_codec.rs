//! Reversible id obfuscation for log lines.
//!
//! Storage ids are sequential integers; log lines carry the encoded form so
//! they are not trivially enumerable when logs are shared. This is not a
//! security boundary and is never used for storage keys.

const ALPHABET: &[u8; 32] = b"0123456789abcdefghjkmnpqrstvwxyz";
const ENCODED_LEN: usize = 13;
const MASK: u64 = 0x5bd1_e995_27d4_eb2f;
const ROTATION: u32 = 23;

/// Encodes one storage id into a fixed-width 13 character token.
pub fn encode_id(id: i64) -> String {
    let mut value = ((id as u64) ^ MASK).rotate_left(ROTATION);
    let mut out = [b'0'; ENCODED_LEN];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(value & 0x1f) as usize];
        value >>= 5;
    }
    // Every byte comes from ALPHABET, which is ASCII.
    out.iter().map(|byte| char::from(*byte)).collect()
}

/// Decodes a token produced by [`encode_id`]. Returns `None` for foreign input.
pub fn decode_id(token: &str) -> Option<i64> {
    if token.len() != ENCODED_LEN {
        return None;
    }

    let mut value: u128 = 0;
    for byte in token.bytes() {
        let digit = ALPHABET.iter().position(|candidate| *candidate == byte)?;
        value = (value << 5) | digit as u128;
    }
    let value = u64::try_from(value).ok()?;
    Some((value.rotate_right(ROTATION) ^ MASK) as i64)
}

#[cfg(test)]
mod tests {
    use super::{decode_id, encode_id};

    #[test]
    fn encoded_ids_decode_back() {
        for id in [0_i64, 1, 2, 42, 1_000_000, i64::MAX, -1] {
            let token = encode_id(id);
            assert_eq!(token.len(), 13);
            assert_eq!(decode_id(&token), Some(id), "token {token}");
        }
    }

    #[test]
    fn tokens_do_not_expose_the_raw_id() {
        assert_ne!(encode_id(1), "0000000000001");
        assert_ne!(encode_id(1), encode_id(2));
    }

    #[test]
    fn rejects_foreign_tokens() {
        assert_eq!(decode_id(""), None);
        assert_eq!(decode_id("short"), None);
        assert_eq!(decode_id("ILOUILOUILOUI"), None);
        assert_eq!(decode_id("zzzzzzzzzzzzz"), None);
    }
}
