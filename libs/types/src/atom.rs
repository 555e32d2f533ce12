//! # Atoms - 6-bit Packed Message Tags
//!
//! Short text literals packed into a single `u64` so they can be compared,
//! hashed and matched as cheaply as an integer. Atoms are the discriminants
//! carried as the first element of tagged message tuples (`put`, `ok`, ...).
//!
//! ## Encoding
//!
//! ```text
//! '0'..='9' →  1..=10
//! 'A'..='Z' → 11..=36
//! '_'       → 37
//! 'a'..='z' → 38..=63
//! other     →  0   (invalid, encoded as zero bits)
//!
//! acc = 0; for c in text { acc = (acc << 6) | code(c) }
//! ```
//!
//! Each character contributes 6 bits to a 64-bit accumulator, so only the
//! **last 10 characters** of a longer text survive. This is the wire layout
//! every peer coordinator expects and is reproduced bit-for-bit: longer texts
//! are not rejected, and texts containing invalid characters may collide.
//!
//! ```rust
//! use types::atom::{Atom, OK_ATOM};
//!
//! const PING: Atom = Atom::new("ping");
//! assert_ne!(PING, OK_ATOM);
//! assert_eq!(PING.to_text(), "ping");
//! ```

use std::fmt;

/// Maximum number of characters an atom retains
pub const MAX_ATOM_LEN: usize = 10;

/// Bits contributed by each character
const BITS_PER_CHAR: u32 = 6;

/// Decoding table from 6-bit codes back to ASCII (code 0 renders as a space)
const DECODING_TABLE: &[u8; 64] =
    b" 0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// Map a single byte to its 6-bit code
#[inline]
pub const fn encode_char(c: u8) -> u64 {
    match c {
        b'0'..=b'9' => (c - b'0') as u64 + 1,
        b'A'..=b'Z' => (c - b'A') as u64 + 11,
        b'_' => 37,
        b'a'..=b'z' => (c - b'a') as u64 + 38,
        _ => 0,
    }
}

/// Encode text into its 64-bit atom value
///
/// Total and side-effect free. Characters beyond the last ten are shifted
/// out of the accumulator.
pub const fn encode(text: &str) -> u64 {
    let bytes = text.as_bytes();
    let mut acc: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        acc = (acc << BITS_PER_CHAR) | encode_char(bytes[i]);
        i += 1;
    }
    acc
}

/// Decode an atom value back to text
///
/// Leading zero chunks are skipped; zero chunks after the first printable
/// character are rendered as spaces.
pub fn decode(value: u64) -> String {
    let mut out = String::with_capacity(MAX_ATOM_LEN + 1);
    let mut started = false;
    // 64 bits hold ten full chunks plus a 4-bit remainder at the top
    for shift in (0..=MAX_ATOM_LEN as u32).rev() {
        let code = ((value >> (shift * BITS_PER_CHAR)) & 0x3F) as usize;
        if code == 0 && !started {
            continue;
        }
        started = true;
        out.push(DECODING_TABLE[code] as char);
    }
    out
}

/// A message tag: text encoded into 64 bits
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Atom(u64);

impl Atom {
    /// Encode `text` into an atom
    pub const fn new(text: &str) -> Self {
        Self(encode(text))
    }

    /// Wrap a raw atom value received from a peer
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Raw 64-bit wire value
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Decoded text
    pub fn to_text(self) -> String {
        decode(self.0)
    }
}

impl From<Atom> for u64 {
    fn from(atom: Atom) -> Self {
        atom.0
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({:?}, {:#018x})", self.to_text(), self.0)
    }
}

/// Request a coordinator to publish an actor on a port
pub const PUT_ATOM: Atom = Atom::new("put");
/// Request a coordinator to withdraw a published actor
pub const DELETE_ATOM: Atom = Atom::new("delete");
/// Successful reply
pub const OK_ATOM: Atom = Atom::new("ok");
/// Failed reply, followed by a message text
pub const ERROR_ATOM: Atom = Atom::new("error");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_zero() {
        assert_eq!(encode(""), 0);
        assert_eq!(Atom::new("").to_text(), "");
    }

    #[test]
    fn test_character_codes() {
        assert_eq!(encode_char(b'0'), 1);
        assert_eq!(encode_char(b'9'), 10);
        assert_eq!(encode_char(b'A'), 11);
        assert_eq!(encode_char(b'Z'), 36);
        assert_eq!(encode_char(b'_'), 37);
        assert_eq!(encode_char(b'a'), 38);
        assert_eq!(encode_char(b'z'), 63);
        assert_eq!(encode_char(b'-'), 0);
        assert_eq!(encode_char(b' '), 0);
    }

    #[test]
    fn test_known_values() {
        // 'o' = 52, 'k' = 48
        assert_eq!(encode("ok"), (52 << 6) | 48);
        // 'p' = 53, 'u' = 58, 't' = 57
        assert_eq!(encode("put"), (53 << 12) | (58 << 6) | 57);
        assert_eq!(OK_ATOM.as_u64(), encode("ok"));
    }

    #[test]
    fn test_truncation_keeps_last_ten() {
        assert_eq!(encode("abcdefghijklmnop"), encode("ghijklmnop"));
        assert_eq!(encode("xx0123456789"), encode("0123456789"));
    }

    #[test]
    fn test_invalid_characters_collide() {
        assert_eq!(encode("a-b"), encode("a.b"));
        assert_eq!(Atom::new("a-b").to_text(), "a b");
    }

    #[test]
    fn test_decode_round_trip() {
        for text in ["put", "ok", "error", "delete", "Z_9", "abcdefghij"] {
            assert_eq!(Atom::new(text).to_text(), text);
        }
    }

    #[test]
    fn test_protocol_tags_distinct() {
        let tags = [PUT_ATOM, DELETE_ATOM, OK_ATOM, ERROR_ATOM];
        for (i, a) in tags.iter().enumerate() {
            for b in &tags[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_display_and_debug() {
        assert_eq!(format!("{}", ERROR_ATOM), "error");
        assert!(format!("{:?}", ERROR_ATOM).starts_with("Atom(\"error\""));
    }
}
