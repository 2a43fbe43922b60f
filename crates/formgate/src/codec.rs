//! Reversible obfuscation of internal record identifiers.
//!
//! Internal identifiers are 24-character hexadecimal strings (MongoDB
//! ObjectIds). Clients only ever see the external form, a Hashids encoding of
//! the id split into two 12-digit chunks:
//!
//! ```text
//! 507f1f77bcf8 6cd799439011  →  [0x1507f1f77bcf8, 0x16cd799439011]  →  "k3x9…"
//! ```
//!
//! Each chunk is prefixed with a `1` marker so leading zeros survive the trip
//! through an integer. Decoding re-encodes the recovered numbers and rejects
//! any input that does not reproduce itself, so tampered or foreign strings
//! fail instead of mapping to a different record.

use std::fmt;

use thiserror::Error;

use crate::error::InvalidIdentifier;

pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz1234567890";
pub const DEFAULT_MIN_LENGTH: usize = 24;

const INTERNAL_ID_LENGTH: usize = 24;
const HEX_CHUNK: usize = 12;
const MIN_ALPHABET_LENGTH: usize = 16;
const SEPARATORS: &[u8] = b"cfhistuCFHISTU";
const SEPARATOR_RATIO: f64 = 3.5;
const GUARD_RATIO: f64 = 12.0;

/// The configured alphabet cannot drive the codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlphabetError {
    #[error("alphabet must contain at least 16 unique characters, got {0}")]
    TooShort(usize),
    #[error("alphabet must be printable ASCII without whitespace, found {0:?}")]
    InvalidCharacter(char),
}

/// Encoder/decoder between internal and external identifiers.
///
/// Deterministic for a given (salt, alphabet, min length) triple; cheap to
/// clone and safe to share across tasks.
#[derive(Clone)]
pub struct IdCodec {
    salt: Vec<u8>,
    min_length: usize,
    alphabet: Vec<u8>,
    separators: Vec<u8>,
    guards: Vec<u8>,
}

impl fmt::Debug for IdCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdCodec")
            .field("salt", &"[REDACTED]")
            .field("min_length", &self.min_length)
            .finish_non_exhaustive()
    }
}

impl IdCodec {
    pub fn new(salt: &str, alphabet: &str, min_length: usize) -> Result<Self, AlphabetError> {
        if let Some(ch) = alphabet
            .chars()
            .find(|c| !c.is_ascii_graphic())
        {
            return Err(AlphabetError::InvalidCharacter(ch));
        }

        let mut unique: Vec<u8> = Vec::with_capacity(alphabet.len());
        for b in alphabet.bytes() {
            if !unique.contains(&b) {
                unique.push(b);
            }
        }
        if unique.len() < MIN_ALPHABET_LENGTH {
            return Err(AlphabetError::TooShort(unique.len()));
        }

        let salt = salt.as_bytes().to_vec();

        let mut separators: Vec<u8> = SEPARATORS
            .iter()
            .copied()
            .filter(|b| unique.contains(b))
            .collect();
        let mut alphabet: Vec<u8> = unique
            .into_iter()
            .filter(|b| !separators.contains(b))
            .collect();

        consistent_shuffle(&mut separators, &salt);

        let min_separators = ratio_ceil(alphabet.len(), SEPARATOR_RATIO);
        if separators.len() < min_separators {
            let missing = (min_separators - separators.len()).min(alphabet.len());
            separators.extend(alphabet.drain(..missing));
        }

        consistent_shuffle(&mut alphabet, &salt);

        let num_guards = ratio_ceil(alphabet.len(), GUARD_RATIO);
        let guards: Vec<u8> = if alphabet.len() < 3 {
            let n = num_guards.min(separators.len());
            separators.drain(..n).collect()
        } else {
            alphabet.drain(..num_guards).collect()
        };

        Ok(Self {
            salt,
            min_length,
            alphabet,
            separators,
            guards,
        })
    }

    /// Obfuscate a 24-character hexadecimal identifier.
    pub fn encode(&self, internal_id: &str) -> Result<String, InvalidIdentifier> {
        if internal_id.len() != INTERNAL_ID_LENGTH
            || !internal_id.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(InvalidIdentifier(internal_id.to_string()));
        }

        let numbers = internal_id
            .as_bytes()
            .chunks(HEX_CHUNK)
            .map(|chunk| {
                let chunk = std::str::from_utf8(chunk).map_err(|_| ())?;
                u64::from_str_radix(&format!("1{chunk}"), 16).map_err(|_| ())
            })
            .collect::<Result<Vec<u64>, ()>>()
            .map_err(|_| InvalidIdentifier(internal_id.to_string()))?;

        Ok(self.encode_numbers(&numbers))
    }

    /// Recover the internal identifier (lower-case hex) from its external form.
    pub fn decode(&self, external_id: &str) -> Result<String, InvalidIdentifier> {
        let invalid = || InvalidIdentifier(external_id.to_string());

        let numbers = self.decode_numbers(external_id).ok_or_else(invalid)?;

        let mut internal = String::with_capacity(INTERNAL_ID_LENGTH);
        for number in numbers {
            let hex = format!("{number:x}");
            let digits = hex.strip_prefix('1').ok_or_else(invalid)?;
            internal.push_str(digits);
        }

        if internal.len() != INTERNAL_ID_LENGTH {
            return Err(invalid());
        }
        Ok(internal)
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    fn encode_numbers(&self, numbers: &[u64]) -> String {
        if numbers.is_empty() {
            return String::new();
        }

        let values_hash: u64 = numbers
            .iter()
            .enumerate()
            .map(|(i, n)| n % (i as u64 + 100))
            .sum();

        let mut alphabet = self.alphabet.clone();
        let lottery = alphabet[index(values_hash, alphabet.len())];
        let mut encoded = vec![lottery];

        for (i, &number) in numbers.iter().enumerate() {
            let salt = lottery_salt(lottery, &self.salt, &alphabet);
            consistent_shuffle(&mut alphabet, &salt);

            let last = hash(number, &alphabet);
            let value = number % (u64::from(last[0]) + i as u64);
            encoded.extend_from_slice(&last);
            encoded.push(self.separators[index(value, self.separators.len())]);
        }
        encoded.pop();

        if encoded.len() < self.min_length {
            encoded = self.pad(encoded, alphabet, values_hash);
        }

        // Every byte comes from the ASCII alphabet.
        encoded.into_iter().map(char::from).collect()
    }

    fn pad(&self, mut encoded: Vec<u8>, mut alphabet: Vec<u8>, values_hash: u64) -> Vec<u8> {
        let guard = index(values_hash + u64::from(encoded[0]), self.guards.len());
        encoded.insert(0, self.guards[guard]);

        if encoded.len() < self.min_length {
            let guard = index(values_hash + u64::from(encoded[2]), self.guards.len());
            encoded.push(self.guards[guard]);
        }

        let split_at = alphabet.len() / 2;
        while encoded.len() < self.min_length {
            let salt = alphabet.clone();
            consistent_shuffle(&mut alphabet, &salt);

            let mut wrapped = Vec::with_capacity(encoded.len() + alphabet.len());
            wrapped.extend_from_slice(&alphabet[split_at..]);
            wrapped.extend_from_slice(&encoded);
            wrapped.extend_from_slice(&alphabet[..split_at]);
            encoded = wrapped;

            let excess = encoded.len().saturating_sub(self.min_length);
            if excess > 0 {
                let from = excess / 2;
                encoded = encoded[from..from + self.min_length].to_vec();
            }
        }
        encoded
    }

    fn decode_numbers(&self, external_id: &str) -> Option<Vec<u64>> {
        if external_id.is_empty() || !external_id.is_ascii() {
            return None;
        }

        let parts: Vec<&[u8]> = external_id
            .as_bytes()
            .split(|b| self.guards.contains(b))
            .collect();
        let core = if (2..=3).contains(&parts.len()) {
            parts[1]
        } else {
            parts[0]
        };

        let (&lottery, rest) = core.split_first()?;
        let mut alphabet = self.alphabet.clone();
        let mut numbers = Vec::new();
        for part in rest.split(|b| self.separators.contains(b)) {
            let salt = lottery_salt(lottery, &self.salt, &alphabet);
            consistent_shuffle(&mut alphabet, &salt);
            numbers.push(unhash(part, &alphabet)?);
        }

        (self.encode_numbers(&numbers) == external_id).then_some(numbers)
    }
}

fn ratio_ceil(len: usize, ratio: f64) -> usize {
    (len as f64 / ratio).ceil() as usize
}

fn index(value: u64, len: usize) -> usize {
    (value % len as u64) as usize
}

/// `(lottery + salt + alphabet)` truncated to the alphabet length.
fn lottery_salt(lottery: u8, salt: &[u8], alphabet: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + salt.len() + alphabet.len());
    out.push(lottery);
    out.extend_from_slice(salt);
    out.extend_from_slice(alphabet);
    out.truncate(alphabet.len());
    out
}

fn consistent_shuffle(chars: &mut [u8], salt: &[u8]) {
    if salt.is_empty() {
        return;
    }

    let mut salt_index = 0usize;
    let mut sum = 0usize;
    for i in (1..chars.len()).rev() {
        let integer = usize::from(salt[salt_index]);
        sum += integer;
        let j = (integer + salt_index + sum) % i;
        chars.swap(i, j);
        salt_index = (salt_index + 1) % salt.len();
    }
}

fn hash(mut number: u64, alphabet: &[u8]) -> Vec<u8> {
    let base = alphabet.len() as u64;
    let mut out = Vec::new();
    loop {
        out.push(alphabet[(number % base) as usize]);
        number /= base;
        if number == 0 {
            break;
        }
    }
    out.reverse();
    out
}

fn unhash(part: &[u8], alphabet: &[u8]) -> Option<u64> {
    let base = alphabet.len() as u64;
    part.iter().try_fold(0u64, |acc, b| {
        let position = alphabet.iter().position(|a| a == b)? as u64;
        acc.checked_mul(base)?.checked_add(position)
    })
}
