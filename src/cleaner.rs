//! Noise removal for the base-call/quality pair of one pileup column.
//!
//! The base-call string packs read-start markers, indel annotations and
//! ambiguous-mapping symbols next to the actual calls. Only calls and
//! deletion placeholders own a quality character, so the cleaner walks the
//! string once, classifies every token and keeps a parallel mask over the
//! quality string.

use crate::errors::LengthMismatch;

/// Symbols marking positions where the aligner could not assign an allele.
/// None of them owns a quality character.
pub const AMBIGUOUS_MAPPING_SYMBOLS: &[u8] = b"0123456789@'&!?_$:;F\"+#-=%)(/~}[";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Base call with a paired quality character.
    Call(u8),
    /// `*` deletion placeholder; paired with a quality character.
    Deletion,
    /// `+N`/`-N` followed by N bases.
    Indel { length: usize },
    /// `^` and its mapping-quality byte.
    ReadStart,
    /// A single ambiguous-mapping symbol, `$` included.
    Noise(u8),
}

impl Token {
    fn owns_quality(&self) -> bool {
        matches!(self, Token::Call(_) | Token::Deletion)
    }
}

/// Left-to-right tokenizer over a pileup base-call string.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(bases: &'a str) -> Self {
        Self {
            bytes: bases.as_bytes(),
            offset: 0,
        }
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let bytes = self.bytes;
        let n = self.offset;
        let byte = *bytes.get(n)?;

        let (token, width) = match byte {
            b'+' | b'-' => {
                let digits = bytes[n + 1..]
                    .iter()
                    .take_while(|value| value.is_ascii_digit())
                    .count();
                if digits == 0 {
                    (Token::Noise(byte), 1)
                } else {
                    let length = bytes[n + 1..n + 1 + digits]
                        .iter()
                        .fold(0usize, |acc, digit| {
                            acc.saturating_mul(10)
                                .saturating_add(usize::from(digit - b'0'))
                        });
                    (Token::Indel { length }, digits.saturating_add(length).saturating_add(1))
                }
            }
            b'^' => (Token::ReadStart, 2),
            b'*' => (Token::Deletion, 1),
            _ if AMBIGUOUS_MAPPING_SYMBOLS.contains(&byte) => (Token::Noise(byte), 1),
            _ => (Token::Call(byte), 1),
        };

        self.offset = n.saturating_add(width).min(bytes.len());
        Some(token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CleanedCalls {
    pub bases: String,
    pub qualities: String,
}

/// Strips indel tokens, read markers, ambiguous-mapping symbols and
/// deletion placeholders from `bases`, dropping the quality characters
/// paired with removed placeholders.
///
/// Fails when the number of quality-owning tokens differs from the length
/// of `qualities`; the pair cannot be aligned in that case.
pub fn clean_calls(bases: &str, qualities: &str) -> Result<CleanedCalls, LengthMismatch> {
    let mut kept = Vec::with_capacity(bases.len());
    let mut keep_quality = Vec::with_capacity(qualities.len());

    for token in Tokens::new(bases) {
        if token.owns_quality() {
            keep_quality.push(matches!(token, Token::Call(_)));
        }
        if let Token::Call(base) = token {
            kept.push(base);
        }
    }

    let quality_bytes = qualities.as_bytes();
    if keep_quality.len() != quality_bytes.len() {
        return Err(LengthMismatch {
            calls: keep_quality.len(),
            qualities: quality_bytes.len(),
        });
    }

    let kept_qualities = quality_bytes
        .iter()
        .zip(&keep_quality)
        .filter_map(|(quality, keep)| keep.then_some(*quality))
        .collect::<Vec<_>>();

    Ok(CleanedCalls {
        bases: decode_ascii(kept),
        qualities: decode_ascii(kept_qualities),
    })
}

fn decode_ascii(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}
