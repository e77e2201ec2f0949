//! The 62-symbol numeral system used for every fixed-width field of a token.
//!
//! Base 62 is the densest radix whose digits all survive a URL fragment unescaped, so each field can be
//! sliced at a fixed offset instead of being parsed out of a delimited grammar.

use rand::Rng;
use crate::*;

/// Number of symbols in the alphabet.
pub const BASE: usize = 62;

/// The symbols in digit order: `0-9`, then `a-z`, then `A-Z`.
pub const SYMBOLS: &[u8; BASE] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The last symbol of the alphabet. Reserved in the blessing field to mean "no blessing".
pub const NONE: char = 'Z';

/// Maps an ascii code to its digit, or `0xFF` if the code is not a symbol.
const DIGITS: [u8; 128] = {
    let mut table = [0xFF; 128];
    let mut i = 0;
    while i < BASE {
        table[SYMBOLS[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Gets the symbol of a digit, if the digit is below [`BASE`].
pub const fn symbol(digit: usize) -> Option<char> {
    if digit < BASE {
        Some(SYMBOLS[digit] as char)
    } else {
        None
    }
}

/// Gets the digit of a symbol, if the symbol is part of the alphabet.
pub fn digit(symbol: char) -> Option<usize> {
    let code = u8::try_from(symbol).ok()?;
    DIGITS
        .get(code as usize)
        .filter(|&&digit| digit != 0xFF)
        .map(|&digit| digit as usize)
}

/// Whether every character of the string is a symbol of the alphabet.
pub fn is_symbols(string: &str) -> bool {
    string.chars().all(|char| digit(char).is_some())
}

/// Encodes an integer as exactly `width` symbols, left-padded with the zero symbol.
///
/// Returns `None` if the integer needs more than `width` symbols.
///
/// ```
/// use noorcard::alphabet;
///
/// assert_eq!(alphabet::encode_int(0, 2).as_deref(), Some("00"));
/// assert_eq!(alphabet::encode_int(62, 2).as_deref(), Some("10"));
/// assert_eq!(alphabet::encode_int(62 * 62, 2), None);
/// ```
pub fn encode_int(mut n: usize, width: usize) -> Option<String> {
    let mut digits = vec![SYMBOLS[0]; width];

    for slot in digits.iter_mut().rev() {
        *slot = SYMBOLS[n % BASE];
        n /= BASE;
    }
    // anything left over did not fit in the field
    (n == 0).then(|| digits.into_iter().map(char::from).collect())
}

/// Decodes a string of symbols as an integer; the exact inverse of [`encode_int`].
///
/// Fails with [`DecodeError::MalformedToken`] on an empty string, a character outside the alphabet, or an
/// integer too large for `usize`.
pub fn decode_int(string: &str) -> Result<usize> {
    if string.is_empty() {
        return Err(DecodeError::MalformedToken);
    }
    string.chars().try_fold(0usize, |acc, char| {
        let digit = digit(char).ok_or(DecodeError::MalformedToken)?;
        acc.checked_mul(BASE)
            .and_then(|acc| acc.checked_add(digit))
            .ok_or(DecodeError::MalformedToken)
    })
}

/// Draws a uniformly random symbol. Used for the salt of preset tokens.
pub fn random_symbol<R: Rng + ?Sized>(rng: &mut R) -> char {
    SYMBOLS[rng.gen_range(0..BASE)] as char
}
