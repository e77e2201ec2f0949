//! Reversible compression of free text into a URL-safe string.
//!
//! Used for the message of custom-path tokens and by the tagged-text legacy format. This is the lz-string
//! "encoded URI component" encoding, so links produced by the web card builder open unchanged. The output
//! only ever contains `A-Z a-z 0-9 + - $`.
//!
//! Tokens arrive in untrusted links, and lz-string output can grow quadratically in its input. Both sides are
//! therefore bounded: a token longer than [`MAX_COMPRESSED_LEN`] is not decompressed at all, and text longer
//! than [`MAX_TEXT_LEN`] is rejected.

use crate::*;

/// Longest token that will be decompressed, in characters.
pub const MAX_COMPRESSED_LEN: usize = 2048;

/// Longest text that will be returned from decompression, in UTF-16 code units.
pub const MAX_TEXT_LEN: usize = 4096;

/// Compresses text into a URL-safe string.
///
/// ```
/// let token = noorcard::compress("Chand Raat Mubarak");
/// assert_eq!(token, "MICwhgdgJgBASmMAXGBZArgIzAJzAayA");
/// assert_eq!(noorcard::decompress(&token).as_deref(), Ok("Chand Raat Mubarak"));
/// ```
pub fn compress(text: &str) -> String {
    lz_str::compress_to_encoded_uri_component(text)
}

/// Whether text can be compressed into a token that [`decompress`] will accept.
pub fn fits(text: &str) -> bool {
    text.encode_utf16().count() <= MAX_TEXT_LEN && compress(text).len() <= MAX_COMPRESSED_LEN
}

/// Decompresses a string produced by [`compress`].
///
/// Fails with [`DecodeError::Decompression`] if the string is empty, longer than [`MAX_COMPRESSED_LEN`], not
/// valid lz-string data, or decompresses to more than [`MAX_TEXT_LEN`] units or to invalid UTF-16.
pub fn decompress(token: &str) -> Result<String> {
    if token.is_empty() || token.len() > MAX_COMPRESSED_LEN {
        return Err(DecodeError::Decompression);
    }
    // chat apps sometimes turn `+` into a space
    let token = token.replace(' ', "+");

    let units = lz_str::decompress_from_encoded_uri_component(token.as_str())
        .ok_or(DecodeError::Decompression)?;
    if units.len() > MAX_TEXT_LEN {
        tracing::debug!(len = units.len(), "decompressed text too long");
        return Err(DecodeError::Decompression);
    }
    String::from_utf16(&units).map_err(|_| DecodeError::Decompression)
}
