use thiserror::Error;
use crate::*;

/// Error type for decoding tokens.
///
/// Only a token that cannot be interpreted at all is an error. Damage confined to a single field (an unknown
/// theme, an index past the end of a dictionary, an unreadable custom message) degrades that field to a
/// default instead.
#[derive(Error, Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum DecodeError {
    /// There was no token to decode.
    #[error("Token is empty")]
    Empty,

    /// The token does not have the shape of the format it claims to be.
    #[error("Malformed token")]
    MalformedToken,

    /// The token refers to a language whose dictionary was not supplied.
    #[error("No dictionary for language {0:?}")]
    MissingDictionary(Language),

    /// Compressed text was corrupt or truncated.
    #[error("Compressed text could not be recovered")]
    Decompression,

    /// No known format accepted the token.
    #[error("Unrecognized token format")]
    UnrecognizedFormat,
}

/// Result of decoding a token.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// A wire format that tokens may be written in.
///
/// Decoding tries [`FORMATS`] in order through [`Format::try_decode`]. [`Format::detect`] must reject the
/// tokens of every other format, by shape or by a version tag; [`Format::decode`] may still fail on a token
/// it detected.
pub trait Format: Sync {
    /// Short name used when logging.
    fn name(&self) -> &'static str;

    /// Whether the token is written in this format.
    fn detect(&self, token: &str) -> bool;

    /// Decodes a token of this format. The sender name is the raw side channel of the link.
    fn decode(&self, token: &str, sender: &str, dictionaries: &Dictionaries) -> Result<CardConfiguration>;

    /// Detects and decodes in one step, returning `None` if the token is not written in this format.
    ///
    /// Formats that can only detect a token by parsing all of it override this to parse it once.
    fn try_decode(
        &self,
        token: &str,
        sender: &str,
        dictionaries: &Dictionaries,
    ) -> Option<Result<CardConfiguration>> {
        self.detect(token).then(|| self.decode(token, sender, dictionaries))
    }
}

/// Every supported format, current first, oldest last. New formats go at the front; existing entries are
/// never changed so old links keep decoding.
pub const FORMATS: &[&dyn Format] = &[&NanoFormat, &legacy::TaggedTextFormat, &legacy::JsonFormat];

/// Decodes a token into a card.
///
/// The sender name travels next to the token rather than inside it, and is passed here as it appeared in the
/// link. The dictionaries must cover the language the token was encoded in; other languages are never
/// consulted in its place.
///
/// # Examples
///
/// ```
/// use noorcard::{Dictionaries, Language, Theme};
///
/// let dictionaries = Dictionaries::builtin();
/// let card = noorcard::decode("eB052X", "Ali", dictionaries)?;
///
/// assert_eq!(card.sender, "Ali");
/// assert_eq!(card.theme, Theme::LanternGlow);
/// assert_eq!(card.blessing, Some(2));
/// assert_eq!(card.language, Language::En);
/// assert_eq!(card.message, dictionaries.get(Language::En).unwrap().messages[5]);
/// # Ok::<(), noorcard::DecodeError>(())
/// ```
pub fn decode(token: &str, sender: &str, dictionaries: &Dictionaries) -> Result<CardConfiguration> {
    decode_with_formats(token, sender, dictionaries, FORMATS)
}

/// Decodes a token by trying the given formats in order.
///
/// Returns the first successful decode. If some format recognised the token but failed to decode it, the
/// error of the first such format is returned; if none recognised it, [`DecodeError::UnrecognizedFormat`].
pub fn decode_with_formats(
    token: &str,
    sender: &str,
    dictionaries: &Dictionaries,
    formats: &[&dyn Format],
) -> Result<CardConfiguration> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DecodeError::Empty);
    }
    let mut first_error = None;

    for format in formats {
        let Some(decoded) = format.try_decode(token, sender, dictionaries) else {
            continue;
        };
        match decoded {
            Ok(card) => {
                tracing::trace!(format = format.name(), "decoded token");
                return Ok(card);
            }
            Err(error) => {
                tracing::trace!(format = format.name(), %error, "format rejected token");
                first_error.get_or_insert(error);
            }
        }
    }
    let error = first_error.unwrap_or(DecodeError::UnrecognizedFormat);
    tracing::debug!(%error, "no format could decode token");
    Err(error)
}

/// Recovers a display name from the sender side channel of a link.
///
/// Underscores and hyphens become spaces. A name that is blank afterwards becomes [`FALLBACK_SENDER`].
pub fn recover_sender(raw: &str) -> String {
    let name = raw.replace(['_', '-'], " ");
    match name.trim() {
        "" => FALLBACK_SENDER.to_owned(),
        name => name.to_owned(),
    }
}

/// Clamps a blessing index to the blessings of a dictionary, if there is one.
pub(crate) fn clamp_blessing(index: usize, dictionary: Option<&Dictionary>) -> usize {
    match dictionary {
        Some(dictionary) if index >= dictionary.blessings.len() => {
            tracing::trace!(index, len = dictionary.blessings.len(), "blessing index out of range");
            0
        }
        _ => index,
    }
}

/// The current format: fixed-width base-62 fields, with a compressed fallback for custom messages.
///
/// Preset path, exactly six symbols:
/// ```text
/// e  B  05  2  X
/// |  |  |   |  `-- salt, random, ignored
/// |  |  |   `----- blessing index, or `Z` for none
/// |  |  `--------- message index, two symbols
/// |  `------------ theme
/// `--------------- language
/// ```
///
/// Custom path, `~` followed by the language, theme, and blessing symbols, a `.`, and the message
/// [compressed](crate::compress):
/// ```text
/// ~eBZ.MoQwbgpgBAttDOB7OV4hot8g
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct NanoFormat;

/// First symbol of a custom-path token.
pub const CUSTOM: char = '~';

/// Separates the header of a custom-path token from its compressed message.
pub const SEPARATOR: char = '.';

/// Length of a preset-path token.
pub const PRESET_LEN: usize = 6;

impl NanoFormat {
    fn decode_preset(token: &str, sender: &str, dictionaries: &Dictionaries) -> Result<CardConfiguration> {
        let mut chars = token.chars();
        let (Some(language), Some(theme)) = (chars.next(), chars.next()) else {
            return Err(DecodeError::MalformedToken);
        };
        let fields = chars.as_str();
        let index = fields.get(..2).ok_or(DecodeError::MalformedToken)?;
        let blessing = fields
            .get(2..)
            .and_then(|rest| rest.chars().next())
            .ok_or(DecodeError::MalformedToken)?;

        let language = language_of(language);
        let dictionary = dictionaries
            .get(language)
            .ok_or(DecodeError::MissingDictionary(language))?;
        let index = alphabet::decode_int(index)?;
        let message = dictionary
            .message(index)
            .or_else(|| {
                tracing::trace!(index, len = dictionary.messages.len(), "message index out of range");
                dictionary.message(0)
            })
            .unwrap_or(FALLBACK_GREETING);

        Ok(CardConfiguration {
            sender: recover_sender(sender),
            recipient: RECIPIENT.to_owned(),
            message: message.to_owned(),
            theme: theme_of(theme),
            blessing: blessing_of(blessing, Some(dictionary)),
            language,
        })
    }

    fn decode_custom(token: &str, sender: &str, dictionaries: &Dictionaries) -> Result<CardConfiguration> {
        let mut chars = token.chars();
        let header = (chars.next(), chars.next(), chars.next(), chars.next(), chars.next());
        let (Some(CUSTOM), Some(language), Some(theme), Some(blessing), Some(SEPARATOR)) = header else {
            return Err(DecodeError::MalformedToken);
        };

        let language = language_of(language);
        let message = compress::decompress(chars.as_str()).unwrap_or_else(|error| {
            tracing::debug!(%error, "custom message unreadable, using fallback greeting");
            FALLBACK_GREETING.to_owned()
        });

        Ok(CardConfiguration {
            sender: recover_sender(sender),
            recipient: RECIPIENT.to_owned(),
            message,
            theme: theme_of(theme),
            blessing: blessing_of(blessing, dictionaries.get(language)),
            language,
        })
    }
}

impl Format for NanoFormat {
    fn name(&self) -> &'static str {
        "nano"
    }

    fn detect(&self, token: &str) -> bool {
        let mut chars = token.chars();
        match chars.next() {
            Some(CUSTOM) => chars.nth(3) == Some(SEPARATOR),
            Some(_) => token.chars().count() == PRESET_LEN && alphabet::is_symbols(token),
            None => false,
        }
    }

    fn decode(&self, token: &str, sender: &str, dictionaries: &Dictionaries) -> Result<CardConfiguration> {
        match token.starts_with(CUSTOM) {
            true => NanoFormat::decode_custom(token, sender, dictionaries),
            false => NanoFormat::decode_preset(token, sender, dictionaries),
        }
    }
}

fn language_of(symbol: char) -> Language {
    Language::from_symbol(symbol).unwrap_or_else(|| {
        tracing::trace!(%symbol, "unknown language symbol");
        Language::default()
    })
}

fn theme_of(symbol: char) -> Theme {
    Theme::from_symbol(symbol).unwrap_or_else(|| {
        tracing::trace!(%symbol, "unknown theme symbol");
        Theme::default()
    })
}

/// Reads the blessing field. A symbol outside the alphabet is treated as "no blessing".
fn blessing_of(symbol: char, dictionary: Option<&Dictionary>) -> Option<usize> {
    if symbol == alphabet::NONE {
        return None;
    }
    match alphabet::digit(symbol) {
        Some(index) => Some(clamp_blessing(index, dictionary)),
        None => {
            tracing::trace!(%symbol, "unknown blessing symbol");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::*;

    fn english() -> &'static Dictionary {
        Dictionaries::builtin().get(Language::En).unwrap()
    }

    #[test]
    fn preset_fields() {
        let card = decode("eB052X", "Ali", Dictionaries::builtin()).unwrap();
        assert_eq!(card, CardConfiguration {
            sender: "Ali".to_owned(),
            recipient: "You".to_owned(),
            message: english().messages[5].clone(),
            theme: Theme::LanternGlow,
            blessing: Some(2),
            language: Language::En,
        });
    }

    #[test]
    fn salt_is_ignored() {
        let dictionaries = Dictionaries::builtin();
        let a = decode("uD07Z0", "", dictionaries).unwrap();
        let b = decode("uD07ZQ", "", dictionaries).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.blessing, None);
        assert_eq!(a.language, Language::Ur);
    }

    #[test]
    fn honours_language_symbol() {
        let dictionaries = Dictionaries::builtin();

        for language in Language::ALL {
            let token = format!("{}A030a", language.symbol());
            let card = decode(&token, "x", dictionaries).unwrap();
            assert_eq!(card.language, language);
            assert_eq!(card.message, dictionaries.get(language).unwrap().messages[3]);
        }
    }

    #[test]
    fn missing_dictionary_is_not_substituted() {
        let dictionaries: Dictionaries = [(Language::En, english().clone())].into_iter().collect();

        assert_eq!(decode("aA030a", "x", &dictionaries), Err(DecodeError::MissingDictionary(Language::Ar)));
        assert!(decode("eA030a", "x", &dictionaries).is_ok());
    }

    #[test]
    fn degraded_fields() {
        let dictionaries = Dictionaries::builtin();

        // unknown language and theme symbols
        let card = decode("xz01Za", "", dictionaries).unwrap();
        assert_eq!(card.language, Language::En);
        assert_eq!(card.theme, Theme::CrescentDream);
        assert_eq!(card.message, english().messages[1]);
        assert_eq!(card.blessing, None);

        // message index past the end of the dictionary
        let card = decode("eAzz0a", "", dictionaries).unwrap();
        assert_eq!(card.message, english().messages[0]);

        // blessing index past the end of the dictionary
        let card = decode("eA00Ya", "", dictionaries).unwrap();
        assert_eq!(card.blessing, Some(0));
    }

    #[test]
    fn empty_dictionary_falls_back_to_greeting() {
        let dictionaries: Dictionaries = [(Language::En, Dictionary::default())].into_iter().collect();
        let card = decode("eA053a", "", &dictionaries).unwrap();

        assert_eq!(card.message, FALLBACK_GREETING);
        assert_eq!(card.blessing, Some(0));
    }

    #[test]
    fn custom_path() {
        let token = format!("~hC1.{}", compress("Chand Raat Mubarak"));
        let card = decode(&token, "Zara_Khan", Dictionaries::builtin()).unwrap();

        assert_eq!(card.sender, "Zara Khan");
        assert_eq!(card.message, "Chand Raat Mubarak");
        assert_eq!(card.theme, Theme::PeacefulGarden);
        assert_eq!(card.blessing, Some(1));
        assert_eq!(card.language, Language::Hi);
    }

    #[test]
    fn custom_path_needs_no_dictionary() {
        let token = format!("~rDZ.{}", compress("Ramzan Mubarak"));
        let card = decode(&token, "", &Dictionaries::new()).unwrap();

        assert_eq!(card.message, "Ramzan Mubarak");
        assert_eq!(card.language, Language::Ru);
        assert_eq!(card.blessing, None);
    }

    #[test]
    fn corrupt_custom_message() {
        let card = decode("~eAZ.%%%", "", Dictionaries::builtin()).unwrap();
        assert_eq!(card.message, FALLBACK_GREETING);

        let card = decode("~eA3.", "", Dictionaries::builtin()).unwrap();
        assert_eq!(card.message, FALLBACK_GREETING);
        assert_eq!(card.blessing, Some(3));
    }

    #[test]
    fn sender_side_channel() {
        let test = |raw, expected| assert_eq!(recover_sender(raw), expected);
        test("Ali",           "Ali");
        test("Umm_e-Hani",    "Umm e Hani");
        test("",              FALLBACK_SENDER);
        test("__-_",          FALLBACK_SENDER);
        test("<b>Ali</b>",    "<b>Ali</b>");
    }

    #[test]
    fn total_failure() {
        let test = |token, expected| {
            assert_eq!(decode(token, "Ali", Dictionaries::builtin()), Err(expected), "{token:?}");
        };
        test("",            DecodeError::Empty);
        test("   ",         DecodeError::Empty);
        test("~eA",         DecodeError::UnrecognizedFormat);
        test("~eAZZ",       DecodeError::UnrecognizedFormat);
        test("eA05",        DecodeError::UnrecognizedFormat);
        test("eA05bX!",     DecodeError::UnrecognizedFormat);
        test("hello world", DecodeError::UnrecognizedFormat);
    }

    #[test]
    fn web_builder_custom_token() {
        let card = decode("~hC1.MICwhgdgJgBASmMAXGBZArgIzAJzAayA", "", Dictionaries::builtin()).unwrap();
        assert_eq!(card.message, "Chand Raat Mubarak");

        let card = decode("~uAZ.MoQwbgpgBAttDOB7OV4hot8g", "", Dictionaries::builtin()).unwrap();
        assert_eq!(card.message, "Save me some samosas");
        assert_eq!(card.language, Language::Ur);
    }

    #[test]
    fn oversized_custom_message() {
        let token = format!("~eAZ.{}", compress(&"a".repeat(100_000)));
        let card = decode(&token, "", Dictionaries::builtin()).unwrap();
        assert_eq!(card.message, FALLBACK_GREETING);
    }

    /// Counts how it is called, and claims every token that starts with `!`.
    #[derive(Default)]
    struct Counting {
        detected: AtomicUsize,
        decoded: AtomicUsize,
        tried: AtomicUsize,
    }

    impl Format for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn detect(&self, token: &str) -> bool {
            self.detected.fetch_add(1, Ordering::Relaxed);
            token.starts_with('!')
        }

        fn decode(&self, _: &str, _: &str, _: &Dictionaries) -> Result<CardConfiguration> {
            self.decoded.fetch_add(1, Ordering::Relaxed);
            Err(DecodeError::MalformedToken)
        }

        fn try_decode(&self, token: &str, _: &str, _: &Dictionaries) -> Option<Result<CardConfiguration>> {
            self.tried.fetch_add(1, Ordering::Relaxed);
            token.starts_with('!').then_some(Err(DecodeError::MalformedToken))
        }
    }

    #[test]
    fn formats_are_tried_once() {
        let counting = Counting::default();
        let formats: [&dyn Format; 2] = [&counting, &NanoFormat];
        let dictionaries = Dictionaries::builtin();

        assert!(decode_with_formats("eB052X", "", dictionaries, &formats).is_ok());
        assert_eq!(decode_with_formats("!x", "", dictionaries, &formats), Err(DecodeError::MalformedToken));
        assert_eq!(decode_with_formats("?x", "", dictionaries, &formats), Err(DecodeError::UnrecognizedFormat));

        assert_eq!(counting.tried.load(Ordering::Relaxed), 3);
        assert_eq!(counting.detected.load(Ordering::Relaxed), 0);
        assert_eq!(counting.decoded.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn detection() {
        let test = |token, expected| assert_eq!(NanoFormat.detect(token), expected, "{token:?}");
        test("eA05bX",   true);
        test("~eAZ.AA",  true);
        test("~eAZ.",    true);
        test("eA05b",    false);
        test("eA05b.",   false);
        test("~eAZAA",   false);
        test("",         false);
    }
}
