use rand::Rng;
use thiserror::Error;
use crate::*;

/// Error type for encoding cards.
#[derive(Error, Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum EncodeError {
    /// The blessing index does not fit in the single-symbol blessing field. The largest encodable index is
    /// [`MAX_BLESSING`].
    #[error("Blessing index {0} does not fit in a token")]
    BlessingIndex(usize),

    /// A custom message is too long to be opened again; see [`fits`](crate::fits).
    #[error("Message is too long to share")]
    MessageTooLong,
}

/// Number of messages a dictionary may have for all of them to be encodable as presets: the two-symbol
/// message field holds 62² values. Messages further down the dictionary are encoded as custom text.
pub const MAX_MESSAGES: usize = alphabet::BASE * alphabet::BASE;

/// Largest encodable blessing index. The last symbol of the alphabet is reserved for "no blessing".
pub const MAX_BLESSING: usize = alphabet::BASE - 2;

/// Encodes a card into a token, drawing the salt from the thread-local RNG.
///
/// The dictionary must be the one of `config.language`: the token records positions within it. The sender
/// is not part of the token; see [`share_fragment`](crate::share_fragment).
///
/// Fails if the blessing index is past [`MAX_BLESSING`], or if a custom message would compress past the
/// limits [`decompress`](crate::decompress) enforces.
///
/// # Examples
///
/// A message found in the dictionary, modulo formatting, takes the preset path:
/// ```
/// use noorcard::{CardConfiguration, Dictionaries, Language, Theme};
///
/// let dictionary = Dictionaries::builtin().get(Language::En).unwrap();
/// let card = CardConfiguration {
///     sender: "Ali".to_owned(),
///     message: dictionary.messages[0].to_uppercase(),
///     theme: Theme::LanternGlow,
///     blessing: Some(2),
///     ..Default::default()
/// };
/// let token = noorcard::encode(&card, dictionary)?;
///
/// assert_eq!(token.len(), 6);
/// assert!(token.starts_with("eB002"));
/// # Ok::<(), noorcard::EncodeError>(())
/// ```
///
/// Anything else takes the custom path:
/// ```
/// use noorcard::{CardConfiguration, Dictionaries, Language};
///
/// let dictionary = Dictionaries::builtin().get(Language::En).unwrap();
/// let card = CardConfiguration {
///     message: "Save me some samosas".to_owned(),
///     ..Default::default()
/// };
/// let token = noorcard::encode(&card, dictionary)?;
///
/// assert!(token.starts_with("~eAZ."));
/// # Ok::<(), noorcard::EncodeError>(())
/// ```
pub fn encode(
    config: &CardConfiguration,
    dictionary: &Dictionary,
) -> std::result::Result<String, EncodeError> {
    encode_with_rng(config, dictionary, &mut rand::thread_rng())
}

/// Encodes a card into a token, drawing the salt from the given RNG.
///
/// See [`encode`].
pub fn encode_with_rng<R: Rng + ?Sized>(
    config: &CardConfiguration,
    dictionary: &Dictionary,
    rng: &mut R,
) -> std::result::Result<String, EncodeError> {
    let language = config.language.symbol();
    let theme = config.theme.symbol();
    let blessing = blessing_symbol(config.blessing)?;

    let preset = dictionary
        .find_message(&config.message)
        .and_then(|index| alphabet::encode_int(index, 2));

    let token = match preset {
        Some(message) => {
            let mut token = String::with_capacity(PRESET_LEN);
            token.push(language);
            token.push(theme);
            token.push_str(&message);
            token.push(blessing);
            token.push(alphabet::random_symbol(rng));
            token
        }
        None => {
            let message = compress::compress(&config.message);
            if message.len() > MAX_COMPRESSED_LEN || config.message.encode_utf16().count() > MAX_TEXT_LEN {
                return Err(EncodeError::MessageTooLong);
            }
            format!("{CUSTOM}{language}{theme}{blessing}{SEPARATOR}{message}")
        }
    };
    Ok(token)
}

/// Gets the symbol of the blessing field.
fn blessing_symbol(blessing: Option<usize>) -> std::result::Result<char, EncodeError> {
    match blessing {
        None => Ok(alphabet::NONE),
        Some(index) if index <= MAX_BLESSING => alphabet::symbol(index).ok_or(EncodeError::BlessingIndex(index)),
        Some(index) => Err(EncodeError::BlessingIndex(index)),
    }
}
