//! Placing tokens in, and taking them out of, the fragment of a share link.
//!
//! A link looks like `https://host/path#Sender_Name.eA05bX`. The fragment never reaches a server. The sender
//! goes first, sanitised so it contains no `.`; the first `.` of the fragment therefore always ends the
//! sender, while the token after it is free to contain `.` of its own (custom-path tokens do).

use std::borrow::Cow;
use crate::*;

/// Separates the sender from the token in a fragment.
pub const NAME_SEPARATOR: char = '.';

/// A sender and token taken out of a link's fragment.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct SharedLink {
    /// The sender as it appeared in the link, percent-decoded but not yet [recovered](crate::recover_sender).
    pub sender: String,
    /// Everything after the sender, for [`decode`](crate::decode).
    pub token: String,
}

/// Makes a sender name safe to place before the token: whitespace and `.` become `_`.
pub fn sanitize_sender(name: &str) -> String {
    name.trim()
        .chars()
        .map(|char| match char {
            NAME_SEPARATOR => '_',
            char if char.is_whitespace() => '_',
            char => char,
        })
        .collect()
}

/// Builds the fragment for a sender and token, without the leading `#`.
///
/// ```
/// assert_eq!(noorcard::share_fragment("Ali Khan", "eA05bX"), "Ali_Khan.eA05bX");
/// assert_eq!(noorcard::share_fragment("Dr. Noor", "eA05bX"), "Dr__Noor.eA05bX");
/// ```
pub fn share_fragment(sender: &str, token: &str) -> String {
    let sender = sanitize_sender(sender);
    format!("{}{NAME_SEPARATOR}{token}", urlencoding::encode(&sender))
}

/// Takes the sender and token out of a fragment, with or without its leading `#`.
///
/// Returns `None` if there is no token; the caller should then show an empty card builder. Fragments of the
/// oldest links, `#data=<token>`, yield the token with an empty sender.
///
/// ```
/// let link = noorcard::parse_fragment("#Ali_Khan.~eAZ.MoQwbgpgBAttDOB7OV4hot8g").unwrap();
/// assert_eq!(link.sender, "Ali_Khan");
/// assert_eq!(link.token, "~eAZ.MoQwbgpgBAttDOB7OV4hot8g");
///
/// assert_eq!(noorcard::parse_fragment("#"), None);
/// ```
pub fn parse_fragment(fragment: &str) -> Option<SharedLink> {
    let fragment = fragment.trim();
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

    if let Some(token) = fragment.split('&').find_map(|param| param.strip_prefix("data=")) {
        return shared_link("", token);
    }
    match fragment.split_once(NAME_SEPARATOR) {
        Some((sender, token)) => shared_link(sender, token),
        None => shared_link("", fragment),
    }
}

fn shared_link(sender: &str, token: &str) -> Option<SharedLink> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let sender = urlencoding::decode(sender).unwrap_or(Cow::Borrowed(sender));

    Some(SharedLink {
        sender: sender.into_owned(),
        token: token.to_owned(),
    })
}

/// Reconstructs the card shared in a fragment.
///
/// Returns `None` if the fragment holds no card, or one that no format can decode; either way the caller
/// should show an empty card builder. The reason is logged at debug level.
///
/// ```
/// use noorcard::Dictionaries;
///
/// let card = noorcard::open_fragment("#Ali.eB052X", Dictionaries::builtin()).unwrap();
/// assert_eq!(card.sender, "Ali");
///
/// assert_eq!(noorcard::open_fragment("", Dictionaries::builtin()), None);
/// ```
pub fn open_fragment(fragment: &str, dictionaries: &Dictionaries) -> Option<CardConfiguration> {
    let link = parse_fragment(fragment)?;

    decode(&link.token, &link.sender, dictionaries)
        .map_err(|error| tracing::debug!(%error, "link holds no readable card"))
        .ok()
}

/// Builds a complete share link for a card.
///
/// Any fragment already on `base_url` is replaced. The dictionary of the card's language is taken from the
/// bundle; without one, the message can only take the custom path.
///
/// ```
/// use noorcard::{CardConfiguration, Dictionaries};
///
/// let card = CardConfiguration {
///     sender: "Ali".to_owned(),
///     message: "See you at taraweeh".to_owned(),
///     ..Default::default()
/// };
/// let link = noorcard::share_link("https://example.org/#old", &card, Dictionaries::builtin())?;
/// assert!(link.starts_with("https://example.org/#Ali.~eAZ."));
/// # Ok::<(), noorcard::EncodeError>(())
/// ```
pub fn share_link(
    base_url: &str,
    config: &CardConfiguration,
    dictionaries: &Dictionaries,
) -> std::result::Result<String, EncodeError> {
    let empty = Dictionary::default();
    let dictionary = dictionaries.get(config.language).unwrap_or(&empty);
    let token = encode(config, dictionary)?;

    let base = base_url
        .split_once('#')
        .map_or(base_url, |(base, _)| base);
    Ok(format!("{base}#{}", share_fragment(&config.sender, &token)))
}
