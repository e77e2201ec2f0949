//! Greeting cards that fit in a link!
//!
//! Noorcard encodes a small greeting card --- sender, message, theme, optional blessing, language --- into
//! the fragment of a URL, short enough to be pasted into any chat app without being truncated, and decodes
//! it back on the other end. There is no server: the link *is* the card.
//!
//! A card whose message comes from the built-in dictionaries encodes as six characters:
//! ```text
//! https://example.org/#Ali.eB052X
//! ```
//!
//!
//! # Overview
//!
//! - Canned messages and blessings are encoded by their position in a per-language [`Dictionary`], as
//! fixed-width base-62 fields. A message that was retyped or reformatted is still recognised as the canned
//! one it copies; see [`normalize`].
//! - Any other message is [compressed](compress) into the token instead, so every card can be shared.
//! - A random salt symbol makes two links for the same card look different.
//! - Decoding degrades field by field. A stale link whose dictionary entry has since been removed, or whose
//! theme no longer exists, still opens --- with a default in place of the damaged field.
//! - Links written by older versions of the format keep opening; see [`legacy`].
//!
//!
//! # Examples
//!
//! Sharing a card and opening it again:
//! ```
//! use noorcard::{CardConfiguration, Dictionaries, Language, Theme};
//!
//! let dictionaries = Dictionaries::builtin();
//! let english = dictionaries.get(Language::En).unwrap();
//!
//! let card = CardConfiguration {
//!     sender: "Ali".to_owned(),
//!     message: english.messages[0].clone(),
//!     theme: Theme::LanternGlow,
//!     blessing: Some(2),
//!     language: Language::En,
//!     ..Default::default()
//! };
//! let link = noorcard::share_link("https://example.org/", &card, dictionaries)?;
//! let (_, fragment) = link.split_once('#').unwrap();
//!
//! assert_eq!(noorcard::open_fragment(fragment, dictionaries), Some(card));
//! # Ok::<(), noorcard::EncodeError>(())
//! ```
//!
//! Working with tokens directly:
//! ```
//! use noorcard::{CardConfiguration, Dictionaries, Language};
//!
//! let dictionaries = Dictionaries::builtin();
//! let card = CardConfiguration {
//!     sender: "Ali".to_owned(),
//!     message: "Ramzan Mubarak from all of us!".to_owned(),
//!     ..Default::default()
//! };
//! let token = noorcard::encode(&card, dictionaries.get(card.language).unwrap())?;
//! let decoded = noorcard::decode(&token, "Ali", dictionaries)?;
//!
//! assert_eq!(decoded, card);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//!
//! # How it works
//!
//! Every field of the card has a small, known set of values, except the message and the sender. The theme
//! and language each get one symbol of a fixed table. The blessing gets one symbol of the
//! [base-62 alphabet](alphabet), with the last symbol, `Z`, meaning "no blessing". Because every field has a
//! fixed width, the token needs no delimiters at all; the decoder slices it at fixed offsets.
//!
//! The message is where the length goes. Most people pick one of the canned messages, so the encoder looks
//! it up in the dictionary of the card's language and, if found, stores its two-symbol index --- 3844
//! possible entries. This is the *preset path*:
//! ```text
//! language  theme  message  blessing  salt
//!    e        B      05        2       X
//! ```
//! A message that isn't canned takes the *custom path*. The token starts with `~`, which no preset token
//! does, followed by the same language, theme, and blessing symbols, a `.`, and the message compressed with
//! lz-string, the same encoding the web card builder writes.
//!
//! The sender has unbounded entropy and compresses badly, so it isn't part of the token at all. It travels
//! in clear text next to it, in the link's fragment; see [`share_fragment`].
//!
//! Two caveats follow from storing positions. First, the dictionaries passed to the decoder must be the ones
//! the encoder used: an index means nothing without the language it was chosen in, so the token carries its
//! language and the decoder never substitutes another one. Second, reordering a dictionary silently changes
//! the message of every preset link already shared. Appending to a dictionary is safe.

pub mod alphabet;
pub mod legacy;
mod normalize;
mod tables;
mod compress;
mod encode;
mod decode;
mod link;

pub use normalize::*;
pub use tables::*;
pub use compress::*;
pub use encode::*;
pub use decode::*;
pub use link::*;

use serde::{Deserialize, Serialize};

/// The recipient shown on every decoded card. Links are not personalised per recipient.
pub const RECIPIENT: &str = "You";

/// Sender shown when a link carries no sender name.
pub const FALLBACK_SENDER: &str = "A Friend";

/// Message shown when a custom message cannot be recovered or a dictionary has no entries.
pub const FALLBACK_GREETING: &str = "Ramadan Mubarak";

/// A greeting card, as built by the sender and as reconstructed by the recipient.
///
/// Only the sender's name and the message are free text. A card is never stored; the link is its only
/// persistent form.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardConfiguration {
    /// Name of the sender. Travels beside the token, not inside it.
    pub sender: String,
    /// Always [`RECIPIENT`] on decoded cards.
    pub recipient: String,
    /// Either (a copy of) a canned message of the card's language, or any text at all.
    pub message: String,
    /// How the card looks.
    pub theme: Theme,
    /// Index of the attached blessing in the dictionary of the card's language, or `None` for no blessing.
    pub blessing: Option<usize>,
    /// The language whose dictionary the message and blessing were chosen from.
    pub language: Language,
}

impl CardConfiguration {
    /// Whether a blessing is attached.
    pub fn include_blessing(&self) -> bool {
        self.blessing.is_some()
    }

    /// Index of the attached blessing, or `0` if there is none.
    pub fn blessing_index(&self) -> usize {
        self.blessing.unwrap_or(0)
    }

    /// Text of the attached blessing, looked up in the given dictionary.
    pub fn blessing_text<'a>(&self, dictionary: &'a Dictionary) -> Option<&'a str> {
        self.blessing.and_then(|index| dictionary.blessing(index))
    }
}

impl Default for CardConfiguration {
    fn default() -> Self {
        CardConfiguration {
            sender: String::new(),
            recipient: RECIPIENT.to_owned(),
            message: String::new(),
            theme: Theme::default(),
            blessing: None,
            language: Language::default(),
        }
    }
}
