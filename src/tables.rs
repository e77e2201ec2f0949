//! Languages, themes, and the per-language dictionaries of canned text.
//!
//! Language and theme tables are fixed: their symbols are part of the wire format. Dictionaries are data,
//! supplied by whoever owns the translations, but their *order* is part of the wire format too --- a preset
//! token stores the position of its message, so reordering a dictionary changes the meaning of every link
//! already shared.

use std::{collections::HashMap, fs, path::Path, sync::OnceLock};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::normalize;

/// Languages a card can be written in. Each has its own, independent dictionary.
///
/// Default: [`Language::En`].
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    /// English.
    #[default]
    #[serde(rename = "en")]
    En,
    /// Urdu, in Arabic script.
    #[serde(rename = "ur")]
    Ur,
    /// Roman Urdu.
    #[serde(rename = "ru")]
    Ru,
    /// Arabic.
    #[serde(rename = "ar")]
    Ar,
    /// Hindi, in Devanagari script.
    #[serde(rename = "hi")]
    Hi,
}

impl Language {
    /// All languages.
    pub const ALL: [Language; 5] = [Language::En, Language::Ur, Language::Ru, Language::Ar, Language::Hi];

    /// The identifier used by the translation assets, e.g. `"en"`.
    pub const fn id(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ur => "ur",
            Language::Ru => "ru",
            Language::Ar => "ar",
            Language::Hi => "hi",
        }
    }

    /// The symbol identifying the language in a token.
    pub const fn symbol(self) -> char {
        match self {
            Language::En => 'e',
            Language::Ur => 'u',
            Language::Ru => 'r',
            Language::Ar => 'a',
            Language::Hi => 'h',
        }
    }

    /// Looks up a language by identifier.
    pub fn from_id(id: &str) -> Option<Language> {
        Language::ALL.into_iter().find(|language| language.id() == id)
    }

    /// Looks up a language by its token symbol.
    pub fn from_symbol(symbol: char) -> Option<Language> {
        Language::ALL.into_iter().find(|language| language.symbol() == symbol)
    }

    /// Looks up a language by identifier, falling back to the default language.
    pub fn resolve(id: &str) -> Language {
        Language::from_id(id).unwrap_or_default()
    }
}

/// Visual themes of a card. Only the identity of the theme is encoded; what it looks like is up to the
/// renderer.
///
/// Default: [`Theme::CrescentDream`].
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    /// `crescent-dream`, symbol `A`.
    #[default]
    CrescentDream,
    /// `lantern-glow`, symbol `B`.
    LanternGlow,
    /// `peaceful-garden`, symbol `C`.
    PeacefulGarden,
    /// `royal-purple`, symbol `D`.
    RoyalPurple,
}

impl Theme {
    /// All themes, in wire order. A theme's symbol is derived from its position here.
    pub const ALL: [Theme; 4] = [Theme::CrescentDream, Theme::LanternGlow, Theme::PeacefulGarden, Theme::RoyalPurple];

    /// The identifier of the theme, e.g. `"lantern-glow"`.
    pub const fn id(self) -> &'static str {
        match self {
            Theme::CrescentDream => "crescent-dream",
            Theme::LanternGlow => "lantern-glow",
            Theme::PeacefulGarden => "peaceful-garden",
            Theme::RoyalPurple => "royal-purple",
        }
    }

    /// Human-readable name of the theme.
    pub const fn name(self) -> &'static str {
        match self {
            Theme::CrescentDream => "Crescent Dream",
            Theme::LanternGlow => "Lantern Glow",
            Theme::PeacefulGarden => "Peaceful Garden",
            Theme::RoyalPurple => "Royal Purple",
        }
    }

    /// The symbol identifying the theme in a token: `A` for the first theme, `B` for the second, and so on.
    pub const fn symbol(self) -> char {
        (b'A' + self as u8) as char
    }

    /// Looks up a theme by identifier.
    pub fn from_id(id: &str) -> Option<Theme> {
        Theme::ALL.into_iter().find(|theme| theme.id() == id)
    }

    /// Looks up a theme by its token symbol.
    pub fn from_symbol(symbol: char) -> Option<Theme> {
        Theme::ALL.into_iter().find(|theme| theme.symbol() == symbol)
    }

    /// Looks up a theme by identifier, falling back to the first theme.
    pub fn resolve(id: &str) -> Theme {
        Theme::from_id(id).unwrap_or_default()
    }
}

/// Error type for loading dictionaries.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read dictionaries: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid dictionaries: {0}")]
    Json(#[from] serde_json::Error),
}

/// The canned text of one language.
///
/// Any other fields of a translation asset are ignored when deserializing, so a whole translation file can
/// be loaded as-is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    /// Canned messages, a.k.a. wishes.
    #[serde(alias = "wishes")]
    pub messages: Vec<String>,
    /// Canned blessings, optionally attached below the message.
    #[serde(default)]
    pub blessings: Vec<String>,
}

impl Dictionary {
    /// Creates a dictionary. The order of both lists is part of every link made with it.
    pub fn new(messages: Vec<String>, blessings: Vec<String>) -> Dictionary {
        Dictionary { messages, blessings }
    }

    /// Finds the canned message that the text is a (possibly reformatted) copy of.
    pub fn find_message(&self, text: &str) -> Option<usize> {
        normalize::find_preset(text, &self.messages)
    }

    /// Gets a canned message by index.
    pub fn message(&self, index: usize) -> Option<&str> {
        self.messages.get(index).map(String::as_str)
    }

    /// Gets a canned blessing by index.
    pub fn blessing(&self, index: usize) -> Option<&str> {
        self.blessings.get(index).map(String::as_str)
    }
}

/// A bundle of dictionaries, at most one per language.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dictionaries {
    tables: HashMap<Language, Dictionary>,
}

impl Dictionaries {
    /// Creates an empty bundle.
    pub fn new() -> Dictionaries {
        Dictionaries::default()
    }

    /// The dictionaries shipped with the crate, covering every [`Language`].
    pub fn builtin() -> &'static Dictionaries {
        static BUILTIN: OnceLock<Dictionaries> = OnceLock::new();

        BUILTIN.get_or_init(|| {
            Dictionaries::from_json(include_str!("../static/dictionaries.json"))
                .expect("Built-in dictionaries are valid")
        })
    }

    /// Parses a JSON object keyed by language identifier. Keys that are not a known language are skipped.
    pub fn from_json(json: &str) -> Result<Dictionaries, ConfigError> {
        let raw: HashMap<String, Dictionary> = serde_json::from_str(json)?;
        let mut dictionaries = Dictionaries::new();

        for (id, dictionary) in raw {
            match Language::from_id(&id) {
                Some(language) => dictionaries.insert(language, dictionary),
                None => tracing::trace!(language = %id, "skipping dictionary of unknown language"),
            }
        }
        Ok(dictionaries)
    }

    /// Reads a JSON file in the format of [`Dictionaries::from_json`].
    pub fn load_from_file(path: &Path) -> Result<Dictionaries, ConfigError> {
        let content = fs::read_to_string(path)?;
        Dictionaries::from_json(&content)
    }

    /// Adds the dictionary of a language, replacing any previous one.
    pub fn insert(&mut self, language: Language, dictionary: Dictionary) {
        self.tables.insert(language, dictionary);
    }

    /// Gets the dictionary of a language, if the bundle has one.
    pub fn get(&self, language: Language) -> Option<&Dictionary> {
        self.tables.get(&language)
    }

    /// Languages present in the bundle, in no particular order.
    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.tables.keys().copied()
    }
}

impl FromIterator<(Language, Dictionary)> for Dictionaries {
    fn from_iter<I: IntoIterator<Item = (Language, Dictionary)>>(iter: I) -> Dictionaries {
        Dictionaries { tables: iter.into_iter().collect() }
    }
}
