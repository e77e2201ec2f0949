//! Formats of links shared before the current one.
//!
//! Links live on in chat histories long after the format that produced them is retired, so each retired
//! format keeps a decoder here. Every one of them is recognised by a version tag inside its payload, never by
//! guesswork, so a token of one format cannot be mistaken for another.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use serde::Deserialize;
use serde_json::Value;
use crate::*;

/// Version tag of [`TaggedTextFormat`] payloads.
pub const TAGGED_TEXT_TAG: &str = "v2|";

/// Version tag of the array form of [`JsonFormat`] payloads.
pub const JSON_TAG: &str = "v1";

/// Delimited text behind a `v2|` tag, [compressed](crate::compress) as a whole.
///
/// ```text
/// v2|<language id>|<theme id>|<blessing index, or empty>|<message>
/// ```
/// The message is the last field and may itself contain `|`. The sender travels beside the token, as with
/// the current format.
#[derive(Clone, Copy, Debug, Default)]
pub struct TaggedTextFormat;

impl TaggedTextFormat {
    /// Decompresses the token and strips the tag, if it has one.
    fn parse(token: &str) -> Option<String> {
        compress::decompress(token)
            .ok()
            .and_then(|text| text.strip_prefix(TAGGED_TEXT_TAG).map(str::to_owned))
    }

    fn card(fields: &str, sender: &str, dictionaries: &Dictionaries) -> Result<CardConfiguration> {
        let mut fields = fields.splitn(4, '|');
        let (Some(language), Some(theme), Some(blessing), Some(message)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(DecodeError::MalformedToken);
        };

        let language = Language::resolve(language);
        let blessing = match blessing {
            "" => None,
            index => index
                .parse()
                .ok()
                .map(|index| decode::clamp_blessing(index, dictionaries.get(language))),
        };

        Ok(CardConfiguration {
            sender: recover_sender(sender),
            recipient: RECIPIENT.to_owned(),
            message: message.to_owned(),
            theme: Theme::resolve(theme),
            blessing,
            language,
        })
    }
}

impl Format for TaggedTextFormat {
    fn name(&self) -> &'static str {
        "tagged-text"
    }

    fn detect(&self, token: &str) -> bool {
        TaggedTextFormat::parse(token).is_some()
    }

    fn decode(&self, token: &str, sender: &str, dictionaries: &Dictionaries) -> Result<CardConfiguration> {
        let fields = TaggedTextFormat::parse(token).ok_or(DecodeError::MalformedToken)?;
        TaggedTextFormat::card(&fields, sender, dictionaries)
    }

    fn try_decode(
        &self,
        token: &str,
        sender: &str,
        dictionaries: &Dictionaries,
    ) -> Option<Result<CardConfiguration>> {
        TaggedTextFormat::parse(token).map(|fields| TaggedTextFormat::card(&fields, sender, dictionaries))
    }
}

/// Writes a card in the [`TaggedTextFormat`]. Only useful for producing links that old clients can open.
pub fn encode_tagged_text(config: &CardConfiguration) -> String {
    let blessing = config.blessing.map(|index| index.to_string()).unwrap_or_default();
    let text = format!(
        "{TAGGED_TEXT_TAG}{}|{}|{}|{}",
        config.language.id(),
        config.theme.id(),
        blessing,
        config.message,
    );
    compress::compress(&text)
}

/// The oldest links: Base64 of the URI-component-encoded JSON of the whole card.
///
/// Either a `v1`-tagged array
/// ```text
/// ["v1", from, wish, themeId, includeBlessing, blessingIndex, lang]
/// ```
/// or the object the very first card builder wrote, recognised by its `wish` and `themeId` fields. The
/// sender is part of the payload; the side channel is only used when the payload has none. Both the standard
/// and the URL-safe Base64 alphabets are accepted, with or without padding.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFormat;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Tagged(Vec<Value>),
    Object(LegacyCard),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyCard {
    #[serde(default)]
    from: String,
    wish: String,
    theme_id: String,
    #[serde(default)]
    include_blessing: bool,
    #[serde(default)]
    blessing_index: Option<usize>,
    #[serde(default)]
    lang: Option<String>,
}

impl LegacyCard {
    fn from_tagged(values: &[Value]) -> Option<LegacyCard> {
        let text = |i: usize| values.get(i).and_then(Value::as_str);
        let (Some(JSON_TAG), Some(wish)) = (text(0), text(2)) else {
            return None;
        };

        Some(LegacyCard {
            from: text(1).unwrap_or_default().to_owned(),
            wish: wish.to_owned(),
            theme_id: text(3).unwrap_or_default().to_owned(),
            include_blessing: values.get(4).and_then(Value::as_bool).unwrap_or(false),
            blessing_index: values
                .get(5)
                .and_then(Value::as_u64)
                .and_then(|index| usize::try_from(index).ok()),
            lang: text(6).map(str::to_owned),
        })
    }

    fn into_card(self, sender: &str, dictionaries: &Dictionaries) -> CardConfiguration {
        let language = self.lang
            .as_deref()
            .map(Language::resolve)
            .unwrap_or_default();
        let blessing = self.include_blessing.then(|| {
            decode::clamp_blessing(self.blessing_index.unwrap_or(0), dictionaries.get(language))
        });
        let sender = match self.from.trim() {
            "" => recover_sender(sender),
            from => from.to_owned(),
        };

        CardConfiguration {
            sender,
            recipient: RECIPIENT.to_owned(),
            message: self.wish,
            theme: Theme::resolve(&self.theme_id),
            blessing,
            language,
        }
    }
}

impl JsonFormat {
    fn parse(token: &str) -> Option<LegacyCard> {
        let base64: String = token
            .trim_end_matches('=')
            .chars()
            .map(|char| match char {
                '-' => '+',
                '_' => '/',
                char => char,
            })
            .collect();
        let bytes = STANDARD_NO_PAD.decode(base64).ok()?;
        let component = String::from_utf8(bytes).ok()?;
        let json = urlencoding::decode(&component).ok()?;

        match serde_json::from_str(&json).ok()? {
            Payload::Tagged(values) => LegacyCard::from_tagged(&values),
            Payload::Object(card) => Some(card),
        }
    }
}

impl Format for JsonFormat {
    fn name(&self) -> &'static str {
        "json"
    }

    fn detect(&self, token: &str) -> bool {
        JsonFormat::parse(token).is_some()
    }

    fn decode(&self, token: &str, sender: &str, dictionaries: &Dictionaries) -> Result<CardConfiguration> {
        JsonFormat::parse(token)
            .map(|card| card.into_card(sender, dictionaries))
            .ok_or(DecodeError::MalformedToken)
    }

    fn try_decode(
        &self,
        token: &str,
        sender: &str,
        dictionaries: &Dictionaries,
    ) -> Option<Result<CardConfiguration>> {
        JsonFormat::parse(token).map(|card| Ok(card.into_card(sender, dictionaries)))
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use super::*;

    /// Written by the first card builder: `btoa(encodeURIComponent(JSON.stringify(card)))`.
    const OBJECT_LINK: &str = "JTdCJTIyZnJvbSUyMiUzQSUyMkFsaSUyMiUyQyUyMnRvJTIyJTNBJTIyWW91JTIyJTJDJTIycmVsYXRpb25zaGlwJTIyJTNBJTIyRnJpZW5kJTIyJTJDJTIyd2lzaCUyMiUzQSUyMlJhbXphbiUyME11YmFyYWslMjB0byUyMHlvdSUyMCUyNiUyMHlvdXJzISUyMiUyQyUyMnRoZW1lSWQlMjIlM0ElMjJyb3lhbC1wdXJwbGUlMjIlMkMlMjJpbmNsdWRlQmxlc3NpbmclMjIlM0F0cnVlJTJDJTIyYWRkU3VycHJpc2UlMjIlM0FmYWxzZSUyQyUyMmJsZXNzaW5nSW5kZXglMjIlM0EzJTdE";

    /// `["v1","Fatima","رمضان كريم","lantern-glow",false,0,"ar"]`, URL-safe and unpadded.
    const TAGGED_ARRAY_LINK: &str = "JTVCJTIydjElMjIlMkMlMjJGYXRpbWElMjIlMkMlMjIlRDglQjElRDklODUlRDglQjYlRDglQTclRDklODYlMjAlRDklODMlRDglQjElRDklOEElRDklODUlMjIlMkMlMjJsYW50ZXJuLWdsb3clMjIlMkNmYWxzZSUyQzAlMkMlMjJhciUyMiU1RA";

    /// `v2|ar|peaceful-garden|1|عيد مبارك | كل عام وأنتم بخير`, as `compressToEncodedURIComponent` wrote it.
    const TAGGED_TEXT_LINK: &str = "G4JgPghgTmAOCmEDG8BmBXANgWgObQBN4A7MARjEE4wQKTBB6MAAJBRMEAowQcjBBGMEGEwesezwETB6lVo3qAJMEDEYIDEwQFRgo5oDowauyA";

    /// `v2|en|crescent-dream||` followed by `Peace, peace and more peace. ` four times.
    const REPETITIVE_TAGGED_TEXT_LINK: &str = "G4JgPgpgdmDGBOEDOtoBcC0ATRBDAtmGAAoS6oA0ABAA5mpW5RZX4D2it9EAdFaeQjU6gxs1YcIXQXwGVpDJi3acRqWd2HcxyyQt5UgA";

    /// `v2|ur|royal-purple||Iftar at 7:15 :)`.
    const NO_BLESSING_TAGGED_TEXT_LINK: &str = "G4JgPgrgTmUPYE8CGAbAtAB2hlBTMYAkgGYAuSUABEqZQOwBcAjAKyUMCUQA";

    #[test]
    fn object_link() {
        let card = decode(OBJECT_LINK, "", Dictionaries::builtin()).unwrap();
        assert_eq!(card, CardConfiguration {
            sender: "Ali".to_owned(),
            recipient: RECIPIENT.to_owned(),
            message: "Ramzan Mubarak to you & yours!".to_owned(),
            theme: Theme::RoyalPurple,
            blessing: Some(3),
            language: Language::En,
        });
    }

    #[test]
    fn padded_link() {
        // `["v1","Yusuf","Eid Mubarak!","crescent-dream",true,4]`, standard alphabet with padding
        let token = "JTVCJTIydjElMjIlMkMlMjJZdXN1ZiUyMiUyQyUyMkVpZCUyME11YmFyYWshJTIyJTJDJTIyY3Jlc2NlbnQtZHJlYW0lMjIlMkN0cnVlJTJDNCU1RA==";
        let card = decode(token, "", Dictionaries::builtin()).unwrap();

        assert_eq!(card.sender, "Yusuf");
        assert_eq!(card.message, "Eid Mubarak!");
        assert_eq!(card.blessing, Some(4));
        assert_eq!(card.language, Language::En);
    }

    #[test]
    fn tagged_array_link() {
        let card = decode(TAGGED_ARRAY_LINK, "ignored", Dictionaries::builtin()).unwrap();

        assert_eq!(card.sender, "Fatima");
        assert_eq!(card.message, "رمضان كريم");
        assert_eq!(card.theme, Theme::LanternGlow);
        assert_eq!(card.blessing, None);
        assert_eq!(card.language, Language::Ar);
    }

    #[test]
    fn tagged_text_link() {
        let card = decode(TAGGED_TEXT_LINK, "Omar", Dictionaries::builtin()).unwrap();

        assert_eq!(card.sender, "Omar");
        assert_eq!(card.message, "عيد مبارك | كل عام وأنتم بخير");
        assert_eq!(card.theme, Theme::PeacefulGarden);
        assert_eq!(card.blessing, Some(1));
        assert_eq!(card.language, Language::Ar);
    }

    #[test]
    fn repetitive_tagged_text_link() {
        let card = decode(REPETITIVE_TAGGED_TEXT_LINK, "", Dictionaries::builtin()).unwrap();

        assert_eq!(card.sender, FALLBACK_SENDER);
        assert_eq!(card.message, "Peace, peace and more peace. ".repeat(4));
        assert_eq!(card.theme, Theme::CrescentDream);
        assert_eq!(card.blessing, None);

        let card = decode(NO_BLESSING_TAGGED_TEXT_LINK, "Hamza", Dictionaries::builtin()).unwrap();
        assert_eq!(card.message, "Iftar at 7:15 :)");
        assert_eq!(card.theme, Theme::RoyalPurple);
        assert_eq!(card.blessing, None);
        assert_eq!(card.language, Language::Ur);
    }

    #[test]
    fn one_step_decoding() {
        let dictionaries = Dictionaries::builtin();
        let test = |format: &dyn Format, token: &str, claimed: bool| {
            let decoded = format.try_decode(token, "Omar", dictionaries);
            assert_eq!(decoded.is_some(), claimed, "{} {token:?}", format.name());
            assert_eq!(format.detect(token), claimed, "{} {token:?}", format.name());
            if let Some(decoded) = decoded {
                assert_eq!(decoded, format.decode(token, "Omar", dictionaries));
            }
        };
        test(&TaggedTextFormat, TAGGED_TEXT_LINK,  true);
        test(&TaggedTextFormat, OBJECT_LINK,       false);
        test(&TaggedTextFormat, "eA05bX",          false);
        test(&JsonFormat,       OBJECT_LINK,       true);
        test(&JsonFormat,       TAGGED_ARRAY_LINK, true);
        test(&JsonFormat,       TAGGED_TEXT_LINK,  false);
    }

    #[test]
    fn tagged_text_encoder() {
        let config = CardConfiguration {
            sender: "Bilal".to_owned(),
            message: "a|b|c".to_owned(),
            theme: Theme::RoyalPurple,
            blessing: Some(9),
            language: Language::Ur,
            ..Default::default()
        };
        let token = encode_tagged_text(&config);
        let card = decode(&token, "Bilal", Dictionaries::builtin()).unwrap();

        // the urdu dictionary only has five blessings
        assert_eq!(card, CardConfiguration { blessing: Some(0), ..config });
    }

    #[test]
    fn formats_do_not_overlap() {
        let custom = format!("~eAZ.{}", compress("v2|en|x||y"));
        let tokens = [
            "eA05bX",
            custom.as_str(),
            TAGGED_TEXT_LINK,
            REPETITIVE_TAGGED_TEXT_LINK,
            NO_BLESSING_TAGGED_TEXT_LINK,
            OBJECT_LINK,
            TAGGED_ARRAY_LINK,
        ];

        for token in tokens {
            let claimed: Vec<_> = FORMATS
                .iter()
                .filter(|format| format.detect(token))
                .map(|format| format.name())
                .collect();
            assert_eq!(claimed.len(), 1, "{token:?} claimed by {claimed:?}");
        }
    }

    #[test]
    fn untagged_payloads_are_rejected() {
        // plain compressed text without the version tag
        assert!(!TaggedTextFormat.detect(&compress("en|crescent-dream||hello")));

        // an array with an unknown version tag, and an object that is not a card
        let encode = |json: &str| STANDARD_NO_PAD.encode(urlencoding::encode(json).as_bytes());
        assert!(!JsonFormat.detect(&encode(r#"["v9","Ali","hi","royal-purple",false,0]"#)));
        assert!(!JsonFormat.detect(&encode(r#"{"name":"Ali"}"#)));
        assert!(JsonFormat.detect(&encode(r#"{"wish":"hi","themeId":"nope"}"#)));
    }

    #[test]
    fn legacy_fields_degrade() {
        let encode = |json: &str| STANDARD_NO_PAD.encode(urlencoding::encode(json).as_bytes());
        let token = encode(r#"{"from":"  ","wish":"hi","themeId":"nope","includeBlessing":true,"blessingIndex":40,"lang":"fr"}"#);
        let card = decode(&token, "Side_Channel", Dictionaries::builtin()).unwrap();

        assert_eq!(card.sender, "Side Channel");
        assert_eq!(card.theme, Theme::CrescentDream);
        assert_eq!(card.blessing, Some(0));
        assert_eq!(card.language, Language::En);
    }
}
