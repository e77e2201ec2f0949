//! Canonical form of free text, used to recognise a hand-edited message as one of the canned ones.

/// Collapses text to its canonical comparable form.
///
/// The text is lowercased, then everything that is not an ascii letter or digit, or a letter of the Arabic
/// or Devanagari blocks, is removed. The result is only ever compared; it is never displayed.
///
/// ```
/// use noorcard::normalize;
///
/// assert_eq!(normalize("  May this Ramzan... bring PEACE! 🌙"), "maythisramzanbringpeace");
/// assert_eq!(normalize("رمضان مبارک"), "رمضانمبارک");
/// ```
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|&char| kept(char))
        .collect()
}

/// Whether two texts are the same preset.
pub fn same_preset(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Finds the first entry normalize-equal to the text.
pub fn find_preset<S: AsRef<str>>(text: &str, entries: &[S]) -> Option<usize> {
    let needle = normalize(text);
    entries
        .iter()
        .position(|entry| normalize(entry.as_ref()) == needle)
}

fn kept(char: char) -> bool {
    matches!(char, 'a'..='z' | '0'..='9' | '\u{0600}'..='\u{06FF}' | '\u{0900}'..='\u{097F}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_formatting() {
        let test = |input, expected| assert_eq!(normalize(input), expected);
        test("",                      "");
        test("Hello, World!",         "helloworld");
        test("43,200 minutes of joy", "43200minutesofjoy");
        test("~.|_-#%",               "");
        test("ÉCOLE",                 "cole");

        for text in ["अल्लाह आपको शब-ए-क़द्र", "اللہ آپ کو شب قدر", "عسى أن يقربك"] {
            assert_eq!(normalize(text), text.replace([' ', '-'], ""));
        }
    }

    #[test]
    fn matching() {
        assert!(same_preset("May this Ramzan heal you.", "may this ramzan heal you"));
        assert!(!same_preset("May this Ramzan heal you", "May this Ramadan heal you"));

        let entries = ["First wish.", "Second wish!", "Third wish"];
        assert_eq!(find_preset("second WISH", &entries), Some(1));
        assert_eq!(find_preset("  third   wish ... ", &entries), Some(2));
        assert_eq!(find_preset("fourth wish", &entries), None);
        assert_eq!(find_preset("", &entries), None);
    }
}
