//! Slug Normalizer: free text to a URL-safe, lowercase, hyphen-delimited token.

/// Accented characters and their closest ASCII base letter.
const TRANSLITERATIONS: &[(char, char)] = &[
    ('á', 'a'), ('à', 'a'), ('æ', 'a'), ('ä', 'a'), ('â', 'a'), ('ã', 'a'), ('å', 'a'), ('ă', 'a'), ('ą', 'a'),
    ('ç', 'c'), ('ć', 'c'), ('č', 'c'),
    ('đ', 'd'), ('ď', 'd'),
    ('è', 'e'), ('é', 'e'), ('ě', 'e'), ('ë', 'e'), ('ê', 'e'), ('ę', 'e'),
    ('ǵ', 'g'), ('ḧ', 'h'),
    ('î', 'i'), ('ï', 'i'), ('í', 'i'), ('ī', 'i'), ('į', 'i'), ('ì', 'i'),
    ('ł', 'l'), ('ḿ', 'm'), ('ǹ', 'n'), ('ń', 'n'), ('ñ', 'n'),
    ('ô', 'o'), ('ö', 'o'), ('ò', 'o'), ('ó', 'o'), ('ø', 'o'), ('ō', 'o'), ('õ', 'o'), ('ő', 'o'), ('œ', 'o'),
    ('ṕ', 'p'), ('ŕ', 'r'), ('ř', 'r'),
    ('ß', 's'), ('ſ', 's'), ('ś', 's'), ('š', 's'), ('ș', 's'),
    ('ť', 't'), ('ț', 't'),
    ('û', 'u'), ('ü', 'u'), ('ù', 'u'), ('ú', 'u'), ('ū', 'u'), ('ǘ', 'u'), ('ů', 'u'), ('ű', 'u'), ('ų', 'u'),
    ('ẃ', 'w'), ('ẍ', 'x'), ('ÿ', 'y'), ('ý', 'y'),
    ('ž', 'z'), ('ź', 'z'), ('ż', 'z'),
];

/// Converts text into a URL slug. Total: worst case returns an empty string,
/// which callers must treat as "no slug", never as a valid one.
///
/// Steps: lowercase, whitespace runs to `-`, drop non-word characters, collapse
/// and trim hyphens, then transliterate accented letters. Letters outside the
/// transliteration table and `_` cannot survive as ASCII, so a last sweep drops
/// them and re-collapses hyphens. That keeps the output inside `[a-z0-9-]` and
/// makes `slugify(slugify(x)) == slugify(x)`.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();

    let mut cleaned = String::with_capacity(lowered.len());
    let mut in_whitespace = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                cleaned.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_alphanumeric() || c == '_' || c == '-' {
            cleaned.push(c);
        }
    }

    let transliterated: String = collapse_hyphens(&cleaned)
        .chars()
        .map(transliterate)
        .collect();

    let ascii: String = transliterated
        .chars()
        .map(|c| if c == '_' { '-' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();

    collapse_hyphens(&ascii)
}

fn transliterate(c: char) -> char {
    TRANSLITERATIONS
        .iter()
        .find(|(from, _)| *from == c)
        .map_or(c, |(_, to)| *to)
}

/// Collapses `-` runs to one and trims them from both ends.
fn collapse_hyphens(s: &str) -> String {
    s.split('-')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// True when `slug` is non-empty and only contains `[a-z0-9-]`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
