//! Filename generation from video titles.

use crate::error::{Error, Result};

/// Turns a video title into a safe file base name.
pub trait FileNameSanitizer: Send + Sync {
    fn sanitize(&self, title: &str) -> String;
}

impl<F> FileNameSanitizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn sanitize(&self, title: &str) -> String {
        self(title)
    }
}

/// Base name used when a title slugifies to nothing.
const FALLBACK_NAME: &str = "video";

static GERMAN: &[(char, &str)] = &[
    ('ä', "ae"),
    ('ö', "oe"),
    ('ü', "ue"),
    ('Ä', "Ae"),
    ('Ö', "Oe"),
    ('Ü', "Ue"),
    ('ß', "ss"),
];

static RUSSIAN: &[(char, &str)] = &[
    ('а', "a"),
    ('б', "b"),
    ('в', "v"),
    ('г', "g"),
    ('д', "d"),
    ('е', "e"),
    ('ё', "yo"),
    ('ж', "zh"),
    ('з', "z"),
    ('и', "i"),
    ('й', "y"),
    ('к', "k"),
    ('л', "l"),
    ('м', "m"),
    ('н', "n"),
    ('о', "o"),
    ('п', "p"),
    ('р', "r"),
    ('с', "s"),
    ('т', "t"),
    ('у', "u"),
    ('ф', "f"),
    ('х', "h"),
    ('ц', "c"),
    ('ч', "ch"),
    ('ш', "sh"),
    ('щ', "sch"),
    ('ъ', ""),
    ('ы', "y"),
    ('ь', ""),
    ('э', "e"),
    ('ю', "yu"),
    ('я', "ya"),
];

static UKRAINIAN: &[(char, &str)] = &[
    ('г', "h"),
    ('ґ', "g"),
    ('є', "ye"),
    ('и', "y"),
    ('і', "i"),
    ('ї', "yi"),
    ('й', "y"),
    ('х', "kh"),
    ('щ', "shch"),
];

/// Latin characters with diacritics shared by every table.
static LATIN: &[(char, &str)] = &[
    ('à', "a"),
    ('á', "a"),
    ('â', "a"),
    ('ã', "a"),
    ('ä', "a"),
    ('å', "a"),
    ('æ', "ae"),
    ('ç', "c"),
    ('è', "e"),
    ('é', "e"),
    ('ê', "e"),
    ('ë', "e"),
    ('ì', "i"),
    ('í', "i"),
    ('î', "i"),
    ('ï', "i"),
    ('ñ', "n"),
    ('ò', "o"),
    ('ó', "o"),
    ('ô', "o"),
    ('õ', "o"),
    ('ö', "o"),
    ('ø', "o"),
    ('ù', "u"),
    ('ú', "u"),
    ('û', "u"),
    ('ü', "u"),
    ('ý', "y"),
    ('ÿ', "y"),
    ('ß', "ss"),
    ('&', "and"),
];

/// Built-in sanitizer: transliterate with a language table, then slugify.
#[derive(Debug, Clone)]
pub struct Transliterator {
    tables: Vec<&'static [(char, &'static str)]>,
}

impl Transliterator {
    /// Build the sanitizer for a language. Unknown languages use only the
    /// shared Latin table.
    pub fn for_language(language: &str) -> Self {
        let mut tables: Vec<&'static [(char, &'static str)]> = match language {
            "de" => vec![GERMAN],
            "ru" => vec![RUSSIAN],
            // Ukrainian overrides a handful of Russian letters.
            "uk" => vec![UKRAINIAN, RUSSIAN],
            _ => Vec::new(),
        };
        tables.push(LATIN);
        Self { tables }
    }

    fn transliterate(&self, c: char) -> Option<&'static str> {
        let lower = c.to_lowercase().next().unwrap_or(c);
        self.tables.iter().find_map(|table| {
            table
                .iter()
                .find(|(from, _)| *from == c || *from == lower)
                .map(|(_, to)| *to)
        })
    }
}

impl Default for Transliterator {
    fn default() -> Self {
        Self::for_language("en")
    }
}

impl FileNameSanitizer for Transliterator {
    fn sanitize(&self, title: &str) -> String {
        let mut slug = String::with_capacity(title.len());
        let mut pending_dash = false;

        let mut push = |piece: &str, slug: &mut String| {
            for c in piece.chars() {
                if c.is_ascii_alphanumeric() {
                    if pending_dash && !slug.is_empty() {
                        slug.push('-');
                    }
                    pending_dash = false;
                    slug.push(c.to_ascii_lowercase());
                } else {
                    pending_dash = true;
                }
            }
        };

        for c in title.chars() {
            if let Some(replacement) = self.transliterate(c) {
                push(replacement, &mut slug);
            } else if c.is_ascii() {
                push(c.encode_utf8(&mut [0; 4]), &mut slug);
            } else {
                push("-", &mut slug);
            }
        }

        if slug.is_empty() {
            FALLBACK_NAME.to_string()
        } else {
            slug
        }
    }
}

/// Reject names that could escape the output directory.
pub fn validate_file_name(name: &str) -> Result<&str> {
    if name.contains("..") || name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(Error::Download(format!(
            "Unsafe target file name: '{}'",
            name
        )));
    }

    if name.trim().is_empty() {
        return Err(Error::Download(
            "Target file name cannot be empty".to_string(),
        ));
    }

    Ok(name)
}

/// Replace the extension of a file name.
pub fn with_extension(file_name: &str, extension: &str) -> String {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}.{}", &file_name[..dot], extension),
        _ => format!("{}.{}", file_name, extension),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_ascii() {
        let t = Transliterator::default();
        assert_eq!(t.sanitize("Hello, World!"), "hello-world");
        assert_eq!(t.sanitize("  Rick Astley - Never Gonna  "), "rick-astley-never-gonna");
        assert_eq!(t.sanitize("a/b\\c:d"), "a-b-c-d");
    }

    #[test]
    fn test_transliterate_by_language() {
        assert_eq!(Transliterator::for_language("de").sanitize("Grüße"), "gruesse");
        assert_eq!(Transliterator::for_language("en").sanitize("Grüße"), "grusse");
        assert_eq!(Transliterator::for_language("ru").sanitize("Привет мир"), "privet-mir");
        assert_eq!(Transliterator::for_language("uk").sanitize("Львів"), "lviv");
        assert_eq!(Transliterator::for_language("en").sanitize("Café & Crème"), "cafe-and-creme");
    }

    #[test]
    fn test_empty_slug_falls_back() {
        assert_eq!(Transliterator::default().sanitize("!!!"), "video");
        assert_eq!(Transliterator::default().sanitize("日本語"), "video");
    }

    #[test]
    fn test_closure_sanitizer() {
        let upper = |title: &str| title.to_uppercase();
        assert_eq!(upper.sanitize("abc"), "ABC");
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("clip.mp4").is_ok());
        assert!(validate_file_name("../clip.mp4").is_err());
        assert!(validate_file_name("a/b.mp4").is_err());
        assert!(validate_file_name("  ").is_err());
    }

    #[test]
    fn test_with_extension() {
        assert_eq!(with_extension("clip.mp4", "srt"), "clip.srt");
        assert_eq!(with_extension("clip", "srt"), "clip.srt");
    }
}
