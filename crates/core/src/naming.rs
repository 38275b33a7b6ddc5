//! Output-name normalization.
//!
//! Input fonts arrive as `Family-Style.ttf`; both transformation stages want a
//! bare family name so the patched outputs do not stack style tokens. Tokens
//! are stripped only when anchored at the end of the stem, longest first, so a
//! family name like `SemiBoldMono` survives intact.

/// Style tokens, longest first. Compound styles must precede their components
/// so `-BoldItalic` wins over `-Italic`.
const STYLE_TOKENS: &[&str] = &[
    "ExtraLightItalic",
    "ExtraBoldItalic",
    "SemiBoldItalic",
    "RegularItalic",
    "MediumItalic",
    "BlackItalic",
    "LightItalic",
    "ExtraLight",
    "BoldItalic",
    "ThinItalic",
    "ExtraBold",
    "SemiBold",
    "Regular",
    "Italic",
    "Medium",
    "Light",
    "Black",
    "Bold",
    "Thin",
];

/// Delimiters that may precede a style token. Checked before the bare token so
/// the delimiter is stripped along with it.
const DELIMITERS: [char; 3] = ['-', '_', '.'];

/// Legacy condensed filenames that encode the style as a single trailing
/// letter instead of a suffix token.
const LEGACY_CONDENSED: &[&str] = &["consola.ttf", "consolab.ttf", "consolai.ttf", "consolaz.ttf"];

/// Derive the output base name for a font file.
///
/// Deterministic: identical input always yields identical output. Never
/// returns an empty string; if stripping would consume the whole stem, the
/// unstripped stem is returned instead.
pub fn normalize(filename: &str) -> String {
    let stem = file_stem(filename);

    if LEGACY_CONDENSED
        .iter()
        .any(|legacy| filename.eq_ignore_ascii_case(legacy))
    {
        return strip_legacy_style(stem).to_string();
    }

    let mut name = stem;
    while let Some(stripped) = strip_style_suffix(name) {
        name = stripped;
    }

    if name.is_empty() { stem } else { name }.to_string()
}

fn file_stem(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(0) | None => filename,
        Some(idx) => &filename[..idx],
    }
}

/// Legacy stems end in `b`/`i`/`z` for bold/italic/bold-italic.
fn strip_legacy_style(stem: &str) -> &str {
    stem.strip_suffix(['b', 'i', 'z', 'B', 'I', 'Z'])
        .unwrap_or(stem)
}

/// Remove one style suffix from the end of `stem`, or `None` if none matches.
fn strip_style_suffix(stem: &str) -> Option<&str> {
    for token in STYLE_TOKENS {
        for delim in DELIMITERS {
            let mut suffix = String::with_capacity(token.len() + 1);
            suffix.push(delim);
            suffix.push_str(token);
            if let Some(rest) = strip_suffix_ci(stem, &suffix) {
                return Some(rest);
            }
        }
        if let Some(rest) = strip_suffix_ci(stem, token) {
            return Some(rest);
        }
    }
    None
}

/// ASCII case-insensitive `strip_suffix`.
fn strip_suffix_ci<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let idx = s.len().checked_sub(suffix.len())?;
    let tail = s.get(idx..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &s[..idx])
}
