// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphSet {
    Matrix,
    Ascii,
    Binary,
    Code,
}

pub fn glyph_set_from_str(spec: &str) -> Result<GlyphSet, String> {
    match spec.trim().to_ascii_lowercase().as_str() {
        "matrix" | "katakana" => Ok(GlyphSet::Matrix),
        "ascii" => Ok(GlyphSet::Ascii),
        "binary" | "bin" | "01" => Ok(GlyphSet::Binary),
        "code" => Ok(GlyphSet::Code),
        _ => Err(format!("unsupported glyph set: {} (see --list-glyphs)", spec)),
    }
}

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    for v in start..=end {
        if let Some(ch) = char::from_u32(v) {
            out.push(ch);
        }
    }
}

pub fn build_glyphs(set: GlyphSet) -> Vec<char> {
    let mut out: Vec<char> = Vec::new();
    match set {
        GlyphSet::Matrix => {
            // Half-width katakana plus digits, the classic look.
            push_range(&mut out, 0xFF66, 0xFF9D);
            push_range(&mut out, 0x30, 0x39);
        }
        GlyphSet::Ascii => {
            push_range(&mut out, 0x21, 0x7E);
        }
        GlyphSet::Binary => {
            push_range(&mut out, 0x30, 0x31);
        }
        GlyphSet::Code => {
            push_range(&mut out, 0x30, 0x39);
            push_range(&mut out, 0x41, 0x5A);
            push_range(&mut out, 0x61, 0x7A);
            out.extend("{}()[]<>;:=+-*/&|!?_".chars());
        }
    }
    if out.is_empty() {
        out.push('0');
        out.push('1');
    }
    out
}

/// Short code-like tokens a rain column can stream out instead of single
/// glyphs. Kept ASCII so they render on any terminal.
pub const SNIPPETS: &[&str] = &[
    "fn main()",
    "let mut x",
    "-> Result",
    "&mut self",
    "match v {",
    "impl Iter",
    ".await?",
    "Vec<u8>",
    "Box<dyn>",
    "if let Some",
    "0x7FFF",
    "use std::",
    "#[derive]",
    "loop {}",
];

/// Rare substitution tokens. Cosmetic only; drawn exactly like a snippet.
pub const EASTER_EGGS: &[&str] = &["WAKE UP", "FOLLOW THE WHITE RABBIT", "KNOCK KNOCK"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_set_parses_aliases() {
        assert_eq!(glyph_set_from_str("01").unwrap(), GlyphSet::Binary);
        assert_eq!(glyph_set_from_str(" Matrix ").unwrap(), GlyphSet::Matrix);
        assert!(glyph_set_from_str("nope").is_err());
    }

    #[test]
    fn binary_set_has_only_0_and_1() {
        assert_eq!(build_glyphs(GlyphSet::Binary), vec!['0', '1']);
    }

    #[test]
    fn snippets_are_nonempty_and_ascii() {
        for s in SNIPPETS.iter().chain(EASTER_EGGS) {
            assert!(!s.is_empty());
            assert!(s.is_ascii());
        }
    }
}
