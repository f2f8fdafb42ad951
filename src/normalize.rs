//! Text folding for case- and diacritic-insensitive matching
//!
//! Bet-code input is typed on phones, often without Vietnamese tone marks,
//! so every lookup key is compared in folded form:
//! - Unicode canonical decomposition (NFD)
//! - Combining marks dropped
//! - `đ`/`Đ` mapped to `d`
//! - Lowercase
//!
//! `FoldedText` keeps a byte-offset map back into the original text so a
//! match found in the folded form can slice the original line.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a lookup key: folded characters with whitespace collapsed.
///
/// ```
/// use betcode::normalize::fold_key;
///
/// assert_eq!(fold_key("Miền  Bắc"), "mien bac");
/// assert_eq!(fold_key("ĐÀ NẴNG"), "da nang");
/// ```
pub fn fold_key(s: &str) -> String {
    FoldedText::new(s)
        .as_str()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Folded text plus the original byte offset of every folded byte.
#[derive(Debug, Clone)]
pub struct FoldedText {
    folded: String,
    origin: Vec<usize>,
}

impl FoldedText {
    pub fn new(original: &str) -> Self {
        let mut folded = String::with_capacity(original.len());
        let mut origin = Vec::with_capacity(original.len() + 1);

        for (offset, ch) in original.char_indices() {
            for decomposed in std::iter::once(ch).nfd() {
                if is_combining_mark(decomposed) {
                    continue;
                }
                let base = match decomposed {
                    'đ' | 'Đ' => 'd',
                    other => other,
                };
                for lower in base.to_lowercase() {
                    let before = folded.len();
                    folded.push(lower);
                    origin.extend(std::iter::repeat(offset).take(folded.len() - before));
                }
            }
        }
        origin.push(original.len());

        Self { folded, origin }
    }

    pub fn as_str(&self) -> &str {
        &self.folded
    }

    /// Byte offset in the original text for a byte offset in the folded text
    pub fn original_offset(&self, folded_offset: usize) -> usize {
        self.origin
            .get(folded_offset)
            .copied()
            .unwrap_or_else(|| self.origin.last().copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_key_strips_tone_marks() {
        assert_eq!(fold_key("Miền Bắc"), "mien bac");
        assert_eq!(fold_key("MIEN BAC"), "mien bac");
        assert_eq!(fold_key("  tp.  HCM "), "tp. hcm");
        assert_eq!(fold_key("kéo"), "keo");
    }

    #[test]
    fn test_decomposed_and_precomposed_fold_equal() {
        let precomposed = "Bắc";
        let decomposed: String = precomposed.nfd().collect();
        assert_ne!(precomposed, decomposed);
        assert_eq!(fold_key(precomposed), fold_key(&decomposed));
    }

    #[test]
    fn test_original_offsets_map_back() {
        let original = "Đầu 12dd5";
        let folded = FoldedText::new(original);
        assert_eq!(folded.as_str(), "dau 12dd5");

        let pos = folded.as_str().find("dd").unwrap();
        let orig = folded.original_offset(pos);
        assert_eq!(&original[..orig], "Đầu 12");
        assert_eq!(folded.original_offset(folded.as_str().len()), original.len());
    }
}
