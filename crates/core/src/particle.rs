//! Korean particle selection.
//!
//! Several particles change shape depending on whether the preceding
//! syllable ends in a vowel (`영희는`) or a consonant (`책은`). Hangul
//! syllables are laid out so the final consonant slot is
//! `(codepoint - 0xAC00) % 28`, with 0 meaning no final.

const HANGUL_FIRST: u32 = 0xAC00;
const HANGUL_LAST: u32 = 0xD7A3;

/// Particle pairs as `(after vowel, after consonant)`.
pub const PAIRS: [(&str, &str); 4] = [("가", "이"), ("를", "을"), ("는", "은"), ("야", "아")];

/// Whether `word` ends in a Hangul syllable with an empty final slot.
///
/// `None` when the last character is not a Hangul syllable.
pub fn ends_with_vowel(word: &str) -> Option<bool> {
    let last = word.chars().last()? as u32;
    if !(HANGUL_FIRST..=HANGUL_LAST).contains(&last) {
        return None;
    }
    Some((last - HANGUL_FIRST) % 28 == 0)
}

/// Choose the form of `particle` that fits after `word`.
///
/// `particle` may be either member of a pair. When the last character of
/// `word` is not a Hangul syllable the combined form is returned, consonant
/// form first, e.g. `은(는)`. Particles outside the table are returned as-is.
pub fn particle_for(word: &str, particle: &str) -> String {
    let Some(&(vowel, consonant)) = PAIRS.iter().find(|(v, c)| *v == particle || *c == particle) else {
        return particle.to_string();
    };

    match ends_with_vowel(word) {
        Some(true) => vowel.to_string(),
        Some(false) => consonant.to_string(),
        None => format!("{consonant}({vowel})"),
    }
}
