//! Filipino syllabification heuristic and letter-bank scrambling.
//!
//! Example:
//!   input:  "bahay"
//!   output: ["ba", "hay"]
//!
//! The splitter is a best-effort heuristic (CV clustering with "ng" as a
//! single consonant unit), not an authoritative linguistic algorithm. The
//! only hard guarantee is that the returned parts are non-empty and
//! concatenate back to the hyphen-stripped input.

use rand::seq::SliceRandom;
use rand::Rng;

/// True if `w` is acceptable as a syllable-question target word:
/// letters and hyphens only, with at least one letter. Digits,
/// punctuation, and whitespace are rejected at input.
pub fn is_valid_target_word(w: &str) -> bool {
    !w.is_empty()
        && w.chars().all(|c| c.is_alphabetic() || c == '-')
        && w.chars().any(|c| c.is_alphabetic())
}

/// Split a word into syllable parts. Hyphens are hard boundaries and are
/// consumed; each hyphen-free segment is split by [`syllabify_segment`].
pub fn auto_syllabify(word: &str) -> Vec<String> {
    word.split('-')
        .filter(|seg| !seg.is_empty())
        .flat_map(syllabify_segment)
        .collect()
}

fn is_vowel(unit: &str) -> bool {
    matches!(
        unit.to_lowercase().as_str(),
        "a" | "e" | "i" | "o" | "u"
    )
}

/// Break a segment into orthographic units: "ng" counts as one consonant
/// (Tagalog digraph), everything else is a single char.
fn units_of(segment: &str) -> Vec<String> {
    let chars: Vec<char> = segment.chars().collect();
    let mut units = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if i + 1 < chars.len()
            && chars[i].eq_ignore_ascii_case(&'n')
            && chars[i + 1].eq_ignore_ascii_case(&'g')
        {
            units.push(chars[i..=i + 1].iter().collect());
            i += 2;
        } else {
            units.push(chars[i].to_string());
            i += 1;
        }
    }
    units
}

/// CV clustering for one hyphen-free segment:
/// - a single consonant between vowels opens the next syllable (V-CV),
/// - two or more consonants split after the first (VC-CV),
/// - leading/trailing consonants attach to the nearest vowel,
/// - a vowel-less segment is returned whole.
fn syllabify_segment(segment: &str) -> Vec<String> {
    let units = units_of(segment);
    let vowels: Vec<usize> = units
        .iter()
        .enumerate()
        .filter(|(_, u)| is_vowel(u))
        .map(|(i, _)| i)
        .collect();

    if vowels.is_empty() {
        return vec![segment.to_string()];
    }

    // Split points between consecutive vowels, expressed as unit indices.
    let mut cuts = Vec::with_capacity(vowels.len());
    for pair in vowels.windows(2) {
        let (v1, v2) = (pair[0], pair[1]);
        let run = v2 - v1 - 1;
        if run <= 1 {
            // V-V or V-CV: everything after the first vowel moves right.
            cuts.push(v1 + 1);
        } else {
            // VC...CV: first consonant closes the left syllable.
            cuts.push(v1 + 2);
        }
    }

    let mut parts = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        parts.push(units[start..cut].concat());
        start = cut;
    }
    parts.push(units[start..].concat());
    parts
}

/// True if `parts` joined together rebuild `target` (hyphens stripped,
/// case-insensitive). Authoring never enforces this automatically; the
/// preview uses it to flag mismatches.
pub fn parts_rebuild_target(parts: &[String], target: &str) -> bool {
    let joined: String = parts.concat().to_lowercase();
    let stripped: String = target
        .chars()
        .filter(|c| *c != '-')
        .collect::<String>()
        .to_lowercase();
    !stripped.is_empty() && joined == stripped
}

/// Scramble an identification answer into uppercase letter tiles.
/// The result is always a permutation of the uppercased answer's
/// characters (whitespace dropped); the order depends on `rng`.
pub fn scramble_letters<R: Rng + ?Sized>(answer: &str, rng: &mut R) -> Vec<char> {
    let mut tiles: Vec<char> = answer
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_uppercase())
        .collect();
    tiles.shuffle(rng);
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sorted(mut v: Vec<char>) -> Vec<char> {
        v.sort_unstable();
        v
    }

    #[test]
    fn bahay_splits_into_ba_hay() {
        assert_eq!(auto_syllabify("bahay"), vec!["ba", "hay"]);
    }

    #[test]
    fn parts_always_rebuild_the_input() {
        for word in ["bahay", "aso", "paaralan", "bangka", "tanga", "kalabaw"] {
            let parts = auto_syllabify(word);
            assert!(!parts.is_empty(), "{word}: no parts");
            assert!(parts.iter().all(|p| !p.is_empty()), "{word}: empty part");
            assert_eq!(parts.concat(), word, "{word}: lossy split");
        }
    }

    #[test]
    fn ng_digraph_stays_in_one_syllable() {
        // single consonant between vowels opens the next syllable
        assert_eq!(auto_syllabify("tanga"), vec!["ta", "nga"]);
        // ng + k: the digraph closes the left syllable
        assert_eq!(auto_syllabify("bangka"), vec!["bang", "ka"]);
    }

    #[test]
    fn adjacent_vowels_split_apart() {
        assert_eq!(auto_syllabify("paaralan"), vec!["pa", "a", "ra", "lan"]);
    }

    #[test]
    fn hyphens_are_hard_boundaries() {
        assert_eq!(auto_syllabify("anak-araw"), vec!["a", "nak", "a", "raw"]);
    }

    #[test]
    fn vowel_less_input_comes_back_whole() {
        assert_eq!(auto_syllabify("ng"), vec!["ng"]);
    }

    #[test]
    fn target_word_charset_is_enforced() {
        assert!(is_valid_target_word("bahay"));
        assert!(is_valid_target_word("anak-araw"));
        assert!(!is_valid_target_word(""));
        assert!(!is_valid_target_word("-"));
        assert!(!is_valid_target_word("bahay1"));
        assert!(!is_valid_target_word("ba hay"));
        assert!(!is_valid_target_word("bahay!"));
    }

    #[test]
    fn preview_check_detects_mismatch() {
        let ok = vec!["ba".to_string(), "hay".to_string()];
        let bad = vec!["ba".to_string(), "hoy".to_string()];
        assert!(parts_rebuild_target(&ok, "bahay"));
        assert!(parts_rebuild_target(&ok, "ba-hay"));
        assert!(!parts_rebuild_target(&bad, "bahay"));
        assert!(!parts_rebuild_target(&[], "bahay"));
    }

    #[test]
    fn letter_bank_is_a_permutation_of_the_uppercased_answer() {
        let mut rng = StdRng::seed_from_u64(7);
        for answer in ["bahay", "Kalabaw", "aso"] {
            let tiles = scramble_letters(answer, &mut rng);
            let expected: Vec<char> = answer.to_uppercase().chars().collect();
            assert_eq!(sorted(tiles), sorted(expected), "answer={answer}");
        }
    }

    #[test]
    fn letter_bank_is_deterministic_under_a_fixed_seed() {
        let a = scramble_letters("kalabaw", &mut StdRng::seed_from_u64(42));
        let b = scramble_letters("kalabaw", &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
