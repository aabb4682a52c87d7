//! Text helpers for identifiers and spelling suggestions.

/// Check if a character is considered part of a word (identifier).
///
/// Uses Unicode Standard Annex #31 rules for identifier characters.
#[inline]
pub fn is_word_character(c: char) -> bool {
    unicode_ident::is_xid_continue(c) || c == '$'
}

/// Whether `needle` occurs in `haystack` at `at` as a whole word.
pub fn is_whole_word_at(haystack: &str, at: usize, needle: &str) -> bool {
    let before = haystack[..at].chars().next_back();
    let after = haystack[at + needle.len()..].chars().next();
    !before.is_some_and(is_word_character) && !after.is_some_and(is_word_character)
}

/// Edit distance between two names, counted in characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let b_len = b_chars.len();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0usize; b_len + 1];
    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_len]
}

/// Closest candidate within two edits, ties broken by candidate order.
///
/// Names of one or two characters only match case-insensitively, since any
/// short name is within two edits of any other.
pub fn find_closest<'c, S: AsRef<str>>(name: &str, candidates: &'c [S]) -> Option<&'c str> {
    let short = name.chars().count() <= 2;
    candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|candidate| *candidate != name)
        .filter_map(|candidate| {
            let distance = if short {
                if candidate.eq_ignore_ascii_case(name) { 0 } else { usize::MAX }
            } else {
                levenshtein(name, candidate)
            };
            (distance <= 2).then_some((distance, candidate))
        })
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}
