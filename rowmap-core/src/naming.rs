//! Table naming
//!
//! A record without an explicit table maps to the plural of its type name:
//! `Singer` becomes `Singers`, `Category` becomes `Categories`. Only the last
//! PascalCase word is inflected, so `ShippingAddress` becomes
//! `ShippingAddresses`. Inflection rules, irregular and uncountable words
//! come from the `pluralizer` crate.

use crate::field::Record;

/// Plural form of a PascalCase type name
pub fn pluralize(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    let split = last_word_start(name);
    let (head, word) = name.split_at(split);
    format!("{head}{}", pluralize_word(word))
}

/// Table name for `T`: explicit override, then the declared table, then the
/// plural of the type name.
pub fn table_name<T: Record>(override_name: Option<&str>) -> String {
    match override_name.or(T::TABLE_NAME) {
        Some(name) => name.to_string(),
        None => pluralize(T::TYPE_NAME),
    }
}

// A word starts at a capital that follows a lowercase letter, or at the last
// capital of an acronym (`HTTPRequest` splits before `Request`).
fn last_word_start(name: &str) -> usize {
    let chars: Vec<(usize, char)> = name.char_indices().collect();
    (1..chars.len())
        .rev()
        .find(|&n| {
            let (_, c) = chars[n];
            let prev_upper = chars[n - 1].1.is_uppercase();
            let next_lower = chars.get(n + 1).is_some_and(|(_, next)| next.is_lowercase());
            c.is_uppercase() && (!prev_upper || next_lower)
        })
        .map(|n| chars[n].0)
        .unwrap_or(0)
}

fn pluralize_word(word: &str) -> String {
    let lower = word.to_lowercase();
    let plural = pluralizer::pluralize(&lower, 2, false);
    match plural.strip_prefix(lower.as_str()) {
        Some(suffix) => format!("{word}{suffix}"),
        None => match_case(word, &plural),
    }
}

/// Re-apply the leading capital of `original` to `replacement`
fn match_case(original: &str, replacement: &str) -> String {
    let mut chars = replacement.chars();
    match (original.chars().next(), chars.next()) {
        (Some(first), Some(head)) if first.is_uppercase() => {
            head.to_uppercase().chain(chars).collect()
        }
        _ => replacement.to_string(),
    }
}
