//! Derivation of the visible rows: filter first, then sort.
//!
//! Everything here is pure. Inputs are borrowed and never reordered; the
//! returned vectors are fresh copies.

use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::models::{Category, Item, SortOption, ViewQuery};

/// Keep items whose name contains `search_term` (case-insensitive) and whose
/// category equals `category` exactly when one is selected.
///
/// Input order is preserved.
pub fn filter_items(items: &[Item], search_term: &str, category: Option<Category>) -> Vec<Item> {
    let term = search_term.to_lowercase();
    items
        .iter()
        .filter(|item| item.matches_search(&term) && item.matches_category(category))
        .cloned()
        .collect()
}

/// Order items by `option` with a stable sort; `Unordered` keeps input order.
pub fn sort_items(items: &[Item], option: SortOption) -> Vec<Item> {
    let mut sorted = items.to_vec();
    match option {
        SortOption::AToZ => sorted.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortOption::ZToA => sorted.sort_by(|a, b| compare_names(&b.name, &a.name)),
        SortOption::LowestPrice => sorted.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOption::HighestPrice => sorted.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortOption::Unordered => {}
    }
    sorted
}

/// Apply a full query: filter, then sort.
pub fn derive_view(items: &[Item], query: &ViewQuery) -> Vec<Item> {
    let filtered = filter_items(items, &query.search_term, query.category);
    sort_items(&filtered, query.sort)
}

/// Collation for product names, root-locale style.
///
/// Three levels, each consulted only on a tie of the previous one:
/// 1. base letters with diacritics and case folded away (`é` sorts with `e`)
/// 2. unaccented before accented ("resume" < "résumé")
/// 3. lowercase before uppercase ("ring" < "Ring" < "rings")
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let primary = base_letters(a)
        .flat_map(char::to_lowercase)
        .cmp(base_letters(b).flat_map(char::to_lowercase));

    primary
        .then_with(|| {
            a.nfd()
                .flat_map(char::to_lowercase)
                .cmp(b.nfd().flat_map(char::to_lowercase))
        })
        .then_with(|| {
            base_letters(a)
                .zip(base_letters(b))
                .find(|(x, y)| x != y)
                .map(|(x, y)| case_rank(x).cmp(&case_rank(y)))
                .unwrap_or(Ordering::Equal)
        })
}

/// Canonically decomposed text with combining marks removed
fn base_letters(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfd().filter(|c| !is_combining_mark(*c))
}

fn case_rank(c: char) -> u8 {
    if c.is_uppercase() { 1 } else { 0 }
}
