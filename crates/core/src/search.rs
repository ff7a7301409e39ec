//! Client-side text search over already-loaded collections.
//!
//! Matching is a case-insensitive substring test against each record's
//! relevant fields. It never touches the network.

/// A record that can be matched by the list-view search box.
pub trait Searchable {
    /// The fields a search term is matched against.
    fn search_fields(&self) -> Vec<&str>;
}

/// Normalise a raw search box value. Returns `None` for a blank term,
/// which means "no filter".
pub fn normalize_term(term: &str) -> Option<String> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Whether `item` matches an already-normalised term.
pub fn matches<T: Searchable>(item: &T, normalized: &str) -> bool {
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(normalized))
}

/// Filter `items` by `term`, preserving order. A blank term returns
/// every item.
///
/// # Examples
///
/// ```
/// use doorctl_core::search::{filter, Searchable};
///
/// struct Tag(&'static str);
/// impl Searchable for Tag {
///     fn search_fields(&self) -> Vec<&str> { vec![self.0] }
/// }
///
/// let tags = [Tag("Front Door"), Tag("Lab")];
/// assert_eq!(filter(&tags, "door").len(), 1);
/// assert_eq!(filter(&tags, "  ").len(), 2);
/// ```
pub fn filter<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    match normalize_term(term) {
        None => items.iter().collect(),
        Some(needle) => items.iter().filter(|item| matches(*item, &needle)).collect(),
    }
}
