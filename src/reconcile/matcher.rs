//! Name lookup used to bind tree leaves to items.
//!
//! Built once per reconciliation call. Lookup tries, in order: exact name,
//! case-insensitive name, then a unique word-boundary prefix in either
//! direction (`"Q9XYZ1"` matches `"Q9XYZ1/1-120"` and vice versa).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::item::Item;

/// Characters that may end a name prefix.
pub const WORD_SEPARATORS: &str = "~. |#\\/<>!\"¤$%^*)}[@',?_";

/// How a leaf name was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum MatchKind {
    /// Identical, case-sensitive.
    Exact,
    /// Identical ignoring case.
    CaseInsensitive,
    /// One name is the other up to a word separator.
    Prefix,
}

/// Index of items by name. Duplicate names resolve to the first item.
#[derive(Debug, Clone)]
pub struct NameIndex {
    items: Vec<Arc<Item>>,
    folded_names: Vec<String>,
    exact: HashMap<String, usize>,
    folded: HashMap<String, usize>,
    identities: HashSet<usize>,
}

impl NameIndex {
    /// Index `items`.
    pub fn new(items: &[Arc<Item>]) -> Self {
        let mut exact = HashMap::with_capacity(items.len());
        let mut folded = HashMap::with_capacity(items.len());
        let mut folded_names = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let lower = item.name().to_lowercase();
            exact.entry(item.name().to_string()).or_insert(position);
            folded.entry(lower.clone()).or_insert(position);
            folded_names.push(lower);
        }
        Self {
            items: items.to_vec(),
            folded_names,
            exact,
            folded,
            identities: items.iter().map(identity).collect(),
        }
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no items were indexed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether this exact item (by identity, not name) is indexed.
    pub fn contains(&self, item: &Arc<Item>) -> bool {
        self.identities.contains(&identity(item))
    }

    /// Resolve `name` to an item.
    pub fn find(&self, name: &str) -> Option<(&Arc<Item>, MatchKind)> {
        if let Some(&position) = self.exact.get(name) {
            return Some((&self.items[position], MatchKind::Exact));
        }
        let lower = name.to_lowercase();
        if let Some(&position) = self.folded.get(&lower) {
            return Some((&self.items[position], MatchKind::CaseInsensitive));
        }
        self.unique_prefix(&lower)
            .map(|position| (&self.items[position], MatchKind::Prefix))
    }

    fn unique_prefix(&self, lower: &str) -> Option<usize> {
        if lower.is_empty() {
            return None;
        }
        let mut found = None;
        for (position, candidate) in self.folded_names.iter().enumerate() {
            if candidate.is_empty() || !is_word_prefix_match(lower, candidate) {
                continue;
            }
            if found.is_some() {
                return None;
            }
            found = Some(position);
        }
        found
    }
}

/// Whether the shorter of `a` and `b` is a prefix of the longer one,
/// followed by a word separator.
pub fn is_word_prefix_match(a: &str, b: &str) -> bool {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if shorter.len() == longer.len() || !longer.starts_with(shorter) {
        return false;
    }
    longer[shorter.len()..]
        .chars()
        .next()
        .is_some_and(|next| WORD_SEPARATORS.contains(next))
}

fn identity(item: &Arc<Item>) -> usize {
    Arc::as_ptr(item) as usize
}
