//! Named items referenced by tree leaves.
//!
//! Items are owned by the caller and shared with the tree through `Arc`.
//! Two leaves refer to the same item when their handles are pointer-equal.

use std::fmt;
use std::sync::Arc;

/// Residue content attached to synthetic placeholder items.
pub const PLACEHOLDER_RESIDUES: &[u8] = b"THISISAPLACEHLDER";

/// An externally owned, named entity (typically an aligned sequence).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    name: Arc<str>,
    residues: Arc<[u8]>,
}

impl Item {
    /// Construct an item from a name and its residues.
    pub fn new(name: impl Into<Arc<str>>, residues: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            residues: residues.into(),
        }
    }

    /// Construct an item carrying only a name.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Synthetic stand-in for a leaf whose name matched no real item.
    pub fn placeholder(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, PLACEHOLDER_RESIDUES.to_vec())
    }

    /// Item name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Residues (aligned, may contain gap characters).
    pub fn residues(&self) -> &[u8] {
        &self.residues
    }

    /// Whether the residues are the placeholder sentinel.
    pub fn has_placeholder_content(&self) -> bool {
        &*self.residues == PLACEHOLDER_RESIDUES
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Wrap a list of names into shareable items with empty residues.
pub fn items_from_names<S: AsRef<str>>(names: &[S]) -> Vec<Arc<Item>> {
    names
        .iter()
        .map(|name| Arc::new(Item::named(name.as_ref())))
        .collect()
}
