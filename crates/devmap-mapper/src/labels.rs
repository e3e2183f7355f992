//! Label and annotation merging
//!
//! Later layers win on key conflicts, so callers pass generated defaults
//! first and user-supplied labels last.

use std::collections::BTreeMap;

/// String map used for labels and annotations
pub type Labels = BTreeMap<String, String>;

/// Every key of `base` and `overrides`; overlapping keys take the override value.
pub fn merge(base: &Labels, overrides: &Labels) -> Labels {
    let mut merged = base.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Fold any number of layers left to right with [`merge`] semantics.
pub fn merge_all<'a>(layers: impl IntoIterator<Item = &'a Labels>) -> Labels {
    layers
        .into_iter()
        .fold(Labels::new(), |acc, layer| merge(&acc, layer))
}
