//! Record contract consumed by stores and the mirror controller.

use std::fmt::Debug;
use std::hash::Hash;

/// A persisted entity the mirror can hold.
///
/// Two equality notions coexist:
/// - `id()` is the stable identity used for de-duplication and removal.
/// - `Eq + Hash` over the whole value is used by diff-based replacement.
pub trait Record: Clone + Eq + Hash {
    /// Stable identity type. Logged with `Debug`, so keep it metadata-only.
    type Id: Clone + Eq + Hash + Debug;

    /// Root entity name used by stores to scope reads and bulk deletes.
    const ENTITY: &'static str;

    /// Returns the stable identity of this record.
    fn id(&self) -> Self::Id;

    /// Concrete entity name for this value.
    ///
    /// Subtypes use dotted names below `ENTITY` (for example `item.task`).
    fn entity(&self) -> &str {
        Self::ENTITY
    }
}

/// Returns whether `entity` belongs to `root`, optionally counting subtypes.
///
/// `item` matches only `item` when `include_subtypes` is false, and also
/// `item.task` or `item.task.repeat` when it is true.
pub fn entity_in_scope(entity: &str, root: &str, include_subtypes: bool) -> bool {
    if entity == root {
        return true;
    }
    include_subtypes
        && entity
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('.'))
}
