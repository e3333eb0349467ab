//! Identity contract shared by every catalog entity.
//!
//! The generic repository and route layers only know about this trait;
//! concrete entities describe how their id and relation sets behave.

use std::fmt::Debug;

use serde::{Serialize, de::DeserializeOwned};
use validator::Validate;

/// Id value meaning "let the backend assign one".
pub const UNASSIGNED_ID: i32 = 0;

/// A record with a unique integer identity.
pub trait Entity:
    Clone + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + Validate + 'static
{
    /// Singular entity name used in errors and log fields.
    const NAME: &'static str;

    /// Returns the entity id, `UNASSIGNED_ID` when none was supplied.
    fn id(&self) -> i32;

    /// Replaces the entity id.
    fn set_id(&mut self, id: i32);

    /// Puts relation id sets in canonical form (sorted, no duplicates).
    fn normalize(&mut self) {}

    /// Whether the caller supplied an id.
    fn has_assigned_id(&self) -> bool {
        self.id() != UNASSIGNED_ID
    }
}

/// Sorts and deduplicates a relation id set in place.
pub fn normalize_ids(ids: &mut Vec<i32>) {
    ids.sort_unstable();
    ids.dedup();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ids_sorts_and_dedups() {
        let mut ids = vec![3, 1, 3, 2, 1];
        normalize_ids(&mut ids);
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_normalize_ids_empty() {
        let mut ids: Vec<i32> = Vec::new();
        normalize_ids(&mut ids);
        assert!(ids.is_empty());
    }
}
