//! Composite key construction for hierarchical entities.
//!
//! A child that lives under a parent (subcategory under category, post under
//! author, comment under post) is stored with partition `"<parent>#<child>"`
//! and sort key `<child>`. Flat entities use their own id as partition and
//! carry no sort key.
//!
//! Identifiers must be non-empty and must not contain [`KEY_SEPARATOR`];
//! that keeps the mapping from `(parent, child)` to partition injective and
//! makes `"<parent>#"` an exact prefix for listing children.

use super::{CompositeKey, KeyError};

pub const KEY_SEPARATOR: char = '#';

/// Build the key for an entity.
///
/// With `child = None` the parent id is the whole key.
///
/// ```
/// use quill_core::storage::build_key;
///
/// let key = build_key("cat-1", Some("sub-1")).unwrap();
/// assert_eq!(key.partition, "cat-1#sub-1");
/// assert_eq!(key.sort.as_deref(), Some("sub-1"));
/// ```
pub fn build_key(parent: &str, child: Option<&str>) -> Result<CompositeKey, KeyError> {
    validate_id("parent", parent)?;
    match child {
        None => Ok(CompositeKey::flat(parent)),
        Some(child) => {
            validate_id("child", child)?;
            Ok(CompositeKey {
                partition: format!("{parent}{KEY_SEPARATOR}{child}"),
                sort: Some(child.to_string()),
            })
        }
    }
}

/// Partition prefix shared by every child of `parent`.
pub fn child_prefix(parent: &str) -> Result<String, KeyError> {
    validate_id("parent", parent)?;
    Ok(format!("{parent}{KEY_SEPARATOR}"))
}

/// Split a hierarchical partition back into `(parent, child)`.
pub fn split_partition(partition: &str) -> Option<(&str, &str)> {
    let (parent, child) = partition.split_once(KEY_SEPARATOR)?;
    if parent.is_empty() || child.is_empty() || child.contains(KEY_SEPARATOR) {
        return None;
    }
    Some((parent, child))
}

/// True when `partition` belongs to a direct child of `parent`.
pub fn is_child_of(partition: &str, parent: &str) -> bool {
    split_partition(partition).is_some_and(|(p, _)| p == parent)
}

pub fn validate_id(role: &'static str, id: &str) -> Result<(), KeyError> {
    if id.is_empty() {
        return Err(KeyError::Empty { role });
    }
    if id.contains(KEY_SEPARATOR) {
        return Err(KeyError::ContainsSeparator {
            role,
            id: id.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_key_has_no_sort() {
        let key = build_key("cat-1", None).unwrap();
        assert_eq!(key.partition, "cat-1");
        assert_eq!(key.sort, None);
    }

    #[test]
    fn test_hierarchical_key_is_stable() {
        let a = build_key("cat-1", Some("sub-1")).unwrap();
        let b = build_key("cat-1", Some("sub-1")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.partition, "cat-1#sub-1");
        assert_eq!(a.sort.as_deref(), Some("sub-1"));
    }

    #[test]
    fn test_distinct_pairs_give_distinct_partitions() {
        let pairs = [("a", "bc"), ("ab", "c"), ("a", "b"), ("b", "a")];
        let partitions: std::collections::HashSet<_> = pairs
            .iter()
            .map(|(p, c)| build_key(p, Some(c)).unwrap().partition)
            .collect();
        assert_eq!(partitions.len(), pairs.len());
    }

    #[test]
    fn test_separator_in_ids_is_rejected() {
        assert_eq!(
            build_key("a#b", Some("c")),
            Err(KeyError::ContainsSeparator {
                role: "parent",
                id: "a#b".to_string()
            })
        );
        assert_eq!(
            build_key("a", Some("b#c")),
            Err(KeyError::ContainsSeparator {
                role: "child",
                id: "b#c".to_string()
            })
        );
    }

    #[test]
    fn test_empty_ids_are_rejected() {
        assert_eq!(build_key("", None), Err(KeyError::Empty { role: "parent" }));
        assert_eq!(
            build_key("cat-1", Some("")),
            Err(KeyError::Empty { role: "child" })
        );
    }

    #[test]
    fn test_child_prefix_matches_only_own_children() {
        let prefix = child_prefix("cat-1").unwrap();
        let own = build_key("cat-1", Some("sub-1")).unwrap();
        let other = build_key("cat-10", Some("sub-1")).unwrap();

        assert!(own.partition.starts_with(&prefix));
        assert!(!other.partition.starts_with(&prefix));
    }

    #[test]
    fn test_split_partition() {
        assert_eq!(split_partition("cat-1#sub-1"), Some(("cat-1", "sub-1")));
        assert_eq!(split_partition("cat-1"), None);
        assert_eq!(split_partition("#sub-1"), None);
        assert_eq!(split_partition("a#b#c"), None);
    }

    #[test]
    fn test_is_child_of() {
        assert!(is_child_of("cat-1#sub-1", "cat-1"));
        assert!(!is_child_of("cat-10#sub-1", "cat-1"));
        assert!(!is_child_of("cat-1", "cat-1"));
    }
}
