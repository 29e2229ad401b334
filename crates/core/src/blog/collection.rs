use std::fmt;

/// Logical collections, one per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Categories,
    Subcategories,
    Authors,
    Posts,
    Comments,
    Users,
    Notifications,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Categories,
        Collection::Subcategories,
        Collection::Authors,
        Collection::Posts,
        Collection::Comments,
        Collection::Users,
        Collection::Notifications,
    ];

    /// Name used by the relational store and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Categories => "categories",
            Collection::Subcategories => "subcategories",
            Collection::Authors => "authors",
            Collection::Posts => "posts",
            Collection::Comments => "comments",
            Collection::Users => "users",
            Collection::Notifications => "notifications",
        }
    }

    /// Entity name used in error messages.
    pub fn entity_type(&self) -> &'static str {
        match self {
            Collection::Categories => "Category",
            Collection::Subcategories => "Subcategory",
            Collection::Authors => "Author",
            Collection::Posts => "Post",
            Collection::Comments => "Comment",
            Collection::Users => "User",
            Collection::Notifications => "Notification",
        }
    }

    /// Wide-column table name before any configured prefix is applied.
    pub fn table_suffix(&self) -> &'static str {
        match self {
            Collection::Categories => "Categories",
            Collection::Subcategories => "Subcategories",
            Collection::Authors => "Authors",
            Collection::Posts => "Posts",
            Collection::Comments => "Comments",
            Collection::Users => "Users",
            Collection::Notifications => "Notifications",
        }
    }

    /// Whether items are keyed `(parent, child)`.
    pub fn is_hierarchical(&self) -> bool {
        matches!(
            self,
            Collection::Subcategories
                | Collection::Posts
                | Collection::Comments
                | Collection::Notifications
        )
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_distinct() {
        let names: std::collections::HashSet<_> =
            Collection::ALL.iter().map(Collection::table_suffix).collect();
        assert_eq!(names.len(), Collection::ALL.len());
    }

    #[test]
    fn test_hierarchical_collections() {
        assert!(!Collection::Categories.is_hierarchical());
        assert!(!Collection::Authors.is_hierarchical());
        assert!(!Collection::Users.is_hierarchical());
        assert!(Collection::Notifications.is_hierarchical());
        assert!(Collection::Subcategories.is_hierarchical());
        assert!(Collection::Posts.is_hierarchical());
        assert!(Collection::Comments.is_hierarchical());
    }
}
