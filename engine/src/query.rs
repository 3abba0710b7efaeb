//! Queries over the store's secondary indexes.

use crate::{Category, Cube, Timestamp};
use serde::{Deserialize, Serialize};

/// A lookup by one of the secondary indexes (`category`, `favorite`,
/// `createdAt`).
///
/// Results are always ordered by creation time, ties broken by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "index", rename_all = "camelCase")]
pub enum IndexQuery {
    /// Cubes of one category
    Category { category: Category },
    /// Cubes marked as favorite
    Favorites,
    /// Cubes created inside an inclusive range; open ends are unbounded
    CreatedAt {
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    },
}

impl IndexQuery {
    /// Query cubes of one category.
    pub fn category(category: impl Into<Category>) -> Self {
        Self::Category {
            category: category.into(),
        }
    }

    /// Query every cube, oldest first.
    pub fn all_by_created_at() -> Self {
        Self::CreatedAt {
            from: None,
            to: None,
        }
    }

    /// Check whether a cube satisfies the query.
    pub fn matches(&self, cube: &Cube) -> bool {
        match self {
            Self::Category { category } => &cube.category == category,
            Self::Favorites => cube.favorite,
            Self::CreatedAt { from, to } => {
                from.map_or(true, |f| cube.created_at >= f)
                    && to.map_or(true, |t| cube.created_at <= t)
            }
        }
    }

    /// Evaluate the query over a full scan.
    pub fn apply(&self, cubes: Vec<Cube>) -> Vec<Cube> {
        let mut found: Vec<Cube> = cubes.into_iter().filter(|c| self.matches(c)).collect();
        found.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubes() -> Vec<Cube> {
        let mut a = Cube::new("a", "Main", "3x3", 300);
        a.favorite = true;
        let b = Cube::new("b", "Small", "2x2", 100);
        let c = Cube::new("c", "Backup", "3x3", 200);
        let mut d = Cube::new("d", "Big", "4x4", 200);
        d.favorite = true;
        vec![a, b, c, d]
    }

    fn ids(cubes: &[Cube]) -> Vec<&str> {
        cubes.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn by_category() {
        let found = IndexQuery::category("3x3").apply(cubes());
        assert_eq!(ids(&found), vec!["c", "a"]);
    }

    #[test]
    fn favorites() {
        let found = IndexQuery::Favorites.apply(cubes());
        assert_eq!(ids(&found), vec!["d", "a"]);
    }

    #[test]
    fn created_at_orders_with_id_tiebreak() {
        let found = IndexQuery::all_by_created_at().apply(cubes());
        assert_eq!(ids(&found), vec!["b", "c", "d", "a"]);
    }

    #[test]
    fn created_at_range_is_inclusive() {
        let query = IndexQuery::CreatedAt {
            from: Some(200),
            to: Some(300),
        };
        let found = query.apply(cubes());
        assert_eq!(ids(&found), vec!["c", "d", "a"]);

        let query = IndexQuery::CreatedAt {
            from: None,
            to: Some(199),
        };
        assert_eq!(ids(&query.apply(cubes())), vec!["b"]);
    }
}
