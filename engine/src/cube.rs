//! Cube and solve types.

use crate::{Category, CubeId, SolveId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single timed attempt belonging to a cube.
///
/// Solves are immutable once created. `cube_id` is a lookup reference only,
/// ownership is expressed by which cube's collection holds the solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solve {
    /// Unique identifier within a cube's history
    pub id: SolveId,
    /// Back-reference to the owning cube
    pub cube_id: CubeId,
    /// Solve duration in milliseconds
    pub time: f64,
    /// Completion time (milliseconds since epoch), the recency sort key
    pub end_time: Timestamp,
    /// Rating points gained or lost by this solve
    pub rating: f64,
    /// Fields this model does not name, carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Solve {
    /// Create a new solve.
    pub fn new(
        id: impl Into<SolveId>,
        cube_id: impl Into<CubeId>,
        time: f64,
        end_time: Timestamp,
        rating: f64,
    ) -> Self {
        Self {
            id: id.into(),
            cube_id: cube_id.into(),
            time,
            end_time,
            rating,
            extra: Map::new(),
        }
    }
}

/// The two solve collections of a cube.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solves {
    /// Full history, in insertion order
    #[serde(default)]
    pub all: Vec<Solve>,
    /// Working subset for the current session
    #[serde(default)]
    pub session: Vec<Solve>,
}

impl Solves {
    /// Check whether the history holds a solve with this id.
    pub fn contains(&self, id: &str) -> bool {
        self.all.iter().any(|s| s.id == id)
    }
}

/// A cube: the top-level entity the user manages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cube {
    /// Unique identifier, stable for the cube's lifetime
    pub id: CubeId,
    /// Display label
    pub name: String,
    /// Puzzle category, e.g. "3x3"
    pub category: Category,
    /// When the cube was created (milliseconds since epoch)
    pub created_at: Timestamp,
    /// Whether the user pinned this cube
    #[serde(default)]
    pub favorite: bool,
    /// Solve history and current session
    #[serde(default)]
    pub solves: Solves,
    /// Fields this model does not name, carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cube {
    /// Create a cube with no solves that is not a favorite.
    pub fn new(
        id: impl Into<CubeId>,
        name: impl Into<String>,
        category: impl Into<Category>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            created_at,
            favorite: false,
            solves: Solves::default(),
            extra: Map::new(),
        }
    }

    /// Record a finished solve in both the history and the current session.
    pub fn record_solve(&mut self, solve: Solve) {
        self.solves.session.push(solve.clone());
        self.solves.all.push(solve);
    }

    /// Ids of the solve history, in order.
    pub fn solve_ids(&self) -> impl Iterator<Item = &str> {
        self.solves.all.iter().map(|s| s.id.as_str())
    }
}
