//! Votable catalog items.

use serde::{Deserialize, Serialize};

/// A dish members can swipe on. The catalog is read-only to sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
  pub id:          String,
  pub name:        String,
  /// Grouping key for downstream lookups; blank means "unclassified".
  #[serde(default)]
  pub cuisine:     String,
  #[serde(default)]
  pub image:       Option<String>,
  #[serde(default)]
  pub restaurant:  Option<String>,
  #[serde(default)]
  pub description: Option<String>,
}

impl Dish {
  pub fn new(
    id: impl Into<String>,
    name: impl Into<String>,
    cuisine: impl Into<String>,
  ) -> Self {
    Self {
      id:          id.into(),
      name:        name.into(),
      cuisine:     cuisine.into(),
      image:       None,
      restaurant:  None,
      description: None,
    }
  }
}
