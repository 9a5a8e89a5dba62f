//! Best-effort lookups against external collaborators.
//!
//! None of these may fail a session or ranking operation: callers go through
//! [`Lookups`], which logs the failure and substitutes a documented default.

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use thiserror::Error;

/// Cuisine assumed when a dish cannot be classified.
pub const DEFAULT_CUISINE: &str = "Mixed";

/// Image shown when no picture can be found for a dish.
pub const DEFAULT_IMAGE: &str = "/images/placeholder-food.jpg";

/// Restaurant count assumed when the directory has no answer.
pub const DEFAULT_RESTAURANT_COUNT: u32 = 0;

#[derive(Debug, Error)]
pub enum LookupError {
  #[error("no entry for {0:?}")]
  Missing(String),

  #[error("lookup service unavailable: {0}")]
  Unavailable(String),
}

pub type LookupFuture<'a, T> =
  Pin<Box<dyn Future<Output = Result<T, LookupError>> + Send + 'a>>;

// ─── Collaborator traits ─────────────────────────────────────────────────────

/// Classifies a dish name into a cuisine.
pub trait CuisineClassifier: Send + Sync {
  fn classify<'a>(&'a self, dish_name: &'a str) -> LookupFuture<'a, String>;
}

/// Counts restaurants serving a cuisine.
pub trait LocationDirectory: Send + Sync {
  fn restaurant_count<'a>(&'a self, cuisine: &'a str) -> LookupFuture<'a, u32>;
}

/// Finds a display image for a dish name.
pub trait ImageLookup: Send + Sync {
  fn image_for<'a>(&'a self, dish_name: &'a str) -> LookupFuture<'a, String>;
}

// ─── Static tables ───────────────────────────────────────────────────────────

/// A lookup answered from a fixed, case-insensitive table.
#[derive(Debug, Clone, Default)]
pub struct StaticTable<V> {
  entries: HashMap<String, V>,
}

impl<V: Clone + Send + Sync> StaticTable<V> {
  pub fn new<K: AsRef<str>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
    Self {
      entries: entries
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_lowercase(), v))
        .collect(),
    }
  }

  fn get(&self, key: &str) -> Result<V, LookupError> {
    self
      .entries
      .get(&key.to_lowercase())
      .cloned()
      .ok_or_else(|| LookupError::Missing(key.to_owned()))
  }
}

impl CuisineClassifier for StaticTable<String> {
  fn classify<'a>(&'a self, dish_name: &'a str) -> LookupFuture<'a, String> {
    Box::pin(async move { self.get(dish_name) })
  }
}

impl LocationDirectory for StaticTable<u32> {
  fn restaurant_count<'a>(&'a self, cuisine: &'a str) -> LookupFuture<'a, u32> {
    Box::pin(async move { self.get(cuisine) })
  }
}

impl ImageLookup for StaticTable<String> {
  fn image_for<'a>(&'a self, dish_name: &'a str) -> LookupFuture<'a, String> {
    Box::pin(async move { self.get(dish_name) })
  }
}

// ─── Bundle with fallbacks ───────────────────────────────────────────────────

/// The set of collaborators a coordinator consults while building results.
#[derive(Clone)]
pub struct Lookups {
  pub cuisines:  Arc<dyn CuisineClassifier>,
  pub locations: Arc<dyn LocationDirectory>,
  pub images:    Arc<dyn ImageLookup>,
}

impl Default for Lookups {
  fn default() -> Self {
    Self {
      cuisines:  Arc::new(StaticTable::<String>::default()),
      locations: Arc::new(StaticTable::<u32>::default()),
      images:    Arc::new(StaticTable::<String>::default()),
    }
  }
}

impl Lookups {
  pub async fn cuisine_or_default(&self, dish_name: &str) -> String {
    match self.cuisines.classify(dish_name).await {
      Ok(c) if !c.trim().is_empty() => c,
      Ok(_) => DEFAULT_CUISINE.to_owned(),
      Err(e) => {
        tracing::warn!(dish = dish_name, error = %e, "cuisine lookup failed; using default");
        DEFAULT_CUISINE.to_owned()
      }
    }
  }

  pub async fn restaurant_count_or_default(&self, cuisine: &str) -> u32 {
    match self.locations.restaurant_count(cuisine).await {
      Ok(n) => n,
      Err(e) => {
        tracing::warn!(cuisine, error = %e, "restaurant count lookup failed; using default");
        DEFAULT_RESTAURANT_COUNT
      }
    }
  }

  pub async fn image_or_default(&self, dish_name: &str) -> String {
    match self.images.image_for(dish_name).await {
      Ok(url) if !url.trim().is_empty() => url,
      Ok(_) => DEFAULT_IMAGE.to_owned(),
      Err(e) => {
        tracing::warn!(dish = dish_name, error = %e, "image lookup failed; using default");
        DEFAULT_IMAGE.to_owned()
      }
    }
  }
}
