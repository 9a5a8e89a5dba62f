//! `GET /dishes`: the votable catalog, in catalog order.

use std::sync::Arc;

use axum::{Json, extract::State};
use nosh_core::{
  Error, coordinator::SessionCoordinator, dish::Dish, store::DishCatalog,
};

use crate::error::ApiError;

pub async fn list<S: DishCatalog>(
  State(coordinator): State<Arc<SessionCoordinator<S>>>,
) -> Result<Json<Vec<Dish>>, ApiError> {
  let dishes = coordinator
    .store()
    .list_dishes()
    .await
    .map_err(Error::store)?;
  Ok(Json(dishes))
}
