//! Zone routes

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::zones::{
    create_zone, delete_zone, get_zone, list_zone_names, list_zones, update_zone, zone_exists,
};
use crate::AppState;

/// Routes mounted under `/wastewise/admin/zones`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_zone))
        .route("/update/:zone_id", put(update_zone))
        .route("/delete/:zone_id", delete(delete_zone))
        .route("/list", get(list_zones))
        .route("/names", get(list_zone_names))
        .route("/:zone_id", get(get_zone))
        .route("/:zone_id/exists", get(zone_exists))
}
