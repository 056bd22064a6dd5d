//! Route administration endpoints

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::routes::{
    count_routes_by_zone, create_route, delete_route, get_route, list_route_ids_by_zone,
    list_routes, update_route,
};
use crate::AppState;

/// Routes mounted under `/wastewise/admin/routes`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_route))
        .route("/update/:route_id", put(update_route))
        .route("/delete/:route_id", delete(delete_route))
        .route("/list", get(list_routes))
        .route("/zone/:zone_id", get(list_route_ids_by_zone))
        .route("/zone/:zone_id/count", get(count_routes_by_zone))
        .route("/:route_id", get(get_route))
}
