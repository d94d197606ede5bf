use axum::{
    Router,
    routing::{get, post},
};

pub mod borrows;
pub mod fixtures;
pub mod system;

/// Router for every `/api` endpoint.
///
/// `/detail`, `/borrow` and `/return` are kept as aliases for older clients.
pub fn router() -> Router {
    Router::new()
        .route("/search", get(fixtures::search))
        .route("/details", get(fixtures::details))
        .route("/detail", get(fixtures::details))
        .route("/checkout", post(borrows::checkout))
        .route("/borrow", post(borrows::checkout))
        .route("/checkin", post(borrows::checkin))
        .route("/return", post(borrows::checkin))
        .route("/ledger/orphans", get(borrows::orphans))
        .route("/inventory/reload", post(system::reload_inventory))
}
