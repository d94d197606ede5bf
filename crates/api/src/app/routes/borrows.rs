use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;

use fixtrack_inventory::{BorrowEntry, CheckoutRequest, FixtureKey};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

fn returned_units(cleared: &[BorrowEntry]) -> u32 {
    cleared
        .iter()
        .fold(0u32, |total, e| total.saturating_add(e.quantity))
}

pub async fn checkout(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CheckoutBody>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text());
        }
    };

    let quantity = match body.quantity() {
        Ok(q) => q,
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
    };

    let request = CheckoutRequest {
        key: FixtureKey::new(&body.article, &body.system),
        borrower: body.borrower,
        borrower_phone: body.borrower_phone,
        location: body.location,
        quantity,
    };

    let catalog = services.catalog();
    let outcome = services
        .run_blocking(move |s| s.ledger().record_checkout(&catalog, &request, Utc::now()))
        .await;

    match outcome {
        Ok(Ok(receipt)) => (
            StatusCode::CREATED,
            Json(json!({
                "ok": true,
                "entry": dto::entry_to_json(&receipt.entry),
                "available_units": receipt.availability.available,
            })),
        )
            .into_response(),
        Ok(Err(e)) => errors::ledger_error_to_response(e),
        Err(e) => errors::join_error_to_response(e),
    }
}

/// Check-in by pair (optionally narrowed by ids), or return by ids alone.
pub async fn checkin(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CheckinBody>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text());
        }
    };

    if !body.has_pair() {
        return return_by_id(services, &body).await;
    }

    let selection = match body.selection() {
        Ok(s) => s,
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
    };

    let key = FixtureKey::new(&body.article, &body.system);
    let catalog = services.catalog();
    let outcome = services
        .run_blocking(move |s| {
            s.ledger()
                .record_checkin(&catalog, &key, &selection, Utc::now())
        })
        .await;

    match outcome {
        Ok(Ok(receipt)) => Json(json!({
            "ok": true,
            "cleared": receipt.cleared.iter().map(dto::entry_to_json).collect::<Vec<_>>(),
            "returned": returned_units(&receipt.cleared),
            "available_units": receipt.availability.available,
        }))
        .into_response(),
        Ok(Err(e)) => errors::ledger_error_to_response(e),
        Err(e) => errors::join_error_to_response(e),
    }
}

async fn return_by_id(
    services: Arc<AppServices>,
    body: &dto::CheckinBody,
) -> axum::response::Response {
    let ids = match body.ids() {
        Ok(ids) => ids,
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
    };
    if ids.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "missing_params",
            "article and system, or borrow id(s), are required",
        );
    }

    let catalog = services.catalog();
    let requested: Vec<String> = ids.iter().map(ToString::to_string).collect();
    let outcome = services
        .run_blocking(move |s| s.ledger().record_return(&catalog, &ids, Utc::now()))
        .await;

    match outcome {
        Ok(Ok(receipt)) => {
            let availability: Vec<serde_json::Value> = receipt
                .availability
                .iter()
                .map(|(key, a)| {
                    json!({
                        "article": key.article,
                        "system": key.system.as_str(),
                        "available_units": a.available,
                    })
                })
                .collect();
            Json(json!({
                "ok": true,
                "borrow_ids": requested,
                "cleared": receipt.cleared.iter().map(dto::entry_to_json).collect::<Vec<_>>(),
                "returned": returned_units(&receipt.cleared),
                "availability": availability,
            }))
            .into_response()
        }
        Ok(Err(e)) => errors::ledger_error_to_response(e),
        Err(e) => errors::join_error_to_response(e),
    }
}

/// Outstanding ledger entries whose fixture is missing from the inventory.
pub async fn orphans(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let catalog = services.catalog();
    match services
        .run_blocking(move |s| s.ledger().orphans(&catalog))
        .await
    {
        Ok(Ok(list)) => Json(json!({
            "count": list.len(),
            "orphans": list.iter().map(dto::entry_to_json).collect::<Vec<_>>(),
        }))
        .into_response(),
        Ok(Err(e)) => errors::storage_error_to_response(e),
        Err(e) => errors::join_error_to_response(e),
    }
}
