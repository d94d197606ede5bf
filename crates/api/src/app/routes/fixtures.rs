use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use fixtrack_core::DomainError;
use fixtrack_inventory::{Availability, FixtureKey, SearchOutcome, SystemLabel};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::SearchQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.body_text());
        }
    };

    let article = query.article.as_deref();
    let article = match errors::required_param(article, "missing_article", "article") {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let system = query
        .system
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(SystemLabel::new);

    let catalog = services.catalog();
    match catalog.search(article, system.as_ref()) {
        SearchOutcome::NotFound => Json(json!({ "found": false })).into_response(),
        SearchOutcome::Multiple(choices) => Json(json!({
            "found": "multiple",
            "choices": choices,
        }))
        .into_response(),
        SearchOutcome::Found {
            article,
            part_number,
            name,
            systems,
        } => {
            let entries = match services.run_blocking(|s| s.ledger().entries()).await {
                Ok(Ok(e)) => e,
                Ok(Err(e)) => return errors::storage_error_to_response(e),
                Err(e) => return errors::join_error_to_response(e),
            };

            let systems: Vec<serde_json::Value> = systems
                .iter()
                .map(|summary| {
                    let availability = Availability::compute(&catalog, &entries, &summary.key());
                    (summary, availability)
                })
                .filter(|(_, availability)| !query.available_only || availability.available > 0)
                .map(|(summary, availability)| dto::summary_to_json(summary, &availability))
                .collect();

            Json(json!({
                "found": true,
                "article": article,
                "part_number": part_number,
                "name": name,
                "systems": systems,
            }))
            .into_response()
        }
    }
}

pub async fn details(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::DetailsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.body_text());
        }
    };

    let (article, system) = match (
        errors::required_param(query.article.as_deref(), "missing_params", "article"),
        errors::required_param(query.system.as_deref(), "missing_params", "system"),
    ) {
        (Ok(a), Ok(s)) => (a, s),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };

    let key = FixtureKey::new(article, system);
    let catalog = services.catalog();
    let Some(summary) = catalog.summary(&key) else {
        return errors::domain_error_to_response(DomainError::not_found(format!("fixture {key}")));
    };

    let lookup = key.clone();
    let open = match services
        .run_blocking(move |s| s.ledger().outstanding_entries(&lookup))
        .await
    {
        Ok(Ok(open)) => open,
        Ok(Err(e)) => return errors::storage_error_to_response(e),
        Err(e) => return errors::join_error_to_response(e),
    };
    let availability = Availability::from_outstanding(
        catalog.baseline(&key),
        open.iter().fold(0u32, |total, e| total.saturating_add(e.quantity)),
    );
    let open: Vec<serde_json::Value> = open.iter().map(dto::entry_to_json).collect();

    Json(json!({
        "record": dto::summary_to_json(&summary, &availability),
        "available_units_total": availability.available,
        "locations": summary.locations,
        "primary_location": summary.primary_location(),
        "outstanding": open,
    }))
    .into_response()
}
