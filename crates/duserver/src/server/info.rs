//! Summary query endpoint.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use duindex::{InfoNode, InfoOptions};
use serde::Deserialize;

use crate::error::ApiError;
use crate::server::ServerState;

/// Query string of `GET /api/v1/info`.
///
/// With no bounds at all the request is the default query (the node's own
/// summary). Once any bound is given, the omitted ones do not truncate:
/// `deep` 0, `maxItems` 0 (unlimited), `longTailPercent` 1.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoQuery {
    #[serde(default, alias = "PathName")]
    pub path_name: String,
    #[serde(alias = "Deep")]
    pub deep: Option<usize>,
    #[serde(alias = "MaxItems")]
    pub max_items: Option<usize>,
    #[serde(alias = "LongTailPercent")]
    pub long_tail_percent: Option<f64>,
}

impl InfoQuery {
    pub fn options(&self) -> InfoOptions {
        if self.deep.is_none() && self.max_items.is_none() && self.long_tail_percent.is_none() {
            return InfoOptions::default();
        }
        InfoOptions {
            deep: self.deep.unwrap_or(0),
            max_items: self.max_items.unwrap_or(0),
            long_tail_percent: self.long_tail_percent.unwrap_or(1.0),
        }
    }
}

pub(crate) async fn get_info(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<InfoQuery>, QueryRejection>,
) -> Result<Json<InfoNode>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let options = query.options();
    tracing::debug!(path = %query.path_name, ?options, "info query");

    let provider = state.provider.clone();
    let path = query.path_name;
    let info = tokio::task::spawn_blocking(move || provider.info_by_path(&path, Some(&options)))
        .await
        .map_err(|e| ApiError::internal(format!("task failed: {e}")))??;

    Ok(Json(info))
}
