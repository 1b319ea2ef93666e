use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::{clamp_limit, json, ApiErr, ApiResp, Ctx, Result};
use crate::models::PredictResults;

/// Prediction query params. `q` is the user's raw input so far; the last
/// token is treated as a partial word.
#[derive(Debug, serde::Deserialize, Default)]
pub struct PredictQuery {
    pub q: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Next-word predictions blended with completions of the trailing partial
/// word.
pub async fn predict(
    State(ctx): State<Arc<Ctx>>,
    Path(lang): Path<String>,
    Query(query): Query<PredictQuery>,
) -> Result<ApiResp<PredictResults>> {
    if !ctx.langs.contains_key(&lang) {
        return Err(ApiErr::new("unknown language", StatusCode::BAD_REQUEST));
    }

    let top_k = clamp_limit(query.top_k, ctx.consts.default_top_k, ctx.consts.max_top_k);

    let predictions = ctx.predictor.hybrid_predict(&query.q, top_k);

    Ok(json(PredictResults {
        language: lang,
        predictions,
    }))
}
