use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::{clamp_limit, json, ApiErr, ApiResp, Ctx, Result};
use crate::models::SuggestResults;

/// Autocomplete query params.
#[derive(Debug, serde::Deserialize, Default)]
pub struct SuggestQuery {
    pub prefix: String,
    #[serde(default)]
    pub max: Option<usize>,
}

/// Ranked prefix suggestions with a fuzzy fallback when nothing matches the
/// prefix exactly. All vocabularies share one index; the language path
/// segment is validated against configuration and echoed back.
pub async fn autocomplete(
    State(ctx): State<Arc<Ctx>>,
    Path(lang): Path<String>,
    Query(query): Query<SuggestQuery>,
) -> Result<ApiResp<SuggestResults>> {
    if !ctx.langs.contains_key(&lang) {
        return Err(ApiErr::new("unknown language", StatusCode::BAD_REQUEST));
    }

    let max = clamp_limit(
        query.max,
        ctx.consts.default_suggestions,
        ctx.consts.max_suggestions,
    );

    let suggestions = ctx.suggester.autocomplete(&query.prefix, max);

    Ok(json(SuggestResults {
        language: lang,
        suggestions,
    }))
}
