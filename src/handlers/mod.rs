pub mod predict;
pub mod suggest;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{models::LangMap, predict::Predictor, suggest::SuggestionEngine};

/// Application context passed to all handlers. The engines are fully loaded
/// before the server starts and only read afterwards, so they are shared
/// across handlers without locking.
pub struct Ctx {
    pub suggester: SuggestionEngine,
    pub predictor: Predictor,
    pub langs: LangMap,
    pub consts: Consts,
}

/// Application constants.
#[derive(Clone, serde::Serialize)]
pub struct Consts {
    pub default_suggestions: usize,
    pub max_suggestions: usize,
    pub default_top_k: usize,
    pub max_top_k: usize,
}

impl Default for Consts {
    fn default() -> Self {
        Self {
            default_suggestions: 10,
            max_suggestions: 50,
            default_top_k: 5,
            max_top_k: 20,
        }
    }
}

/// API response wrapper.
#[derive(Serialize)]
pub struct ApiResp<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T: Serialize> IntoResponse for ApiResp<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

pub fn json<T: Serialize>(data: T) -> ApiResp<T> {
    ApiResp {
        data: Some(data),
        message: None,
    }
}

/// API error type.
#[derive(Debug)]
pub struct ApiErr {
    pub message: String,
    pub status: StatusCode,
}

impl ApiErr {
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let json = Json(ApiResp::<()> {
            data: None,
            message: Some(self.message),
        });
        (self.status, json).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiErr>;

/// Clamp an optional request limit to [1, max], falling back to the default.
pub fn clamp_limit(requested: Option<usize>, default: usize, max: usize) -> usize {
    match requested {
        None | Some(0) => default,
        Some(n) if n > max => max,
        Some(n) => n,
    }
}

/// Config payload: configured languages and request limits.
#[derive(Serialize)]
pub struct ConfigResp {
    pub languages: Vec<LangInfo>,
    pub consts: Consts,
}

#[derive(Serialize)]
pub struct LangInfo {
    pub id: String,
    pub name: String,
}

/// Expose configured languages and limits.
pub async fn get_config(State(ctx): State<Arc<Ctx>>) -> ApiResp<ConfigResp> {
    let mut languages: Vec<LangInfo> = ctx
        .langs
        .values()
        .map(|l| LangInfo {
            id: l.id.clone(),
            name: l.name.clone(),
        })
        .collect();
    languages.sort_by(|a, b| a.id.cmp(&b.id));

    json(ConfigResp {
        languages,
        consts: ctx.consts.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::clamp_limit;

    #[test]
    fn clamp_limit_bounds() {
        assert_eq!(clamp_limit(None, 10, 50), 10);
        assert_eq!(clamp_limit(Some(0), 10, 50), 10);
        assert_eq!(clamp_limit(Some(5), 10, 50), 5);
        assert_eq!(clamp_limit(Some(99), 10, 50), 50);
    }
}
