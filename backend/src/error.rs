use reqwest::StatusCode;
use thiserror::Error;

use crate::database::DatabaseError;

/// Failure talking to one of the upstream HTTP services.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(reqwest::Error),
    #[error("upstream answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to parse upstream response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("upstream rejected the request: {0}")]
    Rejected(String),
    #[error("upstream response is missing `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Parâmetros 'origem' e 'destino' são obrigatórios")]
    MissingLocations,
    #[error("Não foi possível calcular a rota")]
    RouteUnavailable,
    #[error("Não foi possível salvar o histórico da viagem: {0}")]
    History(#[from] DatabaseError),
}

// API keys travel as query parameters, so the URL never reaches error text.
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Request(err.without_url())
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_body_is_untouched() {
        assert_eq!(truncate_body("not found"), "not found");
    }

    #[test]
    fn long_body_is_cut_on_char_boundary() {
        let body = "é".repeat(300);
        let cut = truncate_body(&body);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }
}
