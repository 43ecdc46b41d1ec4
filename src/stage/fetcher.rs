//! Blocking HTTP fetch of a folio's stage document.

use reqwest::header::{ACCEPT, AUTHORIZATION};

use crate::config::HttpConfig;
use crate::constants::JSON_MEDIA_TYPE;
use crate::error::ProcedureError;

/// Scalar arguments of the stage query procedure.
#[derive(Debug, Clone, Default)]
pub struct StageQueryRequest {
    pub service_url: String,
    /// Sent verbatim as `Authorization` when non-empty.
    pub authorization_header: String,
    /// Caller bookkeeping only; not part of the request.
    pub folio: String,
}

impl StageQueryRequest {
    pub fn authorization(&self) -> Option<&str> {
        Some(self.authorization_header.as_str()).filter(|h| !h.is_empty())
    }
}

/// Fetches the raw stage payload.
pub trait StageFetcher {
    fn fetch(&self, request: &StageQueryRequest) -> Result<String, ProcedureError>;
}

/// reqwest-backed fetcher.
pub struct HttpStageFetcher {
    client: reqwest::blocking::Client,
}

impl HttpStageFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, ProcedureError> {
        if config.accept_invalid_certs {
            tracing::warn!(
                "TLS certificate validation DISABLED for stage queries; \
                 any certificate will be trusted"
            );
        }

        let client = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(config.timeout)
            .build()
            .map_err(ProcedureError::HttpClient)?;

        Ok(Self { client })
    }
}

impl StageFetcher for HttpStageFetcher {
    fn fetch(&self, request: &StageQueryRequest) -> Result<String, ProcedureError> {
        let url = request.service_url.as_str();

        let mut req = self.client.get(url).header(ACCEPT, JSON_MEDIA_TYPE);
        if let Some(auth) = request.authorization() {
            req = req.header(AUTHORIZATION, auth);
        }

        let response = req.send().map_err(|source| ProcedureError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProcedureError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().map_err(|source| ProcedureError::Http {
            url: url.to_string(),
            source,
        })?;

        tracing::debug!(folio = %request.folio, bytes = body.len(), "Stage payload received");
        Ok(body)
    }
}
