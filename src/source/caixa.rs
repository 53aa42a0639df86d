//! Caixa Econômica Federal lottery API integration.
//!
//! Official source of Quina results.
//!
//! Base URL: https://servicebus2.caixa.gov.br/portaldeloterias/api/quina
//! `GET /` returns the latest contest, `GET /{n}` a specific one.
//! No auth; the service is public but occasionally slow, hence the
//! configurable timeout.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::DrawSource;
use crate::types::Draw;

const SOURCE_NAME: &str = "caixa";

/// Default upstream endpoint.
pub const DEFAULT_BASE_URL: &str =
    "https://servicebus2.caixa.gov.br/portaldeloterias/api/quina";

// ---------------------------------------------------------------------------
// API response types (Caixa JSON → Rust)
// ---------------------------------------------------------------------------

/// The Caixa result payload. The full response carries ~20 more fields
/// (prize tiers, venue, next-contest estimates); we only deserialize what
/// the engine models.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaixaResult {
    numero: u32,
    #[serde(default)]
    data_apuracao: Option<String>,
    /// Drawn numbers sorted ascending, as zero-padded strings ("04").
    #[serde(default)]
    lista_dezenas: Vec<String>,
    /// Drawn numbers in draw order, same string encoding.
    #[serde(default)]
    dezenas_sorteadas_ordem_sorteio: Vec<String>,
    #[serde(default)]
    acumulado: bool,
}

impl CaixaResult {
    /// Convert to the engine's `Draw`, preferring the draw-order list and
    /// falling back to the sorted one when the order is missing.
    fn into_draw(self) -> Result<Draw> {
        let raw = if self.dezenas_sorteadas_ordem_sorteio.len() == 5 {
            &self.dezenas_sorteadas_ordem_sorteio
        } else {
            &self.lista_dezenas
        };

        let drawn_numbers: Vec<u8> = raw
            .iter()
            .map(|s| {
                s.trim()
                    .parse::<u8>()
                    .with_context(|| format!("bad dezena {s:?} in contest {}", self.numero))
            })
            .collect::<Result<_>>()?;

        Ok(Draw {
            contest_number: self.numero,
            draw_date: self.data_apuracao.as_deref().map(normalize_date).unwrap_or_default(),
            drawn_numbers,
            accumulated: self.acumulado,
        })
    }
}

/// Caixa dates arrive as `dd/mm/yyyy`; store them as ISO `yyyy-mm-dd`.
/// Anything unparsable is kept verbatim.
fn normalize_date(raw: &str) -> String {
    match chrono::NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => raw.trim().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the Caixa lottery API.
pub struct CaixaClient {
    http: Client,
    base_url: String,
}

impl CaixaClient {
    /// Create a new client. `base_url` overrides the official endpoint
    /// (used for tests and mirrors).
    pub fn new(base_url: Option<String>, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent("quinalab/0.1.0")
            .build()
            .context("Failed to build HTTP client for Caixa")?;

        Ok(Self {
            http,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    async fn fetch_url(&self, url: &str) -> Result<Draw> {
        debug!(url = %url, "Fetching Caixa result");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("Caixa API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("Caixa API error {status} for {url}");
        }

        let result: CaixaResult = resp
            .json()
            .await
            .context("Failed to parse Caixa response")?;

        result.into_draw()
    }
}

#[async_trait]
impl DrawSource for CaixaClient {
    async fn fetch_latest(&self) -> Result<Draw> {
        self.fetch_url(&self.base_url).await
    }

    async fn fetch_contest(&self, contest_number: u32) -> Result<Draw> {
        let url = format!("{}/{contest_number}", self.base_url);
        self.fetch_url(&url).await
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
