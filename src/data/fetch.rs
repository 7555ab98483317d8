use crate::data::coordinator::{Completion, FetchMode, FetchOutcome, FetchRequest};
use crate::error::{Error, Result};
use reqwest::Client;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

// Upstream rate-limits clients that don't look like a browser.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Issues quote requests and reports each result as a [`Completion`].
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    endpoint: String,
}

impl Fetcher {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(Error::Config("endpoint is empty".to_string()));
        }

        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn url_for(&self, symbol: &str) -> String {
        format!("{}/{}", self.endpoint, symbol)
    }

    /// Spawns one task per request. Each task only performs I/O and sends its
    /// completion back; state is updated by whoever drains `tx`.
    pub fn dispatch(&self, requests: Vec<FetchRequest>, tx: &UnboundedSender<Completion>) {
        for request in requests {
            let fetcher = self.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = match fetcher.get(&request.symbol, request.mode).await {
                    Ok((status, body)) => FetchOutcome::Response { status, body },
                    Err(e) => FetchOutcome::Failed(e.to_string()),
                };
                debug!(
                    symbol = %request.symbol,
                    generation = request.generation.0,
                    slot = request.slot,
                    "request finished"
                );
                // A closed receiver means the app is shutting down.
                let _ = tx.send(Completion {
                    generation: request.generation,
                    slot: request.slot,
                    outcome,
                });
            });
        }
    }

    async fn get(&self, symbol: &str, mode: FetchMode) -> Result<(u16, Vec<u8>)> {
        let mut req = self.client.get(self.url_for(symbol));
        if let FetchMode::Chart { range, interval } = mode {
            req = req.query(&[("interval", interval), ("range", range)]);
        }

        let res = req.send().await?;
        let status = res.status().as_u16();
        let body = res.bytes().await?;

        Ok((status, body.to_vec()))
    }
}
