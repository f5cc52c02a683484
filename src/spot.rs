use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SpotError;

/// Copper has no remote quote source; it is carried at a fixed price.
pub const COPPER_SPOT: f64 = 1.99;

/// Remote symbol for each metal that has a quote source. Copper is
/// deliberately absent.
static REMOTE_SYMBOLS: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| HashMap::from([("gold", "XAU"), ("silver", "XAG")]));

const GOLDAPI_BASE: &str = "https://www.goldapi.io/api";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Current per-ounce prices for the tracked metals. `last_updated` is
/// `None` when freshness is unknown (never resolved, or only the
/// zero-value default was available).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotQuote {
    pub gold: f64,
    pub silver: f64,
    pub copper: f64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl SpotQuote {
    /// The quote of last resort: zero for the remote-quoted metals, the
    /// fixed constant for copper, unknown freshness.
    pub fn offline() -> SpotQuote {
        SpotQuote {
            gold: 0.0,
            silver: 0.0,
            copper: COPPER_SPOT,
            last_updated: None,
        }
    }

    /// Per-ounce price for a metal identifier. Metals outside the tracked
    /// set are valued at zero rather than treated as an error.
    pub fn price_of(&self, metal: &str) -> f64 {
        match metal {
            "gold" => self.gold,
            "silver" => self.silver,
            "copper" => self.copper,
            _ => 0.0,
        }
    }
}

/// A remote source of per-ounce metal prices.
#[async_trait]
pub trait SpotProvider {
    async fn ounce_price(&self, metal: &str) -> Result<f64, SpotError>;
}

/// A snapshot store the resolver can fall back to when the remote source
/// is unreachable. Reads are best-effort; a missing or unparseable
/// snapshot is just an empty tier.
pub trait SpotCache {
    fn read(&self) -> Option<SpotQuote>;
    fn write(&self, quote: &SpotQuote) -> Result<(), SpotError>;
}

#[derive(Debug, Deserialize)]
struct GoldApiQuote {
    price: f64,
}

/// goldapi.io client. One request per metal, authenticated with the
/// account's access token.
pub struct GoldApi {
    client: reqwest::Client,
    api_key: String,
}

impl GoldApi {
    pub fn new(api_key: String) -> GoldApi {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        GoldApi { client, api_key }
    }
}

#[async_trait]
impl SpotProvider for GoldApi {
    async fn ounce_price(&self, metal: &str) -> Result<f64, SpotError> {
        let symbol = REMOTE_SYMBOLS
            .get(metal)
            .ok_or_else(|| SpotError::Unquoted(metal.to_string()))?;

        let url = format!("{GOLDAPI_BASE}/{symbol}/USD");
        let response = self
            .client
            .get(&url)
            .header("x-access-token", &self.api_key)
            .send()
            .await
            .map_err(|e| SpotError::Request {
                metal: metal.to_string(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(SpotError::Status {
                metal: metal.to_string(),
                status: response.status().as_u16(),
            });
        }

        let quote: GoldApiQuote = response.json().await.map_err(|e| SpotError::Request {
            metal: metal.to_string(),
            source: e,
        })?;

        Ok(quote.price)
    }
}

/// Process-local snapshot of the last resolved quote, kept in a small
/// sled database next to the other app data.
pub struct SnapshotDb {
    db: sled::Db,
}

const SNAPSHOT_KEY: &str = "spot";

impl SnapshotDb {
    pub fn open(path: &Path) -> Result<SnapshotDb, SpotError> {
        let db = sled::open(path).map_err(|e| SpotError::Cache(e.to_string()))?;
        Ok(SnapshotDb { db })
    }
}

impl SpotCache for SnapshotDb {
    fn read(&self) -> Option<SpotQuote> {
        let bytes = self.db.get(SNAPSHOT_KEY).ok().flatten()?;
        serde_json::from_slice(&bytes).ok()
    }

    fn write(&self, quote: &SpotQuote) -> Result<(), SpotError> {
        let bytes = serde_json::to_vec(quote).map_err(|e| SpotError::Cache(e.to_string()))?;
        self.db
            .insert(SNAPSHOT_KEY, bytes)
            .map_err(|e| SpotError::Cache(e.to_string()))?;
        // block until the snapshot is stable on disk
        self.db
            .flush()
            .map_err(|e| SpotError::Cache(e.to_string()))?;
        Ok(())
    }
}

/// Human-readable spot price document, shared with anything else that
/// reads or writes the app's data directory.
pub struct SpotFile {
    path: PathBuf,
}

impl SpotFile {
    pub fn new(path: &str) -> SpotFile {
        SpotFile {
            path: PathBuf::from(path),
        }
    }
}

impl SpotCache for SpotFile {
    fn read(&self) -> Option<SpotQuote> {
        let data = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&data).ok()
    }

    fn write(&self, quote: &SpotQuote) -> Result<(), SpotError> {
        let data =
            serde_json::to_string_pretty(quote).map_err(|e| SpotError::Cache(e.to_string()))?;
        std::fs::write(&self.path, data).map_err(|e| SpotError::Cache(e.to_string()))
    }
}

/// Fetch both precious-metal quotes concurrently. The tier fails as a
/// whole if either lookup does; there is no partial success.
async fn fetch_remote(provider: &dyn SpotProvider) -> Result<SpotQuote, SpotError> {
    let (gold, silver) = futures::future::try_join(
        provider.ounce_price("gold"),
        provider.ounce_price("silver"),
    )
    .await?;

    Ok(SpotQuote {
        gold,
        silver,
        copper: COPPER_SPOT,
        last_updated: Some(Utc::now()),
    })
}

/// Resolve current spot prices through the fallback chain:
/// remote quotes, then the local snapshot, then the spot price file,
/// then the zero-value default. Always returns a usable quote.
///
/// A successful remote fetch refreshes both caches; those writes are
/// best-effort and a failure there never invalidates the live result.
pub async fn resolve_spot_prices(
    provider: &dyn SpotProvider,
    snapshot: &dyn SpotCache,
    spot_file: &dyn SpotCache,
) -> SpotQuote {
    match fetch_remote(provider).await {
        Ok(quote) => {
            if let Err(e) = snapshot.write(&quote) {
                warn!("failed to update local spot snapshot: {}", e);
            }
            if let Err(e) = spot_file.write(&quote) {
                warn!("failed to update spot price file: {}", e);
            }
            quote
        }
        Err(e) => {
            warn!("spot price fetch failed, falling back to cached data: {}", e);
            if let Some(quote) = snapshot.read() {
                debug!("using local spot snapshot");
                return quote;
            }
            if let Some(quote) = spot_file.read() {
                debug!("using spot price file");
                return quote;
            }
            SpotQuote::offline()
        }
    }
}
