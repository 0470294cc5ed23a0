//! Blockfrost-Anbindung: DTOs, Antwort-Parsing, URL-Aufbau und
//! Retry-Politik. Der eigentliche HTTP-Transport steckt im Binary
//! (net.rs) hinter dem ChainDataSource-Trait.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub tx_hash: String,
    pub output_index: u32,
    pub lovelace: u64,
}

/// Jüngste Transaktion des Assets samt Inline-Datum ihres ersten Outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetState {
    pub tx_hash: String,
    pub inline_datum: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Http(u16),
    #[error("transport: {0}")]
    Transport(String),
    #[error("bad response body: {0}")]
    BadBody(String),
    #[error("no transactions for asset")]
    NoTransactions,
    #[error("no inline datum in outputs")]
    NoInlineDatum,
}

/// Abstrakte Datenquelle der Kette; das Binary liefert die
/// Blockfrost-HTTPS-Implementierung, Tests eine Attrappe.
pub trait ChainDataSource {
    /// Alle unverbrauchten Outputs der Wallet-Adresse.
    /// HTTP 404 gilt als leere Liste (Adresse schlicht unbenutzt).
    fn fetch_utxos(&mut self) -> Result<Vec<Utxo>, FetchError>;

    fn fetch_asset_state(&mut self, asset_unit: &str) -> Result<AssetState, FetchError>;
}

pub const MAX_RETRIES: u32 = 3;
pub const BASE_RETRY_DELAY_MS: u64 = 1_000;

/// Exponentielles Backoff: 1 s, 2 s, 4 s, ...
pub fn backoff_delay_ms(attempt: u32) -> u64 {
    BASE_RETRY_DELAY_MS << attempt
}

pub fn utxos_url(host: &str, address: &str) -> String {
    format!("https://{host}/api/v0/addresses/{address}/utxos?count=100&page=1&order=asc")
}

pub fn asset_txs_url(host: &str, asset_unit: &str) -> String {
    format!("https://{host}/api/v0/assets/{asset_unit}/transactions?order=desc&count=1")
}

pub fn tx_utxos_url(host: &str, tx_hash: &str) -> String {
    format!("https://{host}/api/v0/txs/{tx_hash}/utxos")
}

// --- Antwort-DTOs ---

#[derive(Deserialize)]
struct UtxoEntry {
    tx_hash: String,
    output_index: u32,
    amount: Vec<Amount>,
}

#[derive(Deserialize)]
struct Amount {
    unit: String,
    quantity: String,
}

#[derive(Deserialize)]
struct AssetTx {
    tx_hash: String,
}

#[derive(Deserialize)]
struct TxUtxos {
    outputs: Vec<TxOutput>,
}

#[derive(Deserialize)]
struct TxOutput {
    inline_datum: Option<String>,
}

/// Antwort von /addresses/{addr}/utxos: pro Output den Lovelace-Eintrag
/// aus der Asset-Liste herausziehen. Fehlt der Eintrag, zählt der Output
/// mit 0; eine vorhandene, aber unlesbare Menge ist ein Fehler.
pub fn parse_utxos(body: &str) -> Result<Vec<Utxo>, FetchError> {
    let entries: Vec<UtxoEntry> =
        serde_json::from_str(body).map_err(|e| FetchError::BadBody(e.to_string()))?;

    entries
        .into_iter()
        .map(|entry| {
            let lovelace = match entry.amount.iter().find(|a| a.unit == "lovelace") {
                Some(a) => a.quantity.parse().map_err(|_| {
                    FetchError::BadBody(format!("lovelace quantity {:?}", a.quantity))
                })?,
                None => 0,
            };
            Ok(Utxo {
                tx_hash: entry.tx_hash,
                output_index: entry.output_index,
                lovelace,
            })
        })
        .collect()
}

/// Auswertung der UTxO-Antwort inklusive HTTP-Status:
/// 404 heißt leere Liste (Adresse schlicht noch unbenutzt).
pub fn utxos_from_response(status: u16, body: &str) -> Result<Vec<Utxo>, FetchError> {
    match status {
        404 => Ok(Vec::new()),
        200 => parse_utxos(body),
        other => Err(FetchError::Http(other)),
    }
}

/// Nur Transport- und HTTP-Fehler lohnen einen neuen Versuch; ein
/// kaputter Antwortkörper bleibt auch beim nächsten Mal kaputt.
pub fn is_retryable(err: &FetchError) -> bool {
    matches!(err, FetchError::Http(_) | FetchError::Transport(_))
}

/// Antwort von /assets/{unit}/transactions: Hash der jüngsten Transaktion.
pub fn parse_asset_txs(body: &str) -> Result<String, FetchError> {
    let txs: Vec<AssetTx> =
        serde_json::from_str(body).map_err(|e| FetchError::BadBody(e.to_string()))?;
    txs.into_iter()
        .next()
        .map(|tx| tx.tx_hash)
        .ok_or(FetchError::NoTransactions)
}

/// Antwort von /txs/{hash}/utxos: Inline-Datum des ersten Outputs
/// (gleiche Auswahl wie der Monitor im Vertrags-Repo).
pub fn parse_inline_datum(body: &str) -> Result<String, FetchError> {
    let tx: TxUtxos = serde_json::from_str(body).map_err(|e| FetchError::BadBody(e.to_string()))?;
    tx.outputs
        .first()
        .and_then(|out| out.inline_datum.clone())
        .ok_or(FetchError::NoInlineDatum)
}
