// WiFi/Blockfrost-Secrets kommen aus credentials.toml (build.rs → src/credentials.rs)
pub use crate::credentials::{BLOCKFROST_API_KEY, WIFI_PASS, WIFI_SSID};

/*** Blockchain ***/
pub const BLOCKFROST_HOST: &str = "cardano-preprod.blockfrost.io";
pub const WALLET_ADDRESS: &str = "addr_test1qrfmuzchdsna28wrmna0x8jwfmsyreswaews6v68pm337detpu74wqfm2rcagu4chz3pzua7f42j6f8wn9dewnpm9a6syuwkxr";

// Asset unit = policy_id + hex(asset_name)
pub const ASSET_UNIT: &str = "b6d522ad80c9442b45b3ddfb4b59766c8465212749f76c11e8a619a76c6f636b65725f353337";

// 0 = Testnet (preprod), 1 = Mainnet
pub const NETWORK: u8 = 0;

pub const LOVELACE_PER_ADA: u64 = 1_000_000;

/*** Polling ***/
pub const POLL_INTERVAL_MS: u64 = 10_000;

/*** Pumpe ***/
// 1 ADA = 1 Sekunde Laufzeit, geklemmt auf [MIN, MAX]
pub const PUMP_MS_PER_ADA: u64 = 1_000;
pub const PUMP_MIN_DURATION_MS: u64 = 500;
pub const PUMP_MAX_DURATION_MS: u64 = 60_000;

/*** App-Model ***/
#[derive(Clone, Debug, Default)]
pub struct Status {
    pub balance_ada: f64,
    pub utxo_count: usize,
    pub pump_on: bool,
    pub remaining_ms: u64,
    /// Letzte verbuchte Gutschrift in ADA
    pub last_credit_ada: Option<f64>,
    /// Aus dem Inline-Datum abgeleitete Autoritätsadresse (bech32)
    pub authority_address: Option<String>,
    pub contract_locked: bool,
}
