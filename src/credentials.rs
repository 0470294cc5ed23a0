// Auto-generiert aus credentials.toml (build.rs) -- nicht von Hand editieren.
pub const WIFI_SSID: &str = "changeme";
pub const WIFI_PASS: &str = "changeme";
pub const BLOCKFROST_API_KEY: &str = "preprodchangeme";
