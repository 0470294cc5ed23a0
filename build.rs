use std::{env, fs, path::Path};

fn main() {
    // embuild nur für das ESP-Target, Host-Builds (Tests) brauchen es nicht
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::build::CfgArgs::output_propagated("ESP_IDF").unwrap();
        embuild::espidf::sysenv::output();
    }

    println!("cargo:rerun-if-changed=credentials.toml");
    println!("cargo:rerun-if-changed=sdkconfig.defaults");

    // credentials.toml -> src/credentials.rs
    // Fehlt die Datei, bleiben die eingecheckten Platzhalter stehen.
    if let Ok(raw) = fs::read_to_string("credentials.toml") {
        let get = |key: &str| -> String {
            raw.lines()
                .filter_map(|l| l.split_once('='))
                .find(|(k, _)| k.trim() == key)
                .map(|(_, v)| v.trim().trim_matches('"').to_string())
                .unwrap_or_default()
        };

        let generated = format!(
            "// Auto-generiert aus credentials.toml (build.rs) -- nicht von Hand editieren.\n\
             pub const WIFI_SSID: &str = {:?};\n\
             pub const WIFI_PASS: &str = {:?};\n\
             pub const BLOCKFROST_API_KEY: &str = {:?};\n",
            get("wifi_ssid"),
            get("wifi_pass"),
            get("blockfrost_api_key"),
        );

        let dest = Path::new("src").join("credentials.rs");
        if fs::read_to_string(&dest).ok().as_deref() != Some(generated.as_str()) {
            fs::write(&dest, generated).expect("credentials.rs schreiben");
        }
    }
}
