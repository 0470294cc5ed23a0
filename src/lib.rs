//! Kernlogik der Cardano-Vending-Firmware: Adress-Codec, Datum-Decoder,
//! UTxO-Monitor und Pumpensteuerung. Alles hier ist hardwarefrei und
//! läuft in den Host-Tests; esp-idf kommt erst im Binary dazu.

mod credentials; // Auto-generiert aus credentials.toml

pub mod address;
pub mod blockfrost;
pub mod cbor;
pub mod config;
pub mod control;
pub mod datum;
pub mod monitor;
pub mod pump;
