//! Blockfrost über HTTPS (esp-idf HTTP-Client, CA-Bundle aus dem IDF).
//! Implementiert ChainDataSource mit begrenztem exponentiellem Backoff.

use std::time::Duration;

use embedded_svc::http::client::Client;
use embedded_svc::http::Method;
use embedded_svc::io::Read;
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

use esp32_ada_pump::blockfrost::{
    self, backoff_delay_ms, AssetState, ChainDataSource, FetchError, Utxo, MAX_RETRIES,
};
use esp32_ada_pump::config;

pub struct BlockfrostClient {
    api_key: &'static str,
}

impl BlockfrostClient {
    pub fn new() -> Self {
        Self {
            api_key: config::BLOCKFROST_API_KEY,
        }
    }

    fn get(&mut self, url: &str) -> Result<(u16, String), FetchError> {
        let connection = EspHttpConnection::new(&Configuration {
            timeout: Some(Duration::from_secs(15)),
            crt_bundle_attach: Some(esp_idf_sys::esp_crt_bundle_attach),
            ..Default::default()
        })
        .map_err(|e| FetchError::Transport(e.to_string()))?;
        let mut client = Client::wrap(connection);

        let headers = [("project_id", self.api_key)];
        let request = client
            .request(Method::Get, url, &headers)
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let mut response = request
            .submit()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = response.status();

        let mut body = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = response
                .read(&mut buf)
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&buf[..n]);
        }
        let body = String::from_utf8(body).map_err(|e| FetchError::BadBody(e.to_string()))?;

        Ok((status, body))
    }

    // 200/404 gehen durch; Transport-/HTTP-Fehler werden mit Backoff
    // wiederholt, kaputte Antwortkörper sofort gemeldet.
    fn get_with_retry(&mut self, url: &str) -> Result<(u16, String), FetchError> {
        let mut attempt = 0;
        loop {
            let err = match self.get(url) {
                Ok((status, body)) if status == 200 || status == 404 => {
                    return Ok((status, body));
                }
                Ok((status, _)) => FetchError::Http(status),
                Err(e) => e,
            };
            if !blockfrost::is_retryable(&err) || attempt >= MAX_RETRIES {
                return Err(err);
            }
            let delay = backoff_delay_ms(attempt);
            log::warn!("{err}; Versuch {} in {delay} ms", attempt + 1);
            std::thread::sleep(Duration::from_millis(delay));
            attempt += 1;
        }
    }
}

impl ChainDataSource for BlockfrostClient {
    fn fetch_utxos(&mut self) -> Result<Vec<Utxo>, FetchError> {
        let url = blockfrost::utxos_url(config::BLOCKFROST_HOST, config::WALLET_ADDRESS);
        let (status, body) = self.get_with_retry(&url)?;
        blockfrost::utxos_from_response(status, &body)
    }

    fn fetch_asset_state(&mut self, asset_unit: &str) -> Result<AssetState, FetchError> {
        let url = blockfrost::asset_txs_url(config::BLOCKFROST_HOST, asset_unit);
        let (status, body) = self.get_with_retry(&url)?;
        if status != 200 {
            return Err(FetchError::Http(status));
        }
        let tx_hash = blockfrost::parse_asset_txs(&body)?;

        let url = blockfrost::tx_utxos_url(config::BLOCKFROST_HOST, &tx_hash);
        let (status, body) = self.get_with_retry(&url)?;
        if status != 200 {
            return Err(FetchError::Http(status));
        }
        let inline_datum = blockfrost::parse_inline_datum(&body)?;

        Ok(AssetState {
            tx_hash,
            inline_datum,
        })
    }
}
