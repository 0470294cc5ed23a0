//! Status-Webseite des Automaten: Guthaben, UTxO-Zahl, Pumpenzustand.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use embedded_svc::http::Method;
use embedded_svc::io::Write;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};

use esp32_ada_pump::config::Status;

pub fn start_web(state: Arc<Mutex<Status>>) -> Result<EspHttpServer<'static>> {
    let cfg = Configuration {
        stack_size: 12 * 1024,
        ..Default::default()
    };
    let mut server = EspHttpServer::new(&cfg)?;

    // --- GET / : UI ---
    server.fn_handler("/", Method::Get, move |req| -> anyhow::Result<()> {
        let headers = [("Content-Type", "text/html; charset=utf-8")];
        let mut resp = req.into_response(200, Some("OK"), &headers)?;
        resp.write_all(INDEX_HTML.as_bytes())?;
        Ok(())
    })?;

    // --- GET /api : JSON status ---
    {
        let state = state.clone();
        server.fn_handler("/api", Method::Get, move |req| -> anyhow::Result<()> {
            let s = state.lock().unwrap().clone();
            let json = format!(
                "{{\"balance_ada\":{:.6},\"utxo_count\":{},\"pump_on\":{},\"remaining_ms\":{},\"last_credit_ada\":{},\"authority_address\":{},\"contract_locked\":{}}}",
                s.balance_ada,
                s.utxo_count,
                s.pump_on,
                s.remaining_ms,
                match s.last_credit_ada {
                    Some(v) => format!("{v:.6}"),
                    None => "null".into(),
                },
                match &s.authority_address {
                    Some(a) => format!("\"{a}\""),
                    None => "null".into(),
                },
                s.contract_locked,
            );
            let headers = [("Content-Type", "application/json")];
            let mut resp = req.into_response(200, Some("OK"), &headers)?;
            resp.write_all(json.as_bytes())?;
            Ok(())
        })?;
    }

    Ok(server)
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="de">
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width,initial-scale=1" />
<title>ESP32 – ADA Automat</title>
<style>
  body { font: 16px/1.4 system-ui, sans-serif; margin: 0; padding: 16px; background:#0b1020; color:#eaeef5; }
  h1 { font-weight: 600; margin: 0 0 12px; }
  .grid { display:grid; gap:12px; grid-template-columns: repeat(auto-fit, minmax(220px,1fr)); }
  .card { background:#111831; border-radius:14px; padding:14px; box-shadow: 0 1px 0 #0008 inset, 0 1px 20px #0006; }
  .kpi { font-size:28px; font-weight:700; margin-top:6px; }
  .addr { font-size:12px; word-break:break-all; opacity:.8; margin-top:8px; }
</style>
<h1>ADA-Automat</h1>

<div class="grid">
  <div class="card">
    <div>Guthaben</div>
    <div id="balance" class="kpi">–</div>
    <div id="utxos" class="addr"></div>
  </div>

  <div class="card">
    <div>Pumpe</div>
    <div id="pump" class="kpi">aus</div>
    <div id="credit" class="addr"></div>
  </div>

  <div class="card">
    <div>Vertrag</div>
    <div id="locked" class="kpi">–</div>
    <div id="authority" class="addr"></div>
  </div>
</div>

<script>
async function refresh() {
  try {
    const d = await (await fetch('/api')).json();
    document.getElementById('balance').textContent = d.balance_ada.toFixed(6) + ' ADA';
    document.getElementById('utxos').textContent = d.utxo_count + ' UTxOs';
    document.getElementById('pump').textContent =
      d.pump_on ? 'läuft, noch ' + (d.remaining_ms / 1000).toFixed(1) + ' s' : 'aus';
    document.getElementById('credit').textContent =
      d.last_credit_ada !== null ? 'letzte Gutschrift: ' + d.last_credit_ada.toFixed(6) + ' ADA' : '';
    document.getElementById('locked').textContent = d.contract_locked ? 'gesperrt' : 'offen';
    document.getElementById('authority').textContent = d.authority_address ?? '';
  } catch (e) { console.log(e); }
}
refresh();
setInterval(refresh, 2000);
</script>
</html>
"#;
