//! UTxO-Monitor: Snapshot-Diff über Poll-Zyklen.
//! Meldet ausschließlich neu aufgetauchte UTxOs; verschwundene (ausgegebene)
//! werden stillschweigend vergessen.

use std::collections::HashSet;

use crate::blockfrost::Utxo;
use crate::config::LOVELACE_PER_ADA;

pub struct UtxoMonitor {
    previous_ids: HashSet<String>,
    total_balance_ada: f64,
    utxo_count: usize,
    first_poll: bool,
}

impl UtxoMonitor {
    pub fn new() -> Self {
        Self {
            previous_ids: HashSet::new(),
            total_balance_ada: 0.0,
            utxo_count: 0,
            first_poll: true,
        }
    }

    fn utxo_id(utxo: &Utxo) -> String {
        format!("{}#{}", utxo.tx_hash, utxo.output_index)
    }

    fn lovelace_to_ada(lovelace: u64) -> f64 {
        lovelace as f64 / LOVELACE_PER_ADA as f64
    }

    /// Diff gegen den letzten Snapshot; liefert neue UTxOs mit ihrem
    /// ADA-Betrag in Ankunftsreihenfolge. Der allererste Poll setzt nur
    /// die Baseline und meldet nichts.
    pub fn refresh(&mut self, utxos: &[Utxo]) -> Vec<(Utxo, f64)> {
        let mut current_ids = HashSet::with_capacity(utxos.len());
        let mut new_utxos = Vec::new();
        let mut total_lovelace: u64 = 0;

        for utxo in utxos {
            let id = Self::utxo_id(utxo);
            total_lovelace += utxo.lovelace;

            if !self.first_poll && !self.previous_ids.contains(&id) {
                new_utxos.push((utxo.clone(), Self::lovelace_to_ada(utxo.lovelace)));
            }
            current_ids.insert(id);
        }

        self.total_balance_ada = Self::lovelace_to_ada(total_lovelace);
        self.utxo_count = utxos.len();

        if self.first_poll {
            log::info!(
                "Startguthaben: {:.6} ADA ({} UTxOs), Überwachung läuft",
                self.total_balance_ada,
                self.utxo_count
            );
            self.first_poll = false;
        }

        self.previous_ids = current_ids;
        new_utxos
    }

    /// Guthaben des letzten Snapshots (keine Historie).
    pub fn total_balance_ada(&self) -> f64 {
        self.total_balance_ada
    }

    pub fn utxo_count(&self) -> usize {
        self.utxo_count
    }
}

impl Default for UtxoMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utxo(tx: &str, index: u32, lovelace: u64) -> Utxo {
        Utxo {
            tx_hash: tx.into(),
            output_index: index,
            lovelace,
        }
    }

    #[test]
    fn first_poll_only_sets_baseline() {
        let mut monitor = UtxoMonitor::new();
        let utxos = [utxo("a", 0, 2_000_000), utxo("b", 1, 3_000_000)];

        assert!(monitor.refresh(&utxos).is_empty());
        assert_eq!(monitor.total_balance_ada(), 5.0);
        assert_eq!(monitor.utxo_count(), 2);

        // identischer zweiter Poll: weiterhin nichts Neues
        assert!(monitor.refresh(&utxos).is_empty());
    }

    #[test]
    fn reports_exactly_the_arrivals() {
        let mut monitor = UtxoMonitor::new();
        monitor.refresh(&[utxo("a", 0, 1_000_000), utxo("b", 1, 1_000_000)]);

        let new = monitor.refresh(&[
            utxo("a", 0, 1_000_000),
            utxo("b", 1, 1_000_000),
            utxo("c", 0, 2_500_000),
        ]);
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].0, utxo("c", 0, 2_500_000));
        assert_eq!(new[0].1, 2.5);
    }

    #[test]
    fn departures_are_not_reported() {
        let mut monitor = UtxoMonitor::new();
        monitor.refresh(&[utxo("a", 0, 1_000_000), utxo("b", 1, 1_000_000)]);

        // b#1 ausgegeben -> kein Event, Guthaben folgt dem Snapshot
        let new = monitor.refresh(&[utxo("a", 0, 1_000_000)]);
        assert!(new.is_empty());
        assert_eq!(monitor.total_balance_ada(), 1.0);
        assert_eq!(monitor.utxo_count(), 1);
    }

    #[test]
    fn same_tx_different_index_is_distinct() {
        let mut monitor = UtxoMonitor::new();
        monitor.refresh(&[utxo("a", 0, 1_000_000)]);

        let new = monitor.refresh(&[utxo("a", 0, 1_000_000), utxo("a", 1, 4_000_000)]);
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].0.output_index, 1);
    }

    #[test]
    fn reappearing_after_departure_counts_as_new() {
        let mut monitor = UtxoMonitor::new();
        monitor.refresh(&[utxo("a", 0, 1_000_000)]);
        monitor.refresh(&[]);

        // nur der unmittelbar vorherige Snapshot zählt
        let new = monitor.refresh(&[utxo("a", 0, 1_000_000)]);
        assert_eq!(new.len(), 1);
    }
}
