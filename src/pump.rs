//! Pumpensteuerung: Zustandsmaschine mit Laufzeit pro ADA.
//! Eine laufende Aktivierung wird durch weitere Gutschriften verlängert,
//! gedeckelt auf PUMP_MAX_DURATION_MS.

use embedded_hal::digital::OutputPin;

use crate::config::{PUMP_MAX_DURATION_MS, PUMP_MIN_DURATION_MS, PUMP_MS_PER_ADA};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PumpState {
    Idle,
    On,
}

pub struct PumpController<P: OutputPin> {
    pin: P,
    state: PumpState,
    /// Aktivierungszeitpunkt; bleibt bei Verlängerungen stehen
    on_since_ms: u64,
    /// Geplante Gesamtlaufzeit ab on_since_ms; 0 im Idle
    total_duration_ms: u64,
}

impl<P: OutputPin> PumpController<P> {
    /// Übernimmt den Pin und stellt sicher, dass die Pumpe aus ist.
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self {
            pin,
            state: PumpState::Idle,
            on_since_ms: 0,
            total_duration_ms: 0,
        }
    }

    fn duration_for(ada: f64) -> u64 {
        let ms = (ada * PUMP_MS_PER_ADA as f64) as u64;
        ms.clamp(PUMP_MIN_DURATION_MS, PUMP_MAX_DURATION_MS)
    }

    /// Gutschrift verbuchen: startet die Pumpe oder verlängert die
    /// laufende Aktivierung um die geklemmte Laufzeit.
    pub fn notify_ada(&mut self, ada: f64, now_ms: u64) {
        let requested = Self::duration_for(ada);
        log::info!("Pumpe: {ada:.2} ADA = {requested} ms");

        match self.state {
            PumpState::Idle => {
                self.state = PumpState::On;
                self.on_since_ms = now_ms;
                self.total_duration_ms = requested;
                let _ = self.pin.set_high();
                log::info!("Pumpe AN");
            }
            PumpState::On => {
                let elapsed = now_ms.saturating_sub(self.on_since_ms);
                let remaining = self.total_duration_ms.saturating_sub(elapsed);
                self.total_duration_ms = (remaining + requested).min(PUMP_MAX_DURATION_MS);
                log::info!("Pumpe verlängert: gesamt {} ms", self.total_duration_ms);
            }
        }
    }

    /// Muss unabhängig von notify_ada regelmäßig laufen; einziger Pfad,
    /// der die Pumpe wieder abschaltet.
    pub fn tick(&mut self, now_ms: u64) {
        if self.state == PumpState::On
            && now_ms.saturating_sub(self.on_since_ms) >= self.total_duration_ms
        {
            self.state = PumpState::Idle;
            self.total_duration_ms = 0;
            let _ = self.pin.set_low();
            log::info!("Pumpe AUS");
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == PumpState::On
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        if self.state != PumpState::On {
            return 0;
        }
        let elapsed = now_ms.saturating_sub(self.on_since_ms);
        self.total_duration_ms.saturating_sub(elapsed)
    }
}
