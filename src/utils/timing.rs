//! Timer de ações com etapas intermediárias.
//!
//! Usado para medir cada otimização (contagem → estratégia) e a chamada de
//! model-assist. Os tempos vão para o log em nível debug.

use std::time::{Duration, Instant};

/// Mede uma ação e, opcionalmente, suas etapas
#[derive(Debug)]
pub struct ActionTimer {
    label: String,
    started: Instant,
    last_lap: Instant,
    laps: Vec<(String, Duration)>,
}

impl ActionTimer {
    pub fn start(label: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            label: label.into(),
            started: now,
            last_lap: now,
            laps: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Tempo desde o início
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Fecha uma etapa: tempo desde a etapa anterior (ou do início)
    pub fn lap(&mut self, phase: impl Into<String>) -> Duration {
        let now = Instant::now();
        let took = now.duration_since(self.last_lap);
        self.last_lap = now;
        self.laps.push((phase.into(), took));
        took
    }

    /// Etapas registradas, em ordem
    pub fn laps(&self) -> &[(String, Duration)] {
        &self.laps
    }

    /// Encerra e loga o total e as etapas
    pub fn stop_and_log(self) -> Duration {
        let total = self.elapsed();
        if self.laps.is_empty() {
            log::debug!("⏱️  {}: {:.1}ms", self.label, ms(total));
        } else {
            let phases = self
                .laps
                .iter()
                .map(|(phase, took)| format!("{} {:.1}ms", phase, ms(*took)))
                .collect::<Vec<_>>()
                .join(", ");
            log::debug!("⏱️  {}: {:.1}ms ({})", self.label, ms(total), phases);
        }
        total
    }
}

fn ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
