use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Cadence d'affichage réelle : frames texte reçues par seconde, sur une
/// fenêtre glissante de `window` arrivées.
///
/// # Example
/// ```
/// use gr_render::fps::FrameRateMeter;
/// let mut meter = FrameRateMeter::new(30);
/// meter.record();
/// assert!(meter.rate() >= 0.0);
/// ```
pub struct FrameRateMeter {
    arrivals: VecDeque<Instant>,
    window: usize,
    rate: f64,
    total: u64,
}

impl FrameRateMeter {
    #[must_use]
    pub fn new(window: usize) -> Self {
        let window = window.max(2);
        Self {
            arrivals: VecDeque::with_capacity(window + 1),
            window,
            rate: 0.0,
            total: 0,
        }
    }

    /// Enregistre une frame affichée maintenant.
    pub fn record(&mut self) {
        self.record_at(Instant::now());
    }

    /// Enregistre une frame affichée à `now`.
    pub fn record_at(&mut self, now: Instant) {
        self.total += 1;
        self.arrivals.push_back(now);
        if self.arrivals.len() > self.window {
            self.arrivals.pop_front();
        }
        if let Some(&first) = self.arrivals.front() {
            let secs = now.saturating_duration_since(first).as_secs_f64();
            if self.arrivals.len() >= 2 && secs > 0.0 {
                self.rate = (self.arrivals.len() - 1) as f64 / secs;
            }
        }
    }

    /// Oublie l'historique (nouvelle session).
    pub fn reset(&mut self) {
        self.arrivals.clear();
        self.rate = 0.0;
        self.total = 0;
    }

    /// Frames/s sur la fenêtre ; 0 si aucune frame depuis `stale`.
    #[must_use]
    pub fn rate_since(&self, now: Instant, stale: Duration) -> f64 {
        match self.arrivals.back() {
            Some(&last) if now.saturating_duration_since(last) <= stale => self.rate,
            _ => 0.0,
        }
    }

    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Frames reçues depuis le dernier reset.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_arrivals_give_their_rate() {
        let start = Instant::now();
        let mut meter = FrameRateMeter::new(10);
        for i in 0..20u64 {
            meter.record_at(start + Duration::from_millis(i * 50));
        }
        assert!((meter.rate() - 20.0).abs() < 0.01, "{}", meter.rate());
        assert_eq!(meter.total(), 20);
    }

    #[test]
    fn stale_meter_reads_zero() {
        let start = Instant::now();
        let mut meter = FrameRateMeter::new(10);
        meter.record_at(start);
        meter.record_at(start + Duration::from_millis(100));
        let later = start + Duration::from_secs(5);
        assert_eq!(meter.rate_since(later, Duration::from_secs(1)), 0.0);
        meter.reset();
        assert_eq!(meter.total(), 0);
        assert_eq!(meter.rate(), 0.0);
    }
}
