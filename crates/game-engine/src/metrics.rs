use market_types::Gold;
use metrics::{counter, gauge, histogram};
use std::sync::atomic::{AtomicU64, Ordering};

/// Engine counters, mirrored locally so tests and the demo binary can read them.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    games_created: AtomicU64,
    generation_failures: AtomicU64,
    trades_settled: AtomicU64,
    batches_rejected: AtomicU64,
    gold_volume: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game_created(&self, companies: usize) {
        self.games_created.fetch_add(1, Ordering::Relaxed);
        counter!("games_created_total").increment(1);
        gauge!("last_game_companies").set(companies as f64);
    }

    pub fn record_generation_failure(&self) {
        self.generation_failures.fetch_add(1, Ordering::Relaxed);
        counter!("generation_failures_total").increment(1);
    }

    pub fn record_settlement(&self, trades: usize, volume: Gold) {
        let volume = volume.max(0) as u64;
        self.trades_settled.fetch_add(trades as u64, Ordering::Relaxed);
        self.gold_volume.fetch_add(volume, Ordering::Relaxed);
        counter!("trades_settled_total").increment(trades as u64);
        counter!("gold_volume").increment(volume);
        histogram!("trade_batch_size").record(trades as f64);
    }

    pub fn record_batch_rejected(&self) {
        self.batches_rejected.fetch_add(1, Ordering::Relaxed);
        counter!("trade_batches_rejected_total").increment(1);
    }

    pub fn games_created(&self) -> u64 {
        self.games_created.load(Ordering::Relaxed)
    }

    pub fn generation_failures(&self) -> u64 {
        self.generation_failures.load(Ordering::Relaxed)
    }

    pub fn trades_settled(&self) -> u64 {
        self.trades_settled.load(Ordering::Relaxed)
    }

    pub fn batches_rejected(&self) -> u64 {
        self.batches_rejected.load(Ordering::Relaxed)
    }

    pub fn gold_volume(&self) -> u64 {
        self.gold_volume.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_mirrors() {
        let metrics = EngineMetrics::new();
        metrics.record_game_created(5);
        metrics.record_settlement(3, 1_200);
        metrics.record_settlement(1, 100);
        metrics.record_batch_rejected();

        assert_eq!(metrics.games_created(), 1);
        assert_eq!(metrics.trades_settled(), 4);
        assert_eq!(metrics.gold_volume(), 1_300);
        assert_eq!(metrics.batches_rejected(), 1);
        assert_eq!(metrics.generation_failures(), 0);
    }
}
