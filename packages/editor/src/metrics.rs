use crate::debounce::Direction;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_LATENCY_BUDGET: Duration = Duration::from_millis(100);

/// Counters kept by a sync session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetrics {
    pub to_visual_cycles: u64,
    pub to_code_cycles: u64,
    /// Source changes dropped because they matched the last synced text
    pub skipped_echoes: u64,
    pub aborted_cycles: u64,
    pub last_cycle: Option<Duration>,
    total_cycle_time: Duration,
}

impl SyncMetrics {
    pub fn cycles(&self) -> u64 {
        self.to_visual_cycles + self.to_code_cycles
    }

    pub fn average_cycle(&self) -> Option<Duration> {
        let cycles = u32::try_from(self.cycles()).ok().filter(|n| *n > 0)?;
        Some(self.total_cycle_time / cycles)
    }

    pub(crate) fn record_cycle(&mut self, direction: Direction, elapsed: Duration, budget: Duration) {
        match direction {
            Direction::ToVisual => self.to_visual_cycles += 1,
            Direction::ToCode => self.to_code_cycles += 1,
        }
        self.last_cycle = Some(elapsed);
        self.total_cycle_time += elapsed;

        if elapsed > budget {
            warn!(
                %direction,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = budget.as_millis() as u64,
                "Sync cycle exceeded latency budget"
            );
        }
    }

    pub(crate) fn record_echo(&mut self) {
        self.skipped_echoes += 1;
    }

    pub(crate) fn record_abort(&mut self) {
        self.aborted_cycles += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_cycle() {
        let mut metrics = SyncMetrics::default();
        assert_eq!(metrics.average_cycle(), None);

        let budget = DEFAULT_LATENCY_BUDGET;
        metrics.record_cycle(Direction::ToVisual, Duration::from_millis(10), budget);
        metrics.record_cycle(Direction::ToCode, Duration::from_millis(30), budget);
        metrics.record_echo();

        assert_eq!(metrics.cycles(), 2);
        assert_eq!(metrics.average_cycle(), Some(Duration::from_millis(20)));
        assert_eq!(metrics.last_cycle, Some(Duration::from_millis(30)));
        assert_eq!(metrics.skipped_echoes, 1);
    }
}
