//! Per-direction debouncing of change notifications.
//!
//! A new change of one direction replaces the pending change of that
//! direction and restarts its window. The debouncer only does timing; the
//! session decides what a ready change means.

use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Which representation a sync cycle updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Source text changed, the visual tree follows
    ToVisual,
    /// Visual tree changed, the source text follows
    ToCode,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::ToVisual => write!(f, "to-visual"),
            Direction::ToCode => write!(f, "to-code"),
        }
    }
}

/// A change whose window has elapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ready {
    Source(String),
    Visual,
}

impl Ready {
    pub fn direction(&self) -> Direction {
        match self {
            Ready::Source(_) => Direction::ToVisual,
            Ready::Visual => Direction::ToCode,
        }
    }
}

#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    source: Option<(Instant, String)>,
    visual: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            source: None,
            visual: None,
        }
    }

    pub fn push_source(&mut self, text: String, now: Instant) {
        self.source = Some((now + self.window, text));
    }

    pub fn push_visual(&mut self, now: Instant) {
        self.visual = Some(now + self.window);
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.visual.is_none()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        let source = self.source.as_ref().map(|(deadline, _)| *deadline);
        match (source, self.visual) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Take the earliest change whose deadline is at or before `now`
    pub fn take_ready(&mut self, now: Instant) -> Option<Ready> {
        let source_due = self.source.as_ref().map(|(deadline, _)| *deadline).filter(|d| *d <= now);
        let visual_due = self.visual.filter(|d| *d <= now);

        match (source_due, visual_due) {
            (Some(s), Some(v)) if v < s => self.take_visual(),
            (Some(_), _) => self.take_source(),
            (None, Some(_)) => self.take_visual(),
            (None, None) => None,
        }
    }

    /// Take every pending change, earliest deadline first
    pub fn drain(&mut self) -> Vec<Ready> {
        let mut ready = Vec::new();
        while let Some(deadline) = self.next_deadline() {
            match self.take_ready(deadline) {
                Some(change) => ready.push(change),
                None => break,
            }
        }
        ready
    }

    fn take_source(&mut self) -> Option<Ready> {
        self.source.take().map(|(_, text)| Ready::Source(text))
    }

    fn take_visual(&mut self) -> Option<Ready> {
        self.visual.take().map(|_| Ready::Visual)
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
