//! Highlight reset timer bookkeeping.

use tokio_util::sync::CancellationToken;

/// A scheduled reset.
#[derive(Debug, Clone)]
pub(crate) struct ResetTicket {
    pub seq: u64,
    pub token: CancellationToken,
}

/// Tracks the one authoritative pending reset.
///
/// Arming a new reset cancels the previous one, so overlapping timers never
/// fight over the fill color.
#[derive(Debug, Default)]
pub(crate) struct HighlightTimer {
    seq: u64,
    pending: Option<ResetTicket>,
}

impl HighlightTimer {
    pub fn arm(&mut self) -> ResetTicket {
        self.cancel();
        self.seq += 1;
        let ticket = ResetTicket {
            seq: self.seq,
            token: CancellationToken::new(),
        };
        self.pending = Some(ticket.clone());
        ticket
    }

    /// Cancels the pending reset. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(ticket) => {
                ticket.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Retires ticket `seq` after its delay elapsed.
    ///
    /// Returns false when a newer reset replaced it in the meantime.
    pub fn complete(&mut self, seq: u64) -> bool {
        match &self.pending {
            Some(ticket) if ticket.seq == seq => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_cancels_previous() {
        let mut timer = HighlightTimer::default();
        let first = timer.arm();
        let second = timer.arm();

        assert!(first.token.is_cancelled());
        assert!(!second.token.is_cancelled());
        assert!(!timer.complete(first.seq));
        assert!(timer.is_pending());
        assert!(timer.complete(second.seq));
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_cancel_reports_pending() {
        let mut timer = HighlightTimer::default();
        assert!(!timer.cancel());

        let ticket = timer.arm();
        assert!(timer.cancel());
        assert!(ticket.token.is_cancelled());
        assert!(!timer.complete(ticket.seq));
    }
}
