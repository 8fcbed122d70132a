//! Single-shot, cancellable auto-advance timer.
//!
//! Each arm hands out a fresh [`Ticket`]. The sleeping task reports its
//! ticket when it wakes; the owner only acts on it if [`AdvanceTimer::take_fired`]
//! confirms the ticket is still the armed one. Cancelling aborts the task and
//! forgets the ticket, so a wake-up that already sits in a channel is inert.

use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Identity of one arming of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Armed {
    ticket: Ticket,
    deadline: Instant,
    task: JoinHandle<()>,
}

#[derive(Default)]
pub struct AdvanceTimer {
    next_ticket: u64,
    armed: Option<Armed>,
}

impl AdvanceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending timer and schedule a new one.
    ///
    /// After `delay`, `on_fire(ticket)` is sent on `tx`.
    pub fn arm<E, F>(&mut self, delay: Duration, tx: mpsc::UnboundedSender<E>, on_fire: F) -> Ticket
    where
        E: Send + 'static,
        F: FnOnce(Ticket) -> E + Send + 'static,
    {
        self.cancel();

        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        let deadline = Instant::now() + delay;

        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = tx.send(on_fire(ticket));
        });

        tracing::trace!(ticket = %ticket, delay_ms = delay.as_millis() as u64, "Advance timer armed");
        self.armed = Some(Armed {
            ticket,
            deadline,
            task,
        });
        ticket
    }

    /// Drop the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(armed) = self.armed.take() {
            armed.task.abort();
            tracing::trace!(ticket = %armed.ticket, "Advance timer cancelled");
        }
    }

    /// Consume a wake-up. Returns `true` only for the currently armed ticket.
    pub fn take_fired(&mut self, ticket: Ticket) -> bool {
        match &self.armed {
            Some(armed) if armed.ticket == ticket => {
                self.armed = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Time left until the armed timer fires.
    pub fn remaining(&self) -> Option<Duration> {
        self.armed
            .as_ref()
            .map(|armed| armed.deadline.saturating_duration_since(Instant::now()))
    }
}

impl Drop for AdvanceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Convert clip seconds into a timer delay, treating garbage as zero.
pub fn delay_from_secs(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        Duration::ZERO
    }
}
