//! Request lifecycle for a single outstanding call
//!
//! `RequestController` drives one call at a time through
//! `Idle -> Pending -> Success | Error`. Every accepted submission gets a
//! [`Ticket`] carrying a generation number; a settlement is applied only when
//! its ticket still matches, so a consumer can discard in-flight results by
//! calling [`RequestController::invalidate`].

use std::fmt;
use std::future::Future;
use tracing::debug;

/// State of the outstanding call
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleState<T> {
    Idle,
    Pending,
    Success(T),
    Error(String),
}

impl<T> LifecycleState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Proof of an accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of applying a settled call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Result was applied to the lifecycle
    Applied,
    /// Ticket no longer current; result dropped
    Stale,
}

/// Outcome of [`RequestController::submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// A call was already pending; nothing was dispatched
    Rejected,
    /// The call ran and settled
    Settled(Settlement),
}

/// Drives exactly one outstanding call
#[derive(Debug)]
pub struct RequestController<T> {
    state: LifecycleState<T>,
    generation: u64,
}

impl<T> Default for RequestController<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RequestController<T> {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Idle,
            generation: 0,
        }
    }

    pub fn state(&self) -> &LifecycleState<T> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Move to `Pending` and issue a ticket, unless a call is already pending
    pub fn begin(&mut self) -> Option<Ticket> {
        if self.state.is_pending() {
            debug!("Submission rejected: request {} still pending", self.generation);
            return None;
        }

        self.generation += 1;
        self.state = LifecycleState::Pending;
        debug!("Request {} pending", self.generation);

        Some(Ticket {
            generation: self.generation,
        })
    }

    /// Apply the result of the call identified by `ticket`
    pub fn settle<E: fmt::Display>(&mut self, ticket: Ticket, result: Result<T, E>) -> Settlement {
        if ticket.generation != self.generation || !self.state.is_pending() {
            debug!(
                "Dropping stale result for request {} (current {})",
                ticket.generation, self.generation
            );
            return Settlement::Stale;
        }

        self.state = match result {
            Ok(payload) => {
                debug!("Request {} succeeded", ticket.generation);
                LifecycleState::Success(payload)
            }
            Err(e) => {
                debug!("Request {} failed: {}", ticket.generation, e);
                LifecycleState::Error(e.to_string())
            }
        };

        Settlement::Applied
    }

    /// Begin, await `call`, and settle
    ///
    /// `call` is only polled when the submission is accepted.
    pub async fn submit<F, E>(&mut self, call: F) -> Submission
    where
        F: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let Some(ticket) = self.begin() else {
            return Submission::Rejected;
        };

        let result = call.await;
        Submission::Settled(self.settle(ticket, result))
    }

    /// Return a settled lifecycle to `Idle`, handing back its final state
    ///
    /// A pending lifecycle is left untouched.
    pub fn acknowledge(&mut self) -> Option<LifecycleState<T>> {
        if self.state.is_pending() || self.state.is_idle() {
            return None;
        }
        Some(std::mem::replace(&mut self.state, LifecycleState::Idle))
    }

    /// Forget any outstanding call; its eventual result becomes stale
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.state = LifecycleState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let controller: RequestController<u32> = RequestController::new();
        assert_eq!(controller.state(), &LifecycleState::Idle);
    }

    #[test]
    fn test_begin_rejected_while_pending() {
        let mut controller: RequestController<u32> = RequestController::new();

        let first = controller.begin();
        assert!(first.is_some());
        assert!(controller.is_pending());

        let second = controller.begin();
        assert!(second.is_none());
        assert!(controller.is_pending());
    }

    #[test]
    fn test_settle_success_and_error() {
        let mut controller: RequestController<u32> = RequestController::new();

        let ticket = controller.begin().unwrap();
        assert_eq!(controller.settle::<String>(ticket, Ok(7)), Settlement::Applied);
        assert_eq!(controller.state(), &LifecycleState::Success(7));

        let ticket = controller.begin().unwrap();
        assert!(controller.is_pending(), "resubmit resets Success back to Pending");
        assert_eq!(
            controller.settle(ticket, Err("boom")),
            Settlement::Applied
        );
        assert_eq!(controller.state(), &LifecycleState::Error("boom".to_string()));
    }

    #[test]
    fn test_ticket_can_only_settle_once() {
        let mut controller: RequestController<u32> = RequestController::new();

        let ticket = controller.begin().unwrap();
        controller.settle::<String>(ticket, Ok(1));

        assert_eq!(controller.settle::<String>(ticket, Ok(2)), Settlement::Stale);
        assert_eq!(controller.state(), &LifecycleState::Success(1));
    }

    #[test]
    fn test_invalidate_makes_in_flight_result_stale() {
        let mut controller: RequestController<u32> = RequestController::new();

        let old = controller.begin().unwrap();
        controller.invalidate();
        assert!(controller.state().is_idle());

        let current = controller.begin().unwrap();
        assert!(current.generation() > old.generation());

        assert_eq!(controller.settle::<String>(old, Ok(1)), Settlement::Stale);
        assert!(controller.is_pending());

        assert_eq!(controller.settle::<String>(current, Ok(2)), Settlement::Applied);
        assert_eq!(controller.state(), &LifecycleState::Success(2));
    }

    #[test]
    fn test_acknowledge_returns_to_idle() {
        let mut controller: RequestController<u32> = RequestController::new();
        assert!(controller.acknowledge().is_none());

        let ticket = controller.begin().unwrap();
        assert!(controller.acknowledge().is_none(), "pending is not acknowledged");

        controller.settle(ticket, Err("offline"));
        assert_eq!(
            controller.acknowledge(),
            Some(LifecycleState::Error("offline".to_string()))
        );
        assert!(controller.state().is_idle());
    }

    #[tokio::test]
    async fn test_submit_runs_call() {
        let mut controller: RequestController<u32> = RequestController::new();

        let outcome = controller.submit(async { Ok::<_, String>(42) }).await;

        assert_eq!(outcome, Submission::Settled(Settlement::Applied));
        assert_eq!(controller.state(), &LifecycleState::Success(42));
    }

    #[tokio::test]
    async fn test_submit_while_pending_never_polls_call() {
        let mut controller: RequestController<u32> = RequestController::new();
        let _ticket = controller.begin().unwrap();

        let mut polled = false;
        let outcome = controller
            .submit(async {
                polled = true;
                Ok::<_, String>(1)
            })
            .await;

        assert_eq!(outcome, Submission::Rejected);
        assert!(!polled);
        assert!(controller.is_pending());
    }
}
