//! OrderLifecycle - status state machine
//!
//! ```text
//! PENDING ──advance──▶ IN_PREPARATION ──advance──▶ IN_TRANSIT ──advance──▶ DELIVERED
//!    │                      │                          │
//!    └──────cancel──────────┴──────────cancel──────────┘
//!                           ▼
//!                       CANCELED ──resume──▶ PENDING
//!                           │
//!                           └──purge──▶ (removed)
//! ```
//!
//! Every transition is an explicit administrative action. An action that
//! does not apply to the current status is an error, never a no-op.

use shared::order::{LifecycleAction, OrderStatus};
use thiserror::Error;

/// Outcome of a valid lifecycle action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Persist the new status
    To(OrderStatus),
    /// Permanently delete the order
    Purge,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Cannot {action} an order that is {status}")]
pub struct LifecycleError {
    pub action: LifecycleAction,
    pub status: OrderStatus,
}

/// Resolve `action` against `status`
pub fn apply(status: OrderStatus, action: LifecycleAction) -> Result<Transition, LifecycleError> {
    use LifecycleAction::*;
    use OrderStatus::*;

    let next = match (action, status) {
        (Advance, Pending) => Transition::To(InPreparation),
        (Advance, InPreparation) => Transition::To(InTransit),
        (Advance, InTransit) => Transition::To(Delivered),
        (Cancel, Pending | InPreparation | InTransit) => Transition::To(Canceled),
        (Resume, Canceled) => Transition::To(Pending),
        (Purge, Canceled) => Transition::Purge,
        _ => return Err(LifecycleError { action, status }),
    };
    Ok(next)
}

/// Actions accepted from `status`, in display order
pub fn available_actions(status: OrderStatus) -> Vec<LifecycleAction> {
    [
        LifecycleAction::Advance,
        LifecycleAction::Cancel,
        LifecycleAction::Resume,
        LifecycleAction::Purge,
    ]
    .into_iter()
    .filter(|action| apply(status, *action).is_ok())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use LifecycleAction::*;
    use OrderStatus::*;

    #[test]
    fn test_advance_walks_the_happy_path() {
        let mut status = Pending;
        let mut path = vec![status];
        while let Ok(Transition::To(next)) = apply(status, Advance) {
            status = next;
            path.push(status);
        }
        assert_eq!(path, vec![Pending, InPreparation, InTransit, Delivered]);
    }

    #[test]
    fn test_advance_on_terminal_states_errors() {
        for status in [Delivered, Canceled] {
            let err = apply(status, Advance).unwrap_err();
            assert_eq!(err, LifecycleError { action: Advance, status });
        }
    }

    #[test]
    fn test_cancel_only_from_open_states() {
        for status in OrderStatus::ALL {
            let result = apply(status, Cancel);
            if status.is_open() {
                assert_eq!(result, Ok(Transition::To(Canceled)), "{status}");
            } else {
                assert!(result.is_err(), "{status}");
            }
        }
    }

    #[test]
    fn test_resume_and_purge_only_from_canceled() {
        for status in OrderStatus::ALL {
            if status == Canceled {
                assert_eq!(apply(status, Resume), Ok(Transition::To(Pending)));
                assert_eq!(apply(status, Purge), Ok(Transition::Purge));
            } else {
                assert!(apply(status, Resume).is_err(), "{status}");
                assert!(apply(status, Purge).is_err(), "{status}");
            }
        }
    }

    #[test]
    fn test_resume_restarts_from_pending() {
        // Canceled while in transit, resumed: starts over
        let Ok(Transition::To(canceled)) = apply(InTransit, Cancel) else {
            panic!("cancel from IN_TRANSIT must succeed");
        };
        assert_eq!(apply(canceled, Resume), Ok(Transition::To(Pending)));
    }

    #[test]
    fn test_delivered_accepts_nothing() {
        assert!(available_actions(Delivered).is_empty());
        assert_eq!(available_actions(Canceled), vec![Resume, Purge]);
        assert_eq!(available_actions(Pending), vec![Advance, Cancel]);
    }

    #[test]
    fn test_error_message() {
        let err = apply(Delivered, Cancel).unwrap_err();
        assert_eq!(err.to_string(), "Cannot cancel an order that is DELIVERED");
    }
}
