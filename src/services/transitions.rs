use crate::models::booking::RentalStatus;
use crate::models::circuit_booking::CircuitStatus;
use crate::models::excursion_booking::ExcursionStatus;
use crate::services::error::BookingError;

/// Explicit status transition table shared by the three booking kinds.
/// A transition is legal iff its (from, to) pair is listed; everything else,
/// including any move out of a terminal state, is rejected.
pub struct TransitionTable<S> {
    allowed: Vec<(S, S)>,
}

impl<S: Copy + PartialEq> TransitionTable<S> {
    pub fn new(allowed: &[(S, S)]) -> Self {
        Self {
            allowed: allowed.to_vec(),
        }
    }

    pub fn can(&self, from: S, to: S) -> bool {
        self.allowed.iter().any(|&(f, t)| f == from && t == to)
    }

    pub fn check(
        &self,
        from: S,
        to: S,
        name: impl Fn(S) -> &'static str,
    ) -> Result<(), BookingError> {
        if self.can(from, to) {
            Ok(())
        } else {
            Err(BookingError::StatusTransitionNotAllowed {
                from: name(from).to_string(),
                to: name(to).to_string(),
            })
        }
    }
}

pub fn rental_transitions() -> TransitionTable<RentalStatus> {
    use RentalStatus::*;
    TransitionTable::new(&[
        (Pending, Confirmed),
        (Pending, Active),
        (Pending, Canceled),
        (Confirmed, Active),
        (Confirmed, Completed),
        (Confirmed, Canceled),
        (Active, Completed),
        (Active, Canceled),
    ])
}

pub fn circuit_transitions() -> TransitionTable<CircuitStatus> {
    use CircuitStatus::*;
    TransitionTable::new(&[
        (Pending, Confirmed),
        (Pending, Cancelled),
        (Confirmed, Completed),
    ])
}

pub fn excursion_transitions() -> TransitionTable<ExcursionStatus> {
    use ExcursionStatus::*;
    TransitionTable::new(&[
        (Pending, Confirmed),
        (Pending, Cancelled),
        (Confirmed, Cancelled),
        (Confirmed, Completed),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rental_terminal_states_are_closed() {
        let table = rental_transitions();
        for to in [
            RentalStatus::Pending,
            RentalStatus::Confirmed,
            RentalStatus::Active,
            RentalStatus::Completed,
            RentalStatus::Canceled,
        ] {
            assert!(!table.can(RentalStatus::Completed, to));
            assert!(!table.can(RentalStatus::Canceled, to));
        }
    }

    #[test]
    fn circuit_happy_path() {
        let table = circuit_transitions();
        assert!(table.can(CircuitStatus::Pending, CircuitStatus::Confirmed));
        assert!(table.can(CircuitStatus::Confirmed, CircuitStatus::Completed));
        // confirmed circuits cannot be cancelled, only completed
        assert!(!table.can(CircuitStatus::Confirmed, CircuitStatus::Cancelled));
    }

    #[test]
    fn excursion_confirmed_can_still_cancel() {
        let table = excursion_transitions();
        assert!(table.can(ExcursionStatus::Confirmed, ExcursionStatus::Cancelled));
        assert!(!table.can(ExcursionStatus::Cancelled, ExcursionStatus::Pending));
        assert!(!table.can(ExcursionStatus::Completed, ExcursionStatus::Cancelled));
    }

    #[test]
    fn check_reports_the_offending_pair() {
        let table = excursion_transitions();
        let err = table
            .check(
                ExcursionStatus::Completed,
                ExcursionStatus::Cancelled,
                |s| s.as_str(),
            )
            .unwrap_err();
        match err {
            BookingError::StatusTransitionNotAllowed { from, to } => {
                assert_eq!(from, "completed");
                assert_eq!(to, "cancelled");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
