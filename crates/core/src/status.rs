//! Contract status and the lifecycle transition table.
//!
//! The table is pure data: a fixed slice of `(from, to)` pairs. Any status
//! that never appears as a source has an empty allowed set, so adding a new
//! variant never makes it reachable by accident.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    Created,
    Approved,
    Sent,
    Signed,
    Locked,
    Revoked,
}

/// Every legal `(from, to)` move. Nothing else is reachable.
pub const VALID_TRANSITIONS: &[(Status, Status)] = &[
    (Status::Created, Status::Approved),
    (Status::Created, Status::Revoked),
    (Status::Approved, Status::Sent),
    (Status::Approved, Status::Revoked),
    (Status::Sent, Status::Signed),
    (Status::Sent, Status::Revoked),
    (Status::Signed, Status::Locked),
];

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Created,
        Status::Approved,
        Status::Sent,
        Status::Signed,
        Status::Locked,
        Status::Revoked,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Created => "Created",
            Status::Approved => "Approved",
            Status::Sent => "Sent",
            Status::Signed => "Signed",
            Status::Locked => "Locked",
            Status::Revoked => "Revoked",
        }
    }

    /// Locked and Revoked accept no further mutation of any kind.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Locked | Status::Revoked)
    }

    /// Allowed destinations from this status, in table order.
    pub fn allowed_transitions(self) -> Vec<Status> {
        VALID_TRANSITIONS
            .iter()
            .filter(|(from, _)| *from == self)
            .map(|(_, to)| *to)
            .collect()
    }

    pub fn can_transition_to(self, next: Status) -> bool {
        VALID_TRANSITIONS.contains(&(self, next))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CoreError;

    /// Exact, case-sensitive match on the canonical names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

/// Check a requested move without touching any contract.
///
/// Terminality is checked first so callers get a distinct diagnostic for
/// "this contract is finished" versus "that move is not in the table".
/// Unknown tokens and self-transitions fall out as `InvalidTransition`.
pub fn validate_transition(from: Status, requested: &str) -> Result<Status, CoreError> {
    if from.is_terminal() {
        return Err(CoreError::TerminalState {
            status: from,
            requested: requested.to_string(),
        });
    }
    let invalid = || CoreError::InvalidTransition {
        from,
        to: requested.to_string(),
    };
    let next: Status = requested.parse().map_err(|_| invalid())?;
    if from.can_transition_to(next) {
        Ok(next)
    } else {
        Err(invalid())
    }
}
