use super::CoreError;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// lifecycle of a unit of work in the progress ledger.
///
/// valid transitions:
///   - `Pending -> Running`
///   - `Running -> Completed | Error`
///   - `Running -> Running` (a run that crashed mid-unit is restarted)
///   - `Error -> Running` (a failed unit is re-attempted)
///
/// `Completed` is terminal: a completed unit is never scheduled again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    Pending,
    Running,
    Completed,
    Error,
}

impl ProgressStatus {
    pub const ALL: [ProgressStatus; 4] = [
        ProgressStatus::Pending,
        ProgressStatus::Running,
        ProgressStatus::Completed,
        ProgressStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Pending => "PENDING",
            ProgressStatus::Running => "RUNNING",
            ProgressStatus::Completed => "COMPLETED",
            ProgressStatus::Error => "ERROR",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressStatus::Completed | ProgressStatus::Error)
    }

    /// tests whether a ledger row in this status may be moved to `next`.
    pub fn can_transition_to(&self, next: &ProgressStatus) -> bool {
        use ProgressStatus as S;
        matches!(
            (self, next),
            (S::Pending, S::Pending)
                | (S::Pending, S::Running)
                | (S::Running, S::Running)
                | (S::Running, S::Completed)
                | (S::Running, S::Error)
                | (S::Error, S::Running)
        )
    }
}

impl Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProgressStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(ProgressStatus::Pending),
            "RUNNING" => Ok(ProgressStatus::Running),
            "COMPLETED" => Ok(ProgressStatus::Completed),
            "ERROR" => Ok(ProgressStatus::Error),
            _ => Err(CoreError::UnknownStatus(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProgressStatus as S;

    #[test]
    fn test_completed_is_final() {
        for next in S::ALL {
            assert!(!S::Completed.can_transition_to(&next), "COMPLETED -> {next}");
        }
    }

    #[test]
    fn test_forward_transitions() {
        assert!(S::Pending.can_transition_to(&S::Running));
        assert!(S::Running.can_transition_to(&S::Completed));
        assert!(S::Running.can_transition_to(&S::Error));
        assert!(S::Error.can_transition_to(&S::Running));
        assert!(!S::Pending.can_transition_to(&S::Completed));
        assert!(!S::Error.can_transition_to(&S::Completed));
    }

    #[test]
    fn test_round_trip_str() {
        for status in S::ALL {
            let parsed: S = status.as_str().parse().expect("should parse");
            assert_eq!(parsed, status);
        }
        assert!("DONE".parse::<S>().is_err());
    }
}
