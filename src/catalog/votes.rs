//! Vote resolution
//!
//! Voting the same direction twice clears the vote; voting the other
//! direction overwrites it. The score of an alternative is the sum of its
//! signed votes.

use serde::{Deserialize, Serialize};

use crate::types::OpenAltError;

/// A single signed vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    pub fn as_i32(self) -> i32 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }
}

impl TryFrom<i32> for VoteValue {
    type Error = OpenAltError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteValue::Up),
            -1 => Ok(VoteValue::Down),
            other => Err(OpenAltError::bad_request(format!(
                "Vote value must be 1 or -1, got {other}"
            ))),
        }
    }
}

impl From<VoteValue> for i32 {
    fn from(value: VoteValue) -> Self {
        value.as_i32()
    }
}

/// What to store after a user votes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Remove the user's vote
    Cleared,
    /// Store this vote, replacing any previous one
    Cast(VoteValue),
}

impl VoteOutcome {
    /// The user's vote after the outcome is applied
    pub fn user_vote(self) -> Option<VoteValue> {
        match self {
            VoteOutcome::Cleared => None,
            VoteOutcome::Cast(v) => Some(v),
        }
    }
}

/// Decide the new vote given the stored one and the requested one
pub fn resolve_vote(existing: Option<VoteValue>, requested: VoteValue) -> VoteOutcome {
    match existing {
        Some(current) if current == requested => VoteOutcome::Cleared,
        _ => VoteOutcome::Cast(requested),
    }
}

/// Sum of signed votes
pub fn score<I>(votes: I) -> i64
where
    I: IntoIterator<Item = VoteValue>,
{
    votes.into_iter().map(|v| i64::from(v.as_i32())).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_vote_is_cast() {
        assert_eq!(resolve_vote(None, VoteValue::Up), VoteOutcome::Cast(VoteValue::Up));
    }

    #[test]
    fn test_same_vote_clears() {
        assert_eq!(resolve_vote(Some(VoteValue::Down), VoteValue::Down), VoteOutcome::Cleared);
    }

    #[test]
    fn test_opposite_vote_overwrites() {
        assert_eq!(
            resolve_vote(Some(VoteValue::Up), VoteValue::Down),
            VoteOutcome::Cast(VoteValue::Down)
        );
    }

    #[test]
    fn test_toggle_twice_returns_to_zero() {
        let first = resolve_vote(None, VoteValue::Up);
        let second = resolve_vote(first.user_vote(), VoteValue::Up);
        assert_eq!(second.user_vote(), None);
        assert_eq!(score(second.user_vote()), 0);
    }

    #[test]
    fn test_score_sums_signed_votes() {
        let votes = [VoteValue::Up, VoteValue::Up, VoteValue::Down, VoteValue::Up];
        assert_eq!(score(votes), 2);
        assert_eq!(score(Vec::<VoteValue>::new()), 0);
    }

    #[test]
    fn test_json_values() {
        let v: VoteValue = serde_json::from_str("-1").unwrap();
        assert_eq!(v, VoteValue::Down);
        assert!(serde_json::from_str::<VoteValue>("2").is_err());
        assert_eq!(serde_json::to_string(&VoteValue::Up).unwrap(), "1");
    }
}
