//! Referral lifecycle states
//!
//! State IDs are stable and stored in PostgreSQL as SMALLINT.

use std::fmt;

/// Referral lifecycle states
///
/// Success path: PENDING -> SIGNED_UP -> TIER_GRANTED.
/// REJECTED_IP_MATCH is decided once, at creation, never via an update.
/// Terminal states: REJECTED_IP_MATCH (-10), TIER_GRANTED (20).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum ReferralStatus {
    /// Invited user attributed, nothing observed yet
    Pending = 0,

    /// Invited user completed account creation
    SignedUp = 10,

    /// Terminal: invited user showed real engagement, referral counts toward rewards
    TierGranted = 20,

    /// Terminal: creation-time fraud gate tripped (too many referrals from one IP)
    RejectedIpMatch = -10,
}

impl ReferralStatus {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReferralStatus::TierGranted | ReferralStatus::RejectedIpMatch
        )
    }

    /// Get the numeric state ID for PostgreSQL storage
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    /// Convert from PostgreSQL state ID
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(ReferralStatus::Pending),
            10 => Some(ReferralStatus::SignedUp),
            20 => Some(ReferralStatus::TierGranted),
            -10 => Some(ReferralStatus::RejectedIpMatch),
            _ => None,
        }
    }

    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralStatus::Pending => "PENDING",
            ReferralStatus::SignedUp => "SIGNED_UP",
            ReferralStatus::TierGranted => "TIER_GRANTED",
            ReferralStatus::RejectedIpMatch => "REJECTED_IP_MATCH",
        }
    }

    /// Parse from the uppercase wire name
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ReferralStatus::Pending),
            "SIGNED_UP" => Some(ReferralStatus::SignedUp),
            "TIER_GRANTED" => Some(ReferralStatus::TierGranted),
            "REJECTED_IP_MATCH" => Some(ReferralStatus::RejectedIpMatch),
            _ => None,
        }
    }

    /// Check whether advancing to `next` is a legal lifecycle transition.
    ///
    /// REJECTED_IP_MATCH is never a valid target here: it can only be
    /// assigned atomically at creation.
    pub fn can_advance_to(&self, next: ProgressAdvance) -> bool {
        matches!(
            (self, next),
            (ReferralStatus::Pending, ProgressAdvance::SignedUp)
                | (ReferralStatus::SignedUp, ProgressAdvance::TierGranted)
        )
    }
}

impl serde::Serialize for ReferralStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The only two states the update path may target.
///
/// PENDING and REJECTED_IP_MATCH are unrepresentable here, so callers
/// cannot move a record backward or re-run the fraud decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressAdvance {
    SignedUp,
    TierGranted,
}

impl ProgressAdvance {
    /// The status a record must currently hold for this advance to apply
    pub fn expected_prior(&self) -> ReferralStatus {
        match self {
            ProgressAdvance::SignedUp => ReferralStatus::Pending,
            ProgressAdvance::TierGranted => ReferralStatus::SignedUp,
        }
    }

    /// The status this advance writes
    pub fn target(&self) -> ReferralStatus {
        match self {
            ProgressAdvance::SignedUp => ReferralStatus::SignedUp,
            ProgressAdvance::TierGranted => ReferralStatus::TierGranted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(ReferralStatus::TierGranted.is_terminal());
        assert!(ReferralStatus::RejectedIpMatch.is_terminal());

        assert!(!ReferralStatus::Pending.is_terminal());
        assert!(!ReferralStatus::SignedUp.is_terminal());
    }

    #[test]
    fn test_state_id_roundtrip() {
        let states = [
            ReferralStatus::Pending,
            ReferralStatus::SignedUp,
            ReferralStatus::TierGranted,
            ReferralStatus::RejectedIpMatch,
        ];

        for state in states {
            let id = state.id();
            let recovered = ReferralStatus::from_id(id).unwrap();
            assert_eq!(state, recovered);
        }
    }

    #[test]
    fn test_invalid_state_id() {
        assert!(ReferralStatus::from_id(999).is_none());
        assert!(ReferralStatus::from_id(-999).is_none());
    }

    #[test]
    fn test_allowed_transitions() {
        assert!(ReferralStatus::Pending.can_advance_to(ProgressAdvance::SignedUp));
        assert!(ReferralStatus::SignedUp.can_advance_to(ProgressAdvance::TierGranted));

        // Skipping a stage or moving backward is rejected
        assert!(!ReferralStatus::Pending.can_advance_to(ProgressAdvance::TierGranted));
        assert!(!ReferralStatus::SignedUp.can_advance_to(ProgressAdvance::SignedUp));
        assert!(!ReferralStatus::TierGranted.can_advance_to(ProgressAdvance::SignedUp));
        assert!(!ReferralStatus::TierGranted.can_advance_to(ProgressAdvance::TierGranted));
        assert!(!ReferralStatus::RejectedIpMatch.can_advance_to(ProgressAdvance::SignedUp));
        assert!(!ReferralStatus::RejectedIpMatch.can_advance_to(ProgressAdvance::TierGranted));
    }

    #[test]
    fn test_advance_prior_and_target() {
        assert_eq!(
            ProgressAdvance::SignedUp.expected_prior(),
            ReferralStatus::Pending
        );
        assert_eq!(ProgressAdvance::SignedUp.target(), ReferralStatus::SignedUp);
        assert_eq!(
            ProgressAdvance::TierGranted.expected_prior(),
            ReferralStatus::SignedUp
        );
        assert_eq!(
            ProgressAdvance::TierGranted.target(),
            ReferralStatus::TierGranted
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ReferralStatus::Pending.to_string(), "PENDING");
        assert_eq!(
            ReferralStatus::RejectedIpMatch.to_string(),
            "REJECTED_IP_MATCH"
        );
        assert_eq!(
            ReferralStatus::from_str_name("TIER_GRANTED"),
            Some(ReferralStatus::TierGranted)
        );
        assert_eq!(ReferralStatus::from_str_name("pending"), None);
    }
}
