//! Canonical clarification reason codes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClarificationReason {
    MissingService,
    UnsupportedService,
    AmbiguousService,
    MissingDate,
    MissingTime,
    MissingStartDate,
    MissingEndDate,
    MissingDateRange,
    MissingTimeFuzzy,
    PolicyTimeWindow,
    PolicyConstraintOnlyTime,
    MissingContext,
    NeedsClarification,
}

impl ClarificationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ClarificationReason::MissingService => "MISSING_SERVICE",
            ClarificationReason::UnsupportedService => "UNSUPPORTED_SERVICE",
            ClarificationReason::AmbiguousService => "AMBIGUOUS_SERVICE",
            ClarificationReason::MissingDate => "MISSING_DATE",
            ClarificationReason::MissingTime => "MISSING_TIME",
            ClarificationReason::MissingStartDate => "MISSING_START_DATE",
            ClarificationReason::MissingEndDate => "MISSING_END_DATE",
            ClarificationReason::MissingDateRange => "MISSING_DATE_RANGE",
            ClarificationReason::MissingTimeFuzzy => "MISSING_TIME_FUZZY",
            ClarificationReason::PolicyTimeWindow => "POLICY_TIME_WINDOW",
            ClarificationReason::PolicyConstraintOnlyTime => "POLICY_CONSTRAINT_ONLY_TIME",
            ClarificationReason::MissingContext => "MISSING_CONTEXT",
            ClarificationReason::NeedsClarification => "NEEDS_CLARIFICATION",
        }
    }
}

impl std::fmt::Display for ClarificationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
