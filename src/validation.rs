use regex::Regex;
use std::sync::LazyLock;

use crate::models::FormDraft;

// local@domain.tld, no whitespace or '@' in local/domain, at least two
// characters after the final dot.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("email regex"));

/// Validate an email address.
///
/// Pure predicate gating prospect creation/update: an invalid email skips
/// the remote call and surfaces a user-facing validation message instead.
/// Never panics.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Wire names of the required-at-submit fields that are currently empty.
///
/// A lead is never created while this is non-empty.
pub fn missing_required_fields(draft: &FormDraft) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if draft.first_name.is_empty() {
        missing.push("firstName");
    }
    if draft.email.is_empty() {
        missing.push("email");
    }
    if draft.phone.is_empty() {
        missing.push("phone");
    }
    if draft.training_goal.is_empty() {
        missing.push("trainingGoal");
    }
    missing
}
