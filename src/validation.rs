//! Expectation handling for negative test operations.

use crate::models::Outcome;

/// Applies the operation's expectation to a raw dispatch outcome.
///
/// For expected-failure operations the verdict is negated and the message
/// states whether the rejection actually happened. Other outcomes pass
/// through unchanged.
pub fn validate(raw: Outcome, expected_to_fail: bool) -> Outcome {
    if !expected_to_fail {
        return raw;
    }

    if raw.succeeded {
        Outcome::failure("expected failure but operation succeeded")
    } else {
        Outcome {
            succeeded: true,
            message: format!("expected failure occurred: {}", raw.message),
        }
    }
}
