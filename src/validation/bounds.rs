use chrono::NaiveDateTime;

use crate::error::RangeError;

/// Check that `[start, end]` strictly contains the observed departure days.
///
/// Unlike the configuration clamps this rejects instead of adjusting.
pub fn validate_bounds(
    start: NaiveDateTime,
    end: NaiveDateTime,
    observed_min: NaiveDateTime,
    observed_max: NaiveDateTime,
) -> Result<(), RangeError> {
    if start >= observed_min {
        return Err(RangeError::StartNotBeforeWindow {
            start,
            observed_min,
        });
    }
    if end <= observed_max {
        return Err(RangeError::EndNotAfterWindow { end, observed_max });
    }
    Ok(())
}
