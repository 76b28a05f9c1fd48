//! Position validation
//!
//! Runs before any lock is taken or any row is read, so a bad request costs
//! nothing but the check itself.

use crate::errors::{OrdoError, Result};

/// Validate a caller-supplied position against the configured ceiling
///
/// # Errors
/// `InvalidPosition` carrying the offending value if it is `<= 0` or `> max_order`
pub fn validate_position(position: i64, max_order: u32) -> Result<u32> {
    if position <= 0 || position > i64::from(max_order) {
        return Err(OrdoError::InvalidPosition {
            position,
            max: max_order,
        });
    }
    // in range 1..=max_order, so it fits
    Ok(position as u32)
}

/// Validate an optional position; `None` means "append" and always passes
///
/// # Errors
/// As [`validate_position`]
pub fn validate_optional_position(position: Option<i64>, max_order: u32) -> Result<Option<u32>> {
    position
        .map(|p| validate_position(p, max_order))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u32 = 1_000_000;

    #[test]
    fn test_accepts_bounds() {
        assert_eq!(validate_position(1, MAX).unwrap(), 1);
        assert_eq!(validate_position(i64::from(MAX), MAX).unwrap(), MAX);
    }

    #[test]
    fn test_rejects_zero() {
        assert_eq!(
            validate_position(0, MAX).unwrap_err(),
            OrdoError::InvalidPosition {
                position: 0,
                max: MAX
            }
        );
    }

    #[test]
    fn test_rejects_negative() {
        assert!(matches!(
            validate_position(-1, MAX),
            Err(OrdoError::InvalidPosition { position: -1, .. })
        ));
    }

    #[test]
    fn test_rejects_above_ceiling() {
        let over = i64::from(MAX) + 1;
        assert!(matches!(
            validate_position(over, MAX),
            Err(OrdoError::InvalidPosition { position, .. }) if position == over
        ));
        assert!(validate_position(i64::MAX, MAX).is_err());
    }

    #[test]
    fn test_none_means_append() {
        assert_eq!(validate_optional_position(None, MAX).unwrap(), None);
        assert_eq!(validate_optional_position(Some(7), MAX).unwrap(), Some(7));
        assert!(validate_optional_position(Some(0), MAX).is_err());
    }
}
