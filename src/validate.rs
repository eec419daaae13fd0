//! Shared validation policy consumed by every engine entry point.

use chrono::NaiveDate;

use crate::error::EngineError;

/// Validation rules shared by all engine operations.
///
/// One policy object instead of per-call-site checks; every entry point runs
/// its inputs through here before touching state.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValidationPolicy;

impl ValidationPolicy {
    /// Reject blank or whitespace-only identifiers.
    pub fn require_id(&self, field: &str, value: &str) -> Result<(), EngineError> {
        if value.trim().is_empty() {
            return Err(EngineError::Validation(format!("{} must not be blank", field)));
        }
        Ok(())
    }

    /// Reject inverted availability windows.
    pub fn require_window(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<(), EngineError> {
        if end_date < start_date {
            return Err(EngineError::Validation(format!(
                "availability window ends ({}) before it starts ({})",
                end_date, start_date
            )));
        }
        Ok(())
    }

    /// Reject negative or non-finite prices.
    pub fn require_price(&self, price: f64) -> Result<(), EngineError> {
        if !price.is_finite() || price < 0.0 {
            return Err(EngineError::Validation(format!(
                "price must be a non-negative number, got {}",
                price
            )));
        }
        Ok(())
    }

    /// Reject blank text bodies (titles, comments).
    pub fn require_text(&self, field: &str, value: &str) -> Result<(), EngineError> {
        if value.trim().is_empty() {
            return Err(EngineError::Validation(format!("{} must not be empty", field)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn blank_id_rejected() {
        let policy = ValidationPolicy;
        assert!(policy.require_id("item_id", "  ").is_err());
        assert!(policy.require_id("item_id", "item-1").is_ok());
    }

    #[test]
    fn inverted_window_rejected() {
        let policy = ValidationPolicy;
        assert!(policy
            .require_window(day(2025, 6, 30), day(2025, 6, 1))
            .is_err());
        assert!(policy
            .require_window(day(2025, 6, 1), day(2025, 6, 1))
            .is_ok());
    }

    #[test]
    fn bad_price_rejected() {
        let policy = ValidationPolicy;
        assert!(policy.require_price(-1.0).is_err());
        assert!(policy.require_price(f64::NAN).is_err());
        assert!(policy.require_price(0.0).is_ok());
    }
}
