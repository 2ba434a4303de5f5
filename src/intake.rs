use crate::error::{Result, TrackerError};
use crate::format::parse_amount;
use crate::schema::CommissionInput;
use chrono::NaiveDate;

/// Installment counts offered when a commission is recorded.
pub const ALLOWED_INSTALLMENT_COUNTS: [u32; 9] = [1, 2, 3, 4, 5, 6, 12, 18, 24];

/// Raw, unvalidated form values for a new commission.
#[derive(Debug, Clone, Default)]
pub struct CommissionDraft {
    pub description: String,
    pub client_name: String,
    pub total_value: String,
    /// `YYYY-MM-DD`; blank means the sale happened today.
    pub date: String,
    pub installment_count: String,
}

impl CommissionDraft {
    pub fn validate(&self, today: NaiveDate) -> Result<CommissionInput> {
        let description = required("description", &self.description)?;
        let client_name = required("client_name", &self.client_name)?;

        let total_value = parse_amount(&self.total_value).ok_or_else(|| {
            TrackerError::validation(
                "total_value",
                format!("'{}' is not a number", self.total_value.trim()),
            )
        })?;
        if total_value <= 0.0 {
            return Err(TrackerError::validation(
                "total_value",
                format!("must be greater than zero (got {})", total_value),
            ));
        }

        let date = if self.date.trim().is_empty() {
            today
        } else {
            NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
                TrackerError::validation(
                    "date",
                    format!("'{}' is not a YYYY-MM-DD date", self.date.trim()),
                )
            })?
        };

        let installment_count: u32 = self.installment_count.trim().parse().map_err(|_| {
            TrackerError::validation(
                "installment_count",
                format!("'{}' is not a whole number", self.installment_count.trim()),
            )
        })?;
        if !ALLOWED_INSTALLMENT_COUNTS.contains(&installment_count) {
            return Err(TrackerError::validation(
                "installment_count",
                format!(
                    "{} is not one of {:?}",
                    installment_count, ALLOWED_INSTALLMENT_COUNTS
                ),
            ));
        }

        Ok(CommissionInput {
            description,
            client_name,
            total_value,
            date,
            installment_count,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}
