use crate::utils::flexible_date;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentStatus {
    #[schemars(description = "Expected but not yet received")]
    Pending,

    #[schemars(description = "Marked as received by the user")]
    Paid,

    /// Reserved. Nothing in the crate assigns it; toggling it yields `Paid`.
    #[schemars(description = "Reserved for late payments; never assigned automatically")]
    Overdue,
}

impl InstallmentStatus {
    /// `Paid` flips back to `Pending`; any other status becomes `Paid`.
    pub fn toggled(self) -> Self {
        match self {
            InstallmentStatus::Paid => InstallmentStatus::Pending,
            InstallmentStatus::Pending | InstallmentStatus::Overdue => InstallmentStatus::Paid,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InstallmentStatus::Pending => "Pendente",
            InstallmentStatus::Paid => "Pago",
            InstallmentStatus::Overdue => "Atrasado",
        }
    }
}

impl Default for InstallmentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A recorded sale whose total is paid out over `installment_count` months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub id: Uuid,

    #[schemars(description = "Free-text label for the sale")]
    pub description: String,

    pub client_name: String,

    #[schemars(description = "Full commission owed, strictly positive")]
    pub total_value: f64,

    #[serde(with = "flexible_date")]
    #[schemars(with = "NaiveDate", description = "Sale date in YYYY-MM-DD format")]
    pub date: NaiveDate,

    #[schemars(description = "Number of monthly installments, at least 1")]
    pub installment_count: u32,
}

impl Commission {
    /// Semantic checks the type system can't express. `None` means the record is sound.
    pub fn integrity_problem(&self) -> Option<String> {
        if !self.total_value.is_finite() || self.total_value <= 0.0 {
            return Some(format!(
                "commission {} has non-positive total value {}",
                self.id, self.total_value
            ));
        }
        if self.installment_count == 0 {
            return Some(format!("commission {} has zero installments", self.id));
        }
        None
    }
}

/// One scheduled portion of a commission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub id: Uuid,

    #[schemars(description = "Id of the owning commission (lookup only)")]
    pub commission_id: Uuid,

    #[schemars(description = "1-based position within the commission")]
    pub number: u32,

    #[schemars(description = "Copy of the commission's installment count")]
    pub total_installments: u32,

    pub value: f64,

    #[serde(with = "flexible_date")]
    #[schemars(
        with = "NaiveDate",
        description = "Expected payment date in YYYY-MM-DD format"
    )]
    pub due_date: NaiveDate,

    #[serde(default)]
    pub status: InstallmentStatus,
}

impl Installment {
    pub fn is_paid(&self) -> bool {
        self.status == InstallmentStatus::Paid
    }

    pub fn integrity_problem(&self) -> Option<String> {
        if !self.value.is_finite() {
            return Some(format!("installment {} has non-finite value", self.id));
        }
        if self.number == 0 || self.number > self.total_installments {
            return Some(format!(
                "installment {} is numbered {}/{}",
                self.id, self.number, self.total_installments
            ));
        }
        None
    }
}

/// What the intake side hands to the derivation engine. Trusted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionInput {
    pub description: String,
    pub client_name: String,
    pub total_value: f64,
    #[serde(with = "flexible_date")]
    #[schemars(with = "NaiveDate")]
    pub date: NaiveDate,
    pub installment_count: u32,
}

/// Both persisted slots, as one document. Used for schema export only.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoredData {
    #[schemars(description = "Contents of the commissions slot")]
    pub commissions: Vec<Commission>,

    #[schemars(description = "Contents of the installments slot")]
    pub installments: Vec<Installment>,
}

impl StoredData {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(StoredData)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
