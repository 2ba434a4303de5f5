//! # Commission Tracker
//!
//! Turns commission sales into monthly installment schedules and derives the
//! dashboard numbers a salesperson paid in installments needs.
//!
//! ## Core Concepts
//!
//! - **Commission**: one sale, with a total value split over N months
//! - **Installment**: one scheduled portion, due on the sale's day-of-month
//!   (clamped to the month's last day), either pending or paid
//! - **Dashboard**: expected / received totals, the current month's revenue,
//!   a 10-month cash-flow window and a month-by-month statement
//! - **Persistence**: both lists live in string-keyed JSON slots; bad data
//!   loads as empty instead of failing
//!
//! ## Example
//!
//! ```rust,ignore
//! use commission_tracker::*;
//! use chrono::NaiveDate;
//!
//! let mut tracker = CommissionTracker::open(MemoryStore::new());
//!
//! let input = CommissionDraft {
//!     description: "Consultoria de Marketing".to_string(),
//!     client_name: "João Silva".to_string(),
//!     total_value: "1.200,00".to_string(),
//!     date: "2024-01-15".to_string(),
//!     installment_count: "4".to_string(),
//! }
//! .validate(today())?;
//!
//! tracker.add_commission(&input)?;
//!
//! let stats = tracker.ledger().summary(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
//! assert_eq!(stats.total_expected, 1200.0);
//! assert_eq!(stats.month_revenue, 300.0);
//! ```

pub mod aggregation;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod insight;
pub mod intake;
pub mod ledger;
pub mod schema;
pub mod storage;
pub mod utils;

#[cfg(feature = "gemini")]
pub mod llm;

pub use aggregation::*;
pub use config::TrackerConfig;
pub use engine::{derive_installments, toggle_status};
pub use error::{Result, TrackerError};
pub use format::*;
pub use insight::{build_insight_prompt, InsightService, TextGenerator, INSIGHT_FALLBACK};
pub use intake::{CommissionDraft, ALLOWED_INSTALLMENT_COUNTS};
pub use ledger::*;
pub use schema::*;
pub use storage::{
    load_commissions, load_installments, save_commissions, save_installments, stored_schema,
    JsonFileStore, KeyValueStore, MemoryStore, COMMISSIONS_KEY, INSTALLMENTS_KEY,
};
pub use utils::*;

use log::info;

/// Opens a tracker on the JSON-file store described by `config`.
pub fn open_tracker(config: &TrackerConfig) -> Result<CommissionTracker<JsonFileStore>> {
    let store = config.open_store()?;
    info!("Using data directory {}", store.dir().display());
    Ok(CommissionTracker::open(store))
}
