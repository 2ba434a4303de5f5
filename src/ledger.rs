use crate::aggregation::{
    cash_flow_series, group_by_month, monthly_stats, summarize, CashFlowPoint, MonthlyStats,
    SummaryStats,
};
use crate::engine::{derive_installments, toggle_status};
use crate::error::Result;
use crate::format::{format_currency, format_date};
use crate::schema::{Commission, CommissionInput, Installment};
use crate::storage::{
    load_commissions, load_installments, save_commissions, save_installments, KeyValueStore,
};
use crate::utils::MonthKey;
use chrono::{Local, NaiveDate};
use log::info;
use serde::Serialize;
use uuid::Uuid;

/// The complete application state: every commission and every installment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommissionLedger {
    /// Newest first.
    pub commissions: Vec<Commission>,
    /// In creation order; each commission's installments are contiguous.
    pub installments: Vec<Installment>,
}

/// One row of the statement view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementLine<'a> {
    pub installment: &'a Installment,
    /// `None` when the owning commission can't be found.
    pub description: Option<&'a str>,
    pub client_name: Option<&'a str>,
}

impl StatementLine<'_> {
    /// e.g. `João Silva • Parcela 2/4 • 15/02/2024`
    pub fn detail(&self) -> String {
        let position = format!(
            "Parcela {}/{}",
            self.installment.number, self.installment.total_installments
        );
        let date = format_date(self.installment.due_date);
        match self.client_name {
            Some(client) => format!("{} • {} • {}", client, position, date),
            None => format!("{} • {}", position, date),
        }
    }

    pub fn amount(&self) -> String {
        format_currency(self.installment.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementMonth<'a> {
    pub month: MonthKey,
    pub label: String,
    pub lines: Vec<StatementLine<'a>>,
}

impl CommissionLedger {
    pub fn new(commissions: Vec<Commission>, installments: Vec<Installment>) -> Self {
        Self {
            commissions,
            installments,
        }
    }

    /// Derives the installments for `input` and records both sides.
    pub fn add_commission(&mut self, input: &CommissionInput) -> &Commission {
        let (commission, installments) = derive_installments(input);
        self.commissions.insert(0, commission);
        self.installments.extend(installments);
        &self.commissions[0]
    }

    pub fn toggle_installment_status(&mut self, id: Uuid) -> bool {
        toggle_status(&mut self.installments, id)
    }

    pub fn commission(&self, id: Uuid) -> Option<&Commission> {
        self.commissions.iter().find(|c| c.id == id)
    }

    pub fn installment(&self, id: Uuid) -> Option<&Installment> {
        self.installments.iter().find(|i| i.id == id)
    }

    pub fn installments_of(&self, commission_id: Uuid) -> impl Iterator<Item = &Installment> {
        self.installments
            .iter()
            .filter(move |i| i.commission_id == commission_id)
    }

    pub fn summary(&self, today: NaiveDate) -> SummaryStats {
        summarize(&self.installments, today)
    }

    pub fn cash_flow(&self, today: NaiveDate) -> Vec<CashFlowPoint> {
        cash_flow_series(&self.installments, today)
    }

    pub fn monthly_stats(&self) -> Vec<MonthlyStats> {
        monthly_stats(&self.installments)
    }

    /// Every installment grouped by due month, joined to its commission.
    pub fn statement(&self) -> Vec<StatementMonth<'_>> {
        group_by_month(&self.installments)
            .into_iter()
            .map(|group| StatementMonth {
                month: group.month,
                label: group.label,
                lines: group
                    .installments
                    .into_iter()
                    .map(|installment| {
                        let commission = self.commission(installment.commission_id);
                        StatementLine {
                            installment,
                            description: commission.map(|c| c.description.as_str()),
                            client_name: commission.map(|c| c.client_name.as_str()),
                        }
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Owns the ledger and mirrors it to a store after every change.
pub struct CommissionTracker<S: KeyValueStore> {
    ledger: CommissionLedger,
    store: S,
}

impl<S: KeyValueStore> CommissionTracker<S> {
    /// Loads both slots; anything missing or malformed starts out empty.
    pub fn open(store: S) -> Self {
        let ledger = CommissionLedger::new(load_commissions(&store), load_installments(&store));
        info!(
            "Opened tracker with {} commissions and {} installments",
            ledger.commissions.len(),
            ledger.installments.len()
        );
        Self { ledger, store }
    }

    pub fn ledger(&self) -> &CommissionLedger {
        &self.ledger
    }

    /// Records the commission in memory, then persists both lists.
    ///
    /// The in-memory change stands even if saving fails. Installments are
    /// written first, so a partial save leaves at worst orphan installments.
    pub fn add_commission(&mut self, input: &CommissionInput) -> Result<Commission> {
        let commission = self.ledger.add_commission(input).clone();
        self.save()?;
        Ok(commission)
    }

    /// Returns `Ok(false)` without touching the store when `id` is unknown.
    pub fn toggle_installment_status(&mut self, id: Uuid) -> Result<bool> {
        if !self.ledger.toggle_installment_status(id) {
            return Ok(false);
        }
        save_installments(&self.store, &self.ledger.installments)?;
        Ok(true)
    }

    pub fn save(&self) -> Result<()> {
        save_installments(&self.store, &self.ledger.installments)?;
        save_commissions(&self.store, &self.ledger.commissions)
    }

    pub fn summary(&self) -> SummaryStats {
        self.ledger.summary(today())
    }

    pub fn cash_flow(&self) -> Vec<CashFlowPoint> {
        self.ledger.cash_flow(today())
    }
}

/// The local wall-clock date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::InstallmentStatus;
    use crate::error::TrackerError;
    use crate::storage::{MemoryStore, COMMISSIONS_KEY};

    /// Accepts every slot except the commissions one.
    #[derive(Default)]
    struct CommissionsReadOnly {
        inner: MemoryStore,
    }

    impl KeyValueStore for CommissionsReadOnly {
        fn read(&self, key: &str) -> Result<Option<String>> {
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &str) -> Result<()> {
            if key == COMMISSIONS_KEY {
                return Err(TrackerError::Storage("disk full".to_string()));
            }
            self.inner.write(key, value)
        }
    }

    fn input(client: &str, total_value: f64, date: NaiveDate, count: u32) -> CommissionInput {
        CommissionInput {
            description: format!("Venda para {}", client),
            client_name: client.to_string(),
            total_value,
            date,
            installment_count: count,
        }
    }

    #[test]
    fn test_add_commission_prepends_and_appends() {
        let mut ledger = CommissionLedger::default();
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let first = ledger.add_commission(&input("Ana", 300.0, d, 3)).id;
        let second = ledger.add_commission(&input("Bruno", 100.0, d, 1)).id;

        assert_eq!(ledger.commissions[0].id, second);
        assert_eq!(ledger.commissions[1].id, first);
        assert_eq!(ledger.installments.len(), 4);
        assert_eq!(ledger.installments[3].commission_id, second);
        assert_eq!(ledger.installments_of(first).count(), 3);
    }

    #[test]
    fn test_statement_joins_commissions() {
        let mut ledger = CommissionLedger::default();
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        ledger.add_commission(&input("Ana", 1200.0, d, 4));

        let mut orphan = ledger.installments[0].clone();
        orphan.id = Uuid::new_v4();
        orphan.commission_id = Uuid::new_v4();
        ledger.installments.push(orphan);

        let statement = ledger.statement();
        assert_eq!(statement.len(), 4);
        assert_eq!(statement[0].label, "Janeiro 2024");
        assert_eq!(statement[0].lines.len(), 2);

        let line = &statement[1].lines[0];
        assert_eq!(line.client_name, Some("Ana"));
        assert_eq!(line.detail(), "Ana • Parcela 2/4 • 15/02/2024");
        assert_eq!(line.amount(), "R$\u{a0}300,00");

        let orphan_line = statement[0]
            .lines
            .iter()
            .find(|l| l.description.is_none())
            .expect("orphan line present");
        assert_eq!(orphan_line.detail(), "Parcela 1/4 • 15/01/2024");
    }

    #[test]
    fn test_partial_save_never_strands_a_commission() {
        let store = CommissionsReadOnly::default();
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        {
            let mut tracker = CommissionTracker::open(&store);
            assert!(tracker.add_commission(&input("Ana", 300.0, d, 3)).is_err());
            assert_eq!(tracker.ledger().commissions.len(), 1);
        }

        let reopened = CommissionTracker::open(&store);
        let ledger = reopened.ledger();
        assert!(ledger.commissions.is_empty());
        assert_eq!(ledger.installments.len(), 3);

        let lines: usize = ledger.statement().iter().map(|m| m.lines.len()).sum();
        assert_eq!(lines, 3);
        assert!(ledger
            .statement()
            .iter()
            .flat_map(|m| m.lines.iter())
            .all(|l| l.client_name.is_none()));
    }

    #[test]
    fn test_tracker_persists_mutations() {
        let store = MemoryStore::new();
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let installment_id = {
            let mut tracker = CommissionTracker::open(&store);
            tracker.add_commission(&input("Ana", 200.0, d, 2)).unwrap();
            let id = tracker.ledger().installments[0].id;
            assert!(tracker.toggle_installment_status(id).unwrap());
            assert!(!tracker.toggle_installment_status(Uuid::new_v4()).unwrap());
            id
        };

        let reopened = CommissionTracker::open(&store);
        assert_eq!(reopened.ledger().commissions.len(), 1);
        assert_eq!(reopened.ledger().installments.len(), 2);
        assert_eq!(
            reopened.ledger().installment(installment_id).map(|i| i.status),
            Some(InstallmentStatus::Paid)
        );
    }
}
