//! Dashboard numbers derived from the installment list.
//!
//! Nothing here is cached: every function recomputes from the slice it is
//! given, and the date-relative views take "today" as an explicit argument.

use crate::format::month_label;
use crate::schema::{Installment, InstallmentStatus};
use crate::utils::{months_between, MonthKey};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// Months before the current one covered by the cash-flow window.
pub const CASH_FLOW_MONTHS_BEFORE: i32 = 3;
/// Months after the current one covered by the cash-flow window.
pub const CASH_FLOW_MONTHS_AFTER: i32 = 6;
pub const CASH_FLOW_LEN: usize = (CASH_FLOW_MONTHS_BEFORE + 1 + CASH_FLOW_MONTHS_AFTER) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SummaryStats {
    /// Sum of every installment.
    pub total_expected: f64,
    /// Sum of paid installments.
    pub total_received: f64,
    /// Sum of installments due in the current month.
    pub month_revenue: f64,
    /// Sum of pending installments due in the current month.
    pub month_pending: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlowPoint {
    pub month: MonthKey,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGroup<'a> {
    pub month: MonthKey,
    pub label: String,
    pub installments: Vec<&'a Installment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStats {
    pub month: MonthKey,
    pub label: String,
    pub total_expected: f64,
    pub total_received: f64,
    /// Everything not yet paid, including the reserved overdue status.
    pub total_pending: f64,
}

pub fn summarize(installments: &[Installment], today: NaiveDate) -> SummaryStats {
    let current = MonthKey::of(today);

    let total_expected = installments.iter().map(|i| i.value).sum();
    let total_received = installments
        .iter()
        .filter(|i| i.status == InstallmentStatus::Paid)
        .map(|i| i.value)
        .sum();
    let month_revenue = installments
        .iter()
        .filter(|i| current.contains(i.due_date))
        .map(|i| i.value)
        .sum();
    let month_pending = installments
        .iter()
        .filter(|i| current.contains(i.due_date) && i.status == InstallmentStatus::Pending)
        .map(|i| i.value)
        .sum();

    SummaryStats {
        total_expected,
        total_received,
        month_revenue,
        month_pending,
    }
}

/// Totals per month for the window `-3..=+6` months around `today`.
///
/// Always returns [`CASH_FLOW_LEN`] points in chronological order, zero-filled
/// where nothing is due. Installments outside the window are left out.
pub fn cash_flow_series(installments: &[Installment], today: NaiveDate) -> Vec<CashFlowPoint> {
    let current = MonthKey::of(today);

    let mut points: Vec<CashFlowPoint> = (-CASH_FLOW_MONTHS_BEFORE..=CASH_FLOW_MONTHS_AFTER)
        .map(|delta| {
            let month = current.offset(delta);
            CashFlowPoint {
                month,
                label: month_label(month),
                value: 0.0,
            }
        })
        .collect();

    let mut dropped = 0usize;
    for installment in installments {
        let delta = months_between(today, installment.due_date);
        if (-CASH_FLOW_MONTHS_BEFORE..=CASH_FLOW_MONTHS_AFTER).contains(&delta) {
            points[(delta + CASH_FLOW_MONTHS_BEFORE) as usize].value += installment.value;
        } else {
            dropped += 1;
        }
    }

    debug!(
        "Cash-flow window {}..{}: {} installments outside",
        current.offset(-CASH_FLOW_MONTHS_BEFORE),
        current.offset(CASH_FLOW_MONTHS_AFTER),
        dropped
    );

    points
}

/// Groups every installment by due month, oldest month first.
///
/// Within a group installments are ordered by due date; ties keep their
/// original relative order.
pub fn group_by_month(installments: &[Installment]) -> Vec<MonthGroup<'_>> {
    let mut sorted: Vec<&Installment> = installments.iter().collect();
    sorted.sort_by_key(|i| i.due_date);

    let mut groups: Vec<MonthGroup<'_>> = Vec::new();
    for installment in sorted {
        let month = MonthKey::of(installment.due_date);
        match groups.last_mut() {
            Some(group) if group.month == month => group.installments.push(installment),
            _ => groups.push(MonthGroup {
                month,
                label: month_label(month),
                installments: vec![installment],
            }),
        }
    }

    groups
}

/// Expected/received/pending totals for every month that has installments.
pub fn monthly_stats(installments: &[Installment]) -> Vec<MonthlyStats> {
    let mut by_month: BTreeMap<MonthKey, MonthlyStats> = BTreeMap::new();

    for installment in installments {
        let month = MonthKey::of(installment.due_date);
        let stats = by_month.entry(month).or_insert_with(|| MonthlyStats {
            month,
            label: month_label(month),
            total_expected: 0.0,
            total_received: 0.0,
            total_pending: 0.0,
        });

        stats.total_expected += installment.value;
        if installment.is_paid() {
            stats.total_received += installment.value;
        } else {
            stats.total_pending += installment.value;
        }
    }

    by_month.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn installment(value: f64, due_date: NaiveDate, status: InstallmentStatus) -> Installment {
        Installment {
            id: Uuid::new_v4(),
            commission_id: Uuid::new_v4(),
            number: 1,
            total_installments: 1,
            value,
            due_date,
            status,
        }
    }

    #[test]
    fn test_empty_list() {
        let today = date(2024, 6, 10);
        assert_eq!(summarize(&[], today), SummaryStats::default());

        let series = cash_flow_series(&[], today);
        assert_eq!(series.len(), CASH_FLOW_LEN);
        assert!(series.iter().all(|p| p.value == 0.0));

        assert!(group_by_month(&[]).is_empty());
        assert!(monthly_stats(&[]).is_empty());
    }

    #[test]
    fn test_summary_stats() {
        let today = date(2024, 6, 10);
        let list = vec![
            installment(100.0, date(2024, 6, 1), InstallmentStatus::Paid),
            installment(200.0, date(2024, 6, 30), InstallmentStatus::Pending),
            installment(50.0, date(2024, 6, 15), InstallmentStatus::Overdue),
            installment(400.0, date(2024, 7, 1), InstallmentStatus::Pending),
            installment(800.0, date(2023, 6, 10), InstallmentStatus::Paid),
        ];

        let stats = summarize(&list, today);
        assert_eq!(stats.total_expected, 1550.0);
        assert_eq!(stats.total_received, 900.0);
        assert_eq!(stats.month_revenue, 350.0);
        // Overdue is neither paid nor pending.
        assert_eq!(stats.month_pending, 200.0);
        assert!(stats.total_received <= stats.total_expected);
    }

    #[test]
    fn test_cash_flow_window_bounds() {
        let today = date(2024, 1, 20);
        let list = vec![
            installment(10.0, date(2023, 10, 5), InstallmentStatus::Paid),
            installment(20.0, date(2023, 9, 30), InstallmentStatus::Paid),
            installment(30.0, date(2024, 1, 1), InstallmentStatus::Pending),
            installment(35.0, date(2024, 1, 31), InstallmentStatus::Pending),
            installment(40.0, date(2024, 7, 31), InstallmentStatus::Pending),
            installment(50.0, date(2024, 8, 1), InstallmentStatus::Pending),
        ];

        let series = cash_flow_series(&list, today);
        assert_eq!(series.len(), 10);
        assert_eq!(series[0].month, MonthKey::new(2023, 10));
        assert_eq!(series[0].label, "Outubro 2023");
        assert_eq!(series[0].value, 10.0);
        assert_eq!(series[3].month, MonthKey::new(2024, 1));
        assert_eq!(series[3].value, 65.0);
        assert_eq!(series[9].month, MonthKey::new(2024, 7));
        assert_eq!(series[9].value, 40.0);

        for pair in series.windows(2) {
            assert_eq!(pair[0].month.offset(1), pair[1].month);
        }

        let windowed: f64 = series.iter().map(|p| p.value).sum();
        assert_eq!(windowed, 115.0);
        // Out-of-window installments still count in the scalar totals.
        assert_eq!(summarize(&list, today).total_expected, 185.0);
    }

    #[test]
    fn test_cash_flow_shifts_with_today() {
        let list = vec![installment(10.0, date(2024, 1, 5), InstallmentStatus::Pending)];

        let january = cash_flow_series(&list, date(2024, 1, 1));
        let april = cash_flow_series(&list, date(2024, 4, 1));
        assert_eq!(january[3].value, 10.0);
        assert_eq!(april[0].value, 10.0);
        assert!(cash_flow_series(&list, date(2024, 5, 1))
            .iter()
            .all(|p| p.value == 0.0));
    }

    #[test]
    fn test_grouping_is_total_and_sorted() {
        let list = vec![
            installment(1.0, date(2024, 3, 20), InstallmentStatus::Pending),
            installment(2.0, date(2023, 1, 2), InstallmentStatus::Pending),
            installment(3.0, date(2024, 3, 5), InstallmentStatus::Paid),
            installment(4.0, date(2030, 12, 1), InstallmentStatus::Pending),
            installment(5.0, date(2024, 3, 5), InstallmentStatus::Pending),
        ];

        let groups = group_by_month(&list);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Janeiro 2023", "Março 2024", "Dezembro 2030"]);

        let count: usize = groups.iter().map(|g| g.installments.len()).sum();
        assert_eq!(count, list.len());

        let march: Vec<f64> = groups[1].installments.iter().map(|i| i.value).collect();
        assert_eq!(march, vec![3.0, 5.0, 1.0]);
        for group in &groups {
            assert!(group
                .installments
                .windows(2)
                .all(|w| w[0].due_date <= w[1].due_date));
        }
    }

    #[test]
    fn test_monthly_stats_partition() {
        let list = vec![
            installment(100.0, date(2024, 2, 1), InstallmentStatus::Paid),
            installment(60.0, date(2024, 2, 28), InstallmentStatus::Pending),
            installment(40.0, date(2024, 1, 15), InstallmentStatus::Overdue),
        ];

        let stats = monthly_stats(&list);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].month, MonthKey::new(2024, 1));
        assert_eq!(stats[0].total_pending, 40.0);
        assert_eq!(stats[1].label, "Fevereiro 2024");
        assert_eq!(stats[1].total_expected, 160.0);
        assert_eq!(stats[1].total_received, 100.0);
        assert_eq!(stats[1].total_pending, 60.0);
    }
}
