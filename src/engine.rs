use crate::schema::{Commission, CommissionInput, Installment, InstallmentStatus};
use crate::utils::add_months;
use chrono::NaiveDate;
use log::{debug, info};
use uuid::Uuid;

/// Splits a new commission into equal monthly installments.
///
/// The first installment is due on the sale date and each following one a
/// calendar month later (see [`add_months`] for short-month clamping). Every
/// installment receives `total_value / installment_count`; no remainder is
/// redistributed, so the parts may differ from the total by float rounding.
///
/// The input is trusted: validation belongs to the intake side.
pub fn derive_installments(input: &CommissionInput) -> (Commission, Vec<Installment>) {
    let commission = Commission {
        id: Uuid::new_v4(),
        description: input.description.clone(),
        client_name: input.client_name.clone(),
        total_value: input.total_value,
        date: input.date,
        installment_count: input.installment_count,
    };

    let installment_value = input.total_value / input.installment_count as f64;

    let installments: Vec<Installment> = (1..=input.installment_count)
        .map(|number| Installment {
            id: Uuid::new_v4(),
            commission_id: commission.id,
            number,
            total_installments: input.installment_count,
            value: installment_value,
            // Only unreachable far-future dates overflow.
            due_date: add_months(input.date, number - 1).unwrap_or(NaiveDate::MAX),
            status: InstallmentStatus::Pending,
        })
        .collect();

    info!(
        "Derived {} installments of {:.2} for commission {} ({})",
        installments.len(),
        installment_value,
        commission.id,
        commission.client_name
    );

    (commission, installments)
}

/// Flips the status of the installment with `id` between paid and pending.
///
/// Returns `false` and leaves the list untouched when no installment matches.
pub fn toggle_status(installments: &mut [Installment], id: Uuid) -> bool {
    match installments.iter_mut().find(|inst| inst.id == id) {
        Some(installment) => {
            installment.status = installment.status.toggled();
            debug!(
                "Installment {} ({}/{}) is now {:?}",
                installment.id,
                installment.number,
                installment.total_installments,
                installment.status
            );
            true
        }
        None => {
            debug!("Toggle ignored: no installment with id {}", id);
            false
        }
    }
}
