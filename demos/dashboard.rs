use chrono::NaiveDate;
use commission_tracker::*;
use std::error::Error;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let today = NaiveDate::from_ymd_opt(2024, 2, 10).ok_or("invalid demo date")?;
    let mut tracker = CommissionTracker::open(MemoryStore::new());

    let drafts = [
        ("Consultoria de Marketing", "João Silva", "1.200,00", "2024-01-15", "4"),
        ("Licença de software", "Empresa X", "2400", "2024-01-31", "6"),
        ("Treinamento", "Ana Costa", "R$ 450,90", "", "1"),
    ];

    for (description, client_name, total_value, date, installment_count) in drafts {
        let draft = CommissionDraft {
            description: description.to_string(),
            client_name: client_name.to_string(),
            total_value: total_value.to_string(),
            date: date.to_string(),
            installment_count: installment_count.to_string(),
        };
        let input = draft.validate(today)?;
        tracker.add_commission(&input)?;
    }

    let first_id = tracker.ledger().installments[0].id;
    tracker.toggle_installment_status(first_id)?;

    let ledger = tracker.ledger();
    let stats = ledger.summary(today);
    println!("=== Resumo ({}) ===", format_date(today));
    println!("Total previsto:  {}", format_currency(stats.total_expected));
    println!("Total recebido:  {}", format_currency(stats.total_received));
    println!("Receita do mês:  {}", format_currency(stats.month_revenue));
    println!("Pendente do mês: {}", format_currency(stats.month_pending));

    println!("\n=== Fluxo de caixa ===");
    for point in ledger.cash_flow(today) {
        println!("{:<16} {:>14}", point.label, format_currency(point.value));
    }

    println!("\n=== Extrato ===");
    for month in ledger.statement() {
        println!("{}", month.label);
        for line in &month.lines {
            println!(
                "  [{}] {} - {} ({})",
                line.installment.status,
                line.description.unwrap_or("Comissão removida"),
                line.amount(),
                line.detail()
            );
        }
    }

    println!("\nSchema:\n{}", stored_schema()?);
    Ok(())
}
