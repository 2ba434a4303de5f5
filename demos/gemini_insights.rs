use chrono::NaiveDate;
use commission_tracker::llm::GeminiClient;
use commission_tracker::*;
use dotenv::dotenv;
use std::error::Error;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn Error>> {
    dotenv().ok();
    let config = TrackerConfig::default().with_env_overrides();
    let client = GeminiClient::from_config(&config)?;
    println!("Using model {}", client.model());

    let mut ledger = CommissionLedger::default();
    let sales = [
        ("Consultoria de Marketing", "João Silva", 1200.0, (2024, 1, 15), 4),
        ("Licença de software", "Empresa X", 2400.0, (2024, 3, 5), 12),
        ("Treinamento", "Ana Costa", 450.9, (2024, 4, 20), 1),
    ];
    for (description, client_name, total_value, (y, m, d), installment_count) in sales {
        ledger.add_commission(&CommissionInput {
            description: description.to_string(),
            client_name: client_name.to_string(),
            total_value,
            date: NaiveDate::from_ymd_opt(y, m, d).ok_or("invalid demo date")?,
            installment_count,
        });
    }

    let paid: Vec<_> = ledger.installments.iter().take(3).map(|i| i.id).collect();
    for id in paid {
        ledger.toggle_installment_status(id);
    }

    let service = InsightService::new(client);
    let text = service
        .insights(&ledger.commissions, &ledger.installments)
        .await;
    println!("\n{}", text);
    Ok(())
}
