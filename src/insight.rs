//! Narrative insights over the commission history.
//!
//! The text itself comes from an external generator behind [`TextGenerator`];
//! this module only builds the prompt and guarantees the caller always gets
//! something displayable back.

use crate::error::Result;
use crate::schema::{Commission, Installment};
use futures::future::BoxFuture;
use log::{info, warn};

/// Shown whenever the generator fails or returns nothing.
pub const INSIGHT_FALLBACK: &str =
    "Não foi possível gerar insights no momento. Tente novamente mais tarde.";

/// Anything that can turn a prompt into free text.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// The prompt sent to the generator: both lists as JSON plus the analysis brief.
pub fn build_insight_prompt(
    commissions: &[Commission],
    installments: &[Installment],
) -> Result<String> {
    let commissions_json = serde_json::to_string(commissions)?;
    let installments_json = serde_json::to_string(installments)?;

    Ok(format!(
        r#"Atue como um consultor financeiro especializado em vendas e comissões.
Analise os seguintes dados de comissões e parcelas de um vendedor:

Comissões: {commissions_json}
Parcelas: {installments_json}

Forneça uma análise curta e motivadora (máximo 3 parágrafos) sobre:
1. Os meses com maior previsão de recebimento.
2. A saúde financeira atual (risco de inadimplência baseado em parcelas atrasadas/pendentes).
3. Uma dica estratégica para o vendedor aumentar sua previsibilidade.

Use um tom profissional e encorajador, como um consultor financeiro de banco.
Use formatação markdown simples.
Responda em Português do Brasil."#
    ))
}

/// Wraps a generator so insight requests never surface an error.
pub struct InsightService<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> InsightService<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Returns the generated analysis, or [`INSIGHT_FALLBACK`] on any failure.
    pub async fn insights(&self, commissions: &[Commission], installments: &[Installment]) -> String {
        let prompt = match build_insight_prompt(commissions, installments) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!("Could not build insight prompt: {}", e);
                return INSIGHT_FALLBACK.to_string();
            }
        };

        info!(
            "Requesting insights for {} commissions / {} installments",
            commissions.len(),
            installments.len()
        );

        match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Insight generator returned empty text");
                INSIGHT_FALLBACK.to_string()
            }
            Err(e) => {
                warn!("Insight generation failed: {}", e);
                INSIGHT_FALLBACK.to_string()
            }
        }
    }
}
