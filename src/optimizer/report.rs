//! Relatório antes/depois de uma otimização.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Strategy;
use crate::tokens::CostEstimate;

/// `(original - optimized) / original × 100`, ou 0 quando `original == 0`.
pub fn reduction_percentage(original_tokens: usize, optimized_tokens: usize) -> f64 {
    if original_tokens == 0 {
        return 0.0;
    }
    (original_tokens as f64 - optimized_tokens as f64) / original_tokens as f64 * 100.0
}

/// Métricas de uma otimização. Construído uma vez por chamada.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// Estratégia efetivamente aplicada (`auto` já resolvido)
    pub strategy: Strategy,
    pub original_tokens: usize,
    pub optimized_tokens: usize,
    /// Negativo quando a saída cresce (ex: marcador de truncamento)
    pub token_reduction: i64,
    pub reduction_percentage: f64,
    pub original_cost: CostEstimate,
    pub optimized_cost: CostEstimate,
    pub cost_savings: f64,
    pub used_model_assist: bool,
    /// Decisões e fallbacks (ex: `auto -> smart`, falha do model-assist)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl OptimizationReport {
    pub fn new(strategy: Strategy, original_cost: CostEstimate, optimized_cost: CostEstimate) -> Self {
        let original_tokens = original_cost.input_tokens;
        let optimized_tokens = optimized_cost.input_tokens;

        Self {
            strategy,
            original_tokens,
            optimized_tokens,
            token_reduction: original_tokens as i64 - optimized_tokens as i64,
            reduction_percentage: reduction_percentage(original_tokens, optimized_tokens),
            original_cost,
            optimized_cost,
            cost_savings: original_cost.total_cost - optimized_cost.total_cost,
            used_model_assist: false,
            note: None,
        }
    }

    pub fn with_model_assist(mut self, used: bool) -> Self {
        self.used_model_assist = used;
        self
    }

    /// Acrescenta uma nota (separada por `; ` das anteriores)
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = Some(match self.note.take() {
            Some(existing) => format!("{}; {}", existing, note),
            None => note,
        });
        self
    }
}

impl fmt::Display for OptimizationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 Otimização ({})", self.strategy)?;
        writeln!(
            f,
            "   Tokens: {} → {} ({:+}, {:.1}% de redução)",
            self.original_tokens,
            self.optimized_tokens,
            -self.token_reduction,
            self.reduction_percentage
        )?;
        write!(
            f,
            "   Custo:  {} → {} (economia ${:.4})",
            self.original_cost.format(),
            self.optimized_cost.format(),
            self.cost_savings
        )?;
        if self.used_model_assist {
            write!(f, "\n   🤖 Resumo gerado por model-assist")?;
        }
        if let Some(note) = &self.note {
            write!(f, "\n   📝 {}", note)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::PriceTable;

    #[test]
    fn test_reduction_percentage() {
        assert_eq!(reduction_percentage(0, 0), 0.0);
        assert_eq!(reduction_percentage(0, 10), 0.0);
        assert!((reduction_percentage(1000, 250) - 75.0).abs() < 1e-9);
        assert!((reduction_percentage(100, 110) + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_fields() {
        let pricing = PriceTable::gpt_4o();
        let report = OptimizationReport::new(
            Strategy::Truncate,
            pricing.estimate(8000),
            pricing.estimate(2000),
        );

        assert_eq!(report.token_reduction, 6000);
        assert!((report.reduction_percentage - 75.0).abs() < 1e-9);
        assert!(report.cost_savings > 0.0);
        assert!(!report.used_model_assist);
        assert!(report.note.is_none());
    }

    #[test]
    fn test_notes_accumulate() {
        let report = OptimizationReport::new(
            Strategy::Smart,
            CostEstimate::default(),
            CostEstimate::default(),
        )
        .with_note("auto -> smart")
        .with_note("model-assist unavailable");

        assert_eq!(
            report.note.as_deref(),
            Some("auto -> smart; model-assist unavailable")
        );
    }

    #[test]
    fn test_display() {
        let pricing = PriceTable::gpt_4o();
        let report = OptimizationReport::new(Strategy::Smart, pricing.estimate(10_000), pricing.estimate(4000))
            .with_model_assist(true);
        let rendered = report.to_string();

        assert!(rendered.contains("Otimização (smart)"));
        assert!(rendered.contains("10000 → 4000 (-6000, 60.0% de redução)"));
        assert!(rendered.contains("model-assist"));
    }

    #[test]
    fn test_serializes_without_empty_note() {
        let report = OptimizationReport::new(
            Strategy::None,
            CostEstimate::default(),
            CostEstimate::default(),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["strategy"], "none");
        assert!(json.get("note").is_none());
    }
}
