//! Tabela de preços e estimativa de custo.

use serde::{Deserialize, Serialize};

/// Preço por 1k tokens de um modelo.
///
/// Os valores padrão seguem a tabela pública do GPT-4o na época em que o bot foi
/// escrito; trate como configuração, não como constante.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    pub model: String,
    pub input_cost_per_1k: f64,
    pub output_cost_per_1k: f64,
    /// Fração da entrada estimada como saída (0.3 = 30%)
    pub output_ratio: f64,
    /// Teto da estimativa de tokens de saída
    pub max_output_tokens: f64,
}

impl PriceTable {
    pub fn new(model: &str, input_cost_per_1k: f64, output_cost_per_1k: f64) -> Self {
        Self {
            model: model.into(),
            input_cost_per_1k,
            output_cost_per_1k,
            output_ratio: 0.3,
            max_output_tokens: 4000.0,
        }
    }

    pub fn gpt_4o() -> Self {
        Self::new("gpt-4o", 0.0025, 0.01)
    }

    pub fn gpt_4o_mini() -> Self {
        Self::new("gpt-4o-mini", 0.00015, 0.0006)
    }

    /// Busca um preset pelo nome do modelo
    pub fn for_model(model: &str) -> Option<Self> {
        let m = model.to_lowercase();
        if m.contains("gpt-4o-mini") {
            Some(Self::gpt_4o_mini())
        } else if m.contains("gpt-4o") {
            Some(Self::gpt_4o())
        } else {
            None
        }
    }

    /// Mesma tabela com outros preços de entrada/saída
    pub fn with_rates(mut self, input_cost_per_1k: f64, output_cost_per_1k: f64) -> Self {
        self.input_cost_per_1k = input_cost_per_1k;
        self.output_cost_per_1k = output_cost_per_1k;
        self
    }

    /// Calcula o custo para uma quantidade de tokens de entrada.
    ///
    /// Saída estimada = min(output_ratio × entrada, max_output_tokens).
    pub fn estimate(&self, input_tokens: usize) -> CostEstimate {
        let estimated_output_tokens =
            (input_tokens as f64 * self.output_ratio).min(self.max_output_tokens);
        let input_cost = (input_tokens as f64 / 1000.0) * self.input_cost_per_1k;
        let output_cost = (estimated_output_tokens / 1000.0) * self.output_cost_per_1k;

        CostEstimate {
            input_tokens,
            estimated_output_tokens,
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
        }
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::gpt_4o()
    }
}

/// Estimativa de custo de processar um texto.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostEstimate {
    pub input_tokens: usize,
    pub estimated_output_tokens: f64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

impl CostEstimate {
    /// Custo formatado em dólares (centavos quando < $0.01)
    pub fn format(&self) -> String {
        if self.total_cost < 0.01 {
            format!("{:.4}¢", self.total_cost * 100.0)
        } else {
            format!("${:.4}", self.total_cost)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_tokens_zero_cost() {
        let estimate = PriceTable::default().estimate(0);
        assert_eq!(estimate, CostEstimate::default());
    }

    #[test]
    fn test_output_estimate_ratio() {
        let estimate = PriceTable::gpt_4o().estimate(1000);
        assert!((estimate.estimated_output_tokens - 300.0).abs() < 1e-9);
        assert!((estimate.input_cost - 0.0025).abs() < 1e-12);
        assert!((estimate.output_cost - 0.003).abs() < 1e-12);
        assert!((estimate.total_cost - 0.0055).abs() < 1e-12);
    }

    #[test]
    fn test_output_estimate_capped() {
        let estimate = PriceTable::gpt_4o().estimate(100_000);
        assert_eq!(estimate.estimated_output_tokens, 4000.0);
    }

    #[test]
    fn test_for_model() {
        assert_eq!(PriceTable::for_model("GPT-4o-mini").unwrap().model, "gpt-4o-mini");
        assert_eq!(PriceTable::for_model("gpt-4o-2024-08-06").unwrap().model, "gpt-4o");
        assert!(PriceTable::for_model("claude-3-haiku").is_none());
    }
}
