// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TOKEN ACCOUNTANT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Contagem de tokens e estimativa de custo:
// - TokenCounter plugável (SubwordEstimator por padrão)
// - PriceTable configurável (padrão GPT-4o)
// - CostEstimate derivado, função pura da contagem
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod counter;
mod pricing;

pub use counter::{
    CharacterEstimator, SubwordEstimator, TokenCounter, TokenizerError, CHARS_PER_TOKEN,
};
pub use pricing::{CostEstimate, PriceTable};

use std::sync::Arc;

/// Conta tokens e estima custos com um contador e uma tabela de preços.
///
/// Só guarda estado de leitura; pode ser compartilhado entre threads.
#[derive(Clone)]
pub struct TokenAccountant {
    counter: Arc<dyn TokenCounter>,
    pricing: PriceTable,
}

impl TokenAccountant {
    /// Cria um accountant com contador e preços explícitos
    pub fn new(counter: Arc<dyn TokenCounter>, pricing: PriceTable) -> Self {
        Self { counter, pricing }
    }

    /// Troca a tabela de preços
    pub fn with_pricing(mut self, pricing: PriceTable) -> Self {
        self.pricing = pricing;
        self
    }

    /// Tabela de preços em uso
    pub fn pricing(&self) -> &PriceTable {
        &self.pricing
    }

    /// Nome do backend de tokenização
    pub fn backend(&self) -> &str {
        self.counter.name()
    }

    /// Conta tokens de um texto
    pub fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError> {
        if text.is_empty() {
            return Ok(0);
        }
        self.counter.count(text)
    }

    /// Estima o custo de processar o texto com a tabela configurada
    pub fn estimate_cost(&self, text: &str) -> Result<CostEstimate, TokenizerError> {
        Ok(self.pricing.estimate(self.count_tokens(text)?))
    }

    /// Estima o custo com preços de entrada/saída avulsos
    pub fn estimate_cost_at(
        &self,
        text: &str,
        input_cost_per_1k: f64,
        output_cost_per_1k: f64,
    ) -> Result<CostEstimate, TokenizerError> {
        let pricing = self
            .pricing
            .clone()
            .with_rates(input_cost_per_1k, output_cost_per_1k);
        Ok(pricing.estimate(self.count_tokens(text)?))
    }

    /// Custo para uma contagem já conhecida
    pub fn cost_for_tokens(&self, tokens: usize) -> CostEstimate {
        self.pricing.estimate(tokens)
    }
}

impl Default for TokenAccountant {
    fn default() -> Self {
        Self::new(Arc::new(SubwordEstimator::new()), PriceTable::default())
    }
}

impl std::fmt::Debug for TokenAccountant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAccountant")
            .field("counter", &self.counter.name())
            .field("pricing", &self.pricing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        let accountant = TokenAccountant::default();
        assert_eq!(accountant.count_tokens("").unwrap(), 0);

        let cost = accountant.estimate_cost("").unwrap();
        assert_eq!(cost.input_tokens, 0);
        assert_eq!(cost.total_cost, 0.0);
    }

    #[test]
    fn test_estimate_cost_at_custom_rates() {
        let accountant = TokenAccountant::default();
        let text = "word ".repeat(1000);
        let tokens = accountant.count_tokens(&text).unwrap();

        let cost = accountant.estimate_cost_at(&text, 1.0, 0.0).unwrap();
        assert_eq!(cost.input_tokens, tokens);
        assert!((cost.input_cost - tokens as f64 / 1000.0).abs() < 1e-9);
        assert_eq!(cost.output_cost, 0.0);
    }

    #[test]
    fn test_cost_is_pure_function_of_count() {
        let accountant = TokenAccountant::default();
        let text = "Attention is all you need.";
        let tokens = accountant.count_tokens(text).unwrap();
        assert_eq!(
            accountant.estimate_cost(text).unwrap(),
            accountant.cost_for_tokens(tokens)
        );
    }

    struct BrokenCounter;

    impl TokenCounter for BrokenCounter {
        fn count(&self, _text: &str) -> Result<usize, TokenizerError> {
            Err(TokenizerError::Unavailable("encoding not loaded".into()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn test_backend_failure_is_surfaced() {
        let accountant = TokenAccountant::new(Arc::new(BrokenCounter), PriceTable::default());
        assert!(accountant.count_tokens("non-empty").is_err());
        assert!(accountant.estimate_cost("non-empty").is_err());
        // texto vazio não toca o backend
        assert_eq!(accountant.count_tokens("").unwrap(), 0);
    }
}
