//! # Paper Optimizer
//!
//! Motor de otimização de texto para artigos acadêmicos. Reduz o texto extraído
//! de um PDF, de uma URL ou de um arquivo markdown até caber em um orçamento de
//! tokens, preservando o que importa (resumo, introdução, metodologia, resultados,
//! conclusão).
//!
//! ## Pipeline
//!
//! 1. **Contagem de tokens e custo** (`tokens`): contador plugável com fallback
//!    por caracteres e tabela de preços por modelo
//! 2. **Limpeza** (`cleaner`): remove referências, números de página, linhas
//!    repetidas e espaços excedentes
//! 3. **Seções** (`sections`): localiza seções canônicas em texto plano
//!    (heurística de cabeçalhos) ou markdown (estrutura de `#`)
//! 4. **Otimização** (`optimizer`): aplica a estratégia escolhida e gera um
//!    relatório antes/depois
//!
//! ## Estratégias
//!
//! | Estratégia | O que faz |
//! |------------|-----------|
//! | `none`     | Texto inalterado |
//! | `truncate` | 70% do início + 30% do fim |
//! | `sections` | Só as seções selecionadas |
//! | `smart`    | Seções → model-assist → truncate |
//! | `chunk`    | Pedaços sobrepostos de ~12000 caracteres |
//! | `auto`     | Escolhe pela contagem de tokens |
//!
//! ## Exemplo de Uso
//!
//! ```rust,ignore
//! use paper_optimizer::prelude::*;
//!
//! let optimizer = Optimizer::new();
//! let outcome = optimizer.optimize_text(&paper_text, Strategy::Auto, 4000)?;
//! if let Some(report) = outcome.report() {
//!     println!("{}", report);
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Tipos fundamentais compartilhados por todo o sistema.
///
/// - [`Document`]: texto + origem (URL, arquivo, markdown)
/// - [`CanonicalSection`]: as sete seções reconhecidas e seus aliases
/// - [`Section`]: seção localizada com cabeçalho original e corpo
pub mod types;

/// Contagem de tokens e estimativa de custo.
pub mod tokens;

/// Limpeza de texto extraído de PDFs.
pub mod cleaner;

/// Extração de seções canônicas (texto plano e markdown).
pub mod sections;

/// Estratégias de otimização, relatório e model-assist.
///
/// Define o trait `Summarizer` e a implementação compatível com OpenAI
/// usada como fallback da estratégia `smart`.
pub mod optimizer;

/// Configuração do otimizador e do model-assist.
///
/// Fornece configuração dinâmica via variáveis de ambiente:
///
/// **Otimizador:**
/// - `OPTIMIZER_TOKEN_BUDGET`: orçamento de tokens (padrão: 4000)
/// - `OPTIMIZER_STRATEGY`: estratégia padrão (padrão: smart)
/// - `OPTIMIZER_INCLUDE_SECTIONS`: seções incluídas (padrão: abstract,introduction,methodology,conclusion)
/// - `OPTIMIZER_CHUNK_MAX_CHARS` / `OPTIMIZER_CHUNK_OVERLAP`
/// - `OPTIMIZER_INPUT_COST_PER_1K` / `OPTIMIZER_OUTPUT_COST_PER_1K`
/// - `OPTIMIZER_AUTO_NONE_MAX` / `OPTIMIZER_AUTO_SMART_MAX` / `OPTIMIZER_AUTO_SECTIONS_MAX`
/// - `OPTIMIZER_PRESERVE_NEWLINES`: quebras de linha na limpeza (padrão: true)
///
/// **LLM:**
/// - `OPENAI_API_KEY`: habilita o model-assist
/// - `LLM_MODEL`: modelo (padrão: "gpt-4o")
/// - `LLM_API_BASE_URL`: URL base customizada
/// - `LLM_TIMEOUT_SECS`: timeout da chamada (padrão: 60)
/// - `LLM_TEMPERATURE`: temperatura (padrão: 0.3)
pub mod config;

/// Utilitários diversos.
///
/// - Cortes de texto seguros em UTF-8
/// - Leitura de PDF, texto e markdown (arquivo ou URL)
/// - Chunking com sobreposição
/// - Timing de ações
pub mod utils;

// Re-exports principais
pub use cleaner::{CleanerConfig, TextCleaner};
pub use config::{
    load_llm_config, load_optimizer_config, ConfigError, LlmConfig, OptimizerConfig,
    SettingsStore, UserSettings,
};
pub use optimizer::{
    OpenAiSummarizer, OptimizationOutcome, OptimizationReport, OptimizeOptions, Optimizer,
    OptimizerError, Strategy, Summarizer,
};
pub use sections::SectionMap;
pub use tokens::{CostEstimate, PriceTable, TokenAccountant};
pub use types::*;

/// Versão da biblioteca.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude com imports comuns para uso rápido.
///
/// ```rust,ignore
/// use paper_optimizer::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cleaner::TextCleaner;
    pub use crate::optimizer::{
        recommend_strategy, ChunkedOutput, OptimizationOutcome, OptimizationReport,
        OptimizeOptions, OptimizedText, Optimizer, OptimizerError, Strategy, Summarizer,
        SummarizerError,
    };
    pub use crate::sections::{extract, RenderStyle, SectionMap};
    pub use crate::tokens::{CostEstimate, PriceTable, TokenAccountant, TokenCounter};
    pub use crate::types::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
