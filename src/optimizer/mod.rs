// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// OPTIMIZER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Reduz o texto de um artigo para caber em um orçamento de tokens.
//
// Estratégias:
// - none:     pass-through
// - truncate: 70% do início + 30% do fim
// - sections: seções canônicas selecionadas, depois truncate
// - smart:    seções → model-assist → truncate (nunca falha)
// - chunk:    pedaços com sobreposição para processamento individual
// - auto:     escolhe uma das acima pela contagem de tokens
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod report;
mod summarizer;

pub use report::{reduction_percentage, OptimizationReport};
#[cfg(test)]
pub use summarizer::MockSummarizer;
pub use summarizer::{
    build_summary_prompt, OpenAiSummarizer, Summarizer, SummarizerError, MAX_SUMMARY_INPUT_CHARS,
};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::cleaner::TextCleaner;
use crate::config::OptimizerConfig;
use crate::sections::{self, RenderStyle, SectionMap};
use crate::tokens::{CostEstimate, TokenAccountant, TokenizerError};
use crate::types::{CanonicalSection, Document};
use crate::utils::{char_len, last_chars, take_chars, ActionTimer, ChunkOptions, ChunkSplitter};

/// Orçamento padrão de tokens
pub const DEFAULT_TOKEN_BUDGET: usize = 4000;

/// Separador inserido entre início e fim de um texto truncado
pub const TRUNCATION_MARKER: &str = "\n\n[content truncated]\n\n";

/// Frações do orçamento dedicadas ao início e ao fim no truncate
const HEAD_SHARE: f64 = 0.7;
const TAIL_SHARE: f64 = 0.3;

/// Erros do otimizador
#[derive(Debug, Error)]
pub enum OptimizerError {
    /// Falha do backend de tokenização; não há como adivinhar contagens
    #[error("tokenizer failure: {0}")]
    Tokenizer(#[from] TokenizerError),

    #[error("token budget must be greater than zero")]
    InvalidBudget,

    #[error("unknown strategy '{0}' (expected none, truncate, sections, smart, chunk or auto)")]
    UnknownStrategy(String),

    #[error("unknown section '{0}'")]
    UnknownSection(String),
}

/// Estratégia de otimização
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    None,
    Truncate,
    Sections,
    #[default]
    Smart,
    Chunk,
    Auto,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Self::None,
        Self::Truncate,
        Self::Sections,
        Self::Smart,
        Self::Chunk,
        Self::Auto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Truncate => "truncate",
            Self::Sections => "sections",
            Self::Smart => "smart",
            Self::Chunk => "chunk",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| OptimizerError::UnknownStrategy(s.trim().to_string()))
    }
}

/// Limites (inclusivos) de tokens usados pela estratégia `auto`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyThresholds {
    /// Até aqui: `none`
    pub none_max: usize,
    /// Até aqui: `smart`
    pub smart_max: usize,
    /// Até aqui: `sections`; acima: `chunk`
    pub sections_max: usize,
}

impl Default for StrategyThresholds {
    fn default() -> Self {
        Self {
            none_max: 2000,
            smart_max: 8000,
            sections_max: 20_000,
        }
    }
}

impl StrategyThresholds {
    /// Estratégia recomendada para uma contagem de tokens (nunca `auto`)
    pub fn recommend(&self, tokens: usize) -> Strategy {
        if tokens <= self.none_max {
            Strategy::None
        } else if tokens <= self.smart_max {
            Strategy::Smart
        } else if tokens <= self.sections_max {
            Strategy::Sections
        } else {
            Strategy::Chunk
        }
    }

    /// Os limites precisam ser crescentes
    pub fn is_ordered(&self) -> bool {
        self.none_max < self.smart_max && self.smart_max < self.sections_max
    }
}

/// Recomendação com os limites padrão (2000 / 8000 / 20000)
pub fn recommend_strategy(tokens: usize) -> Strategy {
    StrategyThresholds::default().recommend(tokens)
}

/// Lê uma lista de seções separada por vírgulas (`"abstract, related work"`)
pub fn parse_sections(list: &str) -> Result<Vec<CanonicalSection>, OptimizerError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<CanonicalSection>()
                .map_err(OptimizerError::UnknownSection)
        })
        .collect()
}

/// Parâmetros de uma chamada de otimização
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeOptions {
    pub strategy: Strategy,
    /// Orçamento de tokens (> 0)
    pub token_budget: usize,
    /// Seções usadas por `sections` e `smart`, na ordem de saída
    pub include_sections: Vec<CanonicalSection>,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            token_budget: DEFAULT_TOKEN_BUDGET,
            include_sections: CanonicalSection::DEFAULT_INCLUDE.to_vec(),
        }
    }
}

impl OptimizeOptions {
    pub fn new(strategy: Strategy, token_budget: usize) -> Self {
        Self {
            strategy,
            token_budget,
            ..Self::default()
        }
    }

    pub fn with_sections(mut self, include_sections: Vec<CanonicalSection>) -> Self {
        self.include_sections = include_sections;
        self
    }
}

/// Texto otimizado e seu relatório
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedText {
    pub text: String,
    pub optimization_info: OptimizationReport,
}

/// Saída da estratégia `chunk`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkedOutput {
    pub chunks: Vec<String>,
    pub chunk_count: usize,
    pub original_tokens: usize,
    pub original_cost: CostEstimate,
    /// Tokens de cada chunk, na mesma ordem
    pub chunk_tokens: Vec<usize>,
}

/// Resultado de [`Optimizer::optimize`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptimizationOutcome {
    Text(OptimizedText),
    Chunked(ChunkedOutput),
}

impl OptimizationOutcome {
    /// Texto otimizado (None para `chunk`)
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(optimized) => Some(&optimized.text),
            Self::Chunked(_) => None,
        }
    }

    /// Relatório (None para `chunk`)
    pub fn report(&self) -> Option<&OptimizationReport> {
        match self {
            Self::Text(optimized) => Some(&optimized.optimization_info),
            Self::Chunked(_) => None,
        }
    }

    pub fn chunks(&self) -> Option<&ChunkedOutput> {
        match self {
            Self::Chunked(chunked) => Some(chunked),
            Self::Text(_) => None,
        }
    }
}

/// Texto produzido por uma estratégia, antes da contabilidade
struct Applied {
    text: String,
    used_model_assist: bool,
    note: Option<String>,
}

impl Applied {
    fn plain(text: String) -> Self {
        Self {
            text,
            used_model_assist: false,
            note: None,
        }
    }

    fn with_note(text: String, note: impl Into<String>) -> Self {
        Self {
            text,
            used_model_assist: false,
            note: Some(note.into()),
        }
    }
}

/// Motor de otimização.
///
/// Só tem estado de leitura; pode ser compartilhado via `Arc` entre threads.
#[derive(Clone)]
pub struct Optimizer {
    accountant: TokenAccountant,
    cleaner: TextCleaner,
    splitter: ChunkSplitter,
    thresholds: StrategyThresholds,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Optimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Optimizer")
            .field("accountant", &self.accountant)
            .field("chunk_options", self.splitter.options())
            .field("thresholds", &self.thresholds)
            .field("summarizer", &self.summarizer.is_some())
            .finish()
    }
}

impl Optimizer {
    /// Otimizador com contador, preços, limites e chunking padrão, sem model-assist
    pub fn new() -> Self {
        Self {
            accountant: TokenAccountant::default(),
            cleaner: TextCleaner::default(),
            splitter: ChunkSplitter::default(),
            thresholds: StrategyThresholds::default(),
            summarizer: None,
        }
    }

    /// Otimizador configurado (preços, chunking, limites do `auto`)
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new()
            .with_accountant(TokenAccountant::default().with_pricing(config.pricing.clone()))
            .with_chunk_options(config.chunk.clone())
            .with_thresholds(config.thresholds)
            .with_cleaner(TextCleaner::new(config.cleaner.clone()))
    }

    pub fn with_accountant(mut self, accountant: TokenAccountant) -> Self {
        self.accountant = accountant;
        self
    }

    pub fn with_cleaner(mut self, cleaner: TextCleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    pub fn with_chunk_options(mut self, options: ChunkOptions) -> Self {
        self.splitter = ChunkSplitter::new(options);
        self
    }

    pub fn with_thresholds(mut self, thresholds: StrategyThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Habilita o fallback de model-assist da estratégia `smart`
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn accountant(&self) -> &TokenAccountant {
        &self.accountant
    }

    pub fn thresholds(&self) -> &StrategyThresholds {
        &self.thresholds
    }

    pub fn has_summarizer(&self) -> bool {
        self.summarizer.is_some()
    }

    pub fn count_tokens(&self, text: &str) -> Result<usize, OptimizerError> {
        Ok(self.accountant.count_tokens(text)?)
    }

    pub fn estimate_cost(&self, text: &str) -> Result<CostEstimate, OptimizerError> {
        Ok(self.accountant.estimate_cost(text)?)
    }

    pub fn clean(&self, text: &str) -> String {
        self.cleaner.clean(text)
    }

    /// Limpa o documento e extrai as seções no modo da origem
    pub fn extract_sections(&self, document: &Document) -> SectionMap {
        let cleaned = Document::new(self.clean(&document.text), document.kind);
        sections::extract(&cleaned)
    }

    /// Estratégia recomendada para o texto, com os limites configurados
    pub fn recommend(&self, text: &str) -> Result<Strategy, OptimizerError> {
        Ok(self.thresholds.recommend(self.count_tokens(text)?))
    }

    /// Mantém ~70% do orçamento do início e ~30% do fim.
    ///
    /// Texto dentro do orçamento volta inalterado. O corte é por caracteres,
    /// proporcional a `budget / tokens`, então o resultado é aproximado.
    pub fn truncate(&self, text: &str, token_budget: usize) -> Result<String, OptimizerError> {
        let tokens = self.count_tokens(text)?;
        if tokens <= token_budget {
            return Ok(text.to_string());
        }

        let ratio = token_budget as f64 / tokens as f64;
        let total_chars = char_len(text) as f64;
        let head = (total_chars * ratio * HEAD_SHARE) as usize;
        let tail = (total_chars * ratio * TAIL_SHARE) as usize;

        Ok(format!(
            "{}{}{}",
            take_chars(text, head),
            TRUNCATION_MARKER,
            last_chars(text, tail)
        ))
    }

    /// Atalho: detecta a origem do texto e otimiza
    pub fn optimize_text(
        &self,
        text: &str,
        strategy: Strategy,
        token_budget: usize,
    ) -> Result<OptimizationOutcome, OptimizerError> {
        self.optimize(
            &Document::detect(text),
            &OptimizeOptions::new(strategy, token_budget),
        )
    }

    /// Otimiza vários documentos em paralelo; cada resultado é independente
    pub fn optimize_batch(
        &self,
        documents: &[Document],
        options: &OptimizeOptions,
    ) -> Vec<Result<OptimizationOutcome, OptimizerError>> {
        log::info!("📚 Otimizando {} documentos em paralelo", documents.len());
        documents
            .par_iter()
            .map(|document| self.optimize(document, options))
            .collect()
    }

    /// Aplica a estratégia e mede o antes/depois.
    pub fn optimize(
        &self,
        document: &Document,
        options: &OptimizeOptions,
    ) -> Result<OptimizationOutcome, OptimizerError> {
        if options.token_budget == 0 {
            return Err(OptimizerError::InvalidBudget);
        }

        let mut timer = ActionTimer::start(format!("otimização {}", options.strategy));
        let original_cost = self.estimate_cost(&document.text)?;
        let original_tokens = original_cost.input_tokens;
        timer.lap("contagem");

        let (strategy, auto_note) = match options.strategy {
            Strategy::Auto => {
                let resolved = self.thresholds.recommend(original_tokens);
                log::info!("🎯 auto: {} tokens → {}", original_tokens, resolved);
                (resolved, Some(format!("auto -> {}", resolved)))
            }
            other => (other, None),
        };

        let applied = match strategy {
            // `auto` já foi resolvido acima
            Strategy::None | Strategy::Auto => Applied::plain(document.text.clone()),
            Strategy::Truncate => self.apply_truncate(document, options.token_budget)?,
            Strategy::Sections => self.apply_sections(document, options)?,
            Strategy::Smart => self.apply_smart(document, options, original_tokens)?,
            Strategy::Chunk => {
                let chunked = self.apply_chunk(document, original_cost)?;
                timer.lap("chunk");
                log::info!(
                    "✂️  chunk: {} tokens → {} chunks",
                    original_tokens,
                    chunked.chunk_count
                );
                timer.stop_and_log();
                return Ok(OptimizationOutcome::Chunked(chunked));
            }
        };

        timer.lap(strategy.as_str());
        let optimized_cost = self.estimate_cost(&applied.text)?;
        let mut report = OptimizationReport::new(strategy, original_cost, optimized_cost)
            .with_model_assist(applied.used_model_assist);
        if let Some(note) = auto_note {
            report = report.with_note(note);
        }
        if let Some(note) = applied.note {
            report = report.with_note(note);
        }

        log::info!(
            "📉 {}: {} → {} tokens ({:.1}%)",
            strategy,
            report.original_tokens,
            report.optimized_tokens,
            report.reduction_percentage
        );
        timer.stop_and_log();

        Ok(OptimizationOutcome::Text(OptimizedText {
            text: applied.text,
            optimization_info: report,
        }))
    }

    fn apply_truncate(&self, document: &Document, budget: usize) -> Result<Applied, OptimizerError> {
        if self.count_tokens(&document.text)? <= budget {
            return Ok(Applied::plain(document.text.clone()));
        }
        let cleaned = self.clean(&document.text);
        Ok(Applied::plain(self.truncate(&cleaned, budget)?))
    }

    fn apply_sections(
        &self,
        document: &Document,
        options: &OptimizeOptions,
    ) -> Result<Applied, OptimizerError> {
        let cleaned = self.clean(&document.text);
        let found = sections::extract(&Document::new(cleaned.as_str(), document.kind));
        let rendered = found.render(&options.include_sections, RenderStyle::for_document(document));

        if rendered.is_empty() {
            log::debug!("📭 Nenhuma seção selecionada, truncando texto limpo");
            return Ok(Applied::with_note(
                self.truncate(&cleaned, options.token_budget)?,
                "no sections found, truncated",
            ));
        }

        Ok(Applied::plain(self.truncate(&rendered, options.token_budget)?))
    }

    /// seções → model-assist → truncate
    fn apply_smart(
        &self,
        document: &Document,
        options: &OptimizeOptions,
        original_tokens: usize,
    ) -> Result<Applied, OptimizerError> {
        let budget = options.token_budget;
        if original_tokens <= budget {
            return Ok(Applied::plain(document.text.clone()));
        }

        let cleaned = self.clean(&document.text);
        let found = sections::extract(&Document::new(cleaned.as_str(), document.kind));
        let rendered = found.render(&options.include_sections, RenderStyle::for_document(document));

        if !rendered.is_empty() {
            let rendered_tokens = self.count_tokens(&rendered)?;
            if rendered_tokens <= budget {
                log::debug!("🧩 smart: seções cabem no orçamento ({} tokens)", rendered_tokens);
                return Ok(Applied::plain(rendered));
            }
            log::debug!(
                "🧩 smart: seções com {} tokens excedem o orçamento de {}",
                rendered_tokens,
                budget
            );
        }

        let Some(summarizer) = &self.summarizer else {
            return Ok(Applied::with_note(
                self.truncate(&cleaned, budget)?,
                "model-assist unavailable, truncated",
            ));
        };

        match summarizer.summarize(&cleaned, budget) {
            Ok(summary) if !summary.trim().is_empty() => Ok(Applied {
                text: summary,
                used_model_assist: true,
                note: None,
            }),
            Ok(_) => {
                log::warn!("⚠️  Model-assist retornou resumo vazio, truncando");
                Ok(Applied::with_note(
                    self.truncate(&cleaned, budget)?,
                    "model-assist returned an empty summary, truncated",
                ))
            }
            Err(e) => {
                log::warn!("⚠️  Model-assist falhou ({}), truncando", e);
                Ok(Applied::with_note(
                    self.truncate(&cleaned, budget)?,
                    format!("model-assist failed: {}; truncated", e),
                ))
            }
        }
    }

    fn apply_chunk(
        &self,
        document: &Document,
        original_cost: CostEstimate,
    ) -> Result<ChunkedOutput, OptimizerError> {
        let cleaned = self.clean(&document.text);
        let result = self.splitter.split(&cleaned);
        let chunk_tokens = result
            .chunks
            .iter()
            .map(|chunk| self.count_tokens(chunk))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ChunkedOutput {
            chunk_count: result.len(),
            chunks: result.chunks,
            original_tokens: original_cost.input_tokens,
            original_cost,
            chunk_tokens,
        })
    }
}
