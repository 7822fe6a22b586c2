// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONFIGURAÇÃO DO OTIMIZADOR E DO MODEL-ASSIST
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Todas as configurações podem ser definidas via .env. Valores inválidos são
// logados e ignorados (o padrão é mantido).
// Preferências por usuário ficam num SettingsStore explícito.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

use crate::cleaner::CleanerConfig;
use crate::optimizer::{parse_sections, OptimizeOptions, Strategy, StrategyThresholds, DEFAULT_TOKEN_BUDGET};
use crate::tokens::PriceTable;
use crate::types::CanonicalSection;
use crate::utils::ChunkOptions;

/// Erros de configuração
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("missing required variable {0}")]
    Missing(String),

    #[error("auto thresholds must increase (none={none_max}, smart={smart_max}, sections={sections_max})")]
    ThresholdOrder {
        none_max: usize,
        smart_max: usize,
        sections_max: usize,
    },
}

/// Configuração do otimizador
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    pub token_budget: usize,
    pub strategy: Strategy,
    pub include_sections: Vec<CanonicalSection>,
    pub chunk: ChunkOptions,
    pub pricing: PriceTable,
    pub thresholds: StrategyThresholds,
    pub cleaner: CleanerConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            token_budget: DEFAULT_TOKEN_BUDGET,
            strategy: Strategy::default(),
            include_sections: CanonicalSection::DEFAULT_INCLUDE.to_vec(),
            chunk: ChunkOptions::default(),
            pricing: PriceTable::default(),
            thresholds: StrategyThresholds::default(),
            cleaner: CleanerConfig::default(),
        }
    }
}

impl OptimizerConfig {
    /// Opções padrão de chamada derivadas da configuração
    pub fn options(&self) -> OptimizeOptions {
        OptimizeOptions {
            strategy: self.strategy,
            token_budget: self.token_budget,
            include_sections: self.include_sections.clone(),
        }
    }

    /// Verifica invariantes que não dá para checar variável a variável
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_budget == 0 {
            return Err(ConfigError::InvalidValue {
                key: "OPTIMIZER_TOKEN_BUDGET".into(),
                value: "0".into(),
            });
        }
        if !self.thresholds.is_ordered() {
            return Err(ConfigError::ThresholdOrder {
                none_max: self.thresholds.none_max,
                smart_max: self.thresholds.smart_max,
                sections_max: self.thresholds.sections_max,
            });
        }
        Ok(())
    }
}

/// Lê e converte uma variável; valores inválidos são logados e descartados
fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("⚠️  {}='{}' inválido, usando padrão", key, raw);
            None
        }
    }
}

fn positive(key: &str, value: Option<usize>) -> Option<usize> {
    match value {
        Some(0) => {
            log::warn!("⚠️  {}=0 inválido, usando padrão", key);
            None
        }
        other => other,
    }
}

fn non_negative(key: &str, value: Option<f64>) -> Option<f64> {
    match value {
        Some(v) if v < 0.0 || !v.is_finite() => {
            log::warn!("⚠️  {}={} inválido, usando padrão", key, v);
            None
        }
        other => other,
    }
}

/// Carrega a configuração do otimizador das variáveis de ambiente.
///
/// Variáveis suportadas:
/// - `OPTIMIZER_TOKEN_BUDGET`: orçamento de tokens (padrão: 4000)
/// - `OPTIMIZER_STRATEGY`: none, truncate, sections, smart, chunk, auto (padrão: smart)
/// - `OPTIMIZER_INCLUDE_SECTIONS`: lista separada por vírgulas
/// - `OPTIMIZER_CHUNK_MAX_CHARS` / `OPTIMIZER_CHUNK_OVERLAP`: chunking (12000 / 200)
/// - `OPTIMIZER_INPUT_COST_PER_1K` / `OPTIMIZER_OUTPUT_COST_PER_1K`: preços
/// - `OPTIMIZER_AUTO_NONE_MAX` / `OPTIMIZER_AUTO_SMART_MAX` / `OPTIMIZER_AUTO_SECTIONS_MAX`
/// - `OPTIMIZER_PRESERVE_NEWLINES`: false achata todo whitespace na limpeza (padrão: true)
///
/// ```rust,ignore
/// // .env
/// OPTIMIZER_STRATEGY=auto
/// OPTIMIZER_TOKEN_BUDGET=3000
///
/// let config = load_optimizer_config();
/// assert_eq!(config.strategy, Strategy::Auto);
/// ```
pub fn load_optimizer_config() -> OptimizerConfig {
    load_optimizer_config_from(|key| std::env::var(key).ok())
}

/// Igual a [`load_optimizer_config`], com uma fonte de variáveis arbitrária
pub fn load_optimizer_config_from(lookup: impl Fn(&str) -> Option<String>) -> OptimizerConfig {
    let mut config = OptimizerConfig::default();

    if let Some(budget) = positive(
        "OPTIMIZER_TOKEN_BUDGET",
        parse_var(&lookup, "OPTIMIZER_TOKEN_BUDGET"),
    ) {
        config.token_budget = budget;
        log::info!("📦 OPTIMIZER_TOKEN_BUDGET={}", budget);
    }

    if let Some(raw) = lookup("OPTIMIZER_STRATEGY") {
        match raw.parse::<Strategy>() {
            Ok(strategy) => {
                config.strategy = strategy;
                log::info!("📦 OPTIMIZER_STRATEGY={}", strategy);
            }
            Err(e) => log::warn!("⚠️  OPTIMIZER_STRATEGY: {}, usando {}", e, config.strategy),
        }
    }

    if let Some(raw) = lookup("OPTIMIZER_INCLUDE_SECTIONS") {
        match parse_sections(&raw) {
            Ok(sections) if !sections.is_empty() => {
                log::info!("📦 OPTIMIZER_INCLUDE_SECTIONS={:?}", sections);
                config.include_sections = sections;
            }
            Ok(_) => log::warn!("⚠️  OPTIMIZER_INCLUDE_SECTIONS vazio, usando padrão"),
            Err(e) => log::warn!("⚠️  OPTIMIZER_INCLUDE_SECTIONS: {}, usando padrão", e),
        }
    }

    if let Some(max_chars) = positive(
        "OPTIMIZER_CHUNK_MAX_CHARS",
        parse_var(&lookup, "OPTIMIZER_CHUNK_MAX_CHARS"),
    ) {
        config.chunk.max_chars = max_chars;
        log::info!("📦 OPTIMIZER_CHUNK_MAX_CHARS={}", max_chars);
    }

    if let Some(overlap) = parse_var::<usize>(&lookup, "OPTIMIZER_CHUNK_OVERLAP") {
        config.chunk.overlap_chars = overlap;
        log::info!("📦 OPTIMIZER_CHUNK_OVERLAP={}", overlap);
    }

    if let Some(cost) = non_negative(
        "OPTIMIZER_INPUT_COST_PER_1K",
        parse_var(&lookup, "OPTIMIZER_INPUT_COST_PER_1K"),
    ) {
        config.pricing.input_cost_per_1k = cost;
        log::info!("📦 OPTIMIZER_INPUT_COST_PER_1K={}", cost);
    }

    if let Some(cost) = non_negative(
        "OPTIMIZER_OUTPUT_COST_PER_1K",
        parse_var(&lookup, "OPTIMIZER_OUTPUT_COST_PER_1K"),
    ) {
        config.pricing.output_cost_per_1k = cost;
        log::info!("📦 OPTIMIZER_OUTPUT_COST_PER_1K={}", cost);
    }

    if let Some(preserve) = parse_var::<bool>(&lookup, "OPTIMIZER_PRESERVE_NEWLINES") {
        config.cleaner.preserve_newlines = preserve;
        log::info!("📦 OPTIMIZER_PRESERVE_NEWLINES={}", preserve);
    }

    let mut thresholds = config.thresholds;
    if let Some(v) = parse_var(&lookup, "OPTIMIZER_AUTO_NONE_MAX") {
        thresholds.none_max = v;
    }
    if let Some(v) = parse_var(&lookup, "OPTIMIZER_AUTO_SMART_MAX") {
        thresholds.smart_max = v;
    }
    if let Some(v) = parse_var(&lookup, "OPTIMIZER_AUTO_SECTIONS_MAX") {
        thresholds.sections_max = v;
    }
    if thresholds.is_ordered() {
        if thresholds != config.thresholds {
            log::info!(
                "📦 auto: none ≤ {}, smart ≤ {}, sections ≤ {}",
                thresholds.none_max,
                thresholds.smart_max,
                thresholds.sections_max
            );
        }
        config.thresholds = thresholds;
    } else {
        log::warn!(
            "⚠️  Limites do auto fora de ordem ({} / {} / {}), usando padrão",
            thresholds.none_max,
            thresholds.smart_max,
            thresholds.sections_max
        );
    }

    config
}

/// Configuração do cliente de model-assist
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o".to_string(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 60,
            temperature: 0.3,
        }
    }
}

impl LlmConfig {
    /// API key ou erro se ausente
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing("OPENAI_API_KEY".into()))
    }

    /// Preços do modelo configurado, se conhecidos
    pub fn pricing(&self) -> Option<PriceTable> {
        PriceTable::for_model(&self.model)
    }
}

/// Carrega a configuração de LLM das variáveis de ambiente.
///
/// Variáveis suportadas:
/// - `OPENAI_API_KEY`
/// - `LLM_MODEL` (padrão: gpt-4o)
/// - `LLM_API_BASE_URL` (padrão: https://api.openai.com/v1)
/// - `LLM_TIMEOUT_SECS` (padrão: 60)
/// - `LLM_TEMPERATURE` (padrão: 0.3)
pub fn load_llm_config() -> LlmConfig {
    load_llm_config_from(|key| std::env::var(key).ok())
}

/// Igual a [`load_llm_config`], com uma fonte de variáveis arbitrária
pub fn load_llm_config_from(lookup: impl Fn(&str) -> Option<String>) -> LlmConfig {
    let mut config = LlmConfig {
        api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
        ..LlmConfig::default()
    };

    if let Some(model) = lookup("LLM_MODEL").filter(|m| !m.trim().is_empty()) {
        config.model = model.trim().to_string();
        log::info!("📦 LLM_MODEL={}", config.model);
    }

    if let Some(url) = lookup("LLM_API_BASE_URL").filter(|u| !u.trim().is_empty()) {
        config.api_base_url = url.trim().to_string();
        log::info!("📦 LLM_API_BASE_URL={}", config.api_base_url);
    }

    if let Some(timeout) = positive("LLM_TIMEOUT_SECS", parse_var(&lookup, "LLM_TIMEOUT_SECS")) {
        config.timeout_secs = timeout as u64;
        log::info!("📦 LLM_TIMEOUT_SECS={}", timeout);
    }

    if let Some(temperature) = parse_var::<f32>(&lookup, "LLM_TEMPERATURE") {
        if (0.0..=2.0).contains(&temperature) {
            config.temperature = temperature;
            log::info!("📦 LLM_TEMPERATURE={}", temperature);
        } else {
            log::warn!("⚠️  LLM_TEMPERATURE={} fora de [0, 2], usando padrão", temperature);
        }
    }

    if config.api_key.is_none() {
        log::warn!("⚠️  OPENAI_API_KEY não definida, model-assist desabilitado");
    }

    config
}

/// Preferências de otimização de um usuário. Campos `None` herdam a configuração global.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_budget: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_sections: Option<Vec<CanonicalSection>>,
    /// Modelo de model-assist preferido
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Preferências por usuário (user id → settings).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsStore {
    users: HashMap<String, UserSettings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str) -> Option<&UserSettings> {
        self.users.get(user_id)
    }

    /// Substitui as preferências do usuário
    pub fn set(&mut self, user_id: impl Into<String>, settings: UserSettings) {
        self.users.insert(user_id.into(), settings);
    }

    /// Altera as preferências do usuário (criando se não existirem)
    pub fn update(&mut self, user_id: &str, change: impl FnOnce(&mut UserSettings)) {
        change(self.users.entry(user_id.to_string()).or_default());
    }

    pub fn remove(&mut self, user_id: &str) -> Option<UserSettings> {
        self.users.remove(user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Opções efetivas do usuário: preferências sobre a configuração global
    pub fn options_for(&self, user_id: &str, defaults: &OptimizerConfig) -> OptimizeOptions {
        let mut options = defaults.options();
        let Some(settings) = self.get(user_id) else {
            return options;
        };

        if let Some(strategy) = settings.strategy {
            options.strategy = strategy;
        }
        if let Some(budget) = settings.token_budget.filter(|b| *b > 0) {
            options.token_budget = budget;
        }
        if let Some(sections) = settings.include_sections.as_ref().filter(|s| !s.is_empty()) {
            options.include_sections = sections.clone();
        }
        options
    }

    /// Modelo do usuário ou o global
    pub fn model_for<'a>(&'a self, user_id: &str, defaults: &'a LlmConfig) -> &'a str {
        self.get(user_id)
            .and_then(|s| s.model.as_deref())
            .unwrap_or(&defaults.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_optimizer_config_defaults() {
        let config = load_optimizer_config_from(env(&[]));
        assert_eq!(config, OptimizerConfig::default());
        assert_eq!(config.token_budget, 4000);
        assert_eq!(config.strategy, Strategy::Smart);
        assert_eq!(config.chunk.max_chars, 12_000);
        assert_eq!(config.chunk.overlap_chars, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_optimizer_config_from_env() {
        let config = load_optimizer_config_from(env(&[
            ("OPTIMIZER_TOKEN_BUDGET", "3000"),
            ("OPTIMIZER_STRATEGY", "Auto"),
            ("OPTIMIZER_INCLUDE_SECTIONS", "abstract, results"),
            ("OPTIMIZER_CHUNK_MAX_CHARS", "8000"),
            ("OPTIMIZER_CHUNK_OVERLAP", "100"),
            ("OPTIMIZER_INPUT_COST_PER_1K", "0.001"),
            ("OPTIMIZER_AUTO_NONE_MAX", "1000"),
        ]));

        assert_eq!(config.token_budget, 3000);
        assert_eq!(config.strategy, Strategy::Auto);
        assert_eq!(
            config.include_sections,
            vec![CanonicalSection::Abstract, CanonicalSection::Results]
        );
        assert_eq!(config.chunk.max_chars, 8000);
        assert_eq!(config.chunk.overlap_chars, 100);
        assert_eq!(config.pricing.input_cost_per_1k, 0.001);
        assert_eq!(config.pricing.output_cost_per_1k, 0.01);
        assert_eq!(config.thresholds.none_max, 1000);
        assert_eq!(config.thresholds.smart_max, 8000);

        let options = config.options();
        assert_eq!(options.token_budget, 3000);
        assert_eq!(options.strategy, Strategy::Auto);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = load_optimizer_config_from(env(&[
            ("OPTIMIZER_TOKEN_BUDGET", "0"),
            ("OPTIMIZER_STRATEGY", "fastest"),
            ("OPTIMIZER_INCLUDE_SECTIONS", "abstract,appendix"),
            ("OPTIMIZER_CHUNK_MAX_CHARS", "lots"),
            ("OPTIMIZER_INPUT_COST_PER_1K", "-1"),
            ("OPTIMIZER_AUTO_SMART_MAX", "500"),
        ]));
        assert_eq!(config, OptimizerConfig::default());
    }

    #[test]
    fn test_preserve_newlines_from_env() {
        let config = load_optimizer_config_from(env(&[("OPTIMIZER_PRESERVE_NEWLINES", "false")]));
        assert!(!config.cleaner.preserve_newlines);
        assert_eq!(config.cleaner.references_keep_chars, 1000);

        let config = load_optimizer_config_from(env(&[("OPTIMIZER_PRESERVE_NEWLINES", "nope")]));
        assert!(config.cleaner.preserve_newlines);
    }

    #[test]
    fn test_validate() {
        let mut config = OptimizerConfig::default();
        config.thresholds.smart_max = 100;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOrder { smart_max: 100, .. })
        ));

        config = OptimizerConfig {
            token_budget: 0,
            ..OptimizerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_llm_config_from_env() {
        let config = load_llm_config_from(env(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("LLM_MODEL", "gpt-4o-mini"),
            ("LLM_TIMEOUT_SECS", "15"),
            ("LLM_TEMPERATURE", "5.0"),
        ]));

        assert_eq!(config.require_api_key().unwrap(), "sk-test");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.api_base_url, "https://api.openai.com/v1");
        assert_eq!(config.pricing().unwrap().model, "gpt-4o-mini");
    }

    #[test]
    fn test_llm_config_missing_key() {
        let config = load_llm_config_from(env(&[("OPENAI_API_KEY", "")]));
        assert_eq!(
            config.require_api_key(),
            Err(ConfigError::Missing("OPENAI_API_KEY".into()))
        );
    }

    #[test]
    fn test_settings_store_overrides() {
        let defaults = OptimizerConfig::default();
        let llm = LlmConfig::default();
        let mut store = SettingsStore::new();

        store.update("U1", |s| {
            s.strategy = Some(Strategy::Truncate);
            s.token_budget = Some(1500);
            s.model = Some("gpt-4o-mini".into());
        });
        store.set(
            "U2",
            UserSettings {
                include_sections: Some(vec![CanonicalSection::Results]),
                token_budget: Some(0),
                ..UserSettings::default()
            },
        );

        let u1 = store.options_for("U1", &defaults);
        assert_eq!(u1.strategy, Strategy::Truncate);
        assert_eq!(u1.token_budget, 1500);
        assert_eq!(u1.include_sections, defaults.include_sections);
        assert_eq!(store.model_for("U1", &llm), "gpt-4o-mini");

        let u2 = store.options_for("U2", &defaults);
        assert_eq!(u2.strategy, Strategy::Smart);
        assert_eq!(u2.token_budget, 4000);
        assert_eq!(u2.include_sections, vec![CanonicalSection::Results]);

        assert_eq!(store.options_for("unknown", &defaults), defaults.options());
        assert_eq!(store.model_for("unknown", &llm), "gpt-4o");

        assert!(store.remove("U1").is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_settings_store_roundtrips_as_json() {
        let mut store = SettingsStore::new();
        store.update("U1", |s| s.strategy = Some(Strategy::Chunk));

        let json = serde_json::to_string(&store).unwrap();
        assert!(json.contains("\"chunk\""));
        let restored: SettingsStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, store);
    }
}
