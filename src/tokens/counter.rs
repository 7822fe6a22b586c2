// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TOKEN COUNTERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Estimadores determinísticos de tokens. Não reimplementam um BPE exato:
// basta que a contagem seja estável para a mesma entrada.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use thiserror::Error;

/// Caracteres por token usados pelo estimador por caractere (GPT-4)
pub const CHARS_PER_TOKEN: f64 = 4.0;

/// Tamanho médio de um subword para runs alfanuméricos
const SUBWORD_LEN: usize = 4;

/// Falha do backend de tokenização.
///
/// É sempre fatal: o otimizador não pode chutar contagens de tokens.
#[derive(Debug, Error)]
pub enum TokenizerError {
    /// O backend não conseguiu tokenizar o texto
    #[error("Tokenizer backend '{backend}' failed: {message}")]
    Backend { backend: String, message: String },

    /// O backend não está disponível (ex: encoding não carregado)
    #[error("Tokenizer backend unavailable: {0}")]
    Unavailable(String),
}

/// Contador de tokens plugável.
///
/// Implementações precisam ser determinísticas e thread-safe.
pub trait TokenCounter: Send + Sync {
    /// Conta tokens de um texto. Texto vazio sempre retorna 0.
    fn count(&self, text: &str) -> Result<usize, TokenizerError>;

    /// Nome do backend para logs
    fn name(&self) -> &str;
}

/// Estimador por subwords (padrão).
///
/// Regras:
/// - run alfanumérico de n caracteres → ⌈n/4⌉ tokens
/// - ideograma CJK → 1 token
/// - qualquer outro símbolo visível → 1 token
/// - whitespace → 0
#[derive(Debug, Clone, Copy, Default)]
pub struct SubwordEstimator;

impl SubwordEstimator {
    pub fn new() -> Self {
        Self
    }

    fn is_cjk(c: char) -> bool {
        matches!(c as u32,
            0x3040..=0x30FF      // hiragana / katakana
            | 0x3400..=0x4DBF    // CJK ext A
            | 0x4E00..=0x9FFF    // CJK unified
            | 0xAC00..=0xD7AF    // hangul
            | 0xF900..=0xFAFF)   // CJK compatibility
    }
}

impl TokenCounter for SubwordEstimator {
    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        let mut tokens = 0usize;
        let mut run = 0usize;

        for c in text.chars() {
            if c.is_alphanumeric() && !Self::is_cjk(c) {
                run += 1;
                continue;
            }

            if run > 0 {
                tokens += run.div_ceil(SUBWORD_LEN);
                run = 0;
            }

            if !c.is_whitespace() {
                tokens += 1;
            }
        }

        if run > 0 {
            tokens += run.div_ceil(SUBWORD_LEN);
        }

        Ok(tokens)
    }

    fn name(&self) -> &str {
        "subword-estimator"
    }
}

/// Estimador rápido por bytes (~4 chars por token).
#[derive(Debug, Clone)]
pub struct CharacterEstimator {
    chars_per_token: f64,
}

impl CharacterEstimator {
    pub fn new() -> Self {
        Self::with_ratio(CHARS_PER_TOKEN)
    }

    /// Usa uma razão customizada de caracteres por token
    pub fn with_ratio(chars_per_token: f64) -> Self {
        Self { chars_per_token }
    }
}

impl Default for CharacterEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCounter for CharacterEstimator {
    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        if self.chars_per_token <= 0.0 {
            return Err(TokenizerError::Backend {
                backend: self.name().to_string(),
                message: format!("invalid chars_per_token {}", self.chars_per_token),
            });
        }
        Ok((text.len() as f64 / self.chars_per_token).ceil() as usize)
    }

    fn name(&self) -> &str {
        "character-estimator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_zero() {
        assert_eq!(SubwordEstimator::new().count("").unwrap(), 0);
        assert_eq!(CharacterEstimator::new().count("").unwrap(), 0);
        assert_eq!(SubwordEstimator::new().count("   \n\t").unwrap(), 0);
    }

    #[test]
    fn test_subword_counts() {
        let counter = SubwordEstimator::new();
        // "Hello" (5 → 2) + "world" (5 → 2)
        assert_eq!(counter.count("Hello world").unwrap(), 4);
        // "X" (1) + "." (1)
        assert_eq!(counter.count("X.").unwrap(), 2);
        // pontuação conta individualmente
        assert_eq!(counter.count("a, b; c!").unwrap(), 6);
        // ideogramas contam um token cada
        assert_eq!(counter.count("这是").unwrap(), 2);
    }

    #[test]
    fn test_deterministic_and_monotonic() {
        let counter = SubwordEstimator::new();
        let a = "The quick brown fox jumps over the lazy dog.";
        let b = " And then it slept for a while.";

        let first = counter.count(a).unwrap();
        assert_eq!(first, counter.count(a).unwrap());

        let joined = format!("{}{}", a, b);
        assert!(counter.count(&joined).unwrap() >= first);
    }

    #[test]
    fn test_character_estimator() {
        let counter = CharacterEstimator::new();
        // 11 bytes / 4 = 2.75 → 3
        assert_eq!(counter.count("Hello world").unwrap(), 3);
    }

    #[test]
    fn test_character_estimator_invalid_ratio() {
        let counter = CharacterEstimator::with_ratio(0.0);
        assert!(matches!(
            counter.count("text"),
            Err(TokenizerError::Backend { .. })
        ));
    }
}
