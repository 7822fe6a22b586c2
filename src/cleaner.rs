// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TEXT CLEANER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Limpeza de texto extraído de PDF/markdown antes da otimização.
// Etapas (a ordem importa, cada uma alimenta a próxima):
// 1. Caracteres de controle e quebras de página
// 2. Whitespace (preservando quebras de linha por padrão)
// 3. Headers/footers repetidos
// 4. Bibliografia longa demais
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::{char_len, collapse_whitespace, take_chars};

/// Marcador anexado quando a bibliografia é cortada
pub const REFERENCES_MARKER: &str = "[References section truncated for brevity]";

static REFERENCES_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?mi)^[ \t]*(?:#{1,6}[ \t]+)?(?:(?:\d+\.?|[IVX]+\.)[ \t]+)?(?:references and notes|references?|bibliography)[ \t]*#*[ \t]*$",
    )
    .expect("references header regex")
});

static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("newline regex"));

static INLINE_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("inline whitespace regex"));

/// Parâmetros da limpeza
#[derive(Debug, Clone, PartialEq)]
pub struct CleanerConfig {
    /// Mantém quebras de linha simples (necessário para detectar headings).
    /// Se false, todo whitespace vira um espaço.
    pub preserve_newlines: bool,
    /// Linhas repetidas menores que isso são candidatas a header/footer
    pub repeated_line_max_len: usize,
    /// Quantas ocorrências consecutivas de uma linha curta são mantidas
    pub max_repeated_lines: usize,
    /// Fração do documento acima da qual a bibliografia é cortada
    pub references_max_ratio: f64,
    /// Máximo de caracteres mantidos da bibliografia cortada
    pub references_keep_chars: usize,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            preserve_newlines: true,
            repeated_line_max_len: 100,
            max_repeated_lines: 2,
            references_max_ratio: 0.2,
            references_keep_chars: 1000,
        }
    }
}

/// Limpador de texto. Sem estado além da configuração.
#[derive(Debug, Clone, Default)]
pub struct TextCleaner {
    config: CleanerConfig,
}

impl TextCleaner {
    pub fn new(config: CleanerConfig) -> Self {
        Self { config }
    }

    /// Limpador que achata todo whitespace em espaços
    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Aplica as quatro etapas de limpeza.
    ///
    /// Rodar duas vezes não reduz mais o texto.
    pub fn clean(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let stripped = strip_control_chars(text);
        let normalized = if self.config.preserve_newlines {
            normalize_whitespace(&stripped)
        } else {
            collapse_whitespace(&stripped)
        };
        let deduped = self.dedupe_repeated_lines(&normalized);
        let result = self.truncate_references(&deduped);

        log::debug!(
            "🧹 Texto limpo: {} → {} caracteres",
            char_len(text),
            char_len(&result)
        );

        result.trim().to_string()
    }

    /// Remove linhas curtas idênticas consecutivas além das primeiras ocorrências.
    fn dedupe_repeated_lines(&self, text: &str) -> String {
        let mut kept: Vec<&str> = Vec::new();
        let mut prev: Option<&str> = None;
        let mut occurrences = 0usize;

        for line in text.split('\n') {
            let line = line.trim();
            if prev == Some(line) && line.len() < self.config.repeated_line_max_len {
                occurrences += 1;
            } else {
                occurrences = 1;
            }
            prev = Some(line);

            if occurrences <= self.config.max_repeated_lines {
                kept.push(line);
            }
        }

        kept.join("\n")
    }

    /// Corta a bibliografia quando ela domina o documento.
    fn truncate_references(&self, text: &str) -> String {
        if text.contains(REFERENCES_MARKER) {
            return text.to_string();
        }

        let Some(header) = REFERENCES_HEADER.find(text) else {
            return text.to_string();
        };

        let before = &text[..header.start()];
        let references = &text[header.start()..];
        let references_len = char_len(references);
        let total_len = char_len(text);

        if (references_len as f64) <= total_len as f64 * self.config.references_max_ratio {
            return text.to_string();
        }

        let keep = self.config.references_keep_chars.min(references_len / 3);
        log::debug!(
            "📚 Bibliografia com {} de {} caracteres, mantendo {}",
            references_len,
            total_len,
            keep
        );

        format!(
            "{}{}\n\n{}",
            before,
            take_chars(references, keep).trim_end(),
            REFERENCES_MARKER
        )
    }
}

/// Etapa 1: normaliza fins de linha, troca form-feed por quebra de linha e
/// descarta caracteres de controle e invisíveis.
fn strip_control_chars(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    text.chars()
        .filter_map(|c| match c {
            '\n' | '\t' => Some(c),
            '\r' | '\u{0c}' => Some('\n'),
            '\u{feff}' | '\u{200b}' => None,
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// Etapa 2: colapsa espaços/tabs, remove espaços nas bordas das linhas e
/// reduz 3+ quebras de linha a uma linha em branco.
fn normalize_whitespace(text: &str) -> String {
    let collapsed = INLINE_WHITESPACE.replace_all(text, " ");
    let trimmed = collapsed
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    EXCESS_NEWLINES.replace_all(&trimmed, "\n\n").into_owned()
}
