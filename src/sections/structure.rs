//! Diagnóstico de estrutura: linhas que parecem headings.
//!
//! Usado quando a extração não encontra nada, para entender como o PDF foi
//! convertido (headings numerados, em maiúsculas, title case...).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::{char_len, preview};

const SECTION_KEYWORDS: &[&str] = &[
    "abstract",
    "introduction",
    "methodology",
    "methods",
    "method",
    "results",
    "result",
    "discussion",
    "conclusion",
    "conclusions",
    "references",
    "bibliography",
    "acknowledgment",
    "acknowledgments",
    "related work",
    "background",
    "literature review",
    "experimental",
    "evaluation",
    "implementation",
    "analysis",
    "future work",
];

static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.?\s+[A-Za-z]").expect("numbered line regex"));

/// Linha candidata a heading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderCandidate {
    /// Índice da linha (0-based)
    pub line: usize,
    pub text: String,
    /// Palavras-chave de seção encontradas (só em `potential_headers`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords_found: Vec<String>,
}

/// Resultado de [`analyze_structure`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureAnalysis {
    pub total_length: usize,
    pub total_lines: usize,
    pub potential_headers: Vec<HeaderCandidate>,
    pub numbered_sections: Vec<HeaderCandidate>,
    pub all_caps_lines: Vec<HeaderCandidate>,
    pub title_case_lines: Vec<HeaderCandidate>,
}

impl StructureAnalysis {
    /// True se nenhuma linha parece heading
    pub fn has_no_headers(&self) -> bool {
        self.potential_headers.is_empty()
            && self.numbered_sections.is_empty()
            && self.all_caps_lines.is_empty()
            && self.title_case_lines.is_empty()
    }
}

/// Analisa o texto procurando linhas com cara de heading.
pub fn analyze_structure(text: &str) -> StructureAnalysis {
    let mut analysis = StructureAnalysis {
        total_length: char_len(text),
        total_lines: text.split('\n').count(),
        ..Default::default()
    };

    for (line, raw) in text.split('\n').enumerate() {
        let stripped = raw.trim();
        if stripped.is_empty() {
            continue;
        }
        let len = char_len(stripped);
        let lower = stripped.to_lowercase();

        if (5..=50).contains(&len) {
            let keywords_found: Vec<String> = SECTION_KEYWORDS
                .iter()
                .filter(|kw| lower.contains(*kw))
                .map(|kw| kw.to_string())
                .collect();
            if !keywords_found.is_empty() {
                analysis.potential_headers.push(HeaderCandidate {
                    line,
                    text: stripped.to_string(),
                    keywords_found,
                });
            }
        }

        if NUMBERED_LINE.is_match(stripped) {
            analysis.numbered_sections.push(candidate(line, preview(stripped, 50)));
        }

        if is_all_caps(stripped) && (3..=30).contains(&len) {
            analysis.all_caps_lines.push(candidate(line, stripped.to_string()));
        }

        if is_title_case(stripped) && (5..=40).contains(&len) {
            analysis.title_case_lines.push(candidate(line, stripped.to_string()));
        }
    }

    analysis
}

fn candidate(line: usize, text: String) -> HeaderCandidate {
    HeaderCandidate {
        line,
        text,
        keywords_found: Vec::new(),
    }
}

/// Pelo menos uma letra e nenhuma minúscula
fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

/// Cada palavra começa com maiúscula e segue em minúsculas
fn is_title_case(text: &str) -> bool {
    let mut saw_letter = false;
    for word in text.split(|c: char| !c.is_alphabetic()) {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        saw_letter = true;
        if !first.is_uppercase() || chars.any(char::is_uppercase) {
            return false;
        }
    }
    saw_letter
}
