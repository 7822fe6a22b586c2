//! Extração de seções em texto plano por padrões em camadas.
//!
//! Para cada seção canônica existem três camadas de regex, testadas em ordem:
//!
//! | Camada | Formato | Exemplo |
//! |--------|---------|---------|
//! | 1 | heading sozinho na linha | `ABSTRACT\n...` |
//! | 2 | heading seguido de `:`/`-` | `Abstract: ...` |
//! | 3 | heading seguido do corpo | `Abstract This paper ...` |
//!
//! O corpo termina na próxima linha com cara de heading (toda em maiúsculas,
//! numerada ou com uma palavra de seção conhecida) ou no fim do texto.

use once_cell::sync::Lazy;
use regex::Regex;

use super::SectionMap;
use crate::types::{CanonicalSection, Section};
use crate::utils::{collapse_whitespace, take_chars};

/// Limite de caracteres do corpo de cada seção
pub const MAX_SECTION_CHARS: usize = 2000;

/// Numeração opcional antes do heading: `1`, `1.`, `2.3`, `IV.`
const NUMBERING: &str = r"(?:(?:\d+(?:\.\d+)*\.?|[IVX]+\.)[ \t]*)?";

/// Palavras de back-matter que também encerram uma seção
const BACK_MATTER: &[&str] = &[
    "references and notes",
    "references",
    "reference",
    "bibliography",
    "acknowledgments",
    "acknowledgements",
    "acknowledgment",
    "acknowledgement",
    "appendix",
    "appendices",
    "future work",
    "limitations",
];

/// Palavras de heading aceitas no texto plano (mais longas primeiro).
fn header_words(section: CanonicalSection) -> &'static [&'static str] {
    match section {
        CanonicalSection::Abstract => &["abstract"],
        CanonicalSection::Introduction => &["introduction"],
        CanonicalSection::Methodology => &["methodology", "methods", "method", "approach"],
        CanonicalSection::Results => {
            &["experimental results", "results", "experiments", "evaluation"]
        }
        CanonicalSection::Discussion => &["discussion"],
        CanonicalSection::Conclusion => &["concluding remarks", "conclusions", "conclusion"],
        CanonicalSection::RelatedWork => &["related work", "literature review", "background"],
    }
}

/// Alternação regex para uma lista de palavras (espaços viram `[ \t]+`)
fn alternation(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| {
            w.split(' ')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"[ \t]+")
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Como [`alternation`], mas exige a primeira letra maiúscula (`Methods`, `METHODS`).
///
/// Usada na camada 3, onde o corpo vem na mesma linha: uma linha de prosa que
/// começa com `methods for ...` não é heading.
fn capitalized_alternation(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            let first = chars.next().map(|c| c.to_ascii_uppercase()).unwrap_or_default();
            let rest = chars
                .as_str()
                .split(' ')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"[ \t]+");
            format!("{}(?i:{})", regex::escape(&first.to_string()), rest)
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Camadas de uma seção, compiladas uma vez
struct SectionPatterns {
    section: CanonicalSection,
    tiers: [Regex; 3],
}

impl SectionPatterns {
    fn build(section: CanonicalSection) -> Self {
        let words = alternation(header_words(section));
        let tier = |suffix: &str| {
            Regex::new(&format!(
                r"(?mi)^[ \t]*{}(?:{}){}",
                NUMBERING, words, suffix
            ))
            .expect("section tier regex")
        };
        let capitalized = capitalized_alternation(header_words(section));

        Self {
            section,
            tiers: [
                // 1: heading sozinho na linha
                tier(r"[ \t]*:?[ \t]*\n"),
                // 2: heading seguido de dois-pontos/traço
                tier(r"[ \t]*[:\-–—.][ \t]*"),
                // 3: heading seguido direto do corpo (sem `i`: só `Methods`/`METHODS`)
                Regex::new(&format!(
                    r"(?m)^[ \t]*{}(?:{})[ \t]+",
                    NUMBERING, capitalized
                ))
                .expect("section tier regex"),
            ],
        }
    }
}

static PATTERNS: Lazy<Vec<SectionPatterns>> = Lazy::new(|| {
    CanonicalSection::ALL
        .iter()
        .map(|section| SectionPatterns::build(*section))
        .collect()
});

/// Linha que encerra o corpo de uma seção.
static SECTION_STOP: Lazy<Regex> = Lazy::new(|| {
    let mut known: Vec<&str> = CanonicalSection::ALL
        .iter()
        .flat_map(|s| header_words(*s).iter().copied())
        .collect();
    known.extend_from_slice(BACK_MATTER);
    known.sort_by_key(|w| std::cmp::Reverse(w.len()));

    let all_caps = format!(r"{}[A-Z][A-Z0-9 \t&,:'\-]*[A-Z][ \t]*$", NUMBERING);
    let numbered = r"\d+(?:\.\d+)*\.?[ \t]+[A-Z][A-Za-z\-]*(?:[ \t]+[A-Za-z][A-Za-z\-]*){0,6}[ \t]*$";
    let known_line = format!(r"(?i:{}(?:{})[ \t]*:?[ \t]*$)", NUMBERING, alternation(&known));
    let keywords = r"(?i:(?:keywords?|index[ \t]+terms)\b)";

    Regex::new(&format!(
        r"(?m)^[ \t]*(?:{}|{}|{}|{})",
        all_caps, numbered, known_line, keywords
    ))
    .expect("section stop regex")
});

/// Extrai seções canônicas de texto plano (já limpo, com quebras de linha).
///
/// Para cada seção vence a primeira camada que produz corpo não vazio; dentro da
/// camada vence a primeira ocorrência no documento.
pub fn extract_plain(text: &str) -> SectionMap {
    let mut sections = SectionMap::new();
    if text.trim().is_empty() {
        return sections;
    }

    for patterns in PATTERNS.iter() {
        if let Some(section) = find_section(text, patterns) {
            sections.insert_first(section);
        }
    }

    log::debug!(
        "🔎 Texto plano: {} seções encontradas {:?}",
        sections.len(),
        sections.names()
    );

    sections
}

fn find_section(text: &str, patterns: &SectionPatterns) -> Option<Section> {
    for (tier, regex) in patterns.tiers.iter().enumerate() {
        for header in regex.find_iter(text) {
            let body_start = header.end();
            let body_end = SECTION_STOP
                .find_at(text, body_start)
                .map(|stop| stop.start())
                .unwrap_or(text.len());

            if body_end <= body_start {
                continue;
            }

            let body = collapse_whitespace(&text[body_start..body_end]);
            if body.is_empty() {
                continue;
            }

            log::debug!(
                "   {} encontrado na camada {} ({} caracteres)",
                patterns.section,
                tier + 1,
                body.len()
            );

            let raw_header = header
                .as_str()
                .trim()
                .trim_end_matches([':', '-', '–', '—', '.'])
                .trim_end()
                .to_string();

            return Some(Section::new(
                patterns.section,
                raw_header,
                take_chars(&body, MAX_SECTION_CHARS),
            ));
        }
    }

    None
}
