//! Segmentação de documentos markdown por headings.
//!
//! Cada linha `#...` abre um segmento `(header, body)`. Conteúdo antes do primeiro
//! heading é ignorado. Headings dentro de blocos de código (```) não contam.
//! Uma seção canônica absorve seus sub-headings (nível mais profundo) até o
//! próximo heading de nível igual ou superior; sub-headings absorvidos não viram
//! outra seção (`### Analysis` dentro de `## Experiments` fica só em results).

use once_cell::sync::Lazy;
use regex::Regex;

use super::SectionMap;
use crate::types::{CanonicalSection, Section};

static HEADING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ ]{0,3}(#{1,6})(?:[ \t]+(.*?))?[ \t]*$").expect("heading line regex")
});

static LEADING_NUMBERING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d+(?:\.\d+)*\.?|[ivx]+\.)[ \t]+").expect("numbering regex")
});

/// Segmento cru: um heading e as linhas até o próximo heading
#[derive(Debug)]
struct Segment<'a> {
    level: usize,
    header: &'a str,
    title: &'a str,
    body: Vec<&'a str>,
}

/// Normaliza o título de um heading para busca no alias table.
///
/// `"## 2.1 **Related Work**:"` → `"related work"`
pub fn normalize_title(title: &str) -> String {
    let title = title.trim().trim_end_matches('#').trim();
    let lowered = title.trim_start_matches(['*', '_']).to_lowercase();
    let without_number = LEADING_NUMBERING.replace(&lowered, "");
    let stripped = without_number
        .trim()
        .trim_start_matches(['*', '_'])
        .trim_end_matches(['*', '_', ':', '.'])
        .trim();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Divide o texto em segmentos por heading (uma passada pelas linhas)
fn segment(text: &str) -> Vec<Segment<'_>> {
    let mut segments: Vec<Segment<'_>> = Vec::new();
    let mut in_fence = false;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
        }

        let heading = if in_fence {
            None
        } else {
            HEADING_LINE.captures(line)
        };

        match heading {
            Some(caps) => {
                let level = caps.get(1).map_or(1, |m| m.as_str().len());
                let title = caps.get(2).map_or("", |m| m.as_str());
                segments.push(Segment {
                    level,
                    header: line.trim(),
                    title,
                    body: Vec::new(),
                });
            }
            None => {
                if let Some(current) = segments.last_mut() {
                    current.body.push(line);
                }
            }
        }
    }

    segments
}

/// Extrai seções canônicas de um documento markdown.
pub fn extract_markdown(text: &str) -> SectionMap {
    let mut sections = SectionMap::new();
    let segments = segment(text);

    // Segmentos antes deste índice já foram absorvidos por uma seção pai
    let mut absorbed_until = 0;

    for (index, seg) in segments.iter().enumerate() {
        if index < absorbed_until {
            continue;
        }
        let Some(canonical) = CanonicalSection::from_alias(&normalize_title(seg.title)) else {
            continue;
        };
        if sections.contains(canonical) {
            continue;
        }

        let mut lines: Vec<&str> = seg.body.clone();
        let mut children = 0;
        for child in segments[index + 1..]
            .iter()
            .take_while(|child| child.level > seg.level)
        {
            lines.push(child.header);
            lines.extend(child.body.iter().copied());
            children += 1;
        }

        let body = lines.join("\n").trim().to_string();
        if body.is_empty() {
            continue;
        }
        absorbed_until = index + 1 + children;

        log::debug!("   {} ← \"{}\" ({} caracteres)", canonical, seg.header, body.len());
        sections.insert_first(Section::new(canonical, seg.header, body));
    }

    log::debug!(
        "🔎 Markdown: {} segmentos, {} seções canônicas {:?}",
        segments.len(),
        sections.len(),
        sections.names()
    );

    sections
}
