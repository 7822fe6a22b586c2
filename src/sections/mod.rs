// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SECTION EXTRACTOR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Localiza seções canônicas de artigos acadêmicos:
// - Texto plano: regex em três camadas por seção (plain.rs)
// - Markdown: segmentação por headings + alias table (markdown.rs)
// - Diagnóstico de estrutura quando nada é encontrado (structure.rs)
//
// Zero seções é um resultado normal, não um erro.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod markdown;
mod plain;
mod structure;

pub use markdown::{extract_markdown, normalize_title};
pub use plain::{extract_plain, MAX_SECTION_CHARS};
pub use structure::{analyze_structure, HeaderCandidate, StructureAnalysis};

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{CanonicalSection, Document, Section};

/// Formato da renderização das seções selecionadas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    /// `**Abstract:**\n<corpo>`
    Plain,
    /// `<heading original>\n<corpo>`
    Markdown,
}

impl RenderStyle {
    /// Estilo adequado para o documento
    pub fn for_document(document: &Document) -> Self {
        if document.kind.is_markdown() {
            Self::Markdown
        } else {
            Self::Plain
        }
    }
}

/// Seções encontradas em um documento, no máximo uma por nome canônico.
///
/// Iteração em ordem de prioridade (abstract, introduction, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionMap {
    sections: BTreeMap<CanonicalSection, Section>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere a seção só se o nome canônico ainda não existe (primeira vence).
    /// Retorna true se inseriu.
    pub fn insert_first(&mut self, section: Section) -> bool {
        if self.sections.contains_key(&section.canonical) {
            return false;
        }
        self.sections.insert(section.canonical, section);
        true
    }

    pub fn get(&self, canonical: CanonicalSection) -> Option<&Section> {
        self.sections.get(&canonical)
    }

    /// Corpo de uma seção, se encontrada
    pub fn body(&self, canonical: CanonicalSection) -> Option<&str> {
        self.get(canonical).map(|s| s.body.as_str())
    }

    pub fn contains(&self, canonical: CanonicalSection) -> bool {
        self.sections.contains_key(&canonical)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Nomes canônicos encontrados, em ordem de prioridade
    pub fn names(&self) -> Vec<&'static str> {
        self.sections.keys().map(|k| k.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// Seções da lista de inclusão, na ordem da lista. Ausentes e repetidas são puladas.
    pub fn select(&self, include: &[CanonicalSection]) -> Vec<&Section> {
        let mut seen = Vec::with_capacity(include.len());
        include
            .iter()
            .filter(|canonical| {
                if seen.contains(*canonical) {
                    return false;
                }
                seen.push(**canonical);
                true
            })
            .filter_map(|canonical| self.get(*canonical))
            .collect()
    }

    /// Renderiza as seções selecionadas separadas por linha em branco.
    /// String vazia quando nenhuma seção da lista existe.
    pub fn render(&self, include: &[CanonicalSection], style: RenderStyle) -> String {
        self.select(include)
            .into_iter()
            .map(|section| match style {
                RenderStyle::Plain => {
                    format!("**{}:**\n{}", section.canonical.title(), section.body)
                }
                RenderStyle::Markdown => format!("{}\n{}", section.raw_header, section.body),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Extrai seções do documento no modo indicado pela origem.
pub fn extract(document: &Document) -> SectionMap {
    if document.kind.is_markdown() {
        extract_markdown(&document.text)
    } else {
        extract_plain(&document.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> SectionMap {
        let mut map = SectionMap::new();
        map.insert_first(Section::new(CanonicalSection::Abstract, "ABSTRACT", "A body."));
        map.insert_first(Section::new(
            CanonicalSection::Introduction,
            "## 1. Introduction",
            "I body.",
        ));
        map.insert_first(Section::new(CanonicalSection::Conclusion, "CONCLUSION", "C body."));
        map
    }

    #[test]
    fn test_insert_first_keeps_first() {
        let mut map = sample_map();
        assert!(!map.insert_first(Section::new(CanonicalSection::Abstract, "Abstract", "other")));
        assert_eq!(map.body(CanonicalSection::Abstract), Some("A body."));
        assert_eq!(map.names(), vec!["abstract", "introduction", "conclusion"]);
    }

    #[test]
    fn test_select_follows_include_order() {
        let map = sample_map();
        let selected = map.select(&[
            CanonicalSection::Conclusion,
            CanonicalSection::Results,
            CanonicalSection::Abstract,
            CanonicalSection::Conclusion,
        ]);
        let names: Vec<_> = selected.iter().map(|s| s.canonical).collect();
        assert_eq!(
            names,
            vec![CanonicalSection::Conclusion, CanonicalSection::Abstract]
        );
    }

    #[test]
    fn test_render_styles() {
        let map = sample_map();
        let include = [CanonicalSection::Abstract, CanonicalSection::Introduction];

        assert_eq!(
            map.render(&include, RenderStyle::Plain),
            "**Abstract:**\nA body.\n\n**Introduction:**\nI body."
        );
        assert_eq!(
            map.render(&include, RenderStyle::Markdown),
            "ABSTRACT\nA body.\n\n## 1. Introduction\nI body."
        );
        assert_eq!(map.render(&[CanonicalSection::Results], RenderStyle::Plain), "");
    }

    #[test]
    fn test_extract_dispatches_on_kind() {
        let md = Document::markdown("# Abstract\nMarkdown body.");
        assert_eq!(extract(&md).body(CanonicalSection::Abstract), Some("Markdown body."));

        let plain = Document::plain("ABSTRACT\nPlain body.");
        assert_eq!(extract(&plain).body(CanonicalSection::Abstract), Some("Plain body."));
    }
}
