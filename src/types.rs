// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIPOS COMPARTILHADOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Linha de heading markdown (`#` até `######` seguido de texto), título capturado.
static MARKDOWN_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ ]{0,3}#{1,6}[ \t]+(\S[^\n]*?)[ \t]*$").expect("markdown heading regex")
});

/// Origem do texto bruto entregue ao otimizador
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Texto extraído de um PDF baixado por URL
    UrlExtracted,
    /// Texto extraído de um PDF enviado como arquivo
    FileExtracted,
    /// Documento markdown (ex: conversão de PDF para markdown)
    Markdown,
}

impl SourceKind {
    /// Indica se o modo de extração deve ser por headings markdown
    pub fn is_markdown(&self) -> bool {
        matches!(self, Self::Markdown)
    }
}

/// Documento a ser otimizado. Imutável depois de criado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Conteúdo textual bruto
    pub text: String,
    /// Origem do conteúdo
    pub kind: SourceKind,
}

impl Document {
    /// Cria um documento com origem explícita
    pub fn new(text: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// Cria um documento markdown
    pub fn markdown(text: impl Into<String>) -> Self {
        Self::new(text, SourceKind::Markdown)
    }

    /// Cria um documento de texto plano extraído de arquivo
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, SourceKind::FileExtracted)
    }

    /// Detecta a origem pelo conteúdo.
    ///
    /// Só é markdown se algum heading `#` tiver título de seção conhecido
    /// (`## 2. Methods`). Linhas de tabela como `# Params 12M` em texto de PDF
    /// não contam.
    pub fn detect(text: impl Into<String>) -> Self {
        let text = text.into();
        let has_section_heading = MARKDOWN_HEADING.captures_iter(&text).any(|caps| {
            let title = crate::sections::normalize_title(&caps[1]);
            CanonicalSection::from_alias(&title).is_some()
        });
        let kind = if has_section_heading {
            SourceKind::Markdown
        } else {
            SourceKind::FileExtracted
        };
        Self { text, kind }
    }

    /// Retorna true se o documento não tem conteúdo útil
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Papéis canônicos de seção de um artigo acadêmico.
///
/// A ordem de declaração é a ordem de prioridade usada quando um alias
/// pertence a mais de uma seção (ex: "summary").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalSection {
    Abstract,
    Introduction,
    Methodology,
    Results,
    Discussion,
    Conclusion,
    RelatedWork,
}

impl CanonicalSection {
    /// Todas as seções em ordem de prioridade
    pub const ALL: [CanonicalSection; 7] = [
        Self::Abstract,
        Self::Introduction,
        Self::Methodology,
        Self::Results,
        Self::Discussion,
        Self::Conclusion,
        Self::RelatedWork,
    ];

    /// Seções incluídas por padrão nas estratégias `sections` e `smart`
    pub const DEFAULT_INCLUDE: [CanonicalSection; 4] = [
        Self::Abstract,
        Self::Introduction,
        Self::Methodology,
        Self::Conclusion,
    ];

    /// Nome canônico em snake_case
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abstract => "abstract",
            Self::Introduction => "introduction",
            Self::Methodology => "methodology",
            Self::Results => "results",
            Self::Discussion => "discussion",
            Self::Conclusion => "conclusion",
            Self::RelatedWork => "related_work",
        }
    }

    /// Título legível usado na renderização de texto plano
    pub fn title(&self) -> &'static str {
        match self {
            Self::Abstract => "Abstract",
            Self::Introduction => "Introduction",
            Self::Methodology => "Methodology",
            Self::Results => "Results",
            Self::Discussion => "Discussion",
            Self::Conclusion => "Conclusion",
            Self::RelatedWork => "Related Work",
        }
    }

    /// Grafias de heading (minúsculas) que mapeiam para esta seção
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Abstract => &["abstract", "summary"],
            Self::Introduction => &["introduction", "intro"],
            Self::Methodology => &[
                "methods",
                "methodology",
                "method",
                "approach",
                "framework",
                "model",
            ],
            Self::Results => &["results", "experiments", "evaluation", "findings"],
            Self::Discussion => &["discussion", "analysis"],
            Self::Conclusion => &["conclusion", "conclusions", "summary"],
            Self::RelatedWork => &["related work", "background", "literature review"],
        }
    }

    /// Resolve um título normalizado (minúsculo) para a seção canônica.
    ///
    /// Aliases compartilhados resolvem para a primeira seção na ordem de prioridade.
    pub fn from_alias(title: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|section| section.aliases().contains(&title))
    }
}

impl fmt::Display for CanonicalSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|section| section.as_str() == normalized)
            .ok_or_else(|| s.trim().to_string())
    }
}

/// Seção localizada em um documento
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Papel canônico da seção
    pub canonical: CanonicalSection,
    /// Heading como aparece no documento
    pub raw_header: String,
    /// Corpo da seção
    pub body: String,
}

impl Section {
    pub fn new(
        canonical: CanonicalSection,
        raw_header: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            canonical,
            raw_header: raw_header.into(),
            body: body.into(),
        }
    }
}
