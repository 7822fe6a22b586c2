// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SEGMENT - Chunking de Texto
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Divide textos longos em chunks de tamanho limitado com sobreposição.
//
// Split recursivo por prioridade de separadores:
// - "\n\n" (parágrafos)
// - "\n" (linhas)
// - ". " "! " "? " "; " (frases)
// - " " (palavras)
// - "" (caracteres)
//
// Depois os pedaços são juntados gulosamente até `max_chars`, e cada chunk
// novo começa com a cauda do anterior (até `overlap_chars`).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::VecDeque;

use super::char_len;

/// Separadores padrão, do mais forte para o mais fraco
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", "; ", " ", ""];

/// Tamanho padrão do chunk (≈ 4000 tokens × 3 caracteres)
pub const DEFAULT_MAX_CHARS: usize = 12_000;

/// Sobreposição padrão entre chunks
pub const DEFAULT_OVERLAP_CHARS: usize = 200;

/// Opções de configuração para chunking
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkOptions {
    /// Tamanho máximo do chunk em caracteres
    pub max_chars: usize,
    /// Caracteres do fim de um chunk repetidos no início do próximo
    pub overlap_chars: usize,
    /// Separadores em ordem de prioridade. `""` corta em caracteres.
    pub separators: Vec<String>,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS, DEFAULT_OVERLAP_CHARS)
    }
}

impl ChunkOptions {
    /// Cria opções com os separadores padrão
    pub fn new(max_chars: usize, overlap_chars: usize) -> Self {
        Self {
            max_chars,
            overlap_chars,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Substitui a lista de separadores
    pub fn with_separators(mut self, separators: &[&str]) -> Self {
        self.separators = separators.iter().map(|s| s.to_string()).collect();
        self
    }

    /// `max_chars >= 1` e `overlap_chars < max_chars`
    fn clamped(mut self) -> Self {
        self.max_chars = self.max_chars.max(1);
        self.overlap_chars = self.overlap_chars.min(self.max_chars - 1);
        self
    }
}

/// Resultado do chunking de texto
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkResult {
    /// Lista de chunks de texto
    pub chunks: Vec<String>,
    /// Posições (start, end) em bytes de cada chunk no texto original
    pub positions: Vec<(usize, usize)>,
}

impl ChunkResult {
    /// Retorna true se não há chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Retorna o número de chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Itera sobre chunks com suas posições
    pub fn iter(&self) -> impl Iterator<Item = (&String, &(usize, usize))> {
        self.chunks.iter().zip(self.positions.iter())
    }
}

/// Divisor de texto com sobreposição
#[derive(Debug, Clone, Default)]
pub struct ChunkSplitter {
    options: ChunkOptions,
}

impl ChunkSplitter {
    pub fn new(options: ChunkOptions) -> Self {
        Self {
            options: options.clamped(),
        }
    }

    pub fn options(&self) -> &ChunkOptions {
        &self.options
    }

    /// Divide o texto em chunks contíguos.
    ///
    /// Todo chunk tem no máximo `max_chars` caracteres, exceto um pedaço que
    /// nenhum separador consegue dividir (só possível sem `""` na lista).
    pub fn split(&self, text: &str) -> ChunkResult {
        if text.is_empty() {
            return ChunkResult::default();
        }

        let mut pieces = Vec::new();
        self.split_span(text, 0, text.len(), 0, &mut pieces);
        let positions = self.merge(text, &pieces);

        log::debug!(
            "✂️  {} caracteres → {} pedaços → {} chunks",
            char_len(text),
            pieces.len(),
            positions.len()
        );

        ChunkResult {
            chunks: positions
                .iter()
                .map(|(start, end)| text[*start..*end].to_string())
                .collect(),
            positions,
        }
    }

    /// Quebra `text[start..end]` em pedaços de até `max_chars`, descendo na
    /// lista de separadores quando necessário.
    fn split_span(
        &self,
        text: &str,
        start: usize,
        end: usize,
        tier: usize,
        out: &mut Vec<(usize, usize)>,
    ) {
        let span = &text[start..end];
        let max = self.options.max_chars;

        if char_len(span) <= max {
            out.push((start, end));
            return;
        }

        let Some(separator) = self.options.separators.get(tier) else {
            out.push((start, end));
            return;
        };

        if separator.is_empty() {
            let mut piece_start = start;
            let mut count = 0;
            for (offset, _) in span.char_indices() {
                if count == max {
                    out.push((piece_start, start + offset));
                    piece_start = start + offset;
                    count = 0;
                }
                count += 1;
            }
            out.push((piece_start, end));
            return;
        }

        let mut piece_start = start;
        for (offset, matched) in span.match_indices(separator.as_str()) {
            let piece_end = start + offset + matched.len();
            self.push_piece(text, piece_start, piece_end, tier, out);
            piece_start = piece_end;
        }
        if piece_start < end {
            self.push_piece(text, piece_start, end, tier, out);
        }
    }

    fn push_piece(
        &self,
        text: &str,
        start: usize,
        end: usize,
        tier: usize,
        out: &mut Vec<(usize, usize)>,
    ) {
        if char_len(&text[start..end]) > self.options.max_chars {
            self.split_span(text, start, end, tier + 1, out);
        } else {
            out.push((start, end));
        }
    }

    /// Junta pedaços consecutivos em chunks com sobreposição
    fn merge(&self, text: &str, pieces: &[(usize, usize)]) -> Vec<(usize, usize)> {
        let max = self.options.max_chars;
        let overlap = self.options.overlap_chars;

        let mut positions = Vec::new();
        let mut window: VecDeque<(usize, usize, usize)> = VecDeque::new();
        let mut current_len = 0usize;

        for &(start, end) in pieces {
            let piece_len = char_len(&text[start..end]);

            if current_len + piece_len > max {
                if let (Some(first), Some(last)) = (window.front(), window.back()) {
                    positions.push((first.0, last.1));
                }

                while current_len > overlap || (current_len + piece_len > max && current_len > 0)
                {
                    match window.pop_front() {
                        Some((_, _, len)) => current_len -= len,
                        None => break,
                    }
                }
            }

            window.push_back((start, end, piece_len));
            current_len += piece_len;
        }

        if let (Some(first), Some(last)) = (window.front(), window.back()) {
            positions.push((first.0, last.1));
        }

        positions
    }
}

/// Divide texto em chunks com as opções fornecidas.
///
/// # Exemplo
/// ```rust
/// use paper_optimizer::utils::segment::{chunk_text, ChunkOptions};
///
/// let text = "Primeira frase. Segunda frase. Terceira frase.";
/// let result = chunk_text(text, &ChunkOptions::new(20, 0));
///
/// assert_eq!(result.chunks.concat(), text);
/// assert!(result.chunks.iter().all(|c| c.chars().count() <= 20));
/// ```
pub fn chunk_text(text: &str, options: &ChunkOptions) -> ChunkResult {
    ChunkSplitter::new(options.clone()).split(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous(text: &str, result: &ChunkResult) {
        assert_eq!(result.positions.first().map(|p| p.0), Some(0));
        assert_eq!(result.positions.last().map(|p| p.1), Some(text.len()));
        for window in result.positions.windows(2) {
            assert!(window[1].0 <= window[0].1, "gap between chunks");
            assert!(window[1].0 > window[0].0);
        }
        for (chunk, (start, end)) in result.iter() {
            assert_eq!(chunk, &text[*start..*end]);
        }
    }

    #[test]
    fn test_short_text_single_chunk() {
        let result = chunk_text("short text", &ChunkOptions::default());
        assert_eq!(result.chunks, vec!["short text"]);
        assert_eq!(result.positions, vec![(0, 10)]);
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk_text("", &ChunkOptions::default()).is_empty());
    }

    #[test]
    fn test_chunks_bounded_and_contiguous() {
        let paragraph = "This is a sentence about transformers. Another one follows here! ";
        let text = format!("{}\n\n{}\n{}", paragraph.repeat(5), paragraph.repeat(3), paragraph);
        let result = chunk_text(&text, &ChunkOptions::new(100, 20));

        assert!(result.len() > 1);
        for chunk in &result.chunks {
            assert!(chunk.chars().count() <= 100);
        }
        assert_contiguous(&text, &result);
    }

    #[test]
    fn test_overlap_between_chunks() {
        let text = "word ".repeat(100);
        let result = chunk_text(&text, &ChunkOptions::new(50, 10));

        assert_eq!(result.positions[0], (0, 50));
        assert_eq!(result.positions[1].0, 40);
        for window in result.positions.windows(2) {
            assert_eq!(window[0].1 - window[1].0, 10);
        }
        assert_contiguous(&text, &result);
    }

    #[test]
    fn test_character_tier_without_overlap() {
        let text = "a".repeat(25);
        let result = chunk_text(&text, &ChunkOptions::new(10, 0));
        assert_eq!(result.positions, vec![(0, 10), (10, 20), (20, 25)]);
    }

    #[test]
    fn test_unsplittable_piece_emitted_whole() {
        let text = "a".repeat(50);
        let options = ChunkOptions::new(10, 0).with_separators(&["\n"]);
        let result = chunk_text(&text, &options);
        assert_eq!(result.chunks, vec![text.clone()]);
    }

    #[test]
    fn test_unicode_boundaries() {
        let text = "é".repeat(30);
        let result = chunk_text(&text, &ChunkOptions::new(10, 3));
        for chunk in &result.chunks {
            assert!(chunk.chars().count() <= 10);
        }
        assert_contiguous(&text, &result);
    }

    #[test]
    fn test_options_are_clamped() {
        let splitter = ChunkSplitter::new(ChunkOptions::new(0, 5));
        assert_eq!(splitter.options().max_chars, 1);
        assert_eq!(splitter.options().overlap_chars, 0);

        let splitter = ChunkSplitter::new(ChunkOptions::new(10, 50));
        assert_eq!(splitter.options().overlap_chars, 9);
    }
}
