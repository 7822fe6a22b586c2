// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// UTILITÁRIOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Utilitários compartilhados:
// - Text processing (cortes seguros em UTF-8)
// - Timing
// - File reading (PDF, texto, markdown)
// - Text segmentation (chunking com sobreposição)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod file_reader;
/// Chunking de texto com sobreposição.
pub mod segment;
mod text;
mod timing;

pub use file_reader::{FileContent, FileReader, FileReaderError, FileType};
pub use segment::{chunk_text, ChunkOptions, ChunkResult, ChunkSplitter};
pub use text::*;
pub use timing::ActionTimer;
