//! # File Reader
//!
//! Lê o texto bruto de um artigo a partir de um arquivo local ou de uma URL e
//! entrega um [`Document`](crate::types::Document) pronto para o otimizador.
//!
//! ## Tipos de Arquivo Suportados
//!
//! | Tipo | Extensões | Extração de Texto |
//! |------|-----------|-------------------|
//! | PDF | `.pdf` | ✅ `pdf_extract` |
//! | Texto | `.txt` | ✅ UTF-8 |
//! | Markdown | `.md`, `.markdown` | ✅ UTF-8 |
//! | Outros | - | tenta como texto UTF-8 |
//!
//! A extração de layout do PDF fica toda com `pdf_extract`; aqui só
//! escolhemos o modo e medimos o resultado.

use std::time::Duration;
use thiserror::Error;

use super::word_count;
use crate::types::{Document, SourceKind};

/// Limite máximo de tamanho de arquivo padrão (100MB)
const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Timeout padrão de download
const DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// Erros de leitura de arquivos
#[derive(Debug, Error)]
pub enum FileReaderError {
    /// Servidor respondeu com status de erro
    #[error("Download failed: {0}")]
    DownloadError(String),

    /// Arquivo excede o limite configurado
    #[error("File too large: {size} bytes (max: {max})")]
    FileTooLarge { size: u64, max: u64 },

    /// Formato sem extração de texto
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    /// PDF corrompido, protegido ou só com imagens
    #[error("PDF extraction failed: {0}")]
    PdfExtractionError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Erro de conexão, timeout ou DNS
    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Tipo de arquivo, detectado pela extensão ou content-type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Text,
    Markdown,
    /// Imagens não têm texto extraível sem OCR
    Image,
    /// Tipo desconhecido (content-type original, se houver)
    Unknown(String),
}

impl FileType {
    /// Detecta o tipo pela extensão de uma URL ou caminho (case-insensitive).
    ///
    /// Query string e fragmento são ignorados.
    pub fn from_url(url: &str) -> Self {
        let path = url
            .split(['?', '#'])
            .next()
            .unwrap_or(url)
            .to_lowercase();

        let extension = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        if extension.contains('/') {
            return Self::Unknown(String::new());
        }

        match extension {
            "pdf" => Self::Pdf,
            "txt" | "text" => Self::Text,
            "md" | "markdown" => Self::Markdown,
            "png" | "jpg" | "jpeg" | "gif" | "webp" => Self::Image,
            _ => Self::Unknown(String::new()),
        }
    }

    /// Detecta o tipo pelo header Content-Type
    pub fn from_content_type(content_type: &str) -> Self {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();

        match mime.as_str() {
            "application/pdf" => Self::Pdf,
            "text/plain" => Self::Text,
            "text/markdown" | "text/x-markdown" => Self::Markdown,
            m if m.starts_with("image/") => Self::Image,
            _ => Self::Unknown(mime),
        }
    }
}

/// Conteúdo extraído de um arquivo
#[derive(Debug, Clone)]
pub struct FileContent {
    /// URL ou caminho de origem
    pub source: String,
    pub file_type: FileType,
    /// Texto extraído
    pub text: String,
    /// Tamanho original em bytes (antes da extração)
    pub size_bytes: u64,
    pub word_count: usize,
    /// true se veio de download
    pub from_url: bool,
}

impl FileContent {
    /// Converte em documento para o otimizador.
    ///
    /// Markdown declarado (ou detectado pelos headings) vira [`SourceKind::Markdown`].
    /// Texto de PDF nunca é reclassificado: é extraído de URL ou de arquivo.
    pub fn into_document(self) -> Document {
        let markdown = match self.file_type {
            FileType::Markdown => true,
            FileType::Pdf => false,
            _ => Document::detect(self.text.as_str()).kind.is_markdown(),
        };
        let kind = if markdown {
            SourceKind::Markdown
        } else if self.from_url {
            SourceKind::UrlExtracted
        } else {
            SourceKind::FileExtracted
        };
        Document::new(self.text, kind)
    }
}

/// Leitor de arquivos locais e remotos (bloqueante)
pub struct FileReader {
    client: reqwest::blocking::Client,
    max_size: u64,
}

impl FileReader {
    /// Leitor com timeout de 60s e limite de 100MB
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            max_size: MAX_FILE_SIZE,
        }
    }

    /// Define o tamanho máximo de arquivo aceito
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Extrai texto de bytes de um PDF
    pub fn extract_pdf_text(data: &[u8]) -> Result<String, FileReaderError> {
        log::info!("📄 Extraindo texto de PDF ({} bytes)", data.len());

        pdf_extract::extract_text_from_mem(data)
            .map_err(|e| FileReaderError::PdfExtractionError(e.to_string()))
    }

    /// Lê e processa um arquivo local
    pub fn read_file(&self, path: &str) -> Result<FileContent, FileReaderError> {
        log::info!("📂 Lendo arquivo local: {}", path);

        let size = std::fs::metadata(path)?.len();
        self.check_size(size)?;

        let data = std::fs::read(path)?;
        self.process_content(path, &data, FileType::from_url(path), false)
    }

    /// Baixa e processa um arquivo remoto.
    ///
    /// O tipo vem da extensão da URL; se ela não disser nada, do Content-Type.
    pub fn read_url(&self, url: &str) -> Result<FileContent, FileReaderError> {
        log::info!("🌐 Baixando: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FileReaderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FileReaderError::DownloadError(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }

        if let Some(length) = response.content_length() {
            self.check_size(length)?;
        }

        let header_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(FileType::from_content_type);

        let data = response
            .bytes()
            .map_err(|e| FileReaderError::DownloadError(e.to_string()))?;
        self.check_size(data.len() as u64)?;

        let file_type = match FileType::from_url(url) {
            FileType::Unknown(_) => header_type.unwrap_or(FileType::Unknown(String::new())),
            known => known,
        };

        self.process_content(url, &data, file_type, true)
    }

    /// Retorna true para URLs http(s)
    pub fn is_downloadable_url(source: &str) -> bool {
        source.starts_with("http://") || source.starts_with("https://")
    }

    /// Lê de URL ou caminho local conforme o formato da origem
    pub fn read(&self, source: &str) -> Result<FileContent, FileReaderError> {
        if Self::is_downloadable_url(source) {
            self.read_url(source)
        } else {
            self.read_file(source)
        }
    }

    fn check_size(&self, size: u64) -> Result<(), FileReaderError> {
        if size > self.max_size {
            return Err(FileReaderError::FileTooLarge {
                size,
                max: self.max_size,
            });
        }
        Ok(())
    }

    fn process_content(
        &self,
        source: &str,
        data: &[u8],
        file_type: FileType,
        from_url: bool,
    ) -> Result<FileContent, FileReaderError> {
        let text = match &file_type {
            FileType::Pdf => Self::extract_pdf_text(data)?,
            FileType::Image => {
                return Err(FileReaderError::UnsupportedType(
                    "Images cannot be converted to text".into(),
                ));
            }
            FileType::Text | FileType::Markdown | FileType::Unknown(_) => {
                String::from_utf8_lossy(data).into_owned()
            }
        };

        let word_count = word_count(&text);
        log::info!(
            "✅ Arquivo processado: {} | tipo={:?} | {} bytes | {} palavras",
            source,
            file_type,
            data.len(),
            word_count
        );

        Ok(FileContent {
            source: source.to_string(),
            file_type,
            text,
            size_bytes: data.len() as u64,
            word_count,
            from_url,
        })
    }
}

impl Default for FileReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_type_from_url() {
        assert_eq!(FileType::from_url("https://arxiv.org/pdf/1706.03762.PDF"), FileType::Pdf);
        assert_eq!(FileType::from_url("/tmp/paper.md"), FileType::Markdown);
        assert_eq!(FileType::from_url("notes.txt?download=1"), FileType::Text);
        assert_eq!(FileType::from_url("figure.png"), FileType::Image);
        assert_eq!(
            FileType::from_url("https://arxiv.org/abs/1706"),
            FileType::Unknown(String::new())
        );
        assert_eq!(
            FileType::from_url("https://example.com/v1.2/paper"),
            FileType::Unknown(String::new())
        );
    }

    #[test]
    fn test_file_type_from_content_type() {
        assert_eq!(FileType::from_content_type("application/pdf"), FileType::Pdf);
        assert_eq!(
            FileType::from_content_type("text/plain; charset=utf-8"),
            FileType::Text
        );
        assert_eq!(FileType::from_content_type("image/png"), FileType::Image);
        assert_eq!(
            FileType::from_content_type("text/html"),
            FileType::Unknown("text/html".into())
        );
    }

    #[test]
    fn test_read_local_text_file() {
        let path = std::env::temp_dir().join(format!("paper_optimizer_{}.txt", std::process::id()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "ABSTRACT\nThis paper studies X.").unwrap();
        }

        let reader = FileReader::new();
        let content = reader.read(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(content.file_type, FileType::Text);
        assert_eq!(content.word_count, 5);
        assert!(!content.from_url);

        let document = content.into_document();
        assert_eq!(document.kind, SourceKind::FileExtracted);
        assert!(document.text.starts_with("ABSTRACT"));
    }

    #[test]
    fn test_file_too_large() {
        let path = std::env::temp_dir().join(format!("paper_optimizer_big_{}.md", std::process::id()));
        std::fs::write(&path, "# Abstract\n".repeat(10)).unwrap();

        let reader = FileReader::new().with_max_size(10);
        let result = reader.read_file(path.to_str().unwrap());
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(FileReaderError::FileTooLarge { max: 10, .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let reader = FileReader::new();
        assert!(matches!(
            reader.read_file("/definitely/not/here.txt"),
            Err(FileReaderError::IoError(_))
        ));
    }

    #[test]
    fn test_markdown_content_becomes_markdown_document() {
        let content = FileContent {
            source: "https://example.com/paper".into(),
            file_type: FileType::Unknown(String::new()),
            text: "# Abstract\nBody".into(),
            size_bytes: 15,
            word_count: 3,
            from_url: true,
        };
        assert_eq!(content.into_document().kind, SourceKind::Markdown);
    }

    #[test]
    fn test_pdf_text_is_never_markdown() {
        let content = FileContent {
            source: "https://arxiv.org/pdf/2401.00001".into(),
            file_type: FileType::Pdf,
            text: "## Abstract\nBody\nTable 2\n# Params 12M".into(),
            size_bytes: 2048,
            word_count: 7,
            from_url: true,
        };
        assert_eq!(content.into_document().kind, SourceKind::UrlExtracted);
    }
}
