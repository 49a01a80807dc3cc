//! Text extraction — turns raw document bytes into plain text.
//!
//! Extraction is pluggable per format: an [`ExtractorRegistry`] holds one
//! [`TextExtractor`] per [`DocumentFormat`] and dispatches on the sniffed format
//! of each payload. Built-in handlers cover PDF (via `pdf-extract`) and UTF-8
//! plain text.
//!
//! A failing document never aborts the batch. [`ExtractorRegistry::extract_or_empty`]
//! logs the typed [`ExtractionError`] and substitutes an empty string, which the
//! rest of the pipeline scores as a zero-content candidate.

use std::io::{self, Read};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

/// How far into the payload the `%PDF-` header may appear.
const PDF_HEADER_WINDOW: usize = 1024;
const PDF_MAGIC: &[u8] = b"%PDF-";
const UTF8_BOM: char = '\u{feff}';

// ────────────────────────────────────────────────────────────────────────────
// Sources
// ────────────────────────────────────────────────────────────────────────────

/// A readable byte stream for one document.
///
/// The core never touches filesystem paths; whoever owns the bytes (an upload
/// handler, a test, an in-memory buffer) implements this.
pub trait DocumentSource: Send + Sync {
    fn open(&self) -> io::Result<Box<dyn Read + '_>>;
}

impl DocumentSource for Bytes {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(&self[..]))
    }
}

impl DocumentSource for Vec<u8> {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(self.as_slice()))
    }
}

impl<T: DocumentSource + ?Sized> DocumentSource for &T {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        (**self).open()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Formats and errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    PlainText,
}

impl DocumentFormat {
    /// Guesses the format from the payload itself. Returns `None` for binary
    /// data that is neither a PDF nor valid UTF-8.
    ///
    /// A payload that opens with `%PDF-` (after whitespace) is a PDF. Otherwise
    /// valid UTF-8 is text, even when it mentions `%PDF-` somewhere; only
    /// non-text payloads fall back to a header search in the leading window.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.trim_ascii_start().starts_with(PDF_MAGIC) {
            return Some(DocumentFormat::Pdf);
        }
        if std::str::from_utf8(bytes).is_ok() {
            return Some(DocumentFormat::PlainText);
        }
        let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
        window
            .windows(PDF_MAGIC.len())
            .any(|w| w == PDF_MAGIC)
            .then_some(DocumentFormat::Pdf)
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("could not read document: {0}")]
    Read(#[from] io::Error),

    #[error("document is empty")]
    EmptyPayload,

    #[error("unsupported document format")]
    UnsupportedFormat,

    #[error("no extractor registered for {0:?}")]
    NoHandler(DocumentFormat),

    #[error("invalid text encoding: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("corrupt {format:?} document: {reason}")]
    Corrupt {
        format: DocumentFormat,
        reason: String,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Extractors
// ────────────────────────────────────────────────────────────────────────────

/// A format handler. Implement this to plug in support for another format.
pub trait TextExtractor: Send + Sync {
    fn format(&self) -> DocumentFormat;

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// PDF handler backed by `pdf-extract`. Pages are concatenated in order.
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        // pdf-extract panics on some malformed inputs instead of returning Err.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(bytes)
        }));

        match outcome {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractionError::Corrupt {
                format: DocumentFormat::Pdf,
                reason: e.to_string(),
            }),
            Err(_) => Err(ExtractionError::Corrupt {
                format: DocumentFormat::Pdf,
                reason: "PDF parser aborted".to_string(),
            }),
        }
    }
}

/// UTF-8 plain text handler. Strips a leading byte-order mark.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::PlainText
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(text.strip_prefix(UTF8_BOM).unwrap_or(text).to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

/// One extractor per format. Cheap to clone; handlers are shared.
#[derive(Clone)]
pub struct ExtractorRegistry {
    handlers: Vec<Arc<dyn TextExtractor>>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(PdfExtractor));
        registry.register(Arc::new(PlainTextExtractor));
        registry
    }
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Registers `extractor`, replacing any handler already bound to its format.
    pub fn register(&mut self, extractor: Arc<dyn TextExtractor>) {
        let format = extractor.format();
        self.handlers.retain(|h| h.format() != format);
        self.handlers.push(extractor);
    }

    pub fn handler_for(&self, format: DocumentFormat) -> Option<&dyn TextExtractor> {
        self.handlers
            .iter()
            .find(|h| h.format() == format)
            .map(|h| h.as_ref())
    }

    pub fn extract(&self, source: &dyn DocumentSource) -> Result<String, ExtractionError> {
        let mut bytes = Vec::new();
        source.open()?.read_to_end(&mut bytes)?;

        if bytes.is_empty() {
            return Err(ExtractionError::EmptyPayload);
        }

        let format = DocumentFormat::sniff(&bytes).ok_or(ExtractionError::UnsupportedFormat)?;
        let handler = self
            .handler_for(format)
            .ok_or(ExtractionError::NoHandler(format))?;

        handler.extract(&bytes)
    }

    /// Extracts the text of document `index`, or logs the failure and returns
    /// an empty string.
    pub fn extract_or_empty(&self, index: usize, source: &dyn DocumentSource) -> String {
        match self.extract(source) {
            Ok(text) => {
                debug!(document_index = index, chars = text.len(), "Extracted document text");
                text
            }
            Err(e) => {
                warn!(document_index = index, "Text extraction failed: {e}");
                String::new()
            }
        }
    }
}
