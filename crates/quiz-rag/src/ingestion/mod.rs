//! Document ingestion: PDF text extraction and chunking

mod chunker;
mod parser;

pub use chunker::TextChunker;
pub use parser::PdfParser;
