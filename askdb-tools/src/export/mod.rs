mod embedding;
mod flat_document;
mod llm_document;

pub use embedding::*;
pub use flat_document::*;
pub use llm_document::*;
