//! RAG (Retrieval-Augmented Generation) for question answering.
//!
//! An [`Answerer`] is bound to one transcript's [`SemanticIndex`]: it retrieves
//! the best matching chunks for a question, renders them into the QA prompt
//! and hands the prompt to a [`Generator`].
//!
//! [`SemanticIndex`]: crate::vector_store::SemanticIndex
//! [`Generator`]: crate::generation::Generator

mod answerer;
pub mod context;

pub use answerer::{Answerer, RagResponse, DEFAULT_TOP_K};
pub use context::format_context;
