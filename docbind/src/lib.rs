//! Library side of the docbind CLI: the export pipeline and its external
//! collaborators (PDF renderer, content sync, image base URL detection).
pub mod cdn;
pub mod cli;
pub mod error;
pub mod export;
pub mod pdf;
pub mod sync;
