//! Command implementations.

pub mod copy_rag_metadata;
pub mod doctor;
