//! Signature transform module.
//!
//! This module provides:
//! - Parsing of the player asset into a bounded transform program
//! - The program interpreter that decrypts ciphered signatures
//! - A cache of programs keyed by player asset URL

pub mod cache;
pub mod parser;
pub mod program;

pub use cache::SignatureResolver;
pub use parser::parse_player;
pub use program::{SignatureOp, SignatureProgram};
