//! The bloc language core: tokenizer, grammar engine and highlighter.

pub mod classification;
pub mod grammar;
pub mod highlighting;
pub mod lexing;
pub mod testing;
pub mod token;
