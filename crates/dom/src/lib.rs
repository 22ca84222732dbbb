pub mod attrs;
pub mod serialize;

mod builder;
mod entities;
mod tokenizer;
mod tree;
mod types;

pub use crate::tokenizer::tokenize;
pub use crate::tree::{DomTree, SwapError, SwapOutcome, parse_fragment};
pub use crate::types::{Id, Node, NodeId, Token};
