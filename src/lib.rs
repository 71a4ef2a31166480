#![deny(missing_docs)]
// This is an HTML parser. HTML can be untrusted input from the internet.
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod adoption;
mod attributes;
mod error;
mod formatting;
mod nest;
mod rules;
mod sequencer;
mod stack;
mod state;
mod tags;
mod token;
mod tree_builder;
mod utils;

#[doc(hidden)]
pub mod testutils;

pub use attributes::Attributes;
pub use error::Error;
pub use nest::Nest;
pub use state::{InsertionMode, TextState};
pub use token::{EndTag, HtmlString, StartTag, Token};
pub use tree_builder::{TreeBuilder, TreeBuilderOpts};
