use crate::token::Token;
use crate::tree_builder::TreeBuilder;

/// Run a stream of tokens through a [`TreeBuilder`]. See crate-level docs for basic usage.
///
/// Input is pulled lazily: only as many tokens are read as are needed to produce the next output
/// token. Once `input` is exhausted, the remaining elements are closed and the iterator ends.
#[derive(Debug)]
pub struct Nest<I> {
    input: I,
    builder: TreeBuilder,
    eof: bool,
}

impl<I: Iterator<Item = Token>> Nest<I> {
    /// Build a complete document from `input`.
    pub fn new(input: I) -> Self {
        Nest::with_builder(input, TreeBuilder::new())
    }

    /// Construct a new adapter around a pre-configured tree builder.
    ///
    /// Use this over [`Nest::new`] for fragment parsing or to collect parse errors.
    pub fn with_builder(input: I, builder: TreeBuilder) -> Self {
        Nest {
            input,
            builder,
            eof: false,
        }
    }

    /// The tree builder driven by this iterator, e.g. to inspect [`TreeBuilder::errors`].
    pub fn builder(&self) -> &TreeBuilder {
        &self.builder
    }
}

impl<I: Iterator<Item = Token>> Iterator for Nest<I> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.builder.pop_token() {
                break Some(token);
            } else if !self.eof {
                match self.input.next() {
                    Some(Token::Eof) | None => {
                        self.eof = true;
                        self.builder.flush();
                    }
                    Some(token) => self.builder.push(token),
                }
            } else {
                break None;
            }
        }
    }
}
