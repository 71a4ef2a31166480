//! Module of helper functions for integration tests.
//!
//! Those tests should only test public API surface in general, with some exceptions as provided by
//! this module.
use std::cell::Cell;

use crate::Token;

thread_local! {
    /// Buffer of all debugging output logged internally by html5nest.
    pub static OUTPUT: Cell<String> = Cell::default();
}

/// Simple debug logger for tests.
///
/// The test harness used by `tests/nest_fixtures.rs` cannot capture stdout, see [libtest-mimic
/// issue #9](https://github.com/LukasKalbertodt/libtest-mimic/issues/9) -- this is much more performant
/// than println anyway though.
///
/// In release builds the `trace_log!` macro compiles to nothing and this is never called.
pub fn trace_log(msg: &str) {
    OUTPUT.with(|cell| {
        let mut buf = cell.take();
        buf.push_str(msg);
        buf.push('\n');

        if buf.len() > 20 * 1024 * 1024 {
            buf.clear();
            buf.push_str("[truncated output]\n");
        }

        cell.set(buf);
    });
}

/// Render a token sequence as the concatenation of its markup, e.g. `<b>x</b>`.
pub fn serialize<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> String {
    let mut rv = String::new();
    for token in tokens {
        rv.push_str(&String::from_utf8_lossy(token.as_bytes()));
    }
    rv
}
