/// What a mode handler did with the token it was given.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum ControlToken {
    /// The token was consumed.
    Continue,
    /// The token was dropped, usually after a parse error.
    Ignored,
    /// The token has to be dispatched again, typically after a mode change.
    Reprocess,
}

impl ControlToken {
    pub(crate) fn reprocess(self) -> bool {
        self == ControlToken::Reprocess
    }
}

// having this be a macro is performance critical. rustc appears to be unable to optimize away code
// like this:
//
// ```rust
// fn noop(s: &str) {}
//
// noop(&format!("foo"));
// ```
//
// format!() + its string allocation still exists in resulting code
macro_rules! trace_log {
    ($($tt:tt)*) => {{
        #[cfg(debug_assertions)]
        crate::testutils::trace_log(&format!($($tt)*));
    }};
}

pub(crate) use trace_log;
