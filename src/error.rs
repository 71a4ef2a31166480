macro_rules! impl_error {
    ($(
        $string:literal <=> $variant:ident,
    )*) => {
        /// All parse errors the tree builder can report.
        ///
        /// None of them are fatal: the offending token is dropped or redirected and processing
        /// continues.
        #[derive(Debug, Eq, PartialEq, Clone, Copy)]
        pub enum Error {
            $(
                #[doc = concat!("The `", $string, "` error.")]
                $variant
            ),*
        }
        impl std::str::FromStr for Error {
            type Err = ();

            /// Parse a `kebap-case` error code into an enum variant.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $string => Ok(Self::$variant), )*
                    _ => Err(())
                }
            }
        }

        impl Error {
            /// Convert an enum variant back into its `kebap-case` error code.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match *self {
                    $( Self::$variant => $string, )*
                }
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl_error! {
    "unexpected-doctype" <=> UnexpectedDoctype,
    "unexpected-start-tag" <=> UnexpectedStartTag,
    "unexpected-end-tag" <=> UnexpectedEndTag,
    "end-tag-without-matching-open-element" <=> EndTagWithoutMatchingOpenElement,
    "misnested-end-tag" <=> MisnestedEndTag,
    "adoption-agency-outer-loop-exhausted" <=> AdoptionAgencyOuterLoopExhausted,
    "non-space-characters-in-table" <=> NonSpaceCharactersInTable,
    "unexpected-text-after-body" <=> UnexpectedTextAfterBody,
    "eof-in-text" <=> EofInText,
    "eof-in-comment" <=> EofInComment,
    "nested-form" <=> NestedForm,
    "reprocess-limit-exceeded" <=> ReprocessLimitExceeded,
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn codes_round_trip() {
        let error: Error = "misnested-end-tag".parse().unwrap();
        assert_eq!(error, Error::MisnestedEndTag);
        assert_eq!(error.to_string(), "misnested-end-tag");
        assert!("no-such-error".parse::<Error>().is_err());
    }
}
