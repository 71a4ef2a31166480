/// The insertion mode governing how the next token is interpreted.
///
/// See <https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode>
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InsertionMode {
    /// Before anything but a doctype has been seen.
    Initial,
    /// Before the `html` element is open.
    BeforeHtml,
    /// Before the `head` element is open.
    BeforeHead,
    /// Inside `head`.
    InHead,
    /// After `</head>`, before `body`.
    AfterHead,
    /// Inside `body`.
    InBody,
    /// Inside `table`.
    InTable,
    /// Collecting character data found directly inside a table.
    InTableText,
    /// Inside `caption`.
    InCaption,
    /// Inside `colgroup`.
    InColumnGroup,
    /// Inside `tbody`, `thead` or `tfoot`.
    InTableBody,
    /// Inside `tr`.
    InRow,
    /// Inside `td` or `th`.
    InCell,
    /// Inside `select`.
    InSelect,
    /// Inside a `select` that is itself inside a table.
    InSelectInTable,
    /// After `</body>`.
    AfterBody,
    /// After `</html>`.
    AfterAfterBody,
    /// Inside `frameset`.
    InFrameset,
    /// After `</frameset>`.
    AfterFrameset,
    /// After `</html>` in a frameset document.
    AfterAfterFrameset,
    /// Inside an element whose content is not markup, see [`TextState`].
    Text,
    /// Between a comment opener and its closer. Everything passes through verbatim.
    Comment,
}

/// The kind of raw content the [`InsertionMode::Text`] mode is passing through.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextState {
    /// `title`, `textarea`.
    RcData,
    /// `style`, `xmp`, `iframe`, `noembed`, `noframes`, `noscript`.
    RawText,
    /// `script`.
    ScriptData,
    /// `plaintext`, which is never closed.
    PlainText,
}
