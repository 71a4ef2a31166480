//! Element categories used by the insertion modes.
//!
//! See <https://html.spec.whatwg.org/multipage/parsing.html#special>

/// Tokens with these names are dropped outright. They show up in documents where Microsoft Word
/// fragments were copy/pasted.
pub(crate) fn is_ignored(name: &[u8]) -> bool {
    matches!(name, b"?xml:namespace")
}

pub(crate) fn is_comment_start(name: &[u8]) -> bool {
    name.starts_with(b"!--")
}

/// The tokenizer closes comments with a `-->` token whose name is all dashes.
pub(crate) fn is_comment_end(name: &[u8]) -> bool {
    !name.is_empty() && name.iter().all(|&b| b == b'-')
}

pub(crate) fn is_doctype(name: &[u8]) -> bool {
    name == b"!doctype"
}

/// `<!...>` and `<?...>` markup that is neither a doctype nor a comment opener.
pub(crate) fn is_bogus_markup(name: &[u8]) -> bool {
    matches!(name.first(), Some(b'!' | b'?')) && !is_doctype(name) && !is_comment_start(name)
}

pub(crate) fn is_formatting(name: &[u8]) -> bool {
    matches!(
        name,
        b"a" | b"b"
            | b"big"
            | b"code"
            | b"em"
            | b"font"
            | b"i"
            | b"nobr"
            | b"s"
            | b"small"
            | b"strike"
            | b"strong"
            | b"tt"
            | b"u"
    )
}

pub(crate) fn is_special(name: &[u8]) -> bool {
    matches!(
        name,
        b"address"
            | b"applet"
            | b"area"
            | b"article"
            | b"aside"
            | b"base"
            | b"basefont"
            | b"bgsound"
            | b"blockquote"
            | b"body"
            | b"br"
            | b"button"
            | b"caption"
            | b"center"
            | b"col"
            | b"colgroup"
            | b"dd"
            | b"details"
            | b"dir"
            | b"div"
            | b"dl"
            | b"dt"
            | b"embed"
            | b"fieldset"
            | b"figcaption"
            | b"figure"
            | b"footer"
            | b"form"
            | b"frame"
            | b"frameset"
            | b"h1"
            | b"h2"
            | b"h3"
            | b"h4"
            | b"h5"
            | b"h6"
            | b"head"
            | b"header"
            | b"hgroup"
            | b"hr"
            | b"html"
            | b"iframe"
            | b"img"
            | b"input"
            | b"isindex"
            | b"li"
            | b"link"
            | b"listing"
            | b"main"
            | b"marquee"
            | b"menu"
            | b"menuitem"
            | b"meta"
            | b"nav"
            | b"noembed"
            | b"noframes"
            | b"noscript"
            | b"object"
            | b"ol"
            | b"p"
            | b"param"
            | b"plaintext"
            | b"pre"
            | b"script"
            | b"search"
            | b"section"
            | b"select"
            | b"source"
            | b"style"
            | b"summary"
            | b"table"
            | b"tbody"
            | b"td"
            | b"template"
            | b"textarea"
            | b"tfoot"
            | b"th"
            | b"thead"
            | b"title"
            | b"tr"
            | b"track"
            | b"ul"
            | b"wbr"
            | b"xmp"
    )
}

/// Elements that never have content and therefore never get an end tag.
pub(crate) fn is_void(name: &[u8]) -> bool {
    matches!(
        name,
        b"area"
            | b"base"
            | b"basefont"
            | b"bgsound"
            | b"br"
            | b"col"
            | b"embed"
            | b"frame"
            | b"hr"
            | b"img"
            | b"input"
            | b"keygen"
            | b"link"
            | b"menuitem"
            | b"meta"
            | b"param"
            | b"source"
            | b"track"
            | b"wbr"
    )
}

/// Start tags the "in head" rules own and which other modes forward there.
pub(crate) fn is_head_content(name: &[u8]) -> bool {
    matches!(
        name,
        b"base"
            | b"basefont"
            | b"bgsound"
            | b"link"
            | b"meta"
            | b"noframes"
            | b"script"
            | b"style"
            | b"template"
            | b"title"
    )
}

pub(crate) fn is_metadata_void(name: &[u8]) -> bool {
    matches!(name, b"base" | b"basefont" | b"bgsound" | b"link" | b"meta")
}

/// End tags that the "in body" rules close by popping down to the matching element.
pub(crate) fn is_block_end_tag(name: &[u8]) -> bool {
    matches!(
        name,
        b"address"
            | b"article"
            | b"aside"
            | b"blockquote"
            | b"button"
            | b"center"
            | b"details"
            | b"dialog"
            | b"dir"
            | b"div"
            | b"dl"
            | b"fieldset"
            | b"figcaption"
            | b"figure"
            | b"footer"
            | b"header"
            | b"hgroup"
            | b"listing"
            | b"main"
            | b"menu"
            | b"nav"
            | b"ol"
            | b"pre"
            | b"search"
            | b"section"
            | b"summary"
            | b"ul"
    )
}

/// Start tags that close an open `p` and are then inserted like any other element.
pub(crate) fn is_block_start_tag(name: &[u8]) -> bool {
    matches!(
        name,
        b"address"
            | b"article"
            | b"aside"
            | b"blockquote"
            | b"center"
            | b"details"
            | b"dialog"
            | b"dir"
            | b"div"
            | b"dl"
            | b"fieldset"
            | b"figcaption"
            | b"figure"
            | b"footer"
            | b"header"
            | b"hgroup"
            | b"main"
            | b"menu"
            | b"nav"
            | b"ol"
            | b"p"
            | b"search"
            | b"section"
            | b"summary"
            | b"ul"
    )
}

pub(crate) fn is_heading(name: &[u8]) -> bool {
    matches!(name, b"h1" | b"h2" | b"h3" | b"h4" | b"h5" | b"h6")
}

/// Table-structure start tags that are meaningless outside of a table.
pub(crate) fn is_table_structure(name: &[u8]) -> bool {
    matches!(
        name,
        b"caption"
            | b"col"
            | b"colgroup"
            | b"tbody"
            | b"td"
            | b"tfoot"
            | b"th"
            | b"thead"
            | b"tr"
    )
}

pub(crate) fn is_table_section(name: &[u8]) -> bool {
    matches!(name, b"tbody" | b"tfoot" | b"thead")
}

pub(crate) fn is_cell(name: &[u8]) -> bool {
    matches!(name, b"td" | b"th")
}

/// Current nodes for which text is buffered in "in table text" and inserted elements are
/// foster-parented.
pub(crate) fn is_table_context(name: &[u8]) -> bool {
    matches!(
        name,
        b"table" | b"tbody" | b"template" | b"tfoot" | b"thead" | b"tr"
    )
}

/// Inserting into one of these while foster parenting is enabled redirects the content to before
/// the table.
pub(crate) fn is_foster_target(name: &[u8]) -> bool {
    matches!(name, b"table" | b"tbody" | b"tfoot" | b"thead" | b"tr")
}

/// Elements popped by "generate implied end tags".
pub(crate) fn has_implied_end_tag(name: &[u8]) -> bool {
    matches!(
        name,
        b"dd" | b"dt" | b"li" | b"optgroup" | b"option" | b"p" | b"rb" | b"rp" | b"rt" | b"rtc"
    )
}

/// Elements popped by "generate all implied end tags thoroughly".
pub(crate) fn has_implied_end_tag_thoroughly(name: &[u8]) -> bool {
    has_implied_end_tag(name)
        || matches!(
            name,
            b"caption" | b"colgroup" | b"tbody" | b"td" | b"tfoot" | b"th" | b"thead" | b"tr"
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_markers() {
        assert!(is_comment_start(b"!--"));
        assert!(is_comment_end(b"-"));
        assert!(is_comment_end(b"--"));
        assert!(!is_comment_end(b""));
        assert!(!is_comment_end(b"-x"));
    }

    #[test]
    fn bogus_markup() {
        assert!(is_bogus_markup(b"?php"));
        assert!(is_bogus_markup(b"![cdata["));
        assert!(!is_bogus_markup(b"!doctype"));
        assert!(!is_bogus_markup(b"!--"));
        assert!(!is_bogus_markup(b"div"));
    }

    #[test]
    fn categories_do_not_overlap() {
        for name in [&b"a"[..], &b"b"[..], &b"nobr"[..], &b"u"[..]] {
            assert!(is_formatting(name));
            assert!(!is_special(name));
        }
        assert!(is_special(b"p") && !is_formatting(b"p"));
    }
}
