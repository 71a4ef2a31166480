use html5nest::{Error, Nest, Token, TreeBuilder, TreeBuilderOpts};
use pretty_assertions::assert_eq;

/// Split markup into tokens, the way a tokenizer without any state would.
fn tokenize(html: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = html;
    while !rest.is_empty() {
        if rest.starts_with('<') {
            let end = rest.find('>').map_or(rest.len(), |i| i + 1);
            let (tag, tail) = rest.split_at(end);
            if tag.starts_with("</") {
                tokens.push(Token::end_tag(tag));
            } else {
                tokens.push(Token::start_tag(tag));
            }
            rest = tail;
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            let (text, tail) = rest.split_at(end);
            tokens.push(Token::string(text));
            rest = tail;
        }
    }
    tokens
}

fn drain(builder: &mut TreeBuilder) -> Vec<Token> {
    let mut out = Vec::new();
    while let Some(token) = builder.pop_token() {
        out.push(token);
    }
    out
}

fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| String::from_utf8_lossy(token.as_bytes()).into_owned())
        .collect()
}

fn parse(html: &str) -> Vec<Token> {
    Nest::new(tokenize(html).into_iter()).collect()
}

fn parse_fragment(context: &str, html: &str) -> Vec<Token> {
    Nest::with_builder(tokenize(html).into_iter(), TreeBuilder::new_fragment(context)).collect()
}

fn is_void(name: &[u8]) -> bool {
    matches!(
        name,
        b"area"
            | b"base"
            | b"br"
            | b"col"
            | b"embed"
            | b"hr"
            | b"img"
            | b"input"
            | b"link"
            | b"meta"
            | b"source"
            | b"track"
            | b"wbr"
    )
}

fn assert_well_formed(tokens: &[Token]) {
    let mut open: Vec<&[u8]> = Vec::new();
    for token in tokens {
        match token {
            Token::StartTag(tag) if tag.name.starts_with(b"!") || is_void(&tag.name) => {}
            Token::StartTag(tag) => open.push(&tag.name),
            Token::EndTag(tag) => {
                assert_eq!(
                    open.pop().map(String::from_utf8_lossy),
                    Some(String::from_utf8_lossy(&tag.name)),
                    "unbalanced end tag in {}",
                    render(tokens)
                );
            }
            Token::String(_) => {}
            Token::Eof => panic!("end of input in output"),
        }
    }
    assert!(open.is_empty(), "unclosed elements in {}", render(tokens));
}

#[test]
fn every_element_is_closed() {
    for html in &[
        "<b><p>x</b>y</p>",
        "<table>foo<tr><td>bar</table>",
        "<b><div><i>x</b>y</div>z",
        "<p><li>a<div>b</p>c",
        "<table><b>x</table>y",
        "<ul><li><b>a<li>b</ul>",
        "<b><i><u><div>x</b>y",
        "<table><tr><td><table>x</table></td></tr></table>",
        "</div></table></b>",
        "<select><option>a<option>b",
    ] {
        assert_well_formed(&parse(html));
    }
}

#[test]
fn implied_document_structure() {
    assert_eq!(
        render(&parse("")),
        "<html><head></head><body></body></html>"
    );
    assert_eq!(
        render(&parse("x")),
        "<html><head></head><body>x</body></html>"
    );
}

#[test]
fn flush_is_idempotent() {
    let mut builder = TreeBuilder::new();
    for token in tokenize("<div><b>x") {
        builder.push(token);
    }
    builder.flush();
    let first = drain(&mut builder);
    assert_eq!(
        render(&first),
        "<html><head></head><body><div><b>x</b></div></body></html>"
    );

    builder.flush();
    builder.push(Token::Eof);
    builder.push(Token::string("late"));
    assert!(drain(&mut builder).is_empty());
}

#[test]
fn formatting_is_reconstructed() {
    assert_eq!(
        render(&parse("<p><b>x</p>y")),
        "<html><head></head><body><p><b>x</b></p><b>y</b></body></html>"
    );
    assert_eq!(
        render(&parse("<b>x<p>y</p>z")),
        "<html><head></head><body><b>x<p>y</p>z</b></body></html>"
    );
}

#[test]
fn adoption_agency() {
    assert_eq!(
        render(&parse("<b><p>x</b>y</p>")),
        "<html><head></head><body><b></b><p><b>x</b>y</p></body></html>"
    );
    assert_eq!(
        render(&parse("<b><i></b>x")),
        "<html><head></head><body><b><i></i></b><i>x</i></body></html>"
    );
}

#[test]
fn foster_parenting() {
    assert_eq!(
        render(&parse("<table>foo<tr><td>bar</table>")),
        "<html><head></head><body>foo<table><tbody><tr><td>bar</td></tr></tbody></table></body></html>"
    );
    assert_eq!(
        render(&parse("<table><b>x</table>y")),
        "<html><head></head><body><b>x</b><table></table><b>y</b></body></html>"
    );
}

#[test]
fn fragment_parsing() {
    assert_eq!(
        render(&parse_fragment("td", "<span>x</span>")),
        "<span>x</span>"
    );
    assert_eq!(render(&parse_fragment("tr", "<td>x")), "<td>x</td>");
    assert_eq!(render(&parse_fragment("div", "</div>x")), "x");
    assert_eq!(render(&parse_fragment("body", "<p>a")), "<p>a</p>");
}

#[test]
fn reprocessing_is_bounded() {
    let mut builder = TreeBuilder::new_with_opts(TreeBuilderOpts {
        track_errors: true,
        reprocess_limit: 0,
        ..TreeBuilderOpts::default()
    });
    builder.push(Token::string("x"));
    builder.flush();
    let out = drain(&mut builder);

    assert!(builder.errors().contains(&Error::ReprocessLimitExceeded));
    assert_well_formed(&out);
}

#[test]
fn parse_errors_can_be_collected() {
    let tokens = tokenize("<table>x</table></span>");
    let mut nest = Nest::with_builder(
        tokens.into_iter(),
        TreeBuilder::new_with_opts(TreeBuilderOpts {
            track_errors: true,
            ..TreeBuilderOpts::default()
        }),
    );
    let out: Vec<Token> = nest.by_ref().collect();

    assert_well_formed(&out);
    let errors = nest.builder().errors();
    assert!(errors.contains(&Error::NonSpaceCharactersInTable));
    assert!(errors.contains(&Error::EndTagWithoutMatchingOpenElement));
}

/// Seeded linear congruential generator, so that a failing input can be reproduced.
struct Lcg(u64);

impl Lcg {
    fn below(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) % bound as u64) as usize
    }
}

/// Element names whose content is markup. Raw text elements are left out because their content is
/// passed through without being balanced.
const RANDOM_TAGS: &[&str] = &[
    "html", "head", "body", "p", "div", "span", "b", "i", "a", "nobr", "em", "table", "caption",
    "colgroup", "col", "tbody", "tr", "td", "th", "select", "option", "optgroup", "ul", "li",
    "form", "button", "h1", "pre", "template", "object", "input", "br", "img", "hr",
];

fn random_tokens(rng: &mut Lcg) -> Vec<Token> {
    let len = rng.below(24) + 1;
    (0..len)
        .map(|_| match rng.below(5) {
            0 if rng.below(2) == 0 => Token::string("x"),
            0 => Token::string(" "),
            1 => {
                let name = RANDOM_TAGS[rng.below(RANDOM_TAGS.len())];
                Token::end_tag(format!("</{}>", name).into_bytes())
            }
            _ => {
                let name = RANDOM_TAGS[rng.below(RANDOM_TAGS.len())];
                Token::start_tag(format!("<{}>", name).into_bytes())
            }
        })
        .collect()
}

#[test]
fn random_input_stays_balanced() {
    let mut rng = Lcg(0x9e37_79b9_7f4a_7c15);
    for _ in 0..20_000 {
        let input = random_tokens(&mut rng);
        let mut builder = TreeBuilder::new_with_opts(TreeBuilderOpts {
            track_errors: true,
            ..TreeBuilderOpts::default()
        });
        for token in input.iter().cloned() {
            builder.push(token);
        }
        builder.flush();
        let out = drain(&mut builder);

        assert_well_formed(&out);
        assert!(
            !builder.errors().contains(&Error::ReprocessLimitExceeded),
            "reprocess limit hit for {}",
            render(&input)
        );
    }
}
