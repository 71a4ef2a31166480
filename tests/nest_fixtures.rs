use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use glob::glob;
use libtest_mimic::{Arguments, Trial};
use pretty_assertions::assert_eq;
use serde::Deserialize;

use html5nest::testutils::trace_log;
use html5nest::{Nest, Token, TreeBuilder};

mod testutils;
use testutils::catch_unwind_and_report;

#[derive(Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
enum Kind {
    Open,
    Close,
    Text,
}

#[derive(Deserialize, Clone)]
struct FixtureEntry {
    input: Vec<(Kind, String)>,
    output: Vec<(Kind, String)>,
    #[serde(default)]
    context: Option<String>,
}

fn to_token((kind, raw): &(Kind, String)) -> Token {
    match kind {
        Kind::Open => Token::start_tag(raw.as_str()),
        Kind::Close => Token::end_tag(raw.as_str()),
        Kind::Text => Token::string(raw.as_str()),
    }
}

fn from_token(token: &Token) -> (Kind, String) {
    let kind = match token {
        Token::StartTag(_) => Kind::Open,
        Token::EndTag(_) => Kind::Close,
        Token::String(_) => Kind::Text,
        Token::Eof => panic!("end of input is not part of the output stream"),
    };
    (kind, String::from_utf8_lossy(token.as_bytes()).into_owned())
}

fn produce_testcases_from_file(tests: &mut Vec<Trial>, path: &Path) {
    let fname = path.file_name().unwrap().to_str().unwrap().to_owned();

    let f = File::open(path).unwrap();
    let bf = BufReader::new(f);
    let entries: BTreeMap<String, FixtureEntry> = serde_json::from_reader(bf).unwrap();

    for (name, entry) in entries {
        tests.push(Trial::test(format!("{}:{}", fname, name), move || {
            catch_unwind_and_report(move || run_test(&name, entry))
        }));
    }
}

fn run_test(name: &str, entry: FixtureEntry) {
    trace_log(&format!("==== {} ====", name));

    let builder = match &entry.context {
        Some(context) => TreeBuilder::new_fragment(context.as_str()),
        None => TreeBuilder::new(),
    };
    let input: Vec<Token> = entry.input.iter().map(to_token).collect();

    let actual: Vec<(Kind, String)> = Nest::with_builder(input.into_iter(), builder)
        .map(|token| from_token(&token))
        .collect();

    assert_eq!(actual, entry.output);
}

fn main() {
    let args = Arguments::from_args();
    let mut tests = Vec::new();

    for entry in glob("tests/fixtures/*.json").unwrap() {
        produce_testcases_from_file(&mut tests, &entry.unwrap());
    }

    libtest_mimic::run(&args, tests).exit();
}
