//! Tokenizer crate.

mod parser;

use crate::parser::Token;
use serde::Deserialize;

/// Parser settings.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub strict: bool,
}

pub fn count(input: &str, config: &Config) -> usize {
    let mut n = 0;
    for t in parser::tokens(input) {
        match t {
            Token::Word(_) if config.strict => n += 1,
            Token::Word(_) => n += 2,
            Token::Space => {}
        }
    }
    n
}
