use std::fmt;

pub enum Token {
    Word(String),
    Space,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => write!(f, "{}", w),
            Token::Space => write!(f, " "),
        }
    }
}

pub fn tokens(input: &str) -> Vec<Token> {
    input
        .split(' ')
        .map(|w| if w.is_empty() { Token::Space } else { Token::Word(w.to_string()) })
        .collect()
}
