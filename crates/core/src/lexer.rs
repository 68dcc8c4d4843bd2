use crate::error::{SyntaxError, SyntaxErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers, including TRUE and FALSE which the parser turns into literals
    Word(String),
    /// Quoted text literal (content without quotes)
    Str(String),
    /// Integer literal, sign included
    Int(i64),
    /// Float literal, sign included
    Float(f64),
    LParen,
    RParen,
    // Comparison operators
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    // Logical operators
    And,
    Or,
    Not,
    // End of input
    Eof,
}

/// A token with its source position.
///
/// `offset` is the 0-based character offset of the first character and
/// `text` the exact source characters the token was read from.
#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
    pub text: String,
}

pub fn lex(src: &str) -> Result<Vec<Spanned>, SyntaxError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;

    let slice = |from: usize, to: usize| -> String { chars[from..to].iter().collect() };

    while pos < chars.len() {
        let c = chars[pos];

        // Whitespace, including line breaks inside multi-line cells
        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;

        // Text literal
        if c == '"' || c == '\'' {
            let quote = c;
            pos += 1;
            let mut s = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnterminatedString,
                        slice(start, chars.len()),
                        start,
                    ));
                }
                let sc = chars[pos];
                if sc == quote {
                    pos += 1;
                    break;
                }
                s.push(sc);
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                offset: start,
                text: slice(start, pos),
            });
            continue;
        }

        // Number: optional '-' directly followed by a digit
        if c.is_ascii_digit()
            || (c == '-' && pos + 1 < chars.len() && chars[pos + 1].is_ascii_digit())
        {
            if c == '-' {
                pos += 1;
            }
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            let mut dots = 0;
            // Swallow the whole run of number-like characters so that
            // "1.2.3" or "12abc" is reported as one malformed literal.
            while pos < chars.len()
                && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '.' || chars[pos] == '_')
            {
                if chars[pos] == '.' {
                    dots += 1;
                }
                pos += 1;
            }
            let text = slice(start, pos);
            let malformed =
                || SyntaxError::new(SyntaxErrorKind::MalformedNumber, text.clone(), start);

            let token = if dots == 0 {
                Token::Int(text.parse::<i64>().map_err(|_| malformed())?)
            } else {
                // Exactly one '.', with digits on both sides
                let valid = dots == 1
                    && text
                        .trim_start_matches('-')
                        .split('.')
                        .all(|part| !part.is_empty() && part.chars().all(|d| d.is_ascii_digit()));
                if !valid {
                    return Err(malformed());
                }
                Token::Float(text.parse::<f64>().map_err(|_| malformed())?)
            };
            tokens.push(Spanned {
                token,
                offset: start,
                text,
            });
            continue;
        }

        // Operators
        let two = if pos + 1 < chars.len() {
            Some(chars[pos + 1])
        } else {
            None
        };
        let op = match (c, two) {
            ('=', Some('=')) => Some((Token::Eq, 2)),
            // SPSS-style single '='
            ('=', _) => Some((Token::Eq, 1)),
            ('!', Some('=')) => Some((Token::Neq, 2)),
            ('!', _) => Some((Token::Not, 1)),
            ('<', Some('=')) => Some((Token::Lte, 2)),
            // SPSS-style '<>'
            ('<', Some('>')) => Some((Token::Neq, 2)),
            ('<', _) => Some((Token::Lt, 1)),
            ('>', Some('=')) => Some((Token::Gte, 2)),
            ('>', _) => Some((Token::Gt, 1)),
            ('&', _) => Some((Token::And, 1)),
            ('|', _) => Some((Token::Or, 1)),
            ('(', _) => Some((Token::LParen, 1)),
            (')', _) => Some((Token::RParen, 1)),
            _ => None,
        };
        if let Some((token, len)) = op {
            pos += len;
            tokens.push(Spanned {
                token,
                offset: start,
                text: slice(start, pos),
            });
            continue;
        }

        // Identifier / keyword
        if c.is_ascii_alphabetic() || c == '_' {
            while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            let word = slice(start, pos);
            let token = match word.to_ascii_uppercase().as_str() {
                "AND" => Token::And,
                "OR" => Token::Or,
                "NOT" => Token::Not,
                _ => Token::Word(word.clone()),
            };
            tokens.push(Spanned {
                token,
                offset: start,
                text: word,
            });
            continue;
        }

        // Unknown: report the run of non-space punctuation
        while pos < chars.len()
            && !chars[pos].is_whitespace()
            && !chars[pos].is_ascii_alphanumeric()
            && !matches!(chars[pos], '(' | ')' | '"' | '\'' | '_')
        {
            pos += 1;
        }
        return Err(SyntaxError::new(
            SyntaxErrorKind::UnknownOperator,
            slice(start, pos.max(start + 1)),
            start,
        ));
    }

    tokens.push(Spanned {
        token: Token::Eof,
        offset: chars.len(),
        text: String::new(),
    });
    Ok(tokens)
}
