//! Recursive-descent parser for routing and validation expressions.
//!
//! Every call builds a fresh [`Parser`] over a freshly lexed token vector;
//! nothing is shared between calls, so parsing is a pure function of the
//! input text and the configuration.
use crate::ast::Expression;
use crate::config::ParserConfig;
use crate::error::{ExprError, SyntaxError, SyntaxErrorKind};
use crate::lexer::{lex, Spanned, Token};

mod expressions;

/// Parse an expression with the default configuration.
pub fn parse_expression(src: &str) -> Result<Expression, ExprError> {
    parse_expression_with(src, &ParserConfig::default())
}

/// Parse an expression, enforcing `config.max_depth` on both parser
/// nesting and the depth of the resulting tree.
pub fn parse_expression_with(src: &str, config: &ParserConfig) -> Result<Expression, ExprError> {
    let tokens = lex(src)?;
    let mut parser = Parser::new(&tokens, config.max_depth);
    let start = parser.cur().offset;

    let expr = parser.parse_expr(1)?;

    match parser.peek() {
        Token::Eof => {}
        Token::RParen => return Err(parser.syntax_err(SyntaxErrorKind::UnmatchedParen).into()),
        _ => return Err(parser.syntax_err(SyntaxErrorKind::TrailingTokens).into()),
    }

    // Comparisons and NOT inside nested parentheses add levels no single
    // fold sees.
    if expr.depth() > config.max_depth {
        return Err(ExprError::DepthExceeded {
            limit: config.max_depth,
            offset: start,
        });
    }

    tracing::trace!(
        nodes = expr.node_count(),
        depth = expr.depth(),
        "parsed expression"
    );
    Ok(expr)
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned], max_depth: usize) -> Self {
        Parser {
            tokens,
            pos: 0,
            max_depth,
        }
    }

    fn cur(&self) -> &'a Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &'a Token {
        &self.cur().token
    }

    fn advance(&mut self) -> &'a Spanned {
        let t = self.cur();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    /// Syntax error pointing at the current token.
    fn syntax_err(&self, kind: SyntaxErrorKind) -> SyntaxError {
        let cur = self.cur();
        SyntaxError::new(kind, cur.text.clone(), cur.offset)
    }

    /// Depth of `left <op> right` given the depth of `left`, failing at
    /// the connective once it passes the limit.
    fn fold_depth(
        &self,
        left_depth: usize,
        right: &Expression,
        op: &Spanned,
    ) -> Result<usize, ExprError> {
        let folded = left_depth.max(right.depth()) + 1;
        if folded > self.max_depth {
            return Err(ExprError::DepthExceeded {
                limit: self.max_depth,
                offset: op.offset,
            });
        }
        Ok(folded)
    }

    fn check_depth(&self, depth: usize) -> Result<(), ExprError> {
        if depth > self.max_depth {
            return Err(ExprError::DepthExceeded {
                limit: self.max_depth,
                offset: self.cur().offset,
            });
        }
        Ok(())
    }
}
