use super::Parser;
use crate::ast::{BinaryOp, Expression, Literal};
use crate::error::{ExprError, SyntaxError, SyntaxErrorKind};
use crate::lexer::Token;

// `depth` is the parenthesis nesting level of the call, threaded through
// the recursion rather than stored on the parser.
impl<'a> Parser<'a> {
    pub(super) fn parse_expr(&mut self, depth: usize) -> Result<Expression, ExprError> {
        self.parse_or_expr(depth)
    }

    // Folding grows the tree without growing the call stack, so each fold
    // is checked against the limit before the chain gets any longer.
    fn parse_or_expr(&mut self, depth: usize) -> Result<Expression, ExprError> {
        let mut left = self.parse_and_expr(depth)?;
        let mut tree_depth = left.depth();
        while self.peek() == &Token::Or {
            let op = self.advance();
            let right = self.parse_and_expr(depth)?;
            tree_depth = self.fold_depth(tree_depth, &right, op)?;
            left = Expression::or(left, right);
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self, depth: usize) -> Result<Expression, ExprError> {
        let mut left = self.parse_not_expr(depth)?;
        let mut tree_depth = left.depth();
        while self.peek() == &Token::And {
            let op = self.advance();
            let right = self.parse_not_expr(depth)?;
            tree_depth = self.fold_depth(tree_depth, &right, op)?;
            left = Expression::and(left, right);
        }
        Ok(left)
    }

    fn parse_not_expr(&mut self, depth: usize) -> Result<Expression, ExprError> {
        if self.peek() == &Token::Not {
            self.advance();
            let e = self.parse_comparison(depth)?;
            return Ok(Expression::not(e));
        }
        self.parse_comparison(depth)
    }

    fn parse_comparison(&mut self, depth: usize) -> Result<Expression, ExprError> {
        let left = self.parse_operand(depth)?;
        match self.compare_op() {
            Some(op) => {
                self.advance();
                let right = self.parse_operand(depth)?;
                Ok(Expression::binary(op, left, right))
            }
            None => Ok(left),
        }
    }

    fn compare_op(&self) -> Option<BinaryOp> {
        match self.peek() {
            Token::Eq => Some(BinaryOp::Eq),
            Token::Neq => Some(BinaryOp::NotEq),
            Token::Lt => Some(BinaryOp::Lt),
            Token::Lte => Some(BinaryOp::Le),
            Token::Gt => Some(BinaryOp::Gt),
            Token::Gte => Some(BinaryOp::Ge),
            _ => None,
        }
    }

    fn parse_operand(&mut self, depth: usize) -> Result<Expression, ExprError> {
        let tok = self.cur();
        match &tok.token {
            Token::LParen => {
                self.check_depth(depth + 1)?;
                self.advance();
                let inner = self.parse_expr(depth + 1)?;
                if self.peek() != &Token::RParen {
                    // Point at the opening parenthesis, not where input ran out.
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnmatchedParen,
                        tok.text.clone(),
                        tok.offset,
                    )
                    .into());
                }
                self.advance();
                Ok(inner)
            }
            Token::Int(n) => {
                self.advance();
                Ok(Expression::Literal(Literal::Int(*n)))
            }
            Token::Float(f) => {
                self.advance();
                Ok(Expression::Literal(Literal::Float(*f)))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expression::Literal(Literal::Text(s.clone())))
            }
            Token::Word(w) if w.eq_ignore_ascii_case("true") => {
                self.advance();
                Ok(Expression::Literal(Literal::Bool(true)))
            }
            Token::Word(w) if w.eq_ignore_ascii_case("false") => {
                self.advance();
                Ok(Expression::Literal(Literal::Bool(false)))
            }
            Token::Word(w) => {
                self.advance();
                Ok(Expression::VariableRef(w.clone()))
            }
            Token::RParen
            | Token::Eq
            | Token::Neq
            | Token::Lt
            | Token::Lte
            | Token::Gt
            | Token::Gte
            | Token::And
            | Token::Or
            | Token::Not
            | Token::Eof => Err(self.syntax_err(SyntaxErrorKind::EmptyOperand).into()),
        }
    }
}
