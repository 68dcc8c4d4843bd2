//! Expression AST for routing guards and validation rules.
//!
//! Expressions are plain owned trees: no evaluation, no rendering, no
//! resolution of variable names. Consumers match exhaustively on
//! [`Expression`] so a new variant forces every consumer to be revisited.
//!
//! The derived queries (`variable_names`, `node_count`, `depth`) walk the
//! tree with an explicit stack, so they are safe on arbitrarily deep input.

// ──────────────────────────────────────────────
// Operators
// ──────────────────────────────────────────────

/// Binary operators: two logical connectives and six comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 8] = [
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Eq,
        BinaryOp::NotEq,
        BinaryOp::Lt,
        BinaryOp::Gt,
        BinaryOp::Le,
        BinaryOp::Ge,
    ];

    /// Canonical, language-neutral spelling used by the interchange format.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<BinaryOp> {
        BinaryOp::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_comparison(&self) -> bool {
        !self.is_logical()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnaryOp {
    Not,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Not => "NOT",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<UnaryOp> {
        match symbol {
            "NOT" => Some(UnaryOp::Not),
            _ => None,
        }
    }
}

// ──────────────────────────────────────────────
// Literals
// ──────────────────────────────────────────────

/// A typed scalar constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

/// A boolean or comparison expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    /// Reference to a survey variable by name; never resolved here.
    VariableRef(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn var(name: impl Into<String>) -> Self {
        Expression::VariableRef(name.into())
    }

    pub fn int(value: i64) -> Self {
        Expression::Literal(Literal::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Expression::Literal(Literal::Float(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Expression::Literal(Literal::Text(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Expression::Literal(Literal::Bool(value))
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn not(operand: Expression) -> Self {
        Expression::unary(UnaryOp::Not, operand)
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::binary(BinaryOp::And, left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::binary(BinaryOp::Or, left, right)
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Expression::binary(BinaryOp::Eq, left, right)
    }

    pub fn not_eq(left: Expression, right: Expression) -> Self {
        Expression::binary(BinaryOp::NotEq, left, right)
    }

    pub fn lt(left: Expression, right: Expression) -> Self {
        Expression::binary(BinaryOp::Lt, left, right)
    }

    pub fn gt(left: Expression, right: Expression) -> Self {
        Expression::binary(BinaryOp::Gt, left, right)
    }

    pub fn le(left: Expression, right: Expression) -> Self {
        Expression::binary(BinaryOp::Le, left, right)
    }

    pub fn ge(left: Expression, right: Expression) -> Self {
        Expression::binary(BinaryOp::Ge, left, right)
    }

    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal(_) | Expression::VariableRef(_) => Vec::new(),
            Expression::Unary { operand, .. } => vec![operand.as_ref()],
            Expression::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        }
    }

    /// Referenced variable names in first-appearance (pre-order) order,
    /// without duplicates.
    pub fn variable_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Expression::VariableRef(name) => {
                    if !names.contains(&name.as_str()) {
                        names.push(name.as_str());
                    }
                }
                Expression::Literal(_) => {}
                Expression::Unary { operand, .. } => stack.push(operand),
                Expression::Binary { left, right, .. } => {
                    // Right first so the left subtree is visited first.
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        names
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children());
        }
        count
    }

    /// Depth of the tree; a lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for child in node.children() {
                stack.push((child, depth + 1));
            }
        }
        max_depth
    }
}

// Children are detached onto an explicit stack before a node is freed,
// so tearing down a tree never recurses once per level.
impl Drop for Expression {
    fn drop(&mut self) {
        let mut pending: Vec<Expression> = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_children(&mut pending);
        }
    }
}

impl Expression {
    /// Move every non-leaf child onto `pending`, leaving a leaf in its place.
    fn detach_children(&mut self, pending: &mut Vec<Expression>) {
        let mut detach = |child: &mut Box<Expression>| {
            if !matches!(**child, Expression::Literal(_) | Expression::VariableRef(_)) {
                pending.push(std::mem::replace(
                    child.as_mut(),
                    Expression::Literal(Literal::Bool(false)),
                ));
            }
        };
        match self {
            Expression::Literal(_) | Expression::VariableRef(_) => {}
            Expression::Unary { operand, .. } => detach(operand),
            Expression::Binary { left, right, .. } => {
                detach(left);
                detach(right);
            }
        }
    }
}

impl From<Literal> for Expression {
    fn from(lit: Literal) -> Self {
        Expression::Literal(lit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Expression {
        // (A == 1 | B == 2) & !(A > 3)
        Expression::and(
            Expression::or(
                Expression::eq(Expression::var("A"), Expression::int(1)),
                Expression::eq(Expression::var("B"), Expression::int(2)),
            ),
            Expression::not(Expression::gt(Expression::var("A"), Expression::int(3))),
        )
    }

    #[test]
    fn test_leaf_metrics() {
        let leaf = Expression::var("X");
        assert_eq!(leaf.node_count(), 1);
        assert_eq!(leaf.depth(), 1);
        assert_eq!(leaf.variable_names(), vec!["X"]);
    }

    #[test]
    fn test_comparison_metrics() {
        let expr = Expression::eq(Expression::var("X"), Expression::int(1));
        assert_eq!(expr.node_count(), 3);
        assert_eq!(expr.depth(), 2);
    }

    #[test]
    fn test_nested_metrics() {
        let expr = sample();
        // and + or + 2 * (eq + var + lit) + not + (gt + var + lit)
        assert_eq!(expr.node_count(), 12);
        // and -> not -> gt -> leaf
        assert_eq!(expr.depth(), 4);
    }

    #[test]
    fn test_variable_names_ordered_and_deduplicated() {
        assert_eq!(sample().variable_names(), vec!["A", "B"]);
    }

    #[test]
    fn test_literals_reference_no_variables() {
        let expr = Expression::eq(Expression::text("yes"), Expression::bool(true));
        assert!(expr.variable_names().is_empty());
    }

    #[test]
    fn test_symbol_round_trip() {
        for op in BinaryOp::ALL {
            assert_eq!(BinaryOp::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(UnaryOp::from_symbol("NOT"), Some(UnaryOp::Not));
        assert_eq!(BinaryOp::from_symbol("=>"), None);
    }

    #[test]
    fn test_operator_classes() {
        assert!(BinaryOp::And.is_logical());
        assert!(BinaryOp::Or.is_logical());
        assert!(BinaryOp::Le.is_comparison());
        assert!(!BinaryOp::Eq.is_logical());
    }

    #[test]
    fn test_deep_tree_walks_without_recursion() {
        let mut expr = Expression::var("X");
        for _ in 0..10_000 {
            expr = Expression::not(expr);
        }
        assert_eq!(expr.depth(), 10_001);
        assert_eq!(expr.node_count(), 10_001);
    }

    #[test]
    fn test_very_deep_trees_drop_without_overflow() {
        let mut chain = Expression::var("X");
        for i in 0..300_000 {
            let term = Expression::eq(Expression::var("Y"), Expression::int(i));
            chain = Expression::and(chain, term);
        }
        let mut nested = Expression::var("X");
        for _ in 0..300_000 {
            nested = Expression::not(nested);
        }
        assert_eq!(chain.depth(), 300_002);
        drop(chain);
        drop(nested);
    }
}
