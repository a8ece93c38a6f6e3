//! Operator enums carried by instruction nodes.

use std::fmt;

/// Binary arithmetic, bitwise and logical operators.
///
/// String concatenation is an [`BinaryOperator::Add`] whose node signature is
/// `Ljava/lang/String;`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `>>>`
    Ushr,
    /// `&`
    And,
    /// `|`
    Or,
    /// `^`
    Xor,
}

impl BinaryOperator {
    /// Java source token for this operator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Rem => "%",
            BinaryOperator::Shl => "<<",
            BinaryOperator::Shr => ">>",
            BinaryOperator::Ushr => ">>>",
            BinaryOperator::And => "&",
            BinaryOperator::Or => "|",
            BinaryOperator::Xor => "^",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// Arithmetic negation, `-x`
    Neg,
    /// Bitwise complement, `~x`
    Complement,
    /// Logical negation, `!x`
    Not,
}

/// Relational operators of conditional branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOperator {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `>`
    Gt,
    /// `<=`
    Le,
}

impl CompareOperator {
    /// Returns the negated comparison.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            CompareOperator::Eq => CompareOperator::Ne,
            CompareOperator::Ne => CompareOperator::Eq,
            CompareOperator::Lt => CompareOperator::Ge,
            CompareOperator::Ge => CompareOperator::Lt,
            CompareOperator::Gt => CompareOperator::Le,
            CompareOperator::Le => CompareOperator::Gt,
        }
    }

    /// Java source token for this operator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOperator::Eq => "==",
            CompareOperator::Ne => "!=",
            CompareOperator::Lt => "<",
            CompareOperator::Ge => ">=",
            CompareOperator::Gt => ">",
            CompareOperator::Le => "<=",
        }
    }
}

/// Connective of a compound condition built from several branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    /// `&&`
    And,
    /// `||`
    Or,
}

/// The three-way comparison instructions (`lcmp`, `fcmpl`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareKind {
    /// `lcmp`
    Long,
    /// `fcmpl`
    FloatL,
    /// `fcmpg`
    FloatG,
    /// `dcmpl`
    DoubleL,
    /// `dcmpg`
    DoubleG,
}

/// Shape of a reconstructed loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    /// `while (test) { body }`
    While,
    /// `do { body } while (test);`
    DoWhile,
    /// `for (init; test; update) { body }`
    For,
    /// `for (;;) { body }`
    Infinite,
}
