use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One side of a comparison. A `Variable` is resolved by name when the workflow runs,
/// a `Literal` is used verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Operand {
    Literal(String),
    Variable(String),
}

/// The discriminant of an [`Operand`], used when the editor switches an operand's type
/// without touching its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandKind {
    Literal,
    Variable,
}

impl Operand {
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::Literal(_) => OperandKind::Literal,
            Operand::Variable(_) => OperandKind::Variable,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Operand::Literal(v) | Operand::Variable(v) => v,
        }
    }

    /// Re-tags the operand, keeping its current value.
    pub fn with_kind(self, kind: OperandKind) -> Self {
        let value = self.into_value();
        match kind {
            OperandKind::Literal => Operand::Literal(value),
            OperandKind::Variable => Operand::Variable(value),
        }
    }

    /// Replaces the value, keeping the current kind.
    pub fn with_value(self, value: impl Into<String>) -> Self {
        match self {
            Operand::Literal(_) => Operand::Literal(value.into()),
            Operand::Variable(_) => Operand::Variable(value.into()),
        }
    }

    pub fn into_value(self) -> String {
        match self {
            Operand::Literal(v) | Operand::Variable(v) => v,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.value().trim().is_empty()
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(v) => write!(f, "{}", v),
            Operand::Variable(name) => write!(f, "${}", name),
        }
    }
}

/// Comparison operators available to a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    #[default]
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::GreaterThan,
        Operator::GreaterThanOrEqual,
        Operator::LessThan,
        Operator::LessThanOrEqual,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
        }
    }

    /// The vocabulary the persistence API expects on the wire.
    pub fn external_name(&self) -> &'static str {
        match self {
            Operator::Equal => "eq",
            Operator::NotEqual => "ne",
            Operator::GreaterThan => "gt",
            Operator::GreaterThanOrEqual => "gte",
            Operator::LessThan => "lt",
            Operator::LessThanOrEqual => "lte",
        }
    }

    pub fn from_external(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.external_name() == name)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = String;

    /// Accepts either the symbol (`>=`) or the external name (`gte`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.symbol() == s || op.external_name() == s)
            .ok_or_else(|| format!("unknown operator '{}'", s))
    }
}

/// A single boolean comparison: `left <operator> right`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expression {
    pub left: Operand,
    pub operator: Operator,
    pub right: Operand,
}

impl Default for Expression {
    /// A variable compared for equality against an empty literal.
    fn default() -> Self {
        Self {
            left: Operand::Variable(String::new()),
            operator: Operator::Equal,
            right: Operand::Literal(String::new()),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}
