use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "!=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }

    pub fn holds(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CompareOp::Eq => ordering == Equal,
            CompareOp::Neq => ordering != Equal,
            CompareOp::Lt => ordering == Less,
            CompareOp::Lte => ordering != Greater,
            CompareOp::Gt => ordering == Greater,
            CompareOp::Gte => ordering != Less,
        }
    }
}

/// Parsed query expression. Field and motif names are kept as written;
/// the compiler resolves them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Or(Vec<Expr>),
    And(Vec<Expr>),
    Not(Box<Expr>),
    Compare { field: String, op: CompareOp, value: Value },
    In { field: String, values: Vec<Value> },
    Motif(String),
    Sequence(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderKey {
    MotifCount(String),
    Field(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub key: OrderKey,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub expr: Expr,
    pub order_by: Option<OrderBy>,
}
