//! Expression AST
//!
//! Expressions are built from typed fields and composed with `and`, `or`
//! and `not`. Composition never evaluates anything; `to_filters` lowers the
//! tree into the flat, implicitly-ANDed filter list translators consume.
//!
//! Only conjunctions of comparisons (optionally negated) can be lowered.
//! `Or` nodes are constructible but always rejected by `to_filters`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops;

use qe_core::{QueryError, QueryResult, Value};

use crate::filters::{FilterOperator, QueryFilter};

/// Untyped expression tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprNode {
    /// `field <operator> value`
    Comparison {
        field_name: String,
        operator: FilterOperator,
        value: Value,
    },
    And(Box<ExprNode>, Box<ExprNode>),
    Or(Box<ExprNode>, Box<ExprNode>),
    Not(Box<ExprNode>),
}

impl ExprNode {
    /// Node kind, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            ExprNode::Comparison { .. } => "comparison",
            ExprNode::And(..) => "AND",
            ExprNode::Or(..) => "OR",
            ExprNode::Not(..) => "NOT",
        }
    }

    /// Lower into a flat filter list
    pub fn to_filters(&self) -> QueryResult<Vec<QueryFilter>> {
        let mut filters = Vec::new();
        self.lower_into(&mut filters)?;
        Ok(filters)
    }

    fn lower_into(&self, out: &mut Vec<QueryFilter>) -> QueryResult<()> {
        match self {
            ExprNode::Comparison {
                field_name,
                operator,
                value,
            } => {
                out.push(QueryFilter::new(field_name.clone(), *operator, value.clone()));
                Ok(())
            }
            ExprNode::And(left, right) => {
                left.lower_into(out)?;
                right.lower_into(out)
            }
            ExprNode::Or(..) => Err(QueryError::DisjunctionNotSupported),
            ExprNode::Not(inner) => match inner.as_ref() {
                ExprNode::Comparison {
                    field_name,
                    operator,
                    value,
                } => {
                    let inverted = operator.inverse().ok_or_else(|| QueryError::NotInvertible {
                        operator: operator.to_string(),
                    })?;
                    out.push(QueryFilter::new(field_name.clone(), inverted, value.clone()));
                    Ok(())
                }
                other => Err(QueryError::NegationNotSupported { node: other.kind() }),
            },
        }
    }
}

impl fmt::Display for ExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprNode::Comparison {
                field_name,
                operator,
                value,
            } => {
                if operator.requires_value() {
                    write!(f, "{} {} {}", field_name, operator, value)
                } else {
                    write!(f, "{} {}", field_name, operator)
                }
            }
            ExprNode::And(l, r) => write!(f, "({} AND {})", l, r),
            ExprNode::Or(l, r) => write!(f, "({} OR {})", l, r),
            ExprNode::Not(inner) => write!(f, "NOT {}", inner),
        }
    }
}

/// Expression over entity `T`.
///
/// `T` only ties the expression to the entity its fields were declared on;
/// it is never stored.
pub struct Expression<T> {
    node: ExprNode,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Expression<T> {
    /// Leaf comparison
    pub fn comparison(
        field_name: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self::from_node(ExprNode::Comparison {
            field_name: field_name.into(),
            operator,
            value: value.into(),
        })
    }

    pub fn from_node(node: ExprNode) -> Self {
        Self {
            node,
            _entity: PhantomData,
        }
    }

    pub fn node(&self) -> &ExprNode {
        &self.node
    }

    pub fn into_node(self) -> ExprNode {
        self.node
    }

    /// Both expressions must hold
    pub fn and(self, other: Expression<T>) -> Self {
        Self::from_node(ExprNode::And(Box::new(self.node), Box::new(other.node)))
    }

    /// Either expression holds
    pub fn or(self, other: Expression<T>) -> Self {
        Self::from_node(ExprNode::Or(Box::new(self.node), Box::new(other.node)))
    }

    /// Negate this expression
    pub fn not(self) -> Self {
        Self::from_node(ExprNode::Not(Box::new(self.node)))
    }

    /// Lower into a flat filter list.
    ///
    /// Fails for `Or` anywhere in the tree and for `Not` around anything
    /// other than an invertible comparison.
    pub fn to_filters(&self) -> QueryResult<Vec<QueryFilter>> {
        self.node.to_filters().map_err(|err| {
            tracing::warn!(expression = %self.node, error = %err, "Expression cannot be lowered to filters");
            err
        })
    }
}

impl<T> Clone for Expression<T> {
    fn clone(&self) -> Self {
        Self::from_node(self.node.clone())
    }
}

impl<T> PartialEq for Expression<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<T> Eq for Expression<T> {}

impl<T> Hash for Expression<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.hash(state);
    }
}

impl<T> fmt::Debug for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Expression").field(&self.node).finish()
    }
}

impl<T> fmt::Display for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.node.fmt(f)
    }
}

impl<T> ops::BitAnd for Expression<T> {
    type Output = Expression<T>;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl<T> ops::BitOr for Expression<T> {
    type Output = Expression<T>;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl<T> ops::Not for Expression<T> {
    type Output = Expression<T>;

    fn not(self) -> Self::Output {
        Expression::not(self)
    }
}
