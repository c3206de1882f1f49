//! Typed Field Accessors
//!
//! Entities declare their queryable columns as typed fields. A field only
//! knows its name and the Rust type of its values; every operation returns
//! an [`Expression`] over the owning entity.
//!
//! ```
//! use qe_queries::fields::{ComparableField, OrderedField, StringField, TextField, TypedField};
//!
//! struct Task;
//!
//! const TITLE: StringField<Task> = StringField::new("title");
//! const PRIORITY: ComparableField<Task, i64> = ComparableField::new("priority");
//!
//! let expr = TITLE.starts_with("fix").and(PRIORITY.greater_than(2));
//! assert_eq!(expr.to_filters().unwrap().len(), 2);
//! ```
//!
//! Fields are equal when their names are equal, whatever their type
//! parameters, so the same column declared in two places compares equal.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use qe_core::Value;

use crate::expression::Expression;
use crate::filters::FilterOperator;

/// Operations available on every field
pub trait TypedField<T> {
    /// Rust type of the field's values
    type FieldType: Into<Value>;

    /// Declared column name
    fn name(&self) -> &str;

    fn equals(&self, value: impl Into<Self::FieldType>) -> Expression<T> {
        compare::<T, Self::FieldType>(self.name(), FilterOperator::Equals, value.into())
    }

    fn not_equals(&self, value: impl Into<Self::FieldType>) -> Expression<T> {
        compare::<T, Self::FieldType>(self.name(), FilterOperator::NotEquals, value.into())
    }

    fn is_null(&self) -> Expression<T> {
        Expression::comparison(self.name(), FilterOperator::IsNull, Value::Null)
    }

    fn is_not_null(&self) -> Expression<T> {
        Expression::comparison(self.name(), FilterOperator::IsNotNull, Value::Null)
    }

    fn is_in<I>(&self, values: I) -> Expression<T>
    where
        I: IntoIterator,
        I::Item: Into<Self::FieldType>,
    {
        Expression::comparison(
            self.name(),
            FilterOperator::WhereIn,
            collect::<Self::FieldType, _>(values),
        )
    }

    fn is_not_in<I>(&self, values: I) -> Expression<T>
    where
        I: IntoIterator,
        I::Item: Into<Self::FieldType>,
    {
        Expression::comparison(
            self.name(),
            FilterOperator::WhereNotIn,
            collect::<Self::FieldType, _>(values),
        )
    }
}

/// Fields whose values have a natural order
pub trait OrderedField<T>: TypedField<T> {
    fn greater_than(&self, value: impl Into<Self::FieldType>) -> Expression<T> {
        compare::<T, Self::FieldType>(self.name(), FilterOperator::GreaterThan, value.into())
    }

    fn greater_than_or_equal_to(&self, value: impl Into<Self::FieldType>) -> Expression<T> {
        compare::<T, Self::FieldType>(self.name(), FilterOperator::GreaterThanOrEquals, value.into())
    }

    fn less_than(&self, value: impl Into<Self::FieldType>) -> Expression<T> {
        compare::<T, Self::FieldType>(self.name(), FilterOperator::LessThan, value.into())
    }

    fn less_than_or_equal_to(&self, value: impl Into<Self::FieldType>) -> Expression<T> {
        compare::<T, Self::FieldType>(self.name(), FilterOperator::LessThanOrEquals, value.into())
    }
}

/// Text fields
pub trait TextField<T>: OrderedField<T> {
    fn contains(&self, value: impl Into<String>) -> Expression<T> {
        Expression::comparison(self.name(), FilterOperator::Contains, Into::<String>::into(value))
    }

    fn starts_with(&self, value: impl Into<String>) -> Expression<T> {
        Expression::comparison(self.name(), FilterOperator::StartsWith, Into::<String>::into(value))
    }

    fn ends_with(&self, value: impl Into<String>) -> Expression<T> {
        Expression::comparison(self.name(), FilterOperator::EndsWith, Into::<String>::into(value))
    }
}

/// Fields holding a list of elements
pub trait CollectionField<T>: TypedField<T> {
    type Element: Into<Value>;

    fn array_contains(&self, element: impl Into<Self::Element>) -> Expression<T> {
        compare::<T, Self::Element>(self.name(), FilterOperator::ArrayContains, element.into())
    }

    fn array_contains_any<I>(&self, elements: I) -> Expression<T>
    where
        I: IntoIterator,
        I::Item: Into<Self::Element>,
    {
        Expression::comparison(
            self.name(),
            FilterOperator::ArrayContainsAny,
            collect::<Self::Element, _>(elements),
        )
    }
}

fn compare<T, V: Into<Value>>(name: &str, operator: FilterOperator, value: V) -> Expression<T> {
    Expression::comparison(name, operator, value.into())
}

fn collect<V, I>(values: I) -> Value
where
    V: Into<Value>,
    I: IntoIterator,
    I::Item: Into<V>,
{
    Value::List(
        values
            .into_iter()
            .map(|v| Into::<V>::into(v).into())
            .collect(),
    )
}

macro_rules! field_struct {
    ($(#[$meta:meta])* $name:ident<$($param:ident),+>) => {
        $(#[$meta])*
        pub struct $name<$($param),+> {
            name: Cow<'static, str>,
            _marker: PhantomData<fn() -> ($($param,)+)>,
        }

        impl<$($param),+> $name<$($param),+> {
            /// Declare a field with a static name (usable in `const` items)
            pub const fn new(name: &'static str) -> Self {
                Self {
                    name: Cow::Borrowed(name),
                    _marker: PhantomData,
                }
            }

            /// Declare a field with a runtime name
            pub fn named(name: impl Into<String>) -> Self {
                Self {
                    name: Cow::Owned(name.into()),
                    _marker: PhantomData,
                }
            }

            pub fn as_str(&self) -> &str {
                &self.name
            }
        }

        impl<$($param),+> Clone for $name<$($param),+> {
            fn clone(&self) -> Self {
                Self {
                    name: self.name.clone(),
                    _marker: PhantomData,
                }
            }
        }

        impl<$($param),+> fmt::Debug for $name<$($param),+> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.name).finish()
            }
        }

        impl<$($param),+> fmt::Display for $name<$($param),+> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.name)
            }
        }

        impl<$($param),+> Hash for $name<$($param),+> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.name.hash(state);
            }
        }

        impl<$($param),+> Eq for $name<$($param),+> {}
    };
}

field_struct!(
    /// Field supporting equality, null and membership checks
    Field<T, F>
);

field_struct!(
    /// Field whose values can be ordered
    ComparableField<T, F>
);

field_struct!(
    /// Text field with substring operations
    StringField<T>
);

field_struct!(
    /// Field holding a list of `E`
    ListField<T, E>
);

impl<T, F, U, G> PartialEq<Field<U, G>> for Field<T, F> {
    fn eq(&self, other: &Field<U, G>) -> bool {
        self.name == other.name
    }
}

impl<T, F, U, G> PartialEq<ComparableField<U, G>> for ComparableField<T, F> {
    fn eq(&self, other: &ComparableField<U, G>) -> bool {
        self.name == other.name
    }
}

impl<T, U> PartialEq<StringField<U>> for StringField<T> {
    fn eq(&self, other: &StringField<U>) -> bool {
        self.name == other.name
    }
}

impl<T, E, U, G> PartialEq<ListField<U, G>> for ListField<T, E> {
    fn eq(&self, other: &ListField<U, G>) -> bool {
        self.name == other.name
    }
}

impl<T, F: Into<Value>> TypedField<T> for Field<T, F> {
    type FieldType = F;

    fn name(&self) -> &str {
        &self.name
    }
}

impl<T, F: Into<Value>> TypedField<T> for ComparableField<T, F> {
    type FieldType = F;

    fn name(&self) -> &str {
        &self.name
    }
}

impl<T, F: Into<Value>> OrderedField<T> for ComparableField<T, F> {}

impl<T> TypedField<T> for StringField<T> {
    type FieldType = String;

    fn name(&self) -> &str {
        &self.name
    }
}

impl<T> OrderedField<T> for StringField<T> {}

impl<T> TextField<T> for StringField<T> {}

impl<T, E: Into<Value>> TypedField<T> for ListField<T, E> {
    type FieldType = Vec<E>;

    fn name(&self) -> &str {
        &self.name
    }
}

impl<T, E: Into<Value>> CollectionField<T> for ListField<T, E> {
    type Element = E;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::QueryFilter;

    struct Task;
    struct Project;

    const STATUS: Field<Task, String> = Field::new("status");
    const PRIORITY: ComparableField<Task, i64> = ComparableField::new("priority");
    const TITLE: StringField<Task> = StringField::new("title");
    const TAGS: ListField<Task, String> = ListField::new("tags");

    fn single(expr: Expression<Task>) -> QueryFilter {
        let mut filters = expr.to_filters().unwrap();
        assert_eq!(filters.len(), 1);
        filters.remove(0)
    }

    #[test]
    fn test_field_operations() {
        assert_eq!(single(STATUS.equals("open")), QueryFilter::equals("status", "open"));
        assert_eq!(single(STATUS.not_equals("done")).operator, FilterOperator::NotEquals);
        assert_eq!(single(STATUS.is_null()), QueryFilter::is_null("status"));
        assert_eq!(single(STATUS.is_not_null()), QueryFilter::is_not_null("status"));

        let filter = single(STATUS.is_in(["open", "blocked"]));
        assert_eq!(filter.operator, FilterOperator::WhereIn);
        assert_eq!(filter.value, Value::list(["open", "blocked"]));

        let filter = single(STATUS.is_not_in(Vec::<String>::new()));
        assert_eq!(filter.operator, FilterOperator::WhereNotIn);
        assert_eq!(filter.value, Value::List(vec![]));
    }

    #[test]
    fn test_comparable_operations() {
        let cases = [
            (PRIORITY.greater_than(2), FilterOperator::GreaterThan),
            (PRIORITY.greater_than_or_equal_to(2), FilterOperator::GreaterThanOrEquals),
            (PRIORITY.less_than(2), FilterOperator::LessThan),
            (PRIORITY.less_than_or_equal_to(2), FilterOperator::LessThanOrEquals),
        ];
        for (expr, op) in cases {
            let filter = single(expr);
            assert_eq!(filter.field, "priority");
            assert_eq!(filter.operator, op);
            assert_eq!(filter.value, Value::Int(2));
        }
    }

    #[test]
    fn test_large_integer_value() {
        let filter = single(PRIORITY.equals(9_000_000_000_i64));
        assert_eq!(filter.value, Value::Int(9_000_000_000));
    }

    #[test]
    fn test_string_operations() {
        assert_eq!(single(TITLE.contains("bug")).operator, FilterOperator::Contains);
        assert_eq!(single(TITLE.starts_with("fix")).operator, FilterOperator::StartsWith);
        assert_eq!(single(TITLE.ends_with("!")).operator, FilterOperator::EndsWith);
        assert_eq!(single(TITLE.greater_than("m")).value, Value::from("m"));
    }

    #[test]
    fn test_list_operations() {
        let filter = single(TAGS.array_contains("urgent"));
        assert_eq!(filter.operator, FilterOperator::ArrayContains);
        assert_eq!(filter.value, Value::from("urgent"));

        let filter = single(TAGS.array_contains_any(["a", "b"]));
        assert_eq!(filter.operator, FilterOperator::ArrayContainsAny);
        assert_eq!(filter.value, Value::list(["a", "b"]));

        let filter = single(TAGS.equals(vec!["x".to_string()]));
        assert_eq!(filter.value, Value::list(["x"]));
    }

    #[test]
    fn test_equality_by_name_only() {
        let a: Field<Task, String> = Field::new("status");
        let b: Field<Project, i64> = Field::named("status");
        assert_eq!(a, b);
        assert_ne!(a, Field::<Task, String>::new("state"));
        assert_eq!(STATUS, a);
        assert_eq!(TITLE, StringField::<Project>::new("title"));
    }

    #[test]
    fn test_display_and_debug() {
        assert_eq!(TITLE.to_string(), "title");
        assert_eq!(format!("{:?}", TAGS), "ListField(\"tags\")");
    }
}
