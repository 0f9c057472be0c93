//! Dynamic WHERE clauses for list endpoints.
//!
//! Conditions and their bind values are collected together, so placeholders
//! are numbered and bound in the same order without bookkeeping at the call
//! site.

use sqlx::{Postgres, postgres::PgArguments, query::QueryAs};
use time::Date;
use uuid::Uuid;

use crate::models::ActivityKind;

/// A value bound to one `$n` placeholder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterValue {
    Uuid(Uuid),
    Date(Date),
    Kind(ActivityKind),
    Int(i64),
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        FilterValue::Uuid(value)
    }
}

impl From<Date> for FilterValue {
    fn from(value: Date) -> Self {
        FilterValue::Date(value)
    }
}

impl From<ActivityKind> for FilterValue {
    fn from(value: ActivityKind) -> Self {
        FilterValue::Kind(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

/// Builder for a WHERE clause and its bind values.
///
/// # Example
/// ```ignore
/// let mut qb = QueryBuilder::new();
/// qb.push("t.owner_id = {}", owner_id);
/// qb.push_optional("a.activity_type = {}", filter.activity_type);
/// let limit = qb.placeholder(50_i64);
/// let sql = format!("SELECT ... {} LIMIT {limit}", qb.build_where_clause());
/// let rows = qb.bind_to(sqlx::query_as::<_, Row>(&sql)).fetch_all(&pool).await?;
/// ```
#[derive(Debug, Default)]
pub struct QueryBuilder {
    conditions: Vec<String>,
    values: Vec<FilterValue>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bind value and returns its placeholder (`$n`).
    pub fn placeholder(&mut self, value: impl Into<FilterValue>) -> String {
        self.values.push(value.into());
        format!("${}", self.values.len())
    }

    /// Adds a condition; the first `{}` in `template` becomes the value's placeholder.
    pub fn push(&mut self, template: &str, value: impl Into<FilterValue>) -> &mut Self {
        let placeholder = self.placeholder(value);
        self.conditions
            .push(template.replacen("{}", &placeholder, 1));
        self
    }

    /// Adds the condition only when `value` is present.
    pub fn push_optional<T: Into<FilterValue>>(
        &mut self,
        template: &str,
        value: Option<T>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.push(template, value);
        }
        self
    }

    /// Adds inclusive bounds on a `DATE` column for whichever ends are given.
    pub fn add_date_bounds(
        &mut self,
        column: &str,
        start_date: Option<Date>,
        end_date: Option<Date>,
    ) -> &mut Self {
        self.push_optional(&format!("{column} >= {{}}"), start_date);
        self.push_optional(&format!("{column} <= {{}}"), end_date);
        self
    }

    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The WHERE clause including the keyword, or `WHERE 1=1` without conditions.
    pub fn build_where_clause(&self) -> String {
        if self.conditions.is_empty() {
            "WHERE 1=1".to_string()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Binds every registered value, in placeholder order.
    pub fn bind_to<'q, O>(
        &self,
        mut query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for value in &self.values {
            query = match *value {
                FilterValue::Uuid(v) => query.bind(v),
                FilterValue::Date(v) => query.bind(v),
                FilterValue::Kind(v) => query.bind(v),
                FilterValue::Int(v) => query.bind(v),
            };
        }
        query
    }
}
