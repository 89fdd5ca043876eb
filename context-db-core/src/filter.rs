//! Conditional filter assembly for list queries.
//!
//! Every filter is bound at the moment it is pushed, so the placeholder
//! numbering (`$1`, `$2`, ...) always follows argument order no matter which
//! optional filters are active.

use sqlx::{Encode, Postgres, QueryBuilder, Type};

pub struct FilterQuery<'args> {
    builder: QueryBuilder<'args, Postgres>,
    has_where: bool,
}

impl<'args> FilterQuery<'args> {
    /// Start from a `SELECT ... FROM ...` statement with no `WHERE` clause.
    pub fn new(base: &str) -> Self {
        Self {
            builder: QueryBuilder::new(base),
            has_where: false,
        }
    }

    fn push_condition_prefix(&mut self) {
        if self.has_where {
            self.builder.push(" AND ");
        } else {
            self.builder.push(" WHERE ");
            self.has_where = true;
        }
    }

    /// Append `column = <value>` when `value` is present.
    pub fn eq<T>(mut self, column: &str, value: Option<T>) -> Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
    {
        if let Some(value) = value {
            self.push_condition_prefix();
            self.builder.push(column);
            self.builder.push(" = ");
            self.builder.push_bind(value);
        }
        self
    }

    /// Close the statement with `ORDER BY <column> DESC LIMIT <limit>`.
    pub fn newest_first(mut self, column: &str, limit: i64) -> QueryBuilder<'args, Postgres> {
        self.builder.push(" ORDER BY ");
        self.builder.push(column);
        self.builder.push(" DESC LIMIT ");
        self.builder.push_bind(limit.max(0));
        self.builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const BASE: &str = "SELECT id FROM agent_interactions";

    #[test]
    fn test_no_filters() {
        let builder = FilterQuery::new(BASE)
            .eq::<String>("agent_name", None)
            .eq::<Uuid>("project_id", None)
            .newest_first("started_at", 50);

        assert_eq!(
            builder.sql(),
            "SELECT id FROM agent_interactions ORDER BY started_at DESC LIMIT $1"
        );
    }

    #[test]
    fn test_all_filters_numbered_in_order() {
        let builder = FilterQuery::new(BASE)
            .eq("agent_name", Some("rias".to_string()))
            .eq("project_id", Some(Uuid::new_v4()))
            .newest_first("started_at", 50);

        assert_eq!(
            builder.sql(),
            "SELECT id FROM agent_interactions WHERE agent_name = $1 AND project_id = $2 \
             ORDER BY started_at DESC LIMIT $3"
        );
    }

    #[test]
    fn test_second_filter_only_takes_first_placeholder() {
        let builder = FilterQuery::new(BASE)
            .eq::<String>("agent_name", None)
            .eq("project_id", Some(Uuid::new_v4()))
            .newest_first("started_at", 10);

        assert_eq!(
            builder.sql(),
            "SELECT id FROM agent_interactions WHERE project_id = $1 \
             ORDER BY started_at DESC LIMIT $2"
        );
    }

    #[test]
    fn test_first_filter_only() {
        let builder = FilterQuery::new("SELECT id FROM decisions")
            .eq("status", Some("active"))
            .eq::<&str>("decision_type", None)
            .newest_first("created_at", 10);

        assert_eq!(
            builder.sql(),
            "SELECT id FROM decisions WHERE status = $1 ORDER BY created_at DESC LIMIT $2"
        );
    }
}
