use chrono::{DateTime, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// An owned statement parameter.
///
/// Statements travel through the session layer as SQL text plus a slice of
/// these values, so a statement can be re-bound and re-issued verbatim when a
/// transient failure forces a reconnect.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

impl SqlParam {
    /// Bind this parameter onto a sqlx query
    pub(crate) fn bind_to<'q>(
        &self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            SqlParam::Int(value) => query.bind(*value),
            SqlParam::Text(value) => query.bind(value.clone()),
            SqlParam::Bool(value) => query.bind(*value),
            SqlParam::Timestamp(value) => query.bind(*value),
            SqlParam::Null => query.bind(Option::<String>::None),
        }
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Int(value)
    }
}

impl From<i32> for SqlParam {
    fn from(value: i32) -> Self {
        SqlParam::Int(value as i64)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<&String> for SqlParam {
    fn from(value: &String) -> Self {
        SqlParam::Text(value.clone())
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        SqlParam::Bool(value)
    }
}

impl From<DateTime<Utc>> for SqlParam {
    fn from(value: DateTime<Utc>) -> Self {
        SqlParam::Timestamp(value)
    }
}

impl<T> From<Option<T>> for SqlParam
where
    T: Into<SqlParam>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => SqlParam::Null,
        }
    }
}

/// Build a parameter array from heterogeneous values:
/// `params![id, title, true]`.
#[macro_export]
macro_rules! params {
    () => {
        <[$crate::SqlParam; 0]>::default()
    };
    ($($value:expr),+ $(,)?) => {
        [$($crate::SqlParam::from($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        assert_eq!(SqlParam::from(42i64), SqlParam::Int(42));
        assert_eq!(SqlParam::from(7i32), SqlParam::Int(7));
        assert_eq!(SqlParam::from("title"), SqlParam::Text("title".to_string()));
        assert_eq!(
            SqlParam::from("title".to_string()),
            SqlParam::Text("title".to_string())
        );
        assert_eq!(SqlParam::from(true), SqlParam::Bool(true));

        let now = Utc::now();
        assert_eq!(SqlParam::from(now), SqlParam::Timestamp(now));
    }

    #[test]
    fn test_option_maps_to_null() {
        assert_eq!(SqlParam::from(Option::<i64>::None), SqlParam::Null);
        assert_eq!(SqlParam::from(Some(5i64)), SqlParam::Int(5));
        assert_eq!(
            SqlParam::from(Some("x")),
            SqlParam::Text("x".to_string())
        );
    }

    #[test]
    fn test_params_macro() {
        let bound = params![1i64, "Write spec", false];
        assert_eq!(bound.len(), 3);
        assert_eq!(bound[0], SqlParam::Int(1));
        assert_eq!(bound[1], SqlParam::Text("Write spec".to_string()));
        assert_eq!(bound[2], SqlParam::Bool(false));

        let empty = params![];
        assert!(empty.is_empty());
    }
}
