//! Ordered query parameters.

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Omitted from the URL.
    Null,
    /// Appended once.
    Scalar(String),
    /// Appended once per element, in order, under the same key.
    List(Vec<String>),
}

macro_rules! scalar_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for QueryValue {
                fn from(value: $t) -> Self {
                    QueryValue::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_from!(&str, String, &String, i32, i64, u32, u64, usize, bool);

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(QueryValue::Null)
    }
}

impl<T: ToString> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString> From<&[T]> for QueryValue {
    fn from(values: &[T]) -> Self {
        QueryValue::List(values.iter().map(ToString::to_string).collect())
    }
}

/// Query parameters, kept in insertion order.
///
/// ```
/// use backlog_cli::api::Query;
///
/// let query = Query::new()
///     .param("projectId[]", vec![1])
///     .param("assigneeId[]", vec![1, 2, 3])
///     .param("keyword", None::<&str>);
/// assert_eq!(query.pairs().count(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, QueryValue)>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.push(key, value);
        self
    }

    /// Append a parameter in place.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.params.push((key.into(), value.into()));
    }

    /// Whether no parameters were added.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Flatten into `(key, value)` pairs: lists expand to repeated keys and
    /// nulls are dropped.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().flat_map(|(key, value)| {
            let values: Vec<&str> = match value {
                QueryValue::Null => Vec::new(),
                QueryValue::Scalar(v) => vec![v.as_str()],
                QueryValue::List(vs) => vs.iter().map(String::as_str).collect(),
            };
            values.into_iter().map(move |v| (key.as_str(), v))
        })
    }
}
