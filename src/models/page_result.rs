use super::record::Record;
use crate::error::FetchError;

/// One page returned by a [`RecordSource`](crate::client::RecordSource).
///
/// `next_cookie` is present exactly when `has_more` is true; the constructors
/// are the only way to build one.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    records: Vec<Record>,
    has_more: bool,
    next_cookie: Option<String>,
}

impl PageResult {
    /// Final page of the result set
    pub fn last(records: Vec<Record>) -> Self {
        Self {
            records,
            has_more: false,
            next_cookie: None,
        }
    }

    /// Page followed by more results, reachable with `cookie`
    pub fn more(records: Vec<Record>, cookie: impl Into<String>) -> Self {
        Self {
            records,
            has_more: true,
            next_cookie: Some(cookie.into()),
        }
    }

    /// Checked constructor for sources that map a raw response
    pub fn try_new(
        records: Vec<Record>,
        has_more: bool,
        next_cookie: Option<String>,
    ) -> Result<Self, FetchError> {
        match (has_more, next_cookie) {
            (true, Some(cookie)) => Ok(Self::more(records, cookie)),
            (false, None) => Ok(Self::last(records)),
            (true, None) => Err(FetchError::ProtocolViolation(
                "source reported more records without a paging cookie".to_string(),
            )),
            (false, Some(_)) => Err(FetchError::ProtocolViolation(
                "source returned a paging cookie on its last page".to_string(),
            )),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn next_cookie(&self) -> Option<&str> {
        self.next_cookie.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Record>, Option<String>) {
        (self.records, self.next_cookie)
    }
}
