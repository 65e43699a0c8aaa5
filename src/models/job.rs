use crate::config::JobConfig;
use crate::error::{Result, SchedulerError};
use crate::query_builder::QueryDocument;
use uuid::Uuid;

/// Everything one dispatch run needs to know: what to query, which action to
/// invoke per record, and how large each page is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkDispatchJob {
    query: QueryDocument,
    target_action_id: Uuid,
    page_size: u32,
}

impl BulkDispatchJob {
    pub fn new(query: QueryDocument, target_action_id: Uuid, page_size: u32) -> Result<Self> {
        if page_size == 0 {
            return Err(SchedulerError::InvalidJob(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if target_action_id.is_nil() {
            return Err(SchedulerError::InvalidJob(
                "target_action_id must not be the nil UUID".to_string(),
            ));
        }

        Ok(Self {
            query,
            target_action_id,
            page_size,
        })
    }

    pub fn from_config(config: &JobConfig) -> Result<Self> {
        let query = QueryDocument::parse(config.query.trim())?;
        Self::new(query, config.target_action_id, config.page_size)
    }

    pub fn query(&self) -> &QueryDocument {
        &self.query
    }

    pub fn target_action_id(&self) -> Uuid {
        self.target_action_id
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> QueryDocument {
        QueryDocument::parse(r#"<fetch><entity name="account"/></fetch>"#).unwrap()
    }

    #[test]
    fn accepts_valid_job() {
        let action = Uuid::new_v4();
        let job = BulkDispatchJob::new(query(), action, 250).unwrap();
        assert_eq!(job.target_action_id(), action);
        assert_eq!(job.page_size(), 250);
        assert_eq!(job.query().root_name(), "fetch");
    }

    #[test]
    fn rejects_zero_page_size() {
        let err = BulkDispatchJob::new(query(), Uuid::new_v4(), 0).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidJob(_)));
    }

    #[test]
    fn page_size_has_no_upper_bound() {
        for page_size in [5_001, u32::MAX] {
            let job = BulkDispatchJob::new(query(), Uuid::new_v4(), page_size).unwrap();
            assert_eq!(job.page_size(), page_size);
        }
    }

    #[test]
    fn rejects_nil_action() {
        let err = BulkDispatchJob::new(query(), Uuid::nil(), 10).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidJob(_)));
    }

    #[test]
    fn builds_from_config_and_trims_query_text() {
        let config = JobConfig {
            query: "\n  <fetch><entity name=\"contact\"/></fetch>\n".to_string(),
            target_action_id: Uuid::new_v4(),
            page_size: 50,
        };
        let job = BulkDispatchJob::from_config(&config).unwrap();
        assert_eq!(job.query().as_str(), "<fetch><entity name=\"contact\"/></fetch>");
    }

    #[test]
    fn malformed_config_query_is_reported() {
        let config = JobConfig {
            query: "<!-- nothing here -->".to_string(),
            target_action_id: Uuid::new_v4(),
            page_size: 50,
        };
        let err = BulkDispatchJob::from_config(&config).unwrap_err();
        assert!(matches!(err, SchedulerError::MalformedQuery { .. }));
    }
}
