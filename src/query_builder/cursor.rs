use super::document::{element_name, rewrite_root, QueryDocument};
use crate::constants::paging::{self, COUNT_ATTR, PAGE_ATTR, PAGING_COOKIE_ATTR};
use crate::error::{Result, SchedulerError};
use quick_xml::events::BytesStart;

/// Paging position threaded through the fetch loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingState {
    pub cookie: Option<String>,
    pub page: u32,
    pub count: u32,
}

impl PagingState {
    /// First page of a run: no cookie
    pub fn first(count: u32) -> Self {
        Self {
            cookie: None,
            page: paging::FIRST_PAGE,
            count,
        }
    }

    /// Advance to the following page with the cookie the source handed back
    pub fn next(&self, cookie: Option<String>) -> Self {
        Self {
            cookie,
            page: self.page.saturating_add(1),
            count: self.count,
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.page == paging::FIRST_PAGE
    }

    fn validate(&self) -> Result<()> {
        if self.page == 0 || self.count == 0 {
            return Err(SchedulerError::InvalidPaging {
                page: self.page,
                count: self.count,
            });
        }
        Ok(())
    }
}

/// Injects paging attributes into a query document's root element.
///
/// The base document is never modified; each call returns a fresh document.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryCursorBuilder;

impl QueryCursorBuilder {
    pub fn build(base: &QueryDocument, paging: &PagingState) -> Result<QueryDocument> {
        paging.validate()?;

        let page = paging.page.to_string();
        let count = paging.count.to_string();

        let text = rewrite_root(base.as_str(), |root| {
            let mut rebuilt = BytesStart::new(element_name(root)?);

            for attr in root.attributes() {
                let attr = attr.map_err(SchedulerError::malformed_query)?;
                if paging::is_reserved(attr.key.as_ref()) {
                    continue;
                }
                // Attributes are written back double-quoted, so a raw value
                // holding `"` (single-quoted in the source) is re-escaped
                if attr.value.contains(&b'"') {
                    let key = std::str::from_utf8(attr.key.as_ref())
                        .map_err(SchedulerError::malformed_query)?;
                    let value = attr
                        .unescape_value()
                        .map_err(SchedulerError::malformed_query)?;
                    rebuilt.push_attribute((key, value.as_ref()));
                } else {
                    rebuilt.push_attribute(attr);
                }
            }

            if let Some(cookie) = paging.cookie.as_deref() {
                rebuilt.push_attribute((PAGING_COOKIE_ATTR, cookie));
            }
            rebuilt.push_attribute((PAGE_ATTR, page.as_str()));
            rebuilt.push_attribute((COUNT_ATTR, count.as_str()));

            Ok(rebuilt)
        })?;

        QueryDocument::parse(text)
    }

    /// Positional form of [`build`](Self::build)
    pub fn build_with(
        base: &QueryDocument,
        cookie: Option<&str>,
        page: u32,
        count: u32,
    ) -> Result<QueryDocument> {
        Self::build(
            base,
            &PagingState {
                cookie: cookie.map(str::to_string),
                page,
                count,
            },
        )
    }
}
