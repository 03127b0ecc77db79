//! Query-string handling for log URLs: `?url=<escaped>&url=<escaped>`.

use thiserror::Error;
use url::form_urlencoded;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Please enter the full log URL(s) of the test run(s) to compare")]
    Empty,

    #[error("No URLs given")]
    NoUrls,
}

/// Log URLs in the order they were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    urls: Vec<String>,
}

impl LogQuery {
    /// Parse a query string, with or without its leading `?`.
    ///
    /// Only `url` keys are read; other keys are ignored.
    pub fn parse(search: &str) -> Result<Self, QueryError> {
        let search = search.strip_prefix('?').unwrap_or(search);
        if search.is_empty() {
            return Err(QueryError::Empty);
        }

        let mut query = LogQuery::default();
        for (key, value) in form_urlencoded::parse(search.as_bytes()) {
            if key == "url" {
                query.push(value.into_owned());
            }
        }

        if query.urls.is_empty() {
            return Err(QueryError::NoUrls);
        }
        Ok(query)
    }

    /// Build a query from URLs given directly, skipping empty entries.
    pub fn from_urls<I, S>(urls: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut query = LogQuery::default();
        for url in urls {
            query.push(url);
        }
        if query.urls.is_empty() {
            return Err(QueryError::NoUrls);
        }
        Ok(query)
    }

    /// Append another log URL to the input list.
    pub fn push(&mut self, url: impl Into<String>) {
        let url = url.into();
        if !url.is_empty() {
            self.urls.push(url);
        }
    }

    /// The URL shown in the primary input box.
    pub fn first(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }

    /// URLs appended after the primary one.
    pub fn additional(&self) -> &[String] {
        self.urls.get(1..).unwrap_or(&[])
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Rebuild the `?url=...&url=...` string for re-submission.
    pub fn to_search(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::from("?"));
        for url in &self.urls {
            serializer.append_pair("url", url);
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_query_prompts_for_input() {
        assert_eq!(LogQuery::parse(""), Err(QueryError::Empty));
        assert_eq!(LogQuery::parse("?"), Err(QueryError::Empty));
    }

    #[test]
    fn query_without_urls_is_an_error() {
        assert_eq!(LogQuery::parse("?foo=bar&baz"), Err(QueryError::NoUrls));
        assert_eq!(QueryError::NoUrls.to_string(), "No URLs given");
    }

    #[test]
    fn decodes_urls_in_order() {
        let query =
            LogQuery::parse("?url=http%3A%2F%2Fa%2Flog.txt&other=1&url=http%3A%2F%2Fb%2Flog.txt")
                .unwrap();

        assert_eq!(query.first(), Some("http://a/log.txt"));
        assert_eq!(query.additional(), &["http://b/log.txt".to_string()]);
    }

    #[test]
    fn search_string_round_trips() {
        let query = LogQuery::from_urls(["http://a/x?y=1", "", "logs/run 2.txt"]).unwrap();

        assert_eq!(query.urls().len(), 2);
        assert_eq!(LogQuery::parse(&query.to_search()).unwrap(), query);
        assert!(query.to_search().starts_with("?url=http%3A%2F%2Fa"));
    }

    #[test]
    fn single_url_has_no_additional_inputs() {
        let query = LogQuery::parse("url=run.log").unwrap();
        assert!(query.additional().is_empty());
        assert_eq!(LogQuery::from_urls(Vec::<String>::new()), Err(QueryError::NoUrls));
    }
}
