use crate::domain::http::ApiRequest;
use crate::domain::model::{ListQuery, Page, Record};
use crate::domain::ports::Transport;
use crate::utils::error::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    data: Option<ListData<T>>,
}

#[derive(Debug, Deserialize)]
struct ListData<T> {
    items: Option<Vec<T>>,
    total: Option<u64>,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct FetchState<T> {
    pub data: Option<Page<T>>,
    pub is_loading: bool,
    pub is_error: bool,
    pub error: Option<String>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            is_error: false,
            error: None,
        }
    }
}

impl<T> FetchState<T> {
    pub fn is_success(&self) -> bool {
        self.data.is_some() && !self.is_error
    }
}

/// Paginated GET over one collection endpoint.
///
/// Remembers the last query so callers can [`refetch`](ListFetcher::refetch)
/// after a mutation, and keeps the last page it received.
pub struct ListFetcher<T = Record> {
    transport: Arc<dyn Transport>,
    key: String,
    path: String,
    search_param: String,
    last_query: Option<ListQuery>,
    state: FetchState<T>,
}

impl<T: DeserializeOwned> ListFetcher<T> {
    pub fn new(
        transport: Arc<dyn Transport>,
        key: impl Into<String>,
        path: impl Into<String>,
        search_param: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            key: key.into(),
            path: path.into(),
            search_param: search_param.into(),
            last_query: None,
            state: FetchState::default(),
        }
    }

    /// `[resource, page, limit, search]` for the last query.
    pub fn cache_key(&self) -> Vec<String> {
        let mut key = vec![self.key.clone()];
        if let Some(query) = &self.last_query {
            key.push(query.page.to_string());
            key.push(query.limit.to_string());
            key.push(query.search.clone().unwrap_or_default());
        }
        key
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn last_query(&self) -> Option<&ListQuery> {
        self.last_query.as_ref()
    }

    pub async fn fetch(&mut self, query: ListQuery) -> Result<&Page<T>> {
        self.last_query = Some(query.clone());
        self.state.is_loading = true;

        let result = self.load(&query).await;
        self.state.is_loading = false;

        match result {
            Ok(page) => {
                tracing::debug!(
                    "📥 {}: {} of {} records (page {})",
                    self.key,
                    page.items.len(),
                    page.total,
                    page.page
                );
                self.state.is_error = false;
                self.state.error = None;
                let page = self.state.data.insert(page);
                Ok(&*page)
            }
            Err(e) => {
                self.state.is_error = true;
                self.state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Runs the last query again, or the first page if nothing was fetched yet.
    pub async fn refetch(&mut self) -> Result<&Page<T>> {
        let query = self.last_query.clone().unwrap_or_default();
        self.fetch(query).await
    }

    async fn load(&self, query: &ListQuery) -> Result<Page<T>> {
        let request = ApiRequest::get(self.path.clone())
            .query("page", Some(query.page))
            .query("limit", Some(query.limit))
            .query(&self.search_param, query.search.as_deref());

        let body = self.transport.send(request).await?.into_result()?;
        let envelope: ListEnvelope<T> = serde_json::from_value(body)?;
        let data = envelope.data.unwrap_or(ListData {
            items: None,
            total: None,
            page: None,
            limit: None,
        });

        let items = data.items.unwrap_or_default();
        Ok(Page {
            total: data.total.unwrap_or(items.len() as u64),
            page: data.page.unwrap_or(query.page),
            limit: data.limit.unwrap_or(query.limit),
            items,
        })
    }
}
