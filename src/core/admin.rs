use crate::core::fetch::ListFetcher;
use crate::core::form::{build_payload, FormInput, FormMode};
use crate::core::mutation::{Mutation, MutationPayload};
use crate::domain::http::HttpMethod;
use crate::domain::model::{ListQuery, Page, Record};
use crate::domain::ports::Transport;
use crate::domain::resources::{self, ResourceSpec};
use crate::utils::error::{AdminError, Result};
use serde_json::Value;
use std::sync::Arc;

/// List, create, update and delete for one resource of the catalog.
pub struct EntityPage {
    spec: &'static ResourceSpec,
    transport: Arc<dyn Transport>,
    fetcher: ListFetcher<Record>,
}

impl EntityPage {
    pub fn new(spec: &'static ResourceSpec, transport: Arc<dyn Transport>) -> Self {
        let fetcher = ListFetcher::new(
            Arc::clone(&transport),
            spec.name,
            spec.path,
            spec.search_param,
        );
        Self {
            spec,
            transport,
            fetcher,
        }
    }

    /// Opens the page for a resource by name or API path.
    pub fn open(name: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self::new(resources::find(name)?, transport))
    }

    pub fn spec(&self) -> &'static ResourceSpec {
        self.spec
    }

    pub fn fetcher(&self) -> &ListFetcher<Record> {
        &self.fetcher
    }

    pub async fn list(&mut self, query: ListQuery) -> Result<&Page<Record>> {
        self.fetcher.fetch(query).await
    }

    pub async fn add(&mut self, input: &FormInput) -> Result<Value> {
        let payload = build_payload(self.spec, input, FormMode::Add)?;
        let spec = self.spec;
        let mut mutation = self
            .mutation(spec.path.to_string(), HttpMethod::Post, "created")
            .form_data(spec.is_multipart());

        let result = mutation.mutate(payload).await.map_err(|e| match e.status() {
            Some(status) if spec.conflict_statuses.contains(&status) => AdminError::ConflictError {
                message: format!("{} already exists", spec.title),
            },
            _ => e,
        });
        self.after_mutation(result).await
    }

    pub async fn edit(&mut self, id: &str, input: &FormInput) -> Result<Value> {
        let id = require_id(id)?;
        let payload = build_payload(self.spec, input, FormMode::Edit)?;
        let mut mutation = self
            .mutation(self.spec.update_path(id), HttpMethod::Patch, "updated")
            .form_data(self.spec.is_multipart());

        let result = mutation.mutate(payload).await;
        self.after_mutation(result).await
    }

    pub async fn delete(&mut self, id: &str) -> Result<Value> {
        let id = require_id(id)?;
        let mut mutation = self.mutation(self.spec.delete_base(), HttpMethod::Delete, "deleted");

        let result = mutation.mutate(MutationPayload::id(id)).await;
        self.after_mutation(result).await
    }

    fn mutation(&self, path: String, method: HttpMethod, verb: &'static str) -> Mutation {
        let title = self.spec.title;
        Mutation::new(Arc::clone(&self.transport), path)
            .method(method)
            .on_success(move |_| tracing::info!("✅ {} {}", title, verb))
            .on_error(move |e| tracing::debug!("{} not {}: {}", title, verb, e))
    }

    /// Reloads the current listing after a successful write, if one is shown.
    async fn after_mutation(&mut self, result: Result<Value>) -> Result<Value> {
        let value = result?;
        if self.fetcher.last_query().is_some() {
            if let Err(e) = self.fetcher.refetch().await {
                tracing::warn!("⚠️ Could not reload {}: {}", self.spec.name, e);
            }
        }
        Ok(value)
    }
}

fn require_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AdminError::validation("record id must not be empty"));
    }
    Ok(id)
}
