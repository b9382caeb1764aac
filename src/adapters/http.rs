use crate::domain::http::{ApiRequest, ApiResponse, FormPayload, HttpMethod, RequestBody};
use crate::domain::ports::Transport;
use crate::utils::error::{AdminError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// reqwest-backed transport bound to the admin API base URL.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tour-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| AdminError::InvalidConfigValueError {
            field: "api.base_url".to_string(),
            value: joined,
            reason: e.to_string(),
        })
    }

    async fn build_form(payload: &FormPayload) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in &payload.fields {
            form = form.text(name.clone(), value.clone());
        }
        for file in &payload.files {
            let bytes = tokio::fs::read(&file.path).await?;
            let file_name = file
                .path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload")
                .to_string();
            let mime = mime_guess::from_path(&file.path).first_or_octet_stream();
            tracing::debug!(
                "📎 Attaching {} as '{}' ({}, {} bytes)",
                file_name,
                file.name,
                mime,
                bytes.len()
            );
            let part = Part::bytes(bytes)
                .file_name(file_name)
                .mime_str(mime.as_ref())?;
            form = form.part(file.name.clone(), part);
        }
        Ok(form)
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.resolve(&request.path)?;
        tracing::debug!("➡️ {} {}", request.method, url);

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), url.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(payload) => builder.multipart(Self::build_form(payload).await?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        tracing::debug!("⬅️ {} {} -> {}", request.method, url.path(), status);

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ApiResponse { status, body })
    }
}
