use crate::domain::http::{ApiRequest, FormPayload, HttpMethod};
use crate::domain::ports::Transport;
use crate::utils::error::{AdminError, Result};
use serde_json::Value;
use std::sync::Arc;

pub type SuccessCallback = Box<dyn Fn(&Value) + Send + Sync>;
pub type ErrorCallback = Box<dyn Fn(&AdminError) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum MutationPayload {
    Json(Value),
    Form(FormPayload),
}

impl MutationPayload {
    /// Payload carrying only the id, as used for deletes.
    pub fn id(id: impl Into<String>) -> Self {
        MutationPayload::Json(serde_json::json!({ "id": id.into() }))
    }

    fn id_value(&self) -> Option<String> {
        match self {
            MutationPayload::Json(body) => match body.get("id") {
                Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
                Some(Value::Number(id)) => Some(id.to_string()),
                _ => None,
            },
            MutationPayload::Form(form) => form.get("id").map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationState {
    pub is_loading: bool,
    pub is_success: bool,
    pub is_error: bool,
}

/// A write request against one endpoint with success and error callbacks.
///
/// `DELETE` appends the payload's `id` to the path; every other method sends
/// the payload as the request body.
pub struct Mutation {
    transport: Arc<dyn Transport>,
    path: String,
    method: HttpMethod,
    is_form_data: bool,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
    state: MutationState,
}

impl Mutation {
    pub fn new(transport: Arc<dyn Transport>, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
            method: HttpMethod::Post,
            is_form_data: false,
            on_success: None,
            on_error: None,
            state: MutationState::default(),
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn form_data(mut self, is_form_data: bool) -> Self {
        self.is_form_data = is_form_data;
        self
    }

    pub fn on_success(mut self, callback: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&AdminError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> MutationState {
        self.state
    }

    pub async fn mutate(&mut self, payload: MutationPayload) -> Result<Value> {
        self.state = MutationState {
            is_loading: true,
            ..MutationState::default()
        };

        let result = match self.build_request(payload) {
            Ok(request) => {
                tracing::debug!("✏️ {} {}", request.method, request.path);
                match self.transport.send(request).await {
                    Ok(response) => response.into_result(),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        };

        self.state.is_loading = false;
        match &result {
            Ok(data) => {
                self.state.is_success = true;
                if let Some(callback) = &self.on_success {
                    callback(data);
                }
            }
            Err(e) => {
                self.state.is_error = true;
                if let Some(callback) = &self.on_error {
                    callback(e);
                }
            }
        }
        result
    }

    fn build_request(&self, payload: MutationPayload) -> Result<ApiRequest> {
        if self.method == HttpMethod::Delete {
            let id = payload
                .id_value()
                .ok_or_else(|| AdminError::validation("ID required for DELETE request"))?;
            return Ok(ApiRequest::delete(format!("{}/{}", self.path, id)));
        }

        let request = ApiRequest::new(self.method, self.path.clone());
        Ok(match payload {
            MutationPayload::Form(form) => request.multipart(form),
            MutationPayload::Json(body) if self.is_form_data => {
                request.multipart(json_to_form(&body)?)
            }
            MutationPayload::Json(body) => request.json(body),
        })
    }
}

fn json_to_form(body: &Value) -> Result<FormPayload> {
    let object = body
        .as_object()
        .ok_or_else(|| AdminError::validation("form data must be an object"))?;
    let mut form = FormPayload::new();
    for (key, value) in object {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Null => continue,
            other => other.to_string(),
        };
        form = form.text(key.clone(), text);
    }
    Ok(form)
}
