use crate::domain::http::{ApiRequest, ApiResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Key/value persistence for client-side state (session, preferences).
pub trait StateStore: Send + Sync {
    fn read_state(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
    fn write_state(
        &self,
        key: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_state(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn state_dir(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn default_page_size(&self) -> u32;
}

/// Sends one request and hands back the response, whatever its status.
/// Only failures to talk to the server are errors at this level.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}
