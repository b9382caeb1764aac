pub mod adapters;
#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use app::AdminApp;
#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, Command};

pub use adapters::{http::HttpTransport, storage::LocalStateStore};
pub use config::{AppSettings, TomlConfig};
pub use self::core::{
    admin::EntityPage, auth::AuthenticatedTransport, fetch::ListFetcher, mutation::Mutation,
    session::SessionContext,
};
pub use utils::error::{AdminError, Result};
