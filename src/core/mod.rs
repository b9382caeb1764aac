pub mod admin;
pub mod auth;
pub mod fetch;
pub mod form;
pub mod mutation;
pub mod preferences;
pub mod session;
pub mod table;

pub use crate::domain::model::{ListQuery, Page, Record};
pub use crate::domain::ports::{ConfigProvider, StateStore, Transport};
pub use crate::utils::error::Result;
