pub mod client;
pub mod error;
pub mod response;
pub mod source;

pub use client::{ClientConfig, WikiClient};
pub use error::ClientError;
pub use source::LinkSource;
