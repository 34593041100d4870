pub mod auth_client;
pub mod feed_client;
pub mod profile_service;

pub use auth_client::{AccountRemover, HttpAccountRemover};
pub use feed_client::{HttpPublicationSource, PublicationSource};
pub use profile_service::ProfileService;
