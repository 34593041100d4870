pub mod feed_service;
pub mod profile_client;

pub use feed_service::FeedService;
pub use profile_client::{AuthorDirectory, HttpAuthorDirectory};
