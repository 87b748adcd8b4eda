// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod http;
pub mod render;
pub mod storage;

pub use http::HttpFetcher;
pub use render::HtmlRenderer;
pub use storage::LocalStorage;
