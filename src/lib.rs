pub mod client;
pub mod config;
pub mod portfolio;
pub mod render;
pub mod response;

pub use client::NotionClient;
pub use portfolio::Portfolio;
pub use render::HtmlRenderer;
