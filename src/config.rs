use crate::response::NotionId;
use anyhow::{Context, Result};

/// Where to find the portfolio's content in Notion
pub struct Config {
    pub notion_api_key: String,
    pub profile_page_id: NotionId,
    pub links_data_source_id: NotionId,
    pub experience_data_source_id: NotionId,
    pub projects_data_source_id: NotionId,
    pub affiliations_data_source_id: NotionId,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Every value is required, an empty one counts as missing
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .with_context(|| format!("Missing {} env variable", key))
        };
        let id = |key: &str| -> Result<NotionId> {
            let value = var(key)?;
            value
                .parse()
                .with_context(|| format!("{} is not a valid Notion ID: {}", key, value))
        };

        Ok(Config {
            notion_api_key: var("NOTION_API_KEY")?,
            profile_page_id: id("PROFILE_PAGE_ID")?,
            links_data_source_id: id("LINKS_DATASOURCE_ID")?,
            experience_data_source_id: id("EXPERIENCE_DATASOURCE_ID")?,
            projects_data_source_id: id("PROJECTS_DATASOURCE_ID")?,
            affiliations_data_source_id: id("AFFILIATIONS_DATASOURCE_ID")?,
        })
    }
}
