//! The six documents the portfolio frontend reads
//!
//! Each document has a pure constructor from already fetched records, which is where the
//! mapping from Notion properties to fields lives, and a method on [`Portfolio`] that issues
//! the query and feeds it through that constructor.

use crate::{
    client::{Filter, NotionClient, PageRequest, Sort},
    config::Config,
    render::render_blocks,
    response::{plain_text, Block, NotionId, Page, PropertyValue},
};
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub profile_image_url: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Links {
    pub links: Vec<Link>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Link {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    pub url: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    File,
    Link,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Content {
    pub content: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Experiences {
    pub experience: Vec<Experience>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Experience {
    pub company: String,
    pub position: String,
    #[serde(rename = "logoURL")]
    pub logo_url: String,
    pub start: String,
    pub end: Option<String>,
    pub current: bool,
    #[serde(rename = "pageId")]
    pub page_id: NotionId,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Projects {
    pub projects: Vec<Project>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Project {
    pub title: String,
    #[serde(rename = "projectImageURL")]
    pub project_image_url: String,
    #[serde(rename = "projectURL")]
    pub project_url: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Affiliations {
    pub affiliations: Vec<Affiliation>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Affiliation {
    pub title: String,
    #[serde(rename = "logoURL")]
    pub logo_url: String,
}

fn property<'a>(page: &'a Page, name: &str) -> Option<&'a PropertyValue> {
    let value = page.property(name);
    if value.is_none() {
        log::trace!("Page {} has no {:?} property", page.id, name);
    }
    value
}

/// The title held by `name`. Rows without one are skipped by every listing.
fn title(page: &Page, name: &str) -> Option<String> {
    let spans = property(page, name)
        .map(PropertyValue::title)
        .unwrap_or_default();

    if spans.is_empty() {
        log::debug!("Skipping page {} with an empty {:?} title", page.id, name);
        return None;
    }

    Some(plain_text(spans))
}

pub fn profile(page: &Page) -> Profile {
    Profile {
        profile_image_url: page.cover_url().to_string(),
    }
}

pub fn links(pages: &[Page]) -> Links {
    let links = pages
        .iter()
        .filter_map(|page| {
            let title = title(page, "Name")?;
            let file = property(page, "File").and_then(|files| files.files().first());

            Some(match file {
                Some(file) => Link {
                    title,
                    kind: LinkKind::File,
                    url: file.url().to_string(),
                },
                None => Link {
                    title,
                    kind: LinkKind::Link,
                    url: property(page, "Website URL")
                        .and_then(PropertyValue::url)
                        .unwrap_or_default()
                        .to_string(),
                },
            })
        })
        .collect();

    Links { links }
}

pub fn experience(pages: &[Page]) -> Experiences {
    let experience = pages
        .iter()
        .filter_map(|page| {
            let company = title(page, "Company")?;
            let date = match property(page, "Date").and_then(PropertyValue::date) {
                Some(date) => date,
                None => {
                    log::debug!("Skipping experience {} without a date", page.id);
                    return None;
                }
            };
            let position = property(page, "Position")
                .map(|position| plain_text(position.rich_text()))
                .unwrap_or_default();

            Some(Experience {
                company,
                position,
                logo_url: page.cover_url().to_string(),
                start: date.start.clone(),
                end: date.end.clone(),
                current: date.is_current(),
                page_id: page.id,
            })
        })
        .collect();

    Experiences { experience }
}

pub fn projects(pages: &[Page]) -> Projects {
    let projects = pages
        .iter()
        .filter_map(|page| {
            Some(Project {
                title: title(page, "Name")?,
                project_image_url: page.cover_url().to_string(),
                project_url: property(page, "Project URL")
                    .and_then(PropertyValue::url)
                    .map(str::to_string),
                date: property(page, "Date")
                    .and_then(PropertyValue::date)
                    .map(|date| date.start.clone()),
            })
        })
        .collect();

    Projects { projects }
}

pub fn affiliations(pages: &[Page]) -> Affiliations {
    let affiliations = pages
        .iter()
        .filter_map(|page| {
            Some(Affiliation {
                title: title(page, "Name")?,
                logo_url: page.cover_url().to_string(),
            })
        })
        .collect();

    Affiliations { affiliations }
}

pub fn content(blocks: &[Block]) -> Content {
    Content {
        content: render_blocks(blocks).into_string(),
    }
}

fn visible() -> Option<Filter> {
    Some(Filter::checkbox_equals("Hidden", false))
}

pub struct Portfolio {
    client: NotionClient,
    config: Config,
}

impl Portfolio {
    pub fn new(client: NotionClient, config: Config) -> Self {
        Portfolio { client, config }
    }

    pub async fn profile(&self) -> Result<Profile> {
        let page = self
            .client
            .fetch(&PageRequest::new(self.config.profile_page_id))
            .await
            .context("Failed to get profile page")?;

        Ok(profile(&page))
    }

    pub async fn links(&self) -> Result<Links> {
        let pages = self
            .client
            .query_data_source(
                self.config.links_data_source_id,
                visible(),
                Some(vec![Sort::ascending("Display Order")]),
            )
            .await
            .context("Failed to query links")?;

        Ok(links(&pages))
    }

    pub async fn content(&self, page_id: NotionId) -> Result<Content> {
        let blocks = self
            .client
            .get_block_children(page_id)
            .await
            .with_context(|| format!("Failed to get content of {}", page_id))?;

        Ok(content(&blocks))
    }

    pub async fn experience(&self) -> Result<Experiences> {
        let pages = self
            .client
            .query_data_source(
                self.config.experience_data_source_id,
                visible(),
                Some(vec![Sort::descending("Date")]),
            )
            .await
            .context("Failed to query experience")?;

        Ok(experience(&pages))
    }

    pub async fn projects(&self) -> Result<Projects> {
        let pages = self
            .client
            .query_data_source(
                self.config.projects_data_source_id,
                visible(),
                Some(vec![Sort::descending("Date")]),
            )
            .await
            .context("Failed to query projects")?;

        Ok(projects(&pages))
    }

    pub async fn affiliations(&self) -> Result<Affiliations> {
        let pages = self
            .client
            .query_data_source(
                self.config.affiliations_data_source_id,
                visible(),
                Some(vec![Sort::ascending("Display Order")]),
            )
            .await
            .context("Failed to query affiliations")?;

        Ok(affiliations(&pages))
    }
}
