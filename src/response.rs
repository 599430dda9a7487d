use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{collections::HashMap, fmt, str::FromStr};
use time::OffsetDateTime;
use uuid::Uuid;

// ------------------ NOTION IDS ------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct NotionId(Uuid);

impl FromStr for NotionId {
    type Err = uuid::Error;

    /// Accepts both the dashed form the API returns and the 32 character form found in
    /// Notion URLs
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(NotionId)
    }
}

impl fmt::Display for NotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

// ------------------ TYPE TAGGED OBJECTS ------------------
// Notion encodes its unions as `{ "type": "x", "x": { ... } }`, which is neither of serde's
// internally nor adjacently tagged representations. Everything tagged that way goes through
// here so unknown tags can land in an `Unsupported` variant instead of failing the whole
// response.
#[derive(Deserialize)]
struct Tagged {
    #[serde(rename = "type")]
    ty: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Tagged {
    /// Takes the payload stored under the key named by the tag. A missing payload is read as
    /// `null` so nullable payloads (dates, urls, selects...) decode to `None`.
    fn payload<T>(&mut self) -> Result<T, serde_json::Error>
    where
        T: DeserializeOwned,
    {
        let value = self.fields.remove(&self.ty).unwrap_or(Value::Null);
        serde_json::from_value(value)
    }

    fn field<T>(&mut self, key: &str) -> Result<T, serde_json::Error>
    where
        T: DeserializeOwned,
    {
        let value = self.fields.remove(key).unwrap_or(Value::Null);
        serde_json::from_value(value)
    }
}

// ------------------ NOTION LIST OBJECT ------------------
// As defined in https://developers.notion.com/reference/pagination
#[derive(Debug, Deserialize, PartialEq)]
pub struct List<T> {
    pub object: String,
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

// ------------------ NOTION ERROR OBJECT ------------------
// As defined in https://developers.notion.com/reference/status-codes
#[derive(Debug, Deserialize, PartialEq)]
pub struct ApiError {
    pub status: u16,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidRequestUrl,
    InvalidRequest,
    ValidationError,
    MissingVersion,
    Unauthorized,
    RestrictedResource,
    ObjectNotFound,
    ConflictError,
    RateLimited,
    InternalServerError,
    ServiceUnavailable,
    DatabaseConnectionUnavailable,
    GatewayTimeout,
    #[serde(other)]
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidJson => "invalid_json",
            ErrorCode::InvalidRequestUrl => "invalid_request_url",
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::ValidationError => "validation_error",
            ErrorCode::MissingVersion => "missing_version",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::RestrictedResource => "restricted_resource",
            ErrorCode::ObjectNotFound => "object_not_found",
            ErrorCode::ConflictError => "conflict_error",
            ErrorCode::RateLimited => "rate_limited",
            ErrorCode::InternalServerError => "internal_server_error",
            ErrorCode::ServiceUnavailable => "service_unavailable",
            ErrorCode::DatabaseConnectionUnavailable => "database_connection_unavailable",
            ErrorCode::GatewayTimeout => "gateway_timeout",
            ErrorCode::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ------------------ NOTION RICH TEXT OBJECT ------------------
// As defined in https://developers.notion.com/reference/rich-text
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RichText {
    pub plain_text: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub annotations: Annotations,
}

/// Concatenates the plain text of every span
pub fn plain_text(spans: &[RichText]) -> String {
    spans.iter().map(|span| span.plain_text.as_str()).collect()
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    #[serde(default)]
    pub color: Color,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[default]
    Default,
    Gray,
    Brown,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Red,
    GrayBackground,
    BrownBackground,
    OrangeBackground,
    YellowBackground,
    GreenBackground,
    BlueBackground,
    PurpleBackground,
    PinkBackground,
    RedBackground,
}

// ------------------ NOTION PARENT OBJECT ------------------
// As defined in https://developers.notion.com/reference/parent-object
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(try_from = "Tagged")]
pub enum Parent {
    Page(NotionId),
    Database(NotionId),
    DataSource {
        data_source_id: NotionId,
        database_id: Option<NotionId>,
    },
    Block(NotionId),
    Workspace,
    Unsupported {
        ty: String,
    },
}

impl TryFrom<Tagged> for Parent {
    type Error = serde_json::Error;

    fn try_from(mut tagged: Tagged) -> Result<Self, Self::Error> {
        Ok(match tagged.ty.as_str() {
            "page_id" => Parent::Page(tagged.payload()?),
            "database_id" => Parent::Database(tagged.payload()?),
            "data_source_id" => Parent::DataSource {
                data_source_id: tagged.payload()?,
                database_id: tagged.field("database_id")?,
            },
            "block_id" => Parent::Block(tagged.payload()?),
            "workspace" => Parent::Workspace,
            _ => Parent::Unsupported { ty: tagged.ty },
        })
    }
}

// ------------------ NOTION BLOCK OBJECT ------------------
// As defined in https://developers.notion.com/reference/block
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Block {
    pub object: String,
    pub id: NotionId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_edited_time: OffsetDateTime,
    pub parent: Parent,
    pub has_children: bool,
    pub archived: bool,
    #[serde(default)]
    pub in_trash: bool,
    #[serde(flatten)]
    pub ty: BlockType,
}

impl Block {
    pub fn name(&self) -> &str {
        self.ty.name()
    }
}

/// The body of a block, selected by its `type`
///
/// Only the blocks the portfolio renders get their own variant, everything else keeps its tag
/// in `Unsupported` so the renderer can skip it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(try_from = "Tagged")]
pub enum BlockType {
    Paragraph(TextBlock),
    HeadingOne(TextBlock),
    HeadingTwo(TextBlock),
    HeadingThree(TextBlock),
    BulletedListItem(TextBlock),
    Unsupported { ty: String },
}

impl BlockType {
    pub fn name(&self) -> &str {
        match self {
            BlockType::Paragraph(_) => "paragraph",
            BlockType::HeadingOne(_) => "heading_1",
            BlockType::HeadingTwo(_) => "heading_2",
            BlockType::HeadingThree(_) => "heading_3",
            BlockType::BulletedListItem(_) => "bulleted_list_item",
            BlockType::Unsupported { ty } => ty,
        }
    }
}

impl TryFrom<Tagged> for BlockType {
    type Error = serde_json::Error;

    fn try_from(mut tagged: Tagged) -> Result<Self, Self::Error> {
        Ok(match tagged.ty.as_str() {
            "paragraph" => BlockType::Paragraph(tagged.payload()?),
            "heading_1" => BlockType::HeadingOne(tagged.payload()?),
            "heading_2" => BlockType::HeadingTwo(tagged.payload()?),
            "heading_3" => BlockType::HeadingThree(tagged.payload()?),
            "bulleted_list_item" => BlockType::BulletedListItem(tagged.payload()?),
            _ => BlockType::Unsupported { ty: tagged.ty },
        })
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TextBlock {
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub color: Color,
    // Only ever holds what Notion sends inline, children are never fetched recursively
    #[serde(default)]
    pub children: Vec<Block>,
}

// ------------------ NOTION PAGE OBJECT ------------------
// As defined in https://developers.notion.com/reference/page
#[derive(Debug, Deserialize, PartialEq)]
pub struct Page {
    pub object: String,
    pub id: NotionId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_edited_time: OffsetDateTime,
    pub parent: Parent,
    pub archived: bool,
    #[serde(default)]
    pub in_trash: bool,
    pub icon: Option<FileReference>,
    pub cover: Option<FileReference>,
    #[serde(default)]
    pub properties: HashMap<String, Property>,
    pub url: String,
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Page {
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name).map(|property| &property.value)
    }

    /// The cover's URL or an empty string when the page has no usable cover
    pub fn cover_url(&self) -> &str {
        self.cover.as_ref().map(FileReference::url).unwrap_or_default()
    }
}

// ------------------ NOTION DATA SOURCE OBJECT ------------------
// As defined in https://developers.notion.com/reference/data-source
#[derive(Debug, Deserialize, PartialEq)]
pub struct DataSource {
    pub object: String,
    pub id: NotionId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_edited_time: OffsetDateTime,
    pub parent: Parent,
    #[serde(default)]
    pub database_parent: Option<Parent>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub in_trash: bool,
    #[serde(default)]
    pub is_inline: bool,
    #[serde(default)]
    pub title: Vec<RichText>,
    #[serde(default)]
    pub description: Vec<RichText>,
    // The schema is only passed through, never interpreted
    #[serde(default)]
    pub properties: Map<String, Value>,
    pub icon: Option<FileReference>,
    pub cover: Option<FileReference>,
    #[serde(default)]
    pub url: Option<String>,
}

// ------------------ NOTION PROPERTY VALUE OBJECT ------------------
// As defined in https://developers.notion.com/reference/property-value-object
#[derive(Debug, Deserialize, PartialEq)]
pub struct Property {
    pub id: String,
    #[serde(flatten)]
    pub value: PropertyValue,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(try_from = "Tagged")]
pub enum PropertyValue {
    Checkbox(bool),
    Date(Option<Date>),
    Title(Vec<RichText>),
    RichText(Vec<RichText>),
    Url(Option<String>),
    Email(Option<String>),
    Number(Option<f64>),
    Files(Vec<FileReference>),
    Select(Option<SelectOption>),
    MultiSelect(Vec<SelectOption>),
    Formula(Formula),
    Unsupported { ty: String },
}

impl TryFrom<Tagged> for PropertyValue {
    type Error = serde_json::Error;

    fn try_from(mut tagged: Tagged) -> Result<Self, Self::Error> {
        Ok(match tagged.ty.as_str() {
            "checkbox" => PropertyValue::Checkbox(tagged.payload()?),
            "date" => PropertyValue::Date(tagged.payload()?),
            "title" => PropertyValue::Title(tagged.payload()?),
            "rich_text" => PropertyValue::RichText(tagged.payload()?),
            "url" => PropertyValue::Url(tagged.payload()?),
            "email" => PropertyValue::Email(tagged.payload()?),
            "number" => PropertyValue::Number(tagged.payload()?),
            "files" => PropertyValue::Files(tagged.payload()?),
            "select" => PropertyValue::Select(tagged.payload()?),
            "multi_select" => PropertyValue::MultiSelect(tagged.payload()?),
            "formula" => PropertyValue::Formula(tagged.payload()?),
            _ => PropertyValue::Unsupported { ty: tagged.ty },
        })
    }
}

// Reading a value through the wrong accessor is not an error, it is just empty
impl PropertyValue {
    pub fn checkbox(&self) -> bool {
        matches!(self, PropertyValue::Checkbox(true))
    }

    pub fn date(&self) -> Option<&Date> {
        match self {
            PropertyValue::Date(date) => date.as_ref(),
            _ => None,
        }
    }

    pub fn title(&self) -> &[RichText] {
        match self {
            PropertyValue::Title(title) => title,
            _ => &[],
        }
    }

    pub fn rich_text(&self) -> &[RichText] {
        match self {
            PropertyValue::RichText(text) => text,
            _ => &[],
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            PropertyValue::Url(url) => url.as_deref(),
            _ => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            PropertyValue::Email(email) => email.as_deref(),
            _ => None,
        }
    }

    pub fn number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(number) => *number,
            _ => None,
        }
    }

    pub fn files(&self) -> &[FileReference] {
        match self {
            PropertyValue::Files(files) => files,
            _ => &[],
        }
    }

    pub fn select(&self) -> Option<&SelectOption> {
        match self {
            PropertyValue::Select(select) => select.as_ref(),
            _ => None,
        }
    }

    pub fn multi_select(&self) -> &[SelectOption] {
        match self {
            PropertyValue::MultiSelect(options) => options,
            _ => &[],
        }
    }

    pub fn formula(&self) -> Option<&Formula> {
        match self {
            PropertyValue::Formula(formula) => Some(formula),
            _ => None,
        }
    }
}

// ------------------ NOTION DATE ------------------
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Date {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

impl Date {
    /// A range without an end is still ongoing
    pub fn is_current(&self) -> bool {
        self.end.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SelectOption {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub color: Color,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(try_from = "Tagged")]
pub enum Formula {
    Boolean(Option<bool>),
    Date(Option<Date>),
    Number(Option<f64>),
    Text(Option<String>),
    Unsupported { ty: String },
}

impl TryFrom<Tagged> for Formula {
    type Error = serde_json::Error;

    fn try_from(mut tagged: Tagged) -> Result<Self, Self::Error> {
        Ok(match tagged.ty.as_str() {
            "boolean" => Formula::Boolean(tagged.payload()?),
            "date" => Formula::Date(tagged.payload()?),
            "number" => Formula::Number(tagged.payload()?),
            "string" => Formula::Text(tagged.payload()?),
            _ => Formula::Unsupported { ty: tagged.ty },
        })
    }
}

// ------------------ NOTION FILE OBJECT ------------------
// As defined in https://developers.notion.com/reference/file-object
// and https://developers.notion.com/reference/emoji-object
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(try_from = "Tagged")]
pub enum FileReference {
    Internal(HostedFile),
    Uploaded(FileUpload),
    External(ExternalFile),
    Emoji(String),
    Unsupported { ty: String },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HostedFile {
    pub url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expiry_time: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FileUpload {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ExternalFile {
    pub url: String,
}

impl TryFrom<Tagged> for FileReference {
    type Error = serde_json::Error;

    fn try_from(mut tagged: Tagged) -> Result<Self, Self::Error> {
        Ok(match tagged.ty.as_str() {
            "file" => FileReference::Internal(tagged.payload()?),
            "file_upload" => FileReference::Uploaded(tagged.payload()?),
            "external" => FileReference::External(tagged.payload()?),
            "emoji" => FileReference::Emoji(tagged.payload()?),
            _ => FileReference::Unsupported { ty: tagged.ty },
        })
    }
}

impl FileReference {
    /// Where the file can be downloaded from. Uploads, emojis and unknown kinds have no URL
    /// and resolve to an empty string.
    pub fn url(&self) -> &str {
        match self {
            FileReference::Internal(file) => &file.url,
            FileReference::External(file) => &file.url,
            FileReference::Uploaded(_)
            | FileReference::Emoji(_)
            | FileReference::Unsupported { .. } => "",
        }
    }
}
