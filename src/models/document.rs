use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IndexError;

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 500;

/// The closed set of newsgroup categories.
///
/// Wire names are the dotted newsgroup names (e.g. `sci.space`); unknown
/// strings are rejected at the boundary instead of being carried around as
/// free-form text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "alt.atheism")]
    AltAtheism,
    #[serde(rename = "comp.graphics")]
    CompGraphics,
    #[serde(rename = "comp.os.ms-windows.misc")]
    CompOsMsWindowsMisc,
    #[serde(rename = "comp.sys.ibm.pc.hardware")]
    CompSysIbmPcHardware,
    #[serde(rename = "comp.sys.mac.hardware")]
    CompSysMacHardware,
    #[serde(rename = "comp.windows.x")]
    CompWindowsX,
    #[serde(rename = "misc.forsale")]
    MiscForsale,
    #[serde(rename = "rec.autos")]
    RecAutos,
    #[serde(rename = "rec.motorcycles")]
    RecMotorcycles,
    #[serde(rename = "rec.sport.baseball")]
    RecSportBaseball,
    #[serde(rename = "rec.sport.hockey")]
    RecSportHockey,
    #[serde(rename = "sci.crypt")]
    SciCrypt,
    #[serde(rename = "sci.electronics")]
    SciElectronics,
    #[serde(rename = "sci.med")]
    SciMed,
    #[serde(rename = "sci.space")]
    SciSpace,
    #[serde(rename = "soc.religion.christian")]
    SocReligionChristian,
    #[serde(rename = "talk.politics.guns")]
    TalkPoliticsGuns,
    #[serde(rename = "talk.politics.mideast")]
    TalkPoliticsMideast,
    #[serde(rename = "talk.politics.misc")]
    TalkPoliticsMisc,
    #[serde(rename = "talk.religion.misc")]
    TalkReligionMisc,
}

/// Prefix table mapping a category to its coarse family tag.
const CATEGORY_FAMILIES: [(&str, &str); 7] = [
    ("comp.", "computer"),
    ("rec.", "recreation"),
    ("sci.", "science"),
    ("talk.", "discussion"),
    ("soc.", "society"),
    ("misc.", "misc"),
    ("alt.", "alternative"),
];

impl Category {
    /// Every category, in newsgroup order.
    pub const ALL: [Category; 20] = [
        Category::AltAtheism,
        Category::CompGraphics,
        Category::CompOsMsWindowsMisc,
        Category::CompSysIbmPcHardware,
        Category::CompSysMacHardware,
        Category::CompWindowsX,
        Category::MiscForsale,
        Category::RecAutos,
        Category::RecMotorcycles,
        Category::RecSportBaseball,
        Category::RecSportHockey,
        Category::SciCrypt,
        Category::SciElectronics,
        Category::SciMed,
        Category::SciSpace,
        Category::SocReligionChristian,
        Category::TalkPoliticsGuns,
        Category::TalkPoliticsMideast,
        Category::TalkPoliticsMisc,
        Category::TalkReligionMisc,
    ];

    /// The dotted newsgroup name (e.g. `sci.space`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::AltAtheism => "alt.atheism",
            Category::CompGraphics => "comp.graphics",
            Category::CompOsMsWindowsMisc => "comp.os.ms-windows.misc",
            Category::CompSysIbmPcHardware => "comp.sys.ibm.pc.hardware",
            Category::CompSysMacHardware => "comp.sys.mac.hardware",
            Category::CompWindowsX => "comp.windows.x",
            Category::MiscForsale => "misc.forsale",
            Category::RecAutos => "rec.autos",
            Category::RecMotorcycles => "rec.motorcycles",
            Category::RecSportBaseball => "rec.sport.baseball",
            Category::RecSportHockey => "rec.sport.hockey",
            Category::SciCrypt => "sci.crypt",
            Category::SciElectronics => "sci.electronics",
            Category::SciMed => "sci.med",
            Category::SciSpace => "sci.space",
            Category::SocReligionChristian => "soc.religion.christian",
            Category::TalkPoliticsGuns => "talk.politics.guns",
            Category::TalkPoliticsMideast => "talk.politics.mideast",
            Category::TalkPoliticsMisc => "talk.politics.misc",
            Category::TalkReligionMisc => "talk.religion.misc",
        }
    }

    /// Parse a category from its dotted name (case-insensitive).
    pub fn from_str_ci(s: &str) -> Option<Self> {
        let lowered = s.to_lowercase();
        Category::ALL.into_iter().find(|c| c.as_str() == lowered)
    }

    /// The tag form of the category name: dots replaced with dashes.
    pub fn slug(&self) -> String {
        self.as_str().replace('.', "-")
    }

    /// The coarse family tag derived from the name prefix
    /// (e.g. `sci.space` → `science`).
    pub fn family(&self) -> &'static str {
        let name = self.as_str();
        CATEGORY_FAMILIES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map(|(_, family)| *family)
            .unwrap_or("misc")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Application-level document label.
///
/// Carries no engine-enforced transition rules: any status may move to any
/// other via update, and deletion is a separate, permanent mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Archived,
    Draft,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Active, Status::Archived, Status::Draft];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Archived => "archived",
            Status::Draft => "draft",
        }
    }

    /// Parse a status from a string (case-insensitive).
    pub fn from_str_ci(s: &str) -> Option<Self> {
        let lowered = s.to_lowercase();
        Status::ALL.into_iter().find(|st| st.as_str() == lowered)
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Active
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A document as stored in the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque unique identifier, immutable once assigned.
    pub id: String,
    /// Human-readable title, 1–500 characters.
    pub title: String,
    /// Full-text body, non-empty.
    pub body: String,
    /// Newsgroup category.
    pub category: Category,
    /// Tags for exact-match filtering.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Derived or caller-supplied author.
    #[serde(default)]
    pub author: Option<String>,
    /// Where the document came from, if anywhere.
    #[serde(default)]
    pub source_url: Option<String>,
    /// Application-level label; never a deletion mechanism.
    #[serde(default)]
    pub status: Status,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
    /// Strictly increases on every mutation.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Assign a fresh id and creation timestamps to validated fields.
    pub(crate) fn from_fields(fields: DocumentFields, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: fields.title,
            body: fields.body,
            category: fields.category,
            tags: fields.tags,
            author: fields.author,
            source_url: fields.source_url,
            status: fields.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// The engine `_source` representation: every field except `id`, which
    /// lives in the engine's document id.
    pub(crate) fn to_source(&self) -> serde_json::Value {
        let mut value =
            serde_json::to_value(self).expect("Document serialization should not fail");
        if let Some(map) = value.as_object_mut() {
            map.remove("id");
        }
        value
    }

    /// Rebuild a document from an engine hit: id from `_id`, everything
    /// else from `_source`.
    pub(crate) fn from_source(
        id: &str,
        source: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        let mut value = source;
        if let Some(map) = value.as_object_mut() {
            map.insert("id".to_string(), serde_json::Value::String(id.to_string()));
        }
        serde_json::from_value(value)
    }
}

/// Caller-supplied fields for creating a document.
///
/// Ids and timestamps are assigned by the store, never by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFields {
    pub title: String,
    pub body: String,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub status: Status,
}

impl DocumentFields {
    /// Check the field invariants. Runs before any engine call.
    pub fn validate(&self) -> Result<(), IndexError> {
        validate_title(&self.title)?;
        validate_body(&self.body)
    }
}

/// A partial update. `None` means "leave the stored value unchanged";
/// there is no way to clear an optional field through a patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl DocumentPatch {
    /// Check the invariants of the supplied fields only.
    pub fn validate(&self) -> Result<(), IndexError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(body) = &self.body {
            validate_body(body)?;
        }
        Ok(())
    }

    /// Merge the supplied fields into `doc`, leaving the rest untouched.
    pub(crate) fn apply(&self, doc: &mut Document) {
        if let Some(title) = &self.title {
            doc.title = title.clone();
        }
        if let Some(body) = &self.body {
            doc.body = body.clone();
        }
        if let Some(category) = self.category {
            doc.category = category;
        }
        if let Some(tags) = &self.tags {
            doc.tags = tags.clone();
        }
        if let Some(author) = &self.author {
            doc.author = Some(author.clone());
        }
        if let Some(source_url) = &self.source_url {
            doc.source_url = Some(source_url.clone());
        }
        if let Some(status) = self.status {
            doc.status = status;
        }
    }
}

fn validate_title(title: &str) -> Result<(), IndexError> {
    if title.is_empty() {
        return Err(IndexError::Validation("title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(IndexError::Validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_body(body: &str) -> Result<(), IndexError> {
    if body.is_empty() {
        return Err(IndexError::Validation("body must not be empty".into()));
    }
    Ok(())
}
