use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier wrapper for page sections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionId(pub String);

impl SectionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Variant tag of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Header,
    About,
    Life,
    Team,
    Values,
    Jobs,
    Footer,
    Video,
}

impl SectionKind {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Header,
            Self::About,
            Self::Life,
            Self::Team,
            Self::Values,
            Self::Jobs,
            Self::Footer,
            Self::Video,
        ]
    }

    pub const fn tag(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::About => "about",
            Self::Life => "life",
            Self::Team => "team",
            Self::Values => "values",
            Self::Jobs => "jobs",
            Self::Footer => "footer",
            Self::Video => "video",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ordered().into_iter().find(|kind| kind.tag() == tag)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AboutContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LifeContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TeamContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValuesContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    pub items: Vec<ValueItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobsContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FooterLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FooterContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    pub links: Vec<FooterLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Typed payload of a section, one variant per section kind.
///
/// `Unsupported` keeps sections whose `type` tag this build does not know so
/// they survive a load/save cycle; the composer skips them.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionContent {
    Header(HeaderContent),
    About(AboutContent),
    Life(LifeContent),
    Team(TeamContent),
    Values(ValuesContent),
    Jobs(JobsContent),
    Footer(FooterContent),
    Video(VideoContent),
    Unsupported { tag: String, payload: Value },
}

impl SectionContent {
    pub fn default_for(kind: SectionKind) -> Self {
        match kind {
            SectionKind::Header => Self::Header(HeaderContent::default()),
            SectionKind::About => Self::About(AboutContent::default()),
            SectionKind::Life => Self::Life(LifeContent::default()),
            SectionKind::Team => Self::Team(TeamContent::default()),
            SectionKind::Values => Self::Values(ValuesContent::default()),
            SectionKind::Jobs => Self::Jobs(JobsContent::default()),
            SectionKind::Footer => Self::Footer(FooterContent::default()),
            SectionKind::Video => Self::Video(VideoContent::default()),
        }
    }

    /// `None` for unsupported sections.
    pub fn kind(&self) -> Option<SectionKind> {
        match self {
            Self::Header(_) => Some(SectionKind::Header),
            Self::About(_) => Some(SectionKind::About),
            Self::Life(_) => Some(SectionKind::Life),
            Self::Team(_) => Some(SectionKind::Team),
            Self::Values(_) => Some(SectionKind::Values),
            Self::Jobs(_) => Some(SectionKind::Jobs),
            Self::Footer(_) => Some(SectionKind::Footer),
            Self::Video(_) => Some(SectionKind::Video),
            Self::Unsupported { .. } => None,
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Unsupported { tag, .. } => tag,
            other => other.kind().map(SectionKind::tag).unwrap_or_default(),
        }
    }

    /// Parses a raw `content` payload for the given `type` tag.
    pub fn from_parts(tag: &str, payload: Value) -> Result<Self, SectionError> {
        let Some(kind) = SectionKind::from_tag(tag) else {
            return Ok(Self::Unsupported {
                tag: tag.to_string(),
                payload,
            });
        };

        let payload = match payload {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let content = match kind {
            SectionKind::Header => serde_json::from_value(payload).map(Self::Header),
            SectionKind::About => serde_json::from_value(payload).map(Self::About),
            SectionKind::Life => serde_json::from_value(payload).map(Self::Life),
            SectionKind::Team => serde_json::from_value(payload).map(Self::Team),
            SectionKind::Values => serde_json::from_value(payload).map(Self::Values),
            SectionKind::Jobs => serde_json::from_value(payload).map(Self::Jobs),
            SectionKind::Footer => serde_json::from_value(payload).map(Self::Footer),
            SectionKind::Video => serde_json::from_value(payload).map(Self::Video),
        };

        content.map_err(|source| SectionError::InvalidContent { kind, source })
    }

    fn to_payload(&self) -> Value {
        let encoded = match self {
            Self::Header(content) => serde_json::to_value(content),
            Self::About(content) => serde_json::to_value(content),
            Self::Life(content) => serde_json::to_value(content),
            Self::Team(content) => serde_json::to_value(content),
            Self::Values(content) => serde_json::to_value(content),
            Self::Jobs(content) => serde_json::to_value(content),
            Self::Footer(content) => serde_json::to_value(content),
            Self::Video(content) => serde_json::to_value(content),
            Self::Unsupported { payload, .. } => Ok(payload.clone()),
        };
        // Payload structs only hold strings and vectors of strings.
        encoded.unwrap_or(Value::Null)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SectionError {
    #[error("invalid {} section content: {source}", .kind.tag())]
    InvalidContent {
        kind: SectionKind,
        #[source]
        source: serde_json::Error,
    },
}

/// One ordered, typed content block of a careers page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSection", into = "RawSection")]
pub struct Section {
    pub id: SectionId,
    pub order: i32,
    pub content: SectionContent,
}

impl Section {
    pub fn new(kind: SectionKind, order: i32) -> Self {
        Self {
            id: SectionId::generate(),
            order,
            content: SectionContent::default_for(kind),
        }
    }

    pub fn kind(&self) -> Option<SectionKind> {
        self.content.kind()
    }
}

/// Storage and wire shape: `{ id, type, order, content }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawSection {
    id: SectionId,
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    order: i32,
    #[serde(default)]
    content: Value,
}

impl TryFrom<RawSection> for Section {
    type Error = SectionError;

    fn try_from(raw: RawSection) -> Result<Self, Self::Error> {
        let content = SectionContent::from_parts(&raw.tag, raw.content)?;
        Ok(Self {
            id: raw.id,
            order: raw.order,
            content,
        })
    }
}

impl From<Section> for RawSection {
    fn from(section: Section) -> Self {
        Self {
            id: section.id,
            tag: section.content.tag().to_string(),
            order: section.order,
            content: section.content.to_payload(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_typed_payloads() {
        let section: Section = serde_json::from_value(json!({
            "id": "h1",
            "type": "header",
            "order": 0,
            "content": { "title": "Build with us" }
        }))
        .expect("header parses");

        assert_eq!(section.kind(), Some(SectionKind::Header));
        match section.content {
            SectionContent::Header(header) => {
                assert_eq!(header.title.as_deref(), Some("Build with us"));
                assert!(header.subtitle.is_none());
            }
            other => panic!("expected header, got {other:?}"),
        }
    }

    #[test]
    fn empty_or_missing_content_uses_defaults() {
        let section: Section =
            serde_json::from_value(json!({ "id": "j1", "type": "jobs", "order": 1 }))
                .expect("jobs parses");
        assert_eq!(section.content, SectionContent::Jobs(JobsContent::default()));
    }

    #[test]
    fn rejects_unknown_fields_for_known_variants() {
        let error = serde_json::from_value::<Section>(json!({
            "id": "l1",
            "type": "life",
            "order": 2,
            "content": { "imgs": ["a.png"] }
        }))
        .expect_err("typo in field name rejected");
        assert!(error.to_string().contains("life"));
    }

    #[test]
    fn keeps_unrecognised_variants_verbatim() {
        let raw = json!({
            "id": "x1",
            "type": "testimonials",
            "order": 4,
            "content": { "quotes": ["great place"] }
        });
        let section: Section = serde_json::from_value(raw.clone()).expect("unknown tag kept");
        assert!(section.kind().is_none());
        assert_eq!(section.content.tag(), "testimonials");
        assert_eq!(serde_json::to_value(&section).expect("serializes"), raw);
    }
}
