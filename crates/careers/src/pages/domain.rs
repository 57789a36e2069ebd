use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::sections::Section;

/// Identifier wrapper for tenant companies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub String);

impl CompanyId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User reference issued by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

/// Visibility of a tenant's public careers page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Draft,
    Published,
}

impl PageStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            _ => None,
        }
    }
}

/// Brand colours applied to the rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: "#1D4ED8".to_string(),
            secondary_color: "#1E3A5F".to_string(),
            accent_color: "#0EA5E9".to_string(),
            font_family: None,
        }
    }
}

impl Theme {
    /// Rejects colours that are not `#rgb` or `#rrggbb` hex literals and
    /// font stacks containing anything beyond font-name characters.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("primaryColor", &self.primary_color),
            ("secondaryColor", &self.secondary_color),
            ("accentColor", &self.accent_color),
        ] {
            if !is_hex_color(value) {
                return Err(format!("{field} must be a #rgb or #rrggbb colour, got '{value}'"));
            }
        }
        if let Some(font) = self.font_family.as_deref() {
            if !is_font_family(font) {
                return Err(format!(
                    "fontFamily may only contain letters, digits, spaces, commas, quotes and hyphens, got '{font}'"
                ));
            }
        }
        Ok(())
    }
}

/// Font stacks such as `"Open Sans", Arial, sans-serif`.
pub(crate) fn is_font_family(value: &str) -> bool {
    !value.trim().is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, ' ' | ',' | '"' | '\'' | '-'))
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(digits) => {
            matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

/// The owner-editable part of a company record. Save and publish write this
/// wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_meta: Option<SeoMeta>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl PageContent {
    /// Sections sorted by ascending order, ties keeping their stored position.
    pub fn ordered_sections(&self) -> Vec<&Section> {
        let mut ordered: Vec<&Section> = self.sections.iter().collect();
        ordered.sort_by_key(|section| section.order);
        ordered
    }
}

/// One recruiting organisation's careers page configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub slug: String,
    pub name: String,
    pub status: PageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<OwnerId>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub page: PageContent,
}

impl Company {
    pub fn new(slug: impl Into<String>, name: impl Into<String>, status: PageStatus) -> Self {
        Self {
            id: CompanyId::generate(),
            slug: slug.into(),
            name: name.into(),
            status,
            owner_id: None,
            created_at: Utc::now(),
            page: PageContent::default(),
        }
    }

    pub fn with_owner(mut self, owner: OwnerId) -> Self {
        self.owner_id = Some(owner);
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == PageStatus::Published
    }

    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        self.owner_id.as_ref() == Some(owner)
    }

    pub fn initial(&self) -> char {
        self.name
            .chars()
            .find(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }
}

/// Normalises a user-supplied slug: lower-case, whitespace runs become `-`.
pub fn normalize_slug(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
