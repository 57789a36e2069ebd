use serde::{Deserialize, Serialize};

use super::domain::{Company, PageContent, SeoMeta, Theme};
use super::sections::{Section, SectionContent, SectionId, SectionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Serializable form of the editor operations, applied in sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditorCommand {
    AddSection {
        kind: SectionKind,
    },
    RemoveSection {
        id: SectionId,
    },
    MoveSection {
        id: SectionId,
        direction: MoveDirection,
    },
    UpdateSection {
        id: SectionId,
        content: serde_json::Value,
    },
    SetTheme {
        theme: Theme,
    },
    SetBranding {
        #[serde(default)]
        logo_url: Option<String>,
        #[serde(default)]
        banner_url: Option<String>,
        #[serde(default)]
        video_url: Option<String>,
    },
    SetSeo {
        seo_meta: Option<SeoMeta>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("section {0} does not exist")]
    UnknownSection(SectionId),
    #[error("section {id} is a {expected} section and cannot take {found} content")]
    KindMismatch {
        id: SectionId,
        expected: String,
        found: String,
    },
    #[error("{0}")]
    InvalidTheme(String),
    #[error(transparent)]
    InvalidContent(#[from] super::sections::SectionError),
}

/// Owner's in-memory working copy of a company page. Nothing here touches
/// storage; callers persist `draft()` through save or publish.
#[derive(Debug, Clone)]
pub struct PageEditor {
    company: Company,
}

impl PageEditor {
    pub fn new(mut company: Company) -> Self {
        company.page.sections.sort_by_key(|section| section.order);
        Self { company }
    }

    pub fn company(&self) -> &Company {
        &self.company
    }

    pub fn sections(&self) -> &[Section] {
        &self.company.page.sections
    }

    pub fn draft(&self) -> &PageContent {
        &self.company.page
    }

    pub fn into_company(self) -> Company {
        self.company
    }

    pub fn has_kind(&self, kind: SectionKind) -> bool {
        self.sections()
            .iter()
            .any(|section| section.kind() == Some(kind))
    }

    /// Appends a section with default content. Ignored when the page already
    /// has a section of that kind.
    pub fn add_section(&mut self, kind: SectionKind) -> Option<SectionId> {
        if self.has_kind(kind) {
            return None;
        }

        let order = self
            .sections()
            .iter()
            .map(|section| section.order)
            .max()
            .map_or(0, |max| max + 1);
        let section = Section::new(kind, order);
        let id = section.id.clone();
        self.company.page.sections.push(section);
        Some(id)
    }

    pub fn remove_section(&mut self, id: &SectionId) -> bool {
        let before = self.company.page.sections.len();
        self.company.page.sections.retain(|section| &section.id != id);
        before != self.company.page.sections.len()
    }

    /// Swaps the section with its neighbour, exchanging their order values.
    /// Returns `false` at the boundaries or for unknown ids.
    pub fn move_section(&mut self, id: &SectionId, direction: MoveDirection) -> bool {
        let sections = &mut self.company.page.sections;
        let Some(index) = sections.iter().position(|section| &section.id == id) else {
            return false;
        };

        let neighbour = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < sections.len() => index + 1,
            _ => return false,
        };

        let order = sections[index].order;
        sections[index].order = sections[neighbour].order;
        sections[neighbour].order = order;
        sections.swap(index, neighbour);
        true
    }

    pub fn update_section(
        &mut self,
        id: &SectionId,
        content: SectionContent,
    ) -> Result<(), EditorError> {
        let section = self
            .company
            .page
            .sections
            .iter_mut()
            .find(|section| &section.id == id)
            .ok_or_else(|| EditorError::UnknownSection(id.clone()))?;

        if section.content.tag() != content.tag() {
            return Err(EditorError::KindMismatch {
                id: id.clone(),
                expected: section.content.tag().to_string(),
                found: content.tag().to_string(),
            });
        }

        section.content = content;
        Ok(())
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), EditorError> {
        theme.validate().map_err(EditorError::InvalidTheme)?;
        self.company.page.theme = theme;
        Ok(())
    }

    pub fn set_branding(
        &mut self,
        logo_url: Option<String>,
        banner_url: Option<String>,
        video_url: Option<String>,
    ) {
        self.company.page.logo_url = logo_url;
        self.company.page.banner_url = banner_url;
        self.company.page.video_url = video_url;
    }

    pub fn set_seo(&mut self, seo_meta: Option<SeoMeta>) {
        self.company.page.seo_meta = seo_meta;
    }

    pub fn apply(&mut self, command: EditorCommand) -> Result<(), EditorError> {
        match command {
            EditorCommand::AddSection { kind } => {
                self.add_section(kind);
            }
            EditorCommand::RemoveSection { id } => {
                self.remove_section(&id);
            }
            EditorCommand::MoveSection { id, direction } => {
                self.move_section(&id, direction);
            }
            EditorCommand::UpdateSection { id, content } => {
                let tag = self
                    .sections()
                    .iter()
                    .find(|section| section.id == id)
                    .map(|section| section.content.tag().to_string())
                    .ok_or_else(|| EditorError::UnknownSection(id.clone()))?;
                let content = SectionContent::from_parts(&tag, content)?;
                self.update_section(&id, content)?;
            }
            EditorCommand::SetTheme { theme } => self.set_theme(theme)?,
            EditorCommand::SetBranding {
                logo_url,
                banner_url,
                video_url,
            } => self.set_branding(logo_url, banner_url, video_url),
            EditorCommand::SetSeo { seo_meta } => self.set_seo(seo_meta),
        }
        Ok(())
    }

    pub fn apply_all<I>(&mut self, commands: I) -> Result<(), EditorError>
    where
        I: IntoIterator<Item = EditorCommand>,
    {
        commands
            .into_iter()
            .try_for_each(|command| self.apply(command))
    }
}
