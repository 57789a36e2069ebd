//! Tenant careers pages: the company model, typed sections, composition into
//! blocks, the owner's editor and HTML rendering.

pub mod composer;
pub mod domain;
pub mod editor;
pub mod media;
pub mod render;
pub mod sections;

pub use composer::{compose, compose_sections, fallback_blocks, PageBlock};
pub use domain::{normalize_slug, Company, CompanyId, OwnerId, PageContent, PageStatus, SeoMeta, Theme};
pub use editor::{EditorCommand, EditorError, MoveDirection, PageEditor};
pub use media::VideoSource;
pub use render::{render_editor, render_not_found, render_page, JobListing, RenderMode};
pub use sections::{Section, SectionContent, SectionError, SectionId, SectionKind};
