use serde::Serialize;

use super::domain::Company;
use super::media::VideoSource;
use super::sections::{FooterLink, Section, SectionContent, TeamMember, ValueItem};

pub const DEFAULT_HERO_TITLE: &str = "Join our team";
pub const DEFAULT_HERO_SUBTITLE: &str = "Building the future, together.";
pub const DEFAULT_JOBS_HEADING: &str = "Open roles";
pub const DEFAULT_TEAM_HEADING: &str = "Meet the team";
pub const DEFAULT_VALUES_HEADING: &str = "Our values";
pub const DEFAULT_VIDEO_HEADING: &str = "Watch our story";
pub const LIFE_PLACEHOLDER_TILES: usize = 6;

/// A section resolved against its defaults, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum PageBlock {
    Hero {
        title: String,
        subtitle: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        banner_url: Option<String>,
    },
    About {
        heading: String,
        body: String,
    },
    Life {
        heading: String,
        images: Vec<String>,
        placeholder_tiles: usize,
    },
    Team {
        heading: String,
        members: Vec<TeamMember>,
    },
    Values {
        heading: String,
        items: Vec<ValueItem>,
    },
    JobList {
        heading: String,
    },
    Footer {
        tagline: String,
        links: Vec<FooterLink>,
    },
    Video {
        heading: String,
        source: VideoSource,
    },
}

/// Composes the company's stored sections in ascending order.
pub fn compose(company: &Company) -> Vec<PageBlock> {
    compose_sections(company, company.page.ordered_sections())
}

/// Maps each section, in the order given, to its block. An empty sequence
/// yields the hero + job list fallback; unsupported sections are skipped.
pub fn compose_sections<'a, I>(company: &Company, sections: I) -> Vec<PageBlock>
where
    I: IntoIterator<Item = &'a Section>,
{
    let mut sections = sections.into_iter().peekable();
    if sections.peek().is_none() {
        return fallback_blocks(company);
    }

    sections
        .filter_map(|section| block_for(company, &section.content))
        .collect()
}

pub fn fallback_blocks(company: &Company) -> Vec<PageBlock> {
    vec![default_hero(company), default_job_list()]
}

fn default_hero(company: &Company) -> PageBlock {
    PageBlock::Hero {
        title: DEFAULT_HERO_TITLE.to_string(),
        subtitle: DEFAULT_HERO_SUBTITLE.to_string(),
        banner_url: company.page.banner_url.clone(),
    }
}

fn default_job_list() -> PageBlock {
    PageBlock::JobList {
        heading: DEFAULT_JOBS_HEADING.to_string(),
    }
}

fn block_for(company: &Company, content: &SectionContent) -> Option<PageBlock> {
    let block = match content {
        SectionContent::Header(header) => PageBlock::Hero {
            title: text_or(&header.title, DEFAULT_HERO_TITLE),
            subtitle: text_or(&header.subtitle, DEFAULT_HERO_SUBTITLE),
            banner_url: company.page.banner_url.clone(),
        },
        SectionContent::About(about) => PageBlock::About {
            heading: text_or(&about.heading, &format!("About {}", company.name)),
            body: about.body.clone().unwrap_or_default(),
        },
        SectionContent::Life(life) => PageBlock::Life {
            heading: text_or(&life.heading, &format!("Life at {}", company.name)),
            placeholder_tiles: if life.images.is_empty() {
                LIFE_PLACEHOLDER_TILES
            } else {
                0
            },
            images: life.images.clone(),
        },
        SectionContent::Team(team) => PageBlock::Team {
            heading: text_or(&team.heading, DEFAULT_TEAM_HEADING),
            members: team.members.clone(),
        },
        SectionContent::Values(values) => PageBlock::Values {
            heading: text_or(&values.heading, DEFAULT_VALUES_HEADING),
            items: values.items.clone(),
        },
        SectionContent::Jobs(jobs) => PageBlock::JobList {
            heading: text_or(&jobs.heading, DEFAULT_JOBS_HEADING),
        },
        SectionContent::Footer(footer) => PageBlock::Footer {
            tagline: text_or(&footer.tagline, &format!("© {}", company.name)),
            links: if footer.links.is_empty() {
                default_footer_links()
            } else {
                footer.links.clone()
            },
        },
        SectionContent::Video(video) => {
            let source = video
                .url
                .as_deref()
                .and_then(VideoSource::from_url)
                .or_else(|| {
                    company
                        .page
                        .video_url
                        .as_deref()
                        .and_then(VideoSource::from_url)
                })?;
            PageBlock::Video {
                heading: text_or(&video.heading, DEFAULT_VIDEO_HEADING),
                source,
            }
        }
        SectionContent::Unsupported { .. } => return None,
    };

    Some(block)
}

fn text_or(value: &Option<String>, fallback: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => fallback.to_string(),
    }
}

fn default_footer_links() -> Vec<FooterLink> {
    ["About", "Contact", "Privacy"]
        .into_iter()
        .map(|label| FooterLink {
            label: label.to_string(),
            url: "#".to_string(),
        })
        .collect()
}
