use super::composer::PageBlock;
use super::domain::{is_font_family, Company};
use super::media::VideoSource;
use crate::jobs::{JobCriteria, JobFacets, JobPosting};

pub const PREVIEW_BANNER: &str = "Preview Mode - This is how your page will look when published";
pub const NO_MATCHING_JOBS: &str = "No jobs match your filters.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Public,
    Preview,
}

/// Jobs shown by the job-list block together with the state of the filter form.
#[derive(Debug, Clone)]
pub struct JobListing<'a> {
    pub jobs: Vec<&'a JobPosting>,
    pub facets: JobFacets,
    pub criteria: JobCriteria,
    /// Location facet -> tenant page, offered on the aggregate listing.
    pub location_links: Vec<(String, String)>,
}

impl<'a> JobListing<'a> {
    pub fn new(jobs: Vec<&'a JobPosting>, facets: JobFacets, criteria: JobCriteria) -> Self {
        Self {
            jobs,
            facets,
            criteria,
            location_links: Vec::new(),
        }
    }
}

/// Renders a complete careers page document.
pub fn render_page(
    company: &Company,
    blocks: &[PageBlock],
    listing: &JobListing<'_>,
    mode: RenderMode,
) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n");
    push_head(&mut html, company);
    html.push_str("<body>\n");

    if mode == RenderMode::Preview {
        html.push_str(&format!(
            "<div class=\"preview-banner\">{}</div>\n",
            escape_html(PREVIEW_BANNER)
        ));
    }

    push_top_bar(&mut html, company);
    push_blocks(&mut html, company, blocks, listing);
    html.push_str("</body>\n</html>\n");
    html
}

/// Owner-facing overview: status, section list and a live preview of the
/// working copy.
pub fn render_editor(company: &Company, blocks: &[PageBlock], listing: &JobListing<'_>) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n");
    push_head(&mut html, company);
    html.push_str("<body class=\"editor\">\n<header><h1>Careers Page Builder</h1>\n");
    html.push_str(&format!(
        "<a href=\"/{}/preview\">Preview</a>\n</header>\n",
        escape_html(&company.slug)
    ));
    html.push_str(&format!(
        "<section class=\"company-info\"><h2>Company: {}</h2><p>Status: <span class=\"status-{}\">{}</span></p></section>\n",
        escape_html(&company.name),
        company.status.label(),
        company.status.label()
    ));

    html.push_str("<ol class=\"sections\">\n");
    for section in company.page.ordered_sections() {
        html.push_str(&format!(
            "<li data-section-id=\"{}\" data-order=\"{}\">{}</li>\n",
            escape_html(&section.id.0),
            section.order,
            escape_html(section.content.tag())
        ));
    }
    html.push_str("</ol>\n<div class=\"live-preview\">\n");
    push_top_bar(&mut html, company);
    push_blocks(&mut html, company, blocks, listing);
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

pub fn render_not_found() -> String {
    "<!DOCTYPE html>\n<html lang=\"en\">\n<head><title>Page not found</title></head>\n<body><h1>404</h1><p>This careers page could not be found.</p></body>\n</html>\n".to_string()
}

fn push_head(html: &mut String, company: &Company) {
    let seo = company.page.seo_meta.clone().unwrap_or_default();
    let title = seo
        .title
        .unwrap_or_else(|| format!("Careers at {}", company.name));
    let theme = &company.page.theme;

    html.push_str("<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&title)));
    if let Some(description) = seo.description {
        html.push_str(&format!(
            "<meta name=\"description\" content=\"{}\">\n",
            escape_html(&description)
        ));
    }
    if let Some(keywords) = seo.keywords {
        html.push_str(&format!(
            "<meta name=\"keywords\" content=\"{}\">\n",
            escape_html(&keywords)
        ));
    }

    html.push_str(&format!(
        "<style>:root {{ --primary: {}; --secondary: {}; --accent: {};{} }}</style>\n",
        escape_html(&theme.primary_color),
        escape_html(&theme.secondary_color),
        escape_html(&theme.accent_color),
        theme
            .font_family
            .as_deref()
            .filter(|font| is_font_family(font))
            .map(|font| format!(" font-family: {font};"))
            .unwrap_or_default()
    ));
    html.push_str("</head>\n");
}

fn push_top_bar(html: &mut String, company: &Company) {
    html.push_str("<header class=\"top-bar\">");
    match &company.page.logo_url {
        Some(logo) => html.push_str(&format!(
            "<img class=\"logo\" src=\"{}\" alt=\"{}\">",
            escape_html(logo),
            escape_html(&company.name)
        )),
        None => html.push_str(&format!(
            "<div class=\"logo-initial\">{}</div>",
            escape_html(&company.initial().to_string())
        )),
    }
    html.push_str(&format!(
        "<span class=\"company-name\">{}</span></header>\n",
        escape_html(&company.name)
    ));
}

fn push_blocks(
    html: &mut String,
    company: &Company,
    blocks: &[PageBlock],
    listing: &JobListing<'_>,
) {
    for block in blocks {
        match block {
            PageBlock::Hero {
                title,
                subtitle,
                banner_url,
            } => {
                let style = banner_url
                    .as_deref()
                    .map(|url| format!(" style=\"background-image: url('{}')\"", escape_html(url)))
                    .unwrap_or_default();
                html.push_str(&format!(
                    "<section class=\"hero\"{style}><h1>{}</h1><p>{}</p></section>\n",
                    escape_html(title),
                    escape_html(subtitle)
                ));
            }
            PageBlock::About { heading, body } => {
                html.push_str(&format!(
                    "<section class=\"about\"><h2>{}</h2>",
                    escape_html(heading)
                ));
                for paragraph in body.split('\n').filter(|line| !line.trim().is_empty()) {
                    html.push_str(&format!("<p>{}</p>", escape_html(paragraph.trim())));
                }
                html.push_str("</section>\n");
            }
            PageBlock::Life {
                heading,
                images,
                placeholder_tiles,
            } => {
                html.push_str(&format!(
                    "<section class=\"life\"><h2>{}</h2><div class=\"gallery\">",
                    escape_html(heading)
                ));
                for image in images {
                    html.push_str(&format!(
                        "<img src=\"{}\" alt=\"Life at {}\">",
                        escape_html(image),
                        escape_html(&company.name)
                    ));
                }
                for _ in 0..*placeholder_tiles {
                    html.push_str("<div class=\"tile placeholder\"></div>");
                }
                html.push_str("</div></section>\n");
            }
            PageBlock::Team { heading, members } => {
                html.push_str(&format!(
                    "<section class=\"team\"><h2>{}</h2><ul>",
                    escape_html(heading)
                ));
                for member in members {
                    let photo = member
                        .photo_url
                        .as_deref()
                        .map(|url| format!("<img src=\"{}\" alt=\"\">", escape_html(url)))
                        .unwrap_or_default();
                    html.push_str(&format!(
                        "<li>{photo}<strong>{}</strong> <span>{}</span></li>",
                        escape_html(&member.name),
                        escape_html(&member.role)
                    ));
                }
                html.push_str("</ul></section>\n");
            }
            PageBlock::Values { heading, items } => {
                html.push_str(&format!(
                    "<section class=\"values\"><h2>{}</h2><ul>",
                    escape_html(heading)
                ));
                for item in items {
                    let description = item
                        .description
                        .as_deref()
                        .map(|text| format!("<p>{}</p>", escape_html(text)))
                        .unwrap_or_default();
                    html.push_str(&format!(
                        "<li><h3>{}</h3>{description}</li>",
                        escape_html(&item.title)
                    ));
                }
                html.push_str("</ul></section>\n");
            }
            PageBlock::JobList { heading } => push_job_list(html, heading, listing),
            PageBlock::Footer { tagline, links } => {
                html.push_str(&format!(
                    "<footer><p>{}</p><nav>",
                    escape_html(tagline)
                ));
                for link in links {
                    html.push_str(&format!(
                        "<a href=\"{}\">{}</a>",
                        escape_html(&link.url),
                        escape_html(&link.label)
                    ));
                }
                html.push_str("</nav></footer>\n");
            }
            PageBlock::Video { heading, source } => {
                html.push_str(&format!(
                    "<section class=\"video\"><h2>{}</h2>",
                    escape_html(heading)
                ));
                match source {
                    VideoSource::YouTube(embed) => html.push_str(&format!(
                        "<iframe src=\"{}\" title=\"{}\" allowfullscreen></iframe>",
                        escape_html(embed),
                        escape_html(heading)
                    )),
                    VideoSource::Link(url) => html.push_str(&format!(
                        "<video controls src=\"{}\"><a href=\"{}\">Watch video</a></video>",
                        escape_html(url),
                        escape_html(url)
                    )),
                }
                html.push_str("</section>\n");
            }
        }
    }
}

fn push_job_list(html: &mut String, heading: &str, listing: &JobListing<'_>) {
    html.push_str(&format!(
        "<main class=\"jobs\" id=\"open-roles\"><h2>{}</h2>\n",
        escape_html(heading)
    ));
    push_filter_form(html, listing);

    if !listing.location_links.is_empty() {
        html.push_str("<nav class=\"locations\">");
        for (location, href) in &listing.location_links {
            html.push_str(&format!(
                "<a href=\"{}\">{}</a>",
                escape_html(href),
                escape_html(location)
            ));
        }
        html.push_str("</nav>\n");
    }

    html.push_str("<div class=\"job-list\" role=\"list\">\n");
    if listing.jobs.is_empty() {
        html.push_str(&format!("<p class=\"empty\">{NO_MATCHING_JOBS}</p>\n"));
    } else {
        for job in &listing.jobs {
            push_job_card(html, job);
        }
    }
    html.push_str("</div></main>\n");
}

fn push_filter_form(html: &mut String, listing: &JobListing<'_>) {
    let criteria = &listing.criteria;
    html.push_str("<form class=\"filters\" method=\"get\">");
    push_select(
        html,
        "location",
        "All Locations",
        &listing.facets.locations,
        criteria.location.as_deref(),
    );
    push_select(
        html,
        "job_type",
        "All Types",
        &listing.facets.job_types,
        criteria.job_type.as_deref(),
    );
    push_select(
        html,
        "department",
        "All Departments",
        &listing.facets.departments,
        criteria.department.as_deref(),
    );
    html.push_str(&format!(
        "<input type=\"text\" name=\"search\" placeholder=\"Search job titles...\" value=\"{}\">",
        escape_html(criteria.search.as_deref().unwrap_or_default())
    ));
    html.push_str("<button type=\"submit\">Filter</button></form>\n");
}

fn push_select(
    html: &mut String,
    name: &str,
    all_label: &str,
    options: &[String],
    selected: Option<&str>,
) {
    html.push_str(&format!(
        "<select name=\"{name}\"><option value=\"\">{}</option>",
        escape_html(all_label)
    ));
    for option in options {
        let marker = if selected == Some(option.as_str()) {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            "<option value=\"{}\"{marker}>{}</option>",
            escape_html(option),
            escape_html(option)
        ));
    }
    html.push_str("</select>");
}

fn push_job_card(html: &mut String, job: &JobPosting) {
    html.push_str(&format!(
        "<article class=\"job-card\" aria-label=\"{} at {}\"><h3>{}</h3><p class=\"location\">{}</p>",
        escape_html(&job.title),
        escape_html(&job.location),
        escape_html(&job.title),
        escape_html(&job.location)
    ));
    html.push_str(&format!(
        "<span class=\"badge badge-{}\">{}</span><span class=\"department\">{}</span>",
        escape_html(&job.job_type),
        escape_html(&job.job_type),
        escape_html(&job.department)
    ));
    for detail in [&job.work_policy, &job.employment_type, &job.experience_level, &job.salary_range]
        .into_iter()
        .flatten()
    {
        html.push_str(&format!("<span class=\"detail\">{}</span>", escape_html(detail)));
    }
    html.push_str(&format!(
        "<a class=\"apply\" href=\"#\" aria-label=\"Apply for {}\">Apply</a></article>\n",
        escape_html(&job.title)
    ));
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobId;
    use crate::pages::composer::compose;
    use crate::pages::domain::{CompanyId, PageStatus, SeoMeta};
    use chrono::Utc;

    fn company() -> Company {
        let mut company = Company::new("acme", "Acme <Labs>", PageStatus::Published);
        company.page.seo_meta = Some(SeoMeta {
            title: Some("Work at Acme".to_string()),
            description: Some("Open roles".to_string()),
            keywords: None,
        });
        company
    }

    fn posting(title: &str) -> JobPosting {
        JobPosting {
            id: JobId(title.to_string()),
            company_id: CompanyId("c".to_string()),
            title: title.to_string(),
            location: "Berlin, Germany".to_string(),
            job_type: "full-time".to_string(),
            department: "Engineering".to_string(),
            work_policy: Some("Remote".to_string()),
            employment_type: None,
            experience_level: None,
            salary_range: Some("€70k - €90k".to_string()),
            job_slug: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn renders_seo_escaping_and_job_cards() {
        let company = company();
        let jobs = vec![posting("Senior Engineer")];
        let listing = JobListing::new(
            jobs.iter().collect(),
            JobFacets::collect(&jobs),
            JobCriteria::default(),
        );

        let html = render_page(&company, &compose(&company), &listing, RenderMode::Public);
        assert!(html.contains("<title>Work at Acme</title>"));
        assert!(html.contains("Acme &lt;Labs&gt;"));
        assert!(html.contains("Join our team"));
        assert!(html.contains("Senior Engineer"));
        assert!(html.contains("€70k - €90k"));
        assert!(!html.contains(PREVIEW_BANNER));
    }

    #[test]
    fn font_family_outside_font_characters_is_not_rendered() {
        let mut company = company();
        let listing = JobListing::new(Vec::new(), JobFacets::default(), JobCriteria::default());

        company.page.theme.font_family = Some("\"Open Sans\", sans-serif".to_string());
        let html = render_page(&company, &compose(&company), &listing, RenderMode::Public);
        assert!(html.contains("font-family: \"Open Sans\", sans-serif;"));

        company.page.theme.font_family = Some("x; } body { display: none".to_string());
        let html = render_page(&company, &compose(&company), &listing, RenderMode::Public);
        assert!(!html.contains("display: none"));
        assert!(!html.contains("font-family"));
    }

    #[test]
    fn empty_listing_shows_no_match_message_and_preview_banner() {
        let company = company();
        let listing = JobListing::new(Vec::new(), JobFacets::default(), JobCriteria::default());
        let html = render_page(&company, &compose(&company), &listing, RenderMode::Preview);
        assert!(html.contains(NO_MATCHING_JOBS));
        assert!(html.contains(PREVIEW_BANNER));
    }

    #[test]
    fn filter_form_marks_selected_options() {
        let company = company();
        let jobs = vec![posting("Senior Engineer")];
        let criteria = JobCriteria {
            location: Some("Berlin, Germany".to_string()),
            search: Some("eng".to_string()),
            ..JobCriteria::default()
        };
        let listing = JobListing::new(jobs.iter().collect(), JobFacets::collect(&jobs), criteria);
        let html = render_page(&company, &compose(&company), &listing, RenderMode::Public);
        assert!(html.contains("<option value=\"Berlin, Germany\" selected>"));
        assert!(html.contains("value=\"eng\""));
    }

    #[test]
    fn escape_html_covers_attribute_characters() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }
}
