use crate::pages::{normalize_slug, Company, PageStatus};

/// Tenant derived from a job's location: one office per city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TenantSeed {
    pub(crate) slug: String,
    pub(crate) name: String,
}

impl TenantSeed {
    /// `"Berlin, Germany"` becomes slug `berlin`, name `Berlin Office`.
    pub(crate) fn from_location(location: &str) -> Option<Self> {
        let city = location
            .replace(['\u{feff}', '\u{200b}'], "")
            .split(',')
            .next()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        let slug = normalize_slug(&city);
        if slug.is_empty() {
            return None;
        }

        Some(Self {
            slug,
            name: format!("{city} Office"),
        })
    }

    /// Seeded tenants are published straight away with the default theme, no
    /// sections and no owner.
    pub(crate) fn into_company(self) -> Company {
        Company::new(self.slug, self.name, PageStatus::Published)
    }
}
