use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{conversion_error, json_column, timestamp_column, to_json, SqliteStore};
use crate::pages::{Company, CompanyId, OwnerId, PageContent, PageStatus};
use crate::storage::{CompanyRepository, RepositoryError};

const COMPANY_COLUMNS: &str = "id, slug, name, status, owner_id, theme, logo_url, banner_url, \
     video_url, seo_meta, sections, created_at";

fn company_from_row(row: &Row<'_>) -> Result<Company, rusqlite::Error> {
    let status: String = row.get(3)?;
    let theme: String = row.get(5)?;
    let seo_meta: Option<String> = row.get(9)?;
    let sections: String = row.get(10)?;
    let created_at: String = row.get(11)?;

    Ok(Company {
        id: CompanyId(row.get(0)?),
        slug: row.get(1)?,
        name: row.get(2)?,
        status: PageStatus::parse(&status)
            .ok_or_else(|| conversion_error(3, format!("unknown page status '{status}'")))?,
        owner_id: row.get::<_, Option<String>>(4)?.map(OwnerId),
        created_at: timestamp_column(11, &created_at)?,
        page: PageContent {
            theme: json_column(5, &theme)?,
            logo_url: row.get(6)?,
            banner_url: row.get(7)?,
            video_url: row.get(8)?,
            seo_meta: seo_meta
                .as_deref()
                .map(|raw| json_column(9, raw))
                .transpose()?,
            sections: json_column(10, &sections)?,
        },
    })
}

fn query_one(
    conn: &Connection,
    column: &str,
    value: &str,
) -> Result<Option<Company>, rusqlite::Error> {
    conn.query_row(
        &format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE {column} = ?1"),
        params![value],
        company_from_row,
    )
    .optional()
}

/// JSON-encoded draft columns, in the order `write_page` binds them.
struct EncodedPage {
    theme: String,
    seo_meta: Option<String>,
    sections: String,
}

impl EncodedPage {
    fn encode(page: &PageContent) -> Result<Self, RepositoryError> {
        Ok(Self {
            theme: to_json(&page.theme)?,
            seo_meta: page.seo_meta.as_ref().map(to_json).transpose()?,
            sections: to_json(&page.sections)?,
        })
    }
}

impl SqliteStore {
    fn write_page(
        &self,
        id: &CompanyId,
        page: &PageContent,
        status: Option<PageStatus>,
    ) -> Result<Company, RepositoryError> {
        let encoded = EncodedPage::encode(page)?;
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE companies SET theme = ?2, logo_url = ?3, banner_url = ?4, video_url = ?5,
                 seo_meta = ?6, sections = ?7, status = COALESCE(?8, status)
                 WHERE id = ?1",
                params![
                    id.0,
                    encoded.theme,
                    page.logo_url,
                    page.banner_url,
                    page.video_url,
                    encoded.seo_meta,
                    encoded.sections,
                    status.map(PageStatus::label),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_one(conn, "id", &id.0)
        })?
        .ok_or(RepositoryError::NotFound)
    }
}

impl CompanyRepository for SqliteStore {
    fn insert_company(&self, company: Company) -> Result<Company, RepositoryError> {
        let encoded = EncodedPage::encode(&company.page)?;
        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO companies ({COMPANY_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                ),
                params![
                    company.id.0,
                    company.slug,
                    company.name,
                    company.status.label(),
                    company.owner_id.as_ref().map(|owner| owner.0.as_str()),
                    encoded.theme,
                    company.page.logo_url,
                    company.page.banner_url,
                    company.page.video_url,
                    encoded.seo_meta,
                    encoded.sections,
                    company.created_at.to_rfc3339(),
                ],
            )
        })?;
        Ok(company)
    }

    fn find_by_slug(&self, slug: &str) -> Result<Option<Company>, RepositoryError> {
        self.with_conn(|conn| query_one(conn, "slug", slug))
    }

    fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
        self.with_conn(|conn| query_one(conn, "id", &id.0))
    }

    fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<Company>, RepositoryError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COMPANY_COLUMNS} FROM companies WHERE owner_id = ?1 ORDER BY rowid"
            ))?;
            let rows = stmt.query_map(params![owner.0], company_from_row)?;
            rows.collect()
        })
    }

    fn save_page(&self, id: &CompanyId, page: &PageContent) -> Result<Company, RepositoryError> {
        self.write_page(id, page, None)
    }

    fn publish_page(
        &self,
        id: &CompanyId,
        page: &PageContent,
    ) -> Result<Company, RepositoryError> {
        self.write_page(id, page, Some(PageStatus::Published))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::{SectionKind, SeoMeta, Theme};
    use crate::pages::sections::{HeaderContent, Section, SectionContent};

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("store opens")
    }

    #[test]
    fn insert_then_find_round_trips_page_fields() {
        let store = store();
        let mut company = Company::new("acme", "Acme", PageStatus::Draft)
            .with_owner(OwnerId("user-1".to_string()));
        company.page.seo_meta = Some(SeoMeta {
            title: Some("Careers at Acme".to_string()),
            ..SeoMeta::default()
        });
        company.page.sections = vec![Section::new(SectionKind::Header, 0)];
        let inserted = store.insert_company(company.clone()).expect("insert");

        let found = store
            .find_by_slug("acme")
            .expect("query")
            .expect("company exists");
        assert_eq!(found.id, inserted.id);
        assert_eq!(found.page, company.page);
        assert_eq!(found.owner_id, company.owner_id);
        assert_eq!(
            found.created_at.timestamp(),
            company.created_at.timestamp()
        );
    }

    #[test]
    fn duplicate_slug_is_a_conflict() {
        let store = store();
        store
            .insert_company(Company::new("acme", "Acme", PageStatus::Draft))
            .expect("first insert");
        let error = store
            .insert_company(Company::new("acme", "Other", PageStatus::Draft))
            .expect_err("duplicate rejected");
        assert!(matches!(error, RepositoryError::Conflict));
    }

    #[test]
    fn missing_slug_is_none() {
        assert!(store().find_by_slug("nope").expect("query").is_none());
    }

    #[test]
    fn save_keeps_status_and_publish_sets_it() {
        let store = store();
        let company = store
            .insert_company(Company::new("acme", "Acme", PageStatus::Draft))
            .expect("insert");

        let mut page = company.page.clone();
        page.theme = Theme {
            primary_color: "#000".to_string(),
            ..Theme::default()
        };
        page.sections = vec![Section {
            content: SectionContent::Header(HeaderContent {
                title: Some("Hi".to_string()),
                subtitle: None,
            }),
            ..Section::new(SectionKind::Header, 0)
        }];

        let saved = store.save_page(&company.id, &page).expect("save");
        assert_eq!(saved.status, PageStatus::Draft);
        assert_eq!(saved.page, page);

        let published = store.publish_page(&company.id, &page).expect("publish");
        assert!(published.is_published());
    }

    #[test]
    fn saving_unknown_company_is_not_found() {
        let error = store()
            .save_page(&CompanyId("missing".to_string()), &PageContent::default())
            .expect_err("unknown id");
        assert!(matches!(error, RepositoryError::NotFound));
    }

    #[test]
    fn find_by_owner_lists_owned_companies() {
        let store = store();
        let owner = OwnerId("user-1".to_string());
        store
            .insert_company(Company::new("a", "A", PageStatus::Draft).with_owner(owner.clone()))
            .expect("insert a");
        store
            .insert_company(Company::new("b", "B", PageStatus::Draft))
            .expect("insert b");

        let owned = store.find_by_owner(&owner).expect("query");
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].slug, "a");
    }
}
