use crate::db::connection::Database;
use crate::domain::listing::{ListingKind, ListingRecord};
use crate::errors::ServerError;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row, ToSql};

const LISTING_COLUMNS: &str = r#"
    id,            -- 0
    title,         -- 1
    title_ar,      -- 2
    listing_kind,  -- 3
    price,         -- 4
    currency,      -- 5
    city,          -- 6
    latitude,      -- 7
    longitude,     -- 8
    images,        -- 9 (JSON text)
    listed_at      -- 10
"#;

pub const MAX_PAGE_SIZE: u32 = 200;

/// Filters for the public listing search. Every call returns a fresh snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub kind: Option<ListingKind>,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            search: None,
            kind: None,
            page: 1,
            page_size: 50,
        }
    }
}

impl ListingQuery {
    fn offset(&self) -> i64 {
        i64::from(self.page.max(1) - 1) * i64::from(self.limit())
    }

    fn limit(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// WHERE clause and its bound values, shared by the page and count queries.
    fn filter(&self) -> (String, Vec<Box<dyn ToSql>>) {
        let mut clause = String::from("WHERE is_published = 1");
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            clause.push_str(" AND (title LIKE ? OR title_ar LIKE ? OR city LIKE ?)");
            let pattern = format!("%{search}%");
            values.push(Box::new(pattern.clone()));
            values.push(Box::new(pattern.clone()));
            values.push(Box::new(pattern));
        }

        if let Some(kind) = self.kind {
            clause.push_str(" AND listing_kind = ?");
            values.push(Box::new(kind.as_db()));
        }

        (clause, values)
    }
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<ListingRecord> {
    let images_json: String = row.get(9)?;
    let images: Vec<String> = serde_json::from_str(&images_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;

    Ok(ListingRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        title_ar: row.get(2)?,
        listing_kind: row.get(3)?,
        price: row.get(4)?,
        currency: row.get(5)?,
        city: row.get(6)?,
        latitude: row.get(7)?,
        longitude: row.get(8)?,
        images,
        listed_at: row.get(10)?,
    })
}

/// One page of published listings, newest first.
pub fn query_listings(db: &Database, query: &ListingQuery) -> Result<Vec<ListingRecord>, ServerError> {
    let (clause, mut values) = query.filter();
    values.push(Box::new(i64::from(query.limit())));
    values.push(Box::new(query.offset()));

    let sql = format!(
        "SELECT {LISTING_COLUMNS} FROM listings {clause} ORDER BY listed_at DESC, id DESC LIMIT ? OFFSET ?"
    );

    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&sql)?;
        let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let rows = stmt.query_map(params.as_slice(), listing_from_row)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    })
}

/// Number of listings matching the filters, across all pages.
pub fn count_listings(db: &Database, query: &ListingQuery) -> Result<i64, ServerError> {
    let (clause, values) = query.filter();
    let sql = format!("SELECT COUNT(*) FROM listings {clause}");

    db.with_conn(|conn| {
        let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        Ok(conn.query_row(&sql, params.as_slice(), |r| r.get(0))?)
    })
}

pub fn get_listing(db: &Database, id: i64) -> Result<Option<ListingRecord>, ServerError> {
    let sql = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = ? AND is_published = 1");

    db.with_conn(|conn| Ok(conn.query_row(&sql, params![id], listing_from_row).optional()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::{init_db, seed_db};
    use std::path::Path;

    fn seeded_db(dir: &tempfile::TempDir) -> Database {
        let db = Database::new(dir.path().join("listings.sqlite3"));
        init_db(&db, Path::new("sql/schema.sql")).expect("schema");
        seed_db(&db, Path::new("sql/seed.sql")).expect("seed");
        db
    }

    #[test]
    fn newest_first_with_paging() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir);

        let q = ListingQuery {
            page_size: 3,
            ..ListingQuery::default()
        };
        let first: Vec<i64> = query_listings(&db, &q).unwrap().iter().map(|l| l.id).collect();
        assert_eq!(first, vec![8, 7, 5]);

        let second = ListingQuery { page: 2, ..q.clone() };
        let ids: Vec<i64> = query_listings(&db, &second).unwrap().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        assert_eq!(count_listings(&db, &q).unwrap(), 9);
    }

    #[test]
    fn filters_by_kind_and_search() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir);

        let rentals = ListingQuery {
            kind: Some(ListingKind::ForRent),
            ..ListingQuery::default()
        };
        let rows = query_listings(&db, &rentals).unwrap();
        assert!(rows.iter().all(|l| l.kind() == ListingKind::ForRent));
        assert_eq!(count_listings(&db, &rentals).unwrap(), 4);

        let jeddah = ListingQuery {
            search: Some("jeddah".into()),
            ..ListingQuery::default()
        };
        let ids: Vec<i64> = query_listings(&db, &jeddah).unwrap().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![7]);

        let arabic = ListingQuery {
            search: Some("العليا".into()),
            ..ListingQuery::default()
        };
        assert_eq!(count_listings(&db, &arabic).unwrap(), 3);
    }

    #[test]
    fn coordinates_and_images_round_trip_as_stored() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir);

        let villa = get_listing(&db, 1).unwrap().unwrap();
        assert_eq!(villa.latitude.as_deref(), Some("24.7136"));
        assert_eq!(villa.images.len(), 2);

        let off_plan = get_listing(&db, 8).unwrap().unwrap();
        assert!(off_plan.latitude.is_none());

        assert!(get_listing(&db, 404).unwrap().is_none());
    }

    #[test]
    fn seeding_skips_a_populated_table() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir);
        assert!(!seed_db(&db, Path::new("sql/seed.sql")).unwrap());
    }
}
