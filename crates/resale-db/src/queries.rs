use std::str::FromStr;

use crate::Database;
use crate::models::{
    AdminRow, BulkItemOutcome, GadgetRequestRow, ListingFilter, ListingPatch, ListingRow,
    NewListing, QuestionRow, SettingsRow,
};
use anyhow::Result;
use resale_types::models::{ListingStatus, ParseEnumError};
use rusqlite::types::{ToSql, Type};
use rusqlite::{Connection, Row};
use tracing::{debug, warn};

const LISTING_COLUMNS: &str = "id, name, gadget_type, condition, description, seller_price, \
     listing_price, seller_contact_info, photo_url, status, created_at";

impl Database {
    // -- Admins --

    pub fn create_admin(&self, username: &str, password_hash: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO admins (username, hashed_password) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminRow>> {
        self.with_conn(|conn| query_admin_by_username(conn, username))
    }

    // -- Listings --

    pub fn insert_listing(&self, listing: &NewListing) -> Result<ListingRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO gadgets (name, gadget_type, condition, description, seller_price,
                                      listing_price, seller_contact_info, photo_url, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    listing.name,
                    listing.gadget_type.as_str(),
                    listing.condition.as_str(),
                    listing.description,
                    listing.seller_price,
                    listing.listing_price,
                    listing.seller_contact_info,
                    listing.photo_url,
                    listing.status.as_str(),
                ],
            )?;
            let id = conn.last_insert_rowid();
            query_listing(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("Listing {} vanished after insert", id))
        })
    }

    pub fn get_listing(&self, id: i64) -> Result<Option<ListingRow>> {
        self.with_conn(|conn| query_listing(conn, id))
    }

    /// All listings in one status, newest first.
    pub fn listings_by_status(&self, status: ListingStatus) -> Result<Vec<ListingRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM gadgets WHERE status = ?1 ORDER BY created_at DESC, id DESC",
                LISTING_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([status.as_str()], listing_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Storefront query: listings in the filter's statuses (only `available`
    /// when none are given), filtered, newest first.
    pub fn public_listings(&self, filter: &ListingFilter) -> Result<Vec<ListingRow>> {
        self.with_conn(|conn| {
            let statuses: &[ListingStatus] = if filter.statuses.is_empty() {
                &[ListingStatus::Available]
            } else {
                &filter.statuses
            };

            let mut params: Vec<Box<dyn ToSql>> = Vec::new();
            let mut placeholders = Vec::with_capacity(statuses.len());
            for status in statuses {
                params.push(Box::new(status.as_str()));
                placeholders.push(format!("?{}", params.len()));
            }
            let mut sql = format!(
                "SELECT {} FROM gadgets WHERE status IN ({})",
                LISTING_COLUMNS,
                placeholders.join(", ")
            );

            if let Some(gadget_type) = filter.gadget_type {
                params.push(Box::new(gadget_type.as_str()));
                sql.push_str(&format!(" AND gadget_type = ?{}", params.len()));
            }
            if let Some(condition) = filter.condition {
                params.push(Box::new(condition.as_str()));
                sql.push_str(&format!(" AND condition = ?{}", params.len()));
            }
            if let Some(min) = filter.min_price {
                params.push(Box::new(min));
                sql.push_str(&format!(
                    " AND COALESCE(listing_price, seller_price) >= ?{}",
                    params.len()
                ));
            }
            if let Some(max) = filter.max_price {
                params.push(Box::new(max));
                sql.push_str(&format!(
                    " AND COALESCE(listing_price, seller_price) <= ?{}",
                    params.len()
                ));
            }
            sql.push_str(" ORDER BY created_at DESC, id DESC");

            let mut stmt = conn.prepare(&sql)?;
            let refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
            let rows = stmt
                .query_map(refs.as_slice(), listing_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Apply a partial update. Returns `None` if the listing does not exist.
    /// Status is never touched here.
    pub fn update_listing(&self, id: i64, patch: &ListingPatch) -> Result<Option<ListingRow>> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE gadgets SET
                    name          = COALESCE(?1, name),
                    gadget_type   = COALESCE(?2, gadget_type),
                    condition     = COALESCE(?3, condition),
                    description   = COALESCE(?4, description),
                    seller_price  = COALESCE(?5, seller_price),
                    listing_price = COALESCE(?6, listing_price)
                 WHERE id = ?7",
                rusqlite::params![
                    patch.name,
                    patch.gadget_type.map(|t| t.as_str()),
                    patch.condition.map(|c| c.as_str()),
                    patch.description,
                    patch.seller_price,
                    patch.listing_price,
                    id,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_listing(conn, id)
        })
    }

    /// Overwrite a listing's status. Returns `None` if the listing does not exist.
    pub fn set_listing_status(&self, id: i64, status: ListingStatus) -> Result<Option<ListingRow>> {
        self.with_conn_mut(|conn| {
            if write_status(conn, id, status)? == 0 {
                return Ok(None);
            }
            debug!("Listing {} -> {}", id, status);
            query_listing(conn, id)
        })
    }

    /// Apply one status to many listings, in order. Each id is written on its
    /// own; a missing id or a failed write is reported for that id and the
    /// rest of the batch carries on.
    pub fn bulk_set_status(
        &self,
        ids: &[i64],
        status: ListingStatus,
    ) -> Result<Vec<(i64, BulkItemOutcome)>> {
        self.with_conn_mut(|conn| {
            let outcomes = ids
                .iter()
                .map(|&id| {
                    let outcome = match write_status(conn, id, status) {
                        Ok(0) => BulkItemOutcome::NotFound,
                        Ok(_) => BulkItemOutcome::Updated,
                        Err(e) => {
                            warn!("Bulk status update failed for listing {}: {}", id, e);
                            BulkItemOutcome::Failed(e.to_string())
                        }
                    };
                    (id, outcome)
                })
                .collect();
            Ok(outcomes)
        })
    }

    // -- Questions --

    /// Store a buyer question. Returns `None` when `listing_id` is given but
    /// does not reference a listing.
    pub fn insert_question(
        &self,
        listing_id: Option<i64>,
        question: &str,
        contact_info: &str,
    ) -> Result<Option<QuestionRow>> {
        self.with_conn_mut(|conn| {
            if let Some(lid) = listing_id {
                if query_listing(conn, lid)?.is_none() {
                    return Ok(None);
                }
            }
            conn.execute(
                "INSERT INTO questions (listing_id, question, contact_info) VALUES (?1, ?2, ?3)",
                rusqlite::params![listing_id, question, contact_info],
            )?;
            let id = conn.last_insert_rowid();
            let row = conn.query_row(
                "SELECT id, listing_id, question, contact_info, created_at FROM questions WHERE id = ?1",
                [id],
                question_from_row,
            )?;
            Ok(Some(row))
        })
    }

    pub fn list_questions(&self) -> Result<Vec<QuestionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, listing_id, question, contact_info, created_at
                 FROM questions ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([], question_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Hard delete. Returns false if no question had this id.
    pub fn delete_question(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute("DELETE FROM questions WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }

    // -- Gadget requests --

    pub fn insert_gadget_request(
        &self,
        gadget_details: &str,
        contact_info: &str,
    ) -> Result<GadgetRequestRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO gadget_requests (gadget_details, contact_info) VALUES (?1, ?2)",
                (gadget_details, contact_info),
            )?;
            let id = conn.last_insert_rowid();
            let row = conn.query_row(
                "SELECT id, gadget_details, contact_info, is_resolved, created_at
                 FROM gadget_requests WHERE id = ?1",
                [id],
                gadget_request_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn list_gadget_requests(&self) -> Result<Vec<GadgetRequestRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, gadget_details, contact_info, is_resolved, created_at
                 FROM gadget_requests ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([], gadget_request_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Settings --

    pub fn get_settings(&self) -> Result<SettingsRow> {
        self.with_conn(|conn| {
            let row = conn
                .query_row("SELECT whatsapp_number FROM settings WHERE id = 1", [], |row| {
                    Ok(SettingsRow {
                        whatsapp_number: row.get(0)?,
                    })
                })
                .optional()?;
            Ok(row.unwrap_or_default())
        })
    }

    pub fn replace_settings(&self, whatsapp_number: &str) -> Result<SettingsRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO settings (id, whatsapp_number) VALUES (1, ?1)
                 ON CONFLICT(id) DO UPDATE SET whatsapp_number = excluded.whatsapp_number",
                [whatsapp_number],
            )?;
            Ok(SettingsRow {
                whatsapp_number: Some(whatsapp_number.to_string()),
            })
        })
    }
}

fn write_status(conn: &Connection, id: i64, status: ListingStatus) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE gadgets SET status = ?1 WHERE id = ?2",
        rusqlite::params![status.as_str(), id],
    )
}

fn query_admin_by_username(conn: &Connection, username: &str) -> Result<Option<AdminRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, hashed_password, created_at FROM admins WHERE username = ?1",
    )?;

    let row = stmt
        .query_row([username], |row| {
            Ok(AdminRow {
                id: row.get(0)?,
                username: row.get(1)?,
                hashed_password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_listing(conn: &Connection, id: i64) -> Result<Option<ListingRow>> {
    let sql = format!("SELECT {} FROM gadgets WHERE id = ?1", LISTING_COLUMNS);
    let row = conn.query_row(&sql, [id], listing_from_row).optional()?;
    Ok(row)
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<ListingRow> {
    Ok(ListingRow {
        id: row.get(0)?,
        name: row.get(1)?,
        gadget_type: enum_column(row, 2)?,
        condition: enum_column(row, 3)?,
        description: row.get(4)?,
        seller_price: row.get(5)?,
        listing_price: row.get(6)?,
        seller_contact_info: row.get(7)?,
        photo_url: row.get(8)?,
        status: enum_column(row, 9)?,
        created_at: row.get(10)?,
    })
}

fn question_from_row(row: &Row<'_>) -> rusqlite::Result<QuestionRow> {
    Ok(QuestionRow {
        id: row.get(0)?,
        listing_id: row.get(1)?,
        question: row.get(2)?,
        contact_info: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn gadget_request_from_row(row: &Row<'_>) -> rusqlite::Result<GadgetRequestRow> {
    Ok(GadgetRequestRow {
        id: row.get(0)?,
        gadget_details: row.get(1)?,
        contact_info: row.get(2)?,
        is_resolved: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Read a TEXT column holding one of the shared enums.
fn enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resale_types::models::{GadgetCondition, GadgetType};

    fn listing(name: &str, seller_price: f64, status: ListingStatus) -> NewListing {
        NewListing {
            name: name.to_string(),
            gadget_type: GadgetType::Phone,
            condition: GadgetCondition::Used,
            description: "Works fine".to_string(),
            seller_price,
            listing_price: None,
            seller_contact_info: "+15550100".to_string(),
            photo_url: "/uploads/a.jpg".to_string(),
            status,
        }
    }

    fn question_count(db: &Database) -> i64 {
        db.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM questions", [], |r| r.get(0))?)
        })
        .unwrap()
    }

    #[test]
    fn inserted_listing_keeps_requested_status() {
        let db = Database::open_in_memory().unwrap();
        let pending = db.insert_listing(&listing("Pixel", 200.0, ListingStatus::Pending)).unwrap();
        let available = db
            .insert_listing(&listing("ThinkPad", 450.0, ListingStatus::Available))
            .unwrap();

        assert_eq!(pending.status, ListingStatus::Pending);
        assert_eq!(available.status, ListingStatus::Available);
        assert!(!pending.created_at.is_empty());
    }

    #[test]
    fn status_change_on_missing_listing_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.set_listing_status(42, ListingStatus::Sold).unwrap().is_none());
    }

    #[test]
    fn any_status_may_follow_any_other() {
        let db = Database::open_in_memory().unwrap();
        let row = db.insert_listing(&listing("Pixel", 200.0, ListingStatus::Pending)).unwrap();

        for status in [
            ListingStatus::Deleted,
            ListingStatus::Available,
            ListingStatus::Sold,
            ListingStatus::Pending,
        ] {
            let updated = db.set_listing_status(row.id, status).unwrap().unwrap();
            assert_eq!(updated.status, status);
        }
    }

    #[test]
    fn bulk_update_isolates_missing_ids() {
        let db = Database::open_in_memory().unwrap();
        let a = db.insert_listing(&listing("A", 10.0, ListingStatus::Pending)).unwrap();
        let b = db.insert_listing(&listing("B", 20.0, ListingStatus::Pending)).unwrap();

        let outcomes = db.bulk_set_status(&[a.id, 999, b.id], ListingStatus::Sold).unwrap();

        assert_eq!(
            outcomes,
            vec![
                (a.id, BulkItemOutcome::Updated),
                (999, BulkItemOutcome::NotFound),
                (b.id, BulkItemOutcome::Updated),
            ]
        );
        assert_eq!(db.get_listing(a.id).unwrap().unwrap().status, ListingStatus::Sold);
        assert_eq!(db.get_listing(b.id).unwrap().unwrap().status, ListingStatus::Sold);
    }

    #[test]
    fn public_listings_hide_everything_but_available() {
        let db = Database::open_in_memory().unwrap();
        for status in ListingStatus::ALL {
            db.insert_listing(&listing(status.as_str(), 100.0, status)).unwrap();
        }

        let rows = db.public_listings(&ListingFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ListingStatus::Available);
    }

    #[test]
    fn approved_statuses_include_sold() {
        let db = Database::open_in_memory().unwrap();
        let mut ids = Vec::new();
        for status in ListingStatus::ALL {
            ids.push(db.insert_listing(&listing(status.as_str(), 100.0, status)).unwrap().id);
        }

        let filter = ListingFilter {
            statuses: vec![ListingStatus::Available, ListingStatus::Sold],
            ..Default::default()
        };
        let rows = db.public_listings(&filter).unwrap();
        let statuses: Vec<_> = rows.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![ListingStatus::Sold, ListingStatus::Available]);
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![ids[2], ids[1]]);
    }

    #[test]
    fn public_listings_filter_on_effective_price_inclusive() {
        let db = Database::open_in_memory().unwrap();
        let cheap = db.insert_listing(&listing("cheap", 100.0, ListingStatus::Available)).unwrap();
        let mut priced = listing("priced", 100.0, ListingStatus::Available);
        priced.listing_price = Some(300.0);
        let priced = db.insert_listing(&priced).unwrap();

        let filter = ListingFilter {
            min_price: Some(300.0),
            max_price: Some(300.0),
            ..Default::default()
        };
        let rows = db.public_listings(&filter).unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![priced.id]);

        let filter = ListingFilter {
            max_price: Some(100.0),
            ..Default::default()
        };
        let rows = db.public_listings(&filter).unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![cheap.id]);
    }

    #[test]
    fn public_listings_filter_type_and_condition_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_listing(&listing("old phone", 50.0, ListingStatus::Available)).unwrap();
        let mut laptop = listing("laptop", 500.0, ListingStatus::Available);
        laptop.gadget_type = GadgetType::Laptop;
        db.insert_listing(&laptop).unwrap();
        let mut boxed = listing("new phone", 60.0, ListingStatus::Available);
        boxed.condition = GadgetCondition::OpenBox;
        let second = db.insert_listing(&boxed).unwrap();

        let phones = db
            .public_listings(&ListingFilter {
                gadget_type: Some(GadgetType::Phone),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(phones.iter().map(|r| r.id).collect::<Vec<_>>(), vec![second.id, first.id]);

        let open_box = db
            .public_listings(&ListingFilter {
                condition: Some(GadgetCondition::OpenBox),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(open_box.len(), 1);
        assert_eq!(open_box[0].id, second.id);
    }

    #[test]
    fn patch_updates_only_given_fields() {
        let db = Database::open_in_memory().unwrap();
        let row = db.insert_listing(&listing("Pixel", 200.0, ListingStatus::Pending)).unwrap();

        let patch = ListingPatch {
            listing_price: Some(250.0),
            description: Some("Mint".to_string()),
            ..Default::default()
        };
        let updated = db.update_listing(row.id, &patch).unwrap().unwrap();

        assert_eq!(updated.name, "Pixel");
        assert_eq!(updated.description, "Mint");
        assert_eq!(updated.listing_price, Some(250.0));
        assert_eq!(updated.effective_price(), 250.0);
        assert_eq!(updated.status, ListingStatus::Pending);

        assert!(db.update_listing(777, &patch).unwrap().is_none());
    }

    #[test]
    fn deleting_missing_question_changes_nothing() {
        let db = Database::open_in_memory().unwrap();
        db.insert_question(None, "Is it unlocked?", "buyer@example.com").unwrap();
        assert_eq!(question_count(&db), 1);

        assert!(!db.delete_question(12345).unwrap());
        assert_eq!(question_count(&db), 1);
    }

    #[test]
    fn question_for_unknown_listing_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.insert_question(Some(8), "Still available?", "b@x").unwrap().is_none());
        assert_eq!(question_count(&db), 0);

        let row = db.insert_listing(&listing("Pixel", 200.0, ListingStatus::Available)).unwrap();
        let q = db.insert_question(Some(row.id), "Still available?", "b@x").unwrap().unwrap();
        assert_eq!(q.listing_id, Some(row.id));
        assert!(db.delete_question(q.id).unwrap());
        assert_eq!(question_count(&db), 0);
    }

    #[test]
    fn gadget_requests_start_unresolved() {
        let db = Database::open_in_memory().unwrap();
        let row = db.insert_gadget_request("iPhone 15, 256GB", "+15550199").unwrap();
        assert!(!row.is_resolved);
        assert_eq!(db.list_gadget_requests().unwrap().len(), 1);
    }

    #[test]
    fn settings_are_replaced_in_place() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_settings().unwrap().whatsapp_number, None);

        db.replace_settings("+15550001").unwrap();
        db.replace_settings("+15550002").unwrap();

        assert_eq!(db.get_settings().unwrap().whatsapp_number.as_deref(), Some("+15550002"));
        let rows: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM settings", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn admin_usernames_are_unique() {
        let db = Database::open_in_memory().unwrap();
        db.create_admin("root", "$argon2id$fake").unwrap();
        assert!(db.create_admin("root", "$argon2id$other").is_err());

        let admin = db.get_admin_by_username("root").unwrap().unwrap();
        assert_eq!(admin.hashed_password, "$argon2id$fake");
        assert!(db.get_admin_by_username("nobody").unwrap().is_none());
    }
}
