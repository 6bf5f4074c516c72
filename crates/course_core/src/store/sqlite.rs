//! SQLite-backed course store.
//!
//! # Responsibility
//! - Persist one row per course in the `courses` table.
//! - Express every conditional write as a single SQL statement so SQLite's
//!   statement atomicity covers the check and the write.
//!
//! # Invariants
//! - `insert_if_absent` relies on the `id` uniqueness constraint
//!   (`ON CONFLICT(id) DO NOTHING`), never on a prior lookup.
//! - `replace_if_exists` is one `UPDATE ... RETURNING`; a missing row yields
//!   no returned row and therefore `NotFound`.
//! - Read paths reject rows that cannot be decoded instead of masking them.

use super::course_store::{CourseStore, StoreError, StoreResult};
use super::{generate_course_id, GENERATED_ID_ATTEMPTS};
use crate::db::schema::{user_version, SCHEMA_VERSION};
use crate::model::course::Course;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COURSE_COLUMNS: &str = "id, name, language, level, description, created_date, last_modified_date";

/// SQLite-backed course store bound to one connection.
///
/// Concurrent writers each open their own connection to the same database
/// file and wrap it in their own store.
pub struct SqliteCourseStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseStore<'conn> {
    /// Constructs a store from a connection opened through `db::open_db*`.
    ///
    /// # Errors
    /// - `InvalidData` when the schema version is not the one this binary
    ///   writes, or the `courses` table is missing.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let version = user_version(conn)?;
        if version != SCHEMA_VERSION {
            return Err(StoreError::InvalidData(format!(
                "connection schema version {version} does not match {SCHEMA_VERSION}"
            )));
        }

        let has_table: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'courses');",
            [],
            |row| row.get(0),
        )?;
        if !has_table {
            return Err(StoreError::InvalidData(
                "required table `courses` is missing".to_string(),
            ));
        }

        Ok(Self { conn })
    }

    fn try_insert(&self, id: &str, course: &Course) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "INSERT INTO courses (
                id,
                name,
                language,
                level,
                description,
                created_date,
                last_modified_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO NOTHING;",
            params![
                id,
                course.name.as_str(),
                course.language.as_str(),
                course.level.as_str(),
                course.description.as_str(),
                course.created_date.map(to_micros),
                course.last_modified_date.map(to_micros),
            ],
        )?;
        Ok(changed > 0)
    }
}

impl CourseStore for SqliteCourseStore<'_> {
    fn insert_if_absent(&self, id: Option<&str>, course: &Course) -> StoreResult<Course> {
        let assigned = match id.filter(|id| !id.is_empty()) {
            Some(id) => {
                if !self.try_insert(id, course)? {
                    return Err(StoreError::Conflict(id.to_string()));
                }
                id.to_string()
            }
            None => {
                let mut assigned = None;
                for _ in 0..GENERATED_ID_ATTEMPTS {
                    let generated = generate_course_id();
                    if self.try_insert(&generated, course)? {
                        assigned = Some(generated);
                        break;
                    }
                }
                assigned.ok_or_else(|| {
                    StoreError::InvalidData("could not allocate a unique course id".to_string())
                })?
            }
        };

        let mut stored = course.clone();
        stored.id = assigned;
        Ok(stored)
    }

    fn replace_if_exists(&self, id: &str, course: &Course) -> StoreResult<Course> {
        let sql = format!(
            "UPDATE courses
             SET
                name = ?2,
                language = ?3,
                level = ?4,
                description = ?5,
                last_modified_date = CASE
                    WHEN ?6 IS NULL THEN last_modified_date
                    ELSE MAX(?6, COALESCE(last_modified_date, ?6), COALESCE(created_date, ?6))
                END
             WHERE id = ?1
             RETURNING {COURSE_COLUMNS};"
        );
        let replaced = self
            .conn
            .query_row(
                &sql,
                params![
                    id,
                    course.name.as_str(),
                    course.language.as_str(),
                    course.level.as_str(),
                    course.description.as_str(),
                    course.last_modified_date.map(to_micros),
                ],
                RawCourseRow::read,
            )
            .optional()?;

        match replaced {
            Some(row) => row.into_course(),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    fn get(&self, id: &str) -> StoreResult<Option<Course>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(RawCourseRow::read(row)?.into_course()?));
        }
        Ok(None)
    }

    fn list(&self) -> StoreResult<Vec<Course>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next()? {
            courses.push(RawCourseRow::read(row)?.into_course()?);
        }
        Ok(courses)
    }

    fn delete_if_exists(&self, id: &str) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM courses WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn count(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM courses;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative course count `{count}`")))
    }
}

struct RawCourseRow {
    id: String,
    name: String,
    language: String,
    level: String,
    description: String,
    created_date: Option<i64>,
    last_modified_date: Option<i64>,
}

impl RawCourseRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            language: row.get("language")?,
            level: row.get("level")?,
            description: row.get("description")?,
            created_date: row.get("created_date")?,
            last_modified_date: row.get("last_modified_date")?,
        })
    }

    fn into_course(self) -> StoreResult<Course> {
        if self.id.is_empty() {
            return Err(StoreError::InvalidData(
                "empty id in courses.id".to_string(),
            ));
        }
        Ok(Course {
            created_date: parse_micros(self.created_date, "created_date")?,
            last_modified_date: parse_micros(self.last_modified_date, "last_modified_date")?,
            id: self.id,
            name: self.name,
            language: self.language,
            level: self.level,
            description: self.description,
        })
    }
}

fn to_micros(value: DateTime<Utc>) -> i64 {
    value.timestamp_micros()
}

fn parse_micros(value: Option<i64>, column: &str) -> StoreResult<Option<DateTime<Utc>>> {
    match value {
        None => Ok(None),
        Some(micros) => DateTime::<Utc>::from_timestamp_micros(micros)
            .map(Some)
            .ok_or_else(|| {
                StoreError::InvalidData(format!(
                    "invalid timestamp `{micros}` in courses.{column}"
                ))
            }),
    }
}
