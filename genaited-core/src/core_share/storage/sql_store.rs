//! Pooled SQLite store for tutors, groups, and memberships

use std::path::Path;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OpenFlags, OptionalExtension, Row};
use uuid::Uuid;

use super::super::group::StudyGroup;
use super::super::ledger::MembershipLedger;
use super::super::membership::{AddMemberOutcome, MemberRole, MembershipRecord, ResourceKind};
use super::super::passcode::Passcode;
use super::super::registry::ResourceRegistry;
use super::super::tutor::{TutorCategory, TutorConfig};
use super::super::types::{GroupId, Timestamp, TutorId, UserId};
use super::{migrations, ShareStore, StorageError};
use crate::config::StorageConfig;

const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed store implementing the registry, ledger, and resource
/// persistence
///
/// Cloning shares the connection pool.
#[derive(Clone)]
pub struct ShareSqlStore {
    pool: Pool<SqliteConnectionManager>,
}

impl ShareSqlStore {
    /// Create a store over an existing connection pool, running migrations
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Result<Self, StorageError> {
        migrations::migrate(&pool)?;
        Ok(Self { pool })
    }

    /// Open a file-backed store with default pool settings
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Self::open_with(path, DEFAULT_POOL_SIZE, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open a file-backed store with explicit pool size and busy timeout
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        pool_size: u32,
        busy_timeout: Duration,
    ) -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::file(path.as_ref())
            .with_init(move |conn| conn.busy_timeout(busy_timeout));
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e| StorageError::Pool(e.to_string()))?;
        Self::new(pool)
    }

    /// Open an in-memory store
    ///
    /// Each store gets its own named shared-cache database so that every
    /// pooled connection sees the same tables. A plain `:memory:` manager
    /// would give each connection a private, empty database.
    pub fn memory() -> Result<Self, StorageError> {
        Self::memory_with(DEFAULT_POOL_SIZE)
    }

    fn memory_with(pool_size: u32) -> Result<Self, StorageError> {
        let name = format!(
            "file:share-{}?mode=memory&cache=shared",
            Uuid::new_v4().simple()
        );
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let manager = SqliteConnectionManager::file(&name).with_flags(flags);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e| StorageError::Pool(e.to_string()))?;
        Self::new(pool)
    }

    /// Open the store described by the configuration
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        match &config.path {
            Some(path) => Self::open_with(path, config.pool_size, config.busy_timeout),
            None => Self::memory_with(config.pool_size),
        }
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StorageError> {
        self.pool.get().map_err(|e| StorageError::Pool(e.to_string()))
    }
}

/// Map an insert failure, treating a constraint hit as a passcode collision
///
/// The only realistic constraint violation on these inserts is the unique
/// passcode index; ids are fresh uuids.
fn map_insert_err(err: rusqlite::Error) -> StorageError {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        if e.code == rusqlite::ErrorCode::ConstraintViolation {
            return StorageError::DuplicatePasscode;
        }
    }
    StorageError::Sqlite(err)
}

fn tutor_from_row(row: &Row<'_>) -> rusqlite::Result<TutorConfig> {
    let category_str: String = row.get(5)?;
    let category = match category_str.as_str() {
        "Curriculum" => TutorCategory::Curriculum,
        "Teaching" => TutorCategory::Teaching,
        "Research" => TutorCategory::Research,
        _ => TutorCategory::General,
    };

    Ok(TutorConfig {
        id: TutorId::new(row.get(0)?),
        owner_id: UserId::new(row.get(1)?),
        name: row.get(2)?,
        description: row.get(3)?,
        instructions: row.get(4)?,
        category,
        icon: row.get(6)?,
        is_public: row.get::<_, i64>(7)? != 0,
        passcode: row.get::<_, Option<String>>(8)?.map(Passcode::from_stored),
        created_at: Timestamp::from_millis(row.get::<_, i64>(9)?.max(0) as u64),
        updated_at: Timestamp::from_millis(row.get::<_, i64>(10)?.max(0) as u64),
    })
}

const TUTOR_COLUMNS: &str = "id, owner_id, name, description, instructions, category, icon, \
                             is_public, passcode, created_at, updated_at";

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<StudyGroup> {
    Ok(StudyGroup {
        id: GroupId::new(row.get(0)?),
        owner_id: UserId::new(row.get(1)?),
        name: row.get(2)?,
        description: row.get(3)?,
        institution: row.get(4)?,
        program: row.get(5)?,
        year: row.get::<_, Option<i64>>(6)?.map(|y| y.clamp(0, u8::MAX as i64) as u8),
        semester: row.get::<_, Option<i64>>(7)?.map(|s| s.clamp(0, u8::MAX as i64) as u8),
        passcode: Passcode::from_stored(row.get(8)?),
        created_at: Timestamp::from_millis(row.get::<_, i64>(9)?.max(0) as u64),
        updated_at: Timestamp::from_millis(row.get::<_, i64>(10)?.max(0) as u64),
    })
}

const GROUP_COLUMNS: &str = "id, owner_id, name, description, institution, program, year, \
                             semester, passcode, created_at, updated_at";

fn membership_from_row(row: &Row<'_>) -> rusqlite::Result<MembershipRecord> {
    let kind_str: String = row.get(0)?;
    let kind = match kind_str.as_str() {
        "Tutor" => ResourceKind::Tutor,
        _ => ResourceKind::Group,
    };
    let role_str: String = row.get(3)?;
    let role = match role_str.as_str() {
        "Admin" => MemberRole::Admin,
        _ => MemberRole::Member,
    };

    Ok(MembershipRecord {
        resource_kind: kind,
        resource_id: row.get(1)?,
        user_id: UserId::new(row.get(2)?),
        role,
        joined_at: Timestamp::from_millis(row.get::<_, i64>(4)?.max(0) as u64),
    })
}

impl ResourceRegistry for ShareSqlStore {
    fn find_tutor_by_code(&self, code: &Passcode) -> Result<Option<TutorConfig>, StorageError> {
        let conn = self.conn()?;
        let tutor = conn
            .query_row(
                &format!("SELECT {TUTOR_COLUMNS} FROM tutor_configs WHERE passcode = ?"),
                params![code.as_str()],
                tutor_from_row,
            )
            .optional()?;
        Ok(tutor)
    }

    fn find_group_by_code(&self, code: &Passcode) -> Result<Option<StudyGroup>, StorageError> {
        let conn = self.conn()?;
        let group = conn
            .query_row(
                &format!("SELECT {GROUP_COLUMNS} FROM study_groups WHERE passcode = ?"),
                params![code.as_str()],
                group_from_row,
            )
            .optional()?;
        Ok(group)
    }
}

impl MembershipLedger for ShareSqlStore {
    fn membership(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        user_id: &UserId,
    ) -> Result<Option<MembershipRecord>, StorageError> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                "SELECT resource_kind, resource_id, user_id, role, joined_at
                 FROM memberships
                 WHERE resource_kind = ? AND resource_id = ? AND user_id = ?",
                params![kind.as_str(), resource_id, user_id.as_str()],
                membership_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn add_member_if_absent(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        user_id: &UserId,
        role: MemberRole,
    ) -> Result<AddMemberOutcome, StorageError> {
        let conn = self.conn()?;

        // The primary key on (resource_kind, resource_id, user_id) makes
        // this the atomic check-then-insert; 0 changed rows means the
        // triple already existed.
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO memberships (resource_kind, resource_id, user_id, role, joined_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                kind.as_str(),
                resource_id,
                user_id.as_str(),
                role.as_str(),
                Timestamp::now().as_millis() as i64,
            ],
        )?;

        Ok(if inserted == 0 {
            AddMemberOutcome::AlreadyMember
        } else {
            AddMemberOutcome::Inserted
        })
    }

    fn list_members(
        &self,
        kind: ResourceKind,
        resource_id: &str,
    ) -> Result<Vec<MembershipRecord>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT resource_kind, resource_id, user_id, role, joined_at
             FROM memberships
             WHERE resource_kind = ? AND resource_id = ?
             ORDER BY joined_at",
        )?;

        let members = stmt
            .query_map(params![kind.as_str(), resource_id], membership_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(members)
    }

    fn remove_member(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        user_id: &UserId,
    ) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM memberships
             WHERE resource_kind = ? AND resource_id = ? AND user_id = ?",
            params![kind.as_str(), resource_id, user_id.as_str()],
        )?;
        Ok(removed > 0)
    }
}

impl ShareStore for ShareSqlStore {
    fn insert_tutor(&self, tutor: &TutorConfig) -> Result<(), StorageError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO tutor_configs
                 (id, owner_id, name, description, instructions, category, icon, is_public, passcode, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                tutor.id.as_str(),
                tutor.owner_id.as_str(),
                &tutor.name,
                &tutor.description,
                &tutor.instructions,
                tutor.category.as_str(),
                &tutor.icon,
                tutor.is_public as i64,
                tutor.passcode.as_ref().map(|c| c.as_str()),
                tutor.created_at.as_millis() as i64,
                tutor.updated_at.as_millis() as i64,
            ],
        )
        .map_err(map_insert_err)?;

        Ok(())
    }

    fn insert_group(&self, group: &StudyGroup) -> Result<(), StorageError> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO study_groups
                 (id, owner_id, name, description, institution, program, year, semester, passcode, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                group.id.as_str(),
                group.owner_id.as_str(),
                &group.name,
                &group.description,
                &group.institution,
                &group.program,
                group.year.map(|y| y as i64),
                group.semester.map(|s| s as i64),
                group.passcode.as_str(),
                group.created_at.as_millis() as i64,
                group.updated_at.as_millis() as i64,
            ],
        )
        .map_err(map_insert_err)?;

        // The creator joins as admin in the same transaction so a group can
        // never exist without its first member.
        tx.execute(
            "INSERT INTO memberships (resource_kind, resource_id, user_id, role, joined_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                ResourceKind::Group.as_str(),
                group.id.as_str(),
                group.owner_id.as_str(),
                MemberRole::Admin.as_str(),
                group.created_at.as_millis() as i64,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn get_tutor(&self, id: &TutorId) -> Result<Option<TutorConfig>, StorageError> {
        let conn = self.conn()?;
        let tutor = conn
            .query_row(
                &format!("SELECT {TUTOR_COLUMNS} FROM tutor_configs WHERE id = ?"),
                params![id.as_str()],
                tutor_from_row,
            )
            .optional()?;
        Ok(tutor)
    }

    fn get_group(&self, id: &GroupId) -> Result<Option<StudyGroup>, StorageError> {
        let conn = self.conn()?;
        let group = conn
            .query_row(
                &format!("SELECT {GROUP_COLUMNS} FROM study_groups WHERE id = ?"),
                params![id.as_str()],
                group_from_row,
            )
            .optional()?;
        Ok(group)
    }

    fn list_tutors_visible_to(&self, user_id: &UserId) -> Result<Vec<TutorConfig>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TUTOR_COLUMNS} FROM tutor_configs
             WHERE owner_id = ?1
                OR is_public = 1
                OR id IN (SELECT resource_id FROM memberships
                          WHERE resource_kind = 'Tutor' AND user_id = ?1)
             ORDER BY created_at DESC"
        ))?;

        let tutors = stmt
            .query_map(params![user_id.as_str()], tutor_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tutors)
    }

    fn list_groups_for_member(&self, user_id: &UserId) -> Result<Vec<StudyGroup>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {GROUP_COLUMNS} FROM study_groups g
             JOIN memberships m
               ON m.resource_kind = 'Group' AND m.resource_id = g.id
             WHERE m.user_id = ?
             ORDER BY m.joined_at DESC"
        ))?;

        let groups = stmt
            .query_map(params![user_id.as_str()], group_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_share::group::NewGroup;
    use crate::core_share::tutor::{NewTutor, TutorSharing};

    fn sample_tutor(owner: &UserId, passcode: Option<Passcode>) -> TutorConfig {
        let sharing = if passcode.is_some() {
            TutorSharing::Restricted
        } else {
            TutorSharing::Public
        };
        TutorConfig::new(
            owner.clone(),
            NewTutor {
                name: "Maths Tutor".to_string(),
                description: None,
                instructions: None,
                category: TutorCategory::Curriculum,
                icon: None,
                sharing,
            },
            passcode,
        )
    }

    fn sample_group(owner: &UserId, passcode: Passcode) -> StudyGroup {
        StudyGroup::new(
            owner.clone(),
            NewGroup {
                name: "Year 1 Science".to_string(),
                description: None,
                institution: "Ada College of Education".to_string(),
                program: None,
                year: Some(1),
                semester: None,
            },
            passcode,
        )
    }

    #[test]
    fn test_insert_and_find_tutor_by_code() {
        let store = ShareSqlStore::memory().unwrap();
        let owner = UserId::new("teacher-1".to_string());
        let code = Passcode::normalize("AB12CD").unwrap();

        let tutor = sample_tutor(&owner, Some(code.clone()));
        store.insert_tutor(&tutor).unwrap();

        let found = store.find_tutor_by_code(&code).unwrap().unwrap();
        assert_eq!(found.id, tutor.id);
        assert_eq!(found.name, "Maths Tutor");
        assert_eq!(found.passcode, Some(code));
    }

    #[test]
    fn test_public_tutor_not_findable_by_code() {
        let store = ShareSqlStore::memory().unwrap();
        let owner = UserId::new("teacher-1".to_string());

        store.insert_tutor(&sample_tutor(&owner, None)).unwrap();

        let probe = Passcode::normalize("AB12CD").unwrap();
        assert!(store.find_tutor_by_code(&probe).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_tutor_passcode_rejected() {
        let store = ShareSqlStore::memory().unwrap();
        let owner = UserId::new("teacher-1".to_string());
        let code = Passcode::normalize("AB12CD").unwrap();

        store
            .insert_tutor(&sample_tutor(&owner, Some(code.clone())))
            .unwrap();

        let result = store.insert_tutor(&sample_tutor(&owner, Some(code)));
        assert!(matches!(result, Err(StorageError::DuplicatePasscode)));
    }

    #[test]
    fn test_insert_group_bootstraps_creator_admin() {
        let store = ShareSqlStore::memory().unwrap();
        let owner = UserId::new("student-1".to_string());
        let group = sample_group(&owner, Passcode::normalize("GRP001").unwrap());

        store.insert_group(&group).unwrap();

        let members = store
            .list_members(ResourceKind::Group, group.id.as_str())
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, owner);
        assert!(members[0].is_admin());
    }

    #[test]
    fn test_add_member_if_absent_is_idempotent() {
        let store = ShareSqlStore::memory().unwrap();
        let owner = UserId::new("student-1".to_string());
        let joiner = UserId::new("student-2".to_string());
        let group = sample_group(&owner, Passcode::normalize("GRP002").unwrap());
        store.insert_group(&group).unwrap();

        let first = store
            .add_member_if_absent(
                ResourceKind::Group,
                group.id.as_str(),
                &joiner,
                MemberRole::Member,
            )
            .unwrap();
        assert_eq!(first, AddMemberOutcome::Inserted);

        let second = store
            .add_member_if_absent(
                ResourceKind::Group,
                group.id.as_str(),
                &joiner,
                MemberRole::Member,
            )
            .unwrap();
        assert_eq!(second, AddMemberOutcome::AlreadyMember);

        let members = store
            .list_members(ResourceKind::Group, group.id.as_str())
            .unwrap();
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn test_remove_member() {
        let store = ShareSqlStore::memory().unwrap();
        let owner = UserId::new("student-1".to_string());
        let joiner = UserId::new("student-2".to_string());
        let group = sample_group(&owner, Passcode::normalize("GRP003").unwrap());
        store.insert_group(&group).unwrap();

        store
            .add_member_if_absent(
                ResourceKind::Group,
                group.id.as_str(),
                &joiner,
                MemberRole::Member,
            )
            .unwrap();

        assert!(store
            .remove_member(ResourceKind::Group, group.id.as_str(), &joiner)
            .unwrap());
        assert!(!store
            .remove_member(ResourceKind::Group, group.id.as_str(), &joiner)
            .unwrap());
    }

    #[test]
    fn test_list_tutors_visible_to() {
        let store = ShareSqlStore::memory().unwrap();
        let teacher = UserId::new("teacher-1".to_string());
        let other_teacher = UserId::new("teacher-2".to_string());
        let student = UserId::new("student-1".to_string());

        // Own restricted tutor, someone else's public tutor, someone else's
        // restricted tutor.
        let own = sample_tutor(&teacher, Some(Passcode::normalize("AAAA11").unwrap()));
        let public = sample_tutor(&other_teacher, None);
        let hidden = sample_tutor(&other_teacher, Some(Passcode::normalize("BBBB22").unwrap()));
        store.insert_tutor(&own).unwrap();
        store.insert_tutor(&public).unwrap();
        store.insert_tutor(&hidden).unwrap();

        let for_teacher = store.list_tutors_visible_to(&teacher).unwrap();
        let ids: Vec<_> = for_teacher.iter().map(|t| t.id.clone()).collect();
        assert!(ids.contains(&own.id));
        assert!(ids.contains(&public.id));
        assert!(!ids.contains(&hidden.id));

        // Joining the hidden tutor makes it visible to the student.
        store
            .add_member_if_absent(
                ResourceKind::Tutor,
                hidden.id.as_str(),
                &student,
                MemberRole::Member,
            )
            .unwrap();
        let for_student = store.list_tutors_visible_to(&student).unwrap();
        let ids: Vec<_> = for_student.iter().map(|t| t.id.clone()).collect();
        assert!(ids.contains(&hidden.id));
        assert!(!ids.contains(&own.id));
    }

    #[test]
    fn test_list_groups_for_member() {
        let store = ShareSqlStore::memory().unwrap();
        let owner = UserId::new("student-1".to_string());
        let joiner = UserId::new("student-2".to_string());

        let mine = sample_group(&owner, Passcode::normalize("GRP004").unwrap());
        let joined = sample_group(&owner, Passcode::normalize("GRP005").unwrap());
        let unrelated = sample_group(&owner, Passcode::normalize("GRP006").unwrap());
        store.insert_group(&mine).unwrap();
        store.insert_group(&joined).unwrap();
        store.insert_group(&unrelated).unwrap();

        store
            .add_member_if_absent(
                ResourceKind::Group,
                joined.id.as_str(),
                &joiner,
                MemberRole::Member,
            )
            .unwrap();

        let groups = store.list_groups_for_member(&joiner).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, joined.id);

        // The creator sees every group they created (admin membership).
        let owned = store.list_groups_for_member(&owner).unwrap();
        assert_eq!(owned.len(), 3);
    }

    #[test]
    fn test_get_tutor_and_group_by_id() {
        let store = ShareSqlStore::memory().unwrap();
        let owner = UserId::new("teacher-1".to_string());

        let tutor = sample_tutor(&owner, None);
        store.insert_tutor(&tutor).unwrap();
        assert_eq!(store.get_tutor(&tutor.id).unwrap().unwrap().id, tutor.id);

        let group = sample_group(&owner, Passcode::normalize("GRP007").unwrap());
        store.insert_group(&group).unwrap();
        assert_eq!(store.get_group(&group.id).unwrap().unwrap().id, group.id);

        assert!(store
            .get_tutor(&TutorId::new("missing".to_string()))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_same_code_on_both_kinds_resolves_tutor_first() {
        let store = ShareSqlStore::memory().unwrap();
        let owner = UserId::new("teacher-1".to_string());
        let code = Passcode::normalize("XY34ZW").unwrap();

        store.insert_group(&sample_group(&owner, code.clone())).unwrap();
        store
            .insert_tutor(&sample_tutor(&owner, Some(code.clone())))
            .unwrap();

        use crate::core_share::registry::CodeTarget;
        match store.resolve_code(&code).unwrap() {
            CodeTarget::Tutor(_) => {}
            other => panic!("expected tutor precedence, got {other:?}"),
        }
    }

    #[test]
    fn test_file_backed_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("share.db");

        let owner = UserId::new("teacher-1".to_string());
        let code = Passcode::normalize("FI1E00").unwrap();
        {
            let store = ShareSqlStore::open(&path).unwrap();
            store
                .insert_tutor(&sample_tutor(&owner, Some(code.clone())))
                .unwrap();
        }

        // Reopen and read back.
        let store = ShareSqlStore::open(&path).unwrap();
        assert!(store.find_tutor_by_code(&code).unwrap().is_some());
    }
}
