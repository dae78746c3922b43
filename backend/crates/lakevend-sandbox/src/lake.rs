//! Shared state of the in-process lake and its setup helpers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Duration, Utc};
use lakevend_commons::{FileFormat, GranteeIdentity, SessionTag, TableReference};
use parking_lot::Mutex;

use crate::error::{Result, SandboxError};

pub const DEFAULT_ACCOUNT_ID: &str = "123456789012";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_BUCKET: &str = "lakevend-sandbox";

/// How a new grant combines with the grantee's existing grant on a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrantSemantics {
    /// The latest grant replaces earlier ones.
    #[default]
    Replace,
    /// Grants accumulate, like Lake Formation.
    Union,
}

#[derive(Debug, Clone)]
pub(crate) struct SandboxTable {
    pub storage_path: String,
    pub file_format: FileFormat,
    pub schema: SchemaRef,
    /// One entry per data file, in key order.
    pub files: Vec<RecordBatch>,
}

impl SandboxTable {
    pub fn column_names(&self) -> Vec<String> {
        self.schema.fields().iter().map(|f| f.name().clone()).collect()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SandboxRole {
    pub arn: String,
    pub required_tag: SessionTag,
}

#[derive(Debug, Clone)]
pub(crate) struct IssuedSession {
    pub role: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct IssuedTableCredentials {
    pub table: TableKey,
    pub columns: Vec<String>,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

/// `(database, table)`
pub(crate) type TableKey = (String, String);

pub(crate) fn table_key(table: &TableReference) -> TableKey {
    (table.database_name().to_string(), table.table_name().to_string())
}

/// Roles are keyed by short name so `app-role` and its ARN are the same role.
pub(crate) fn role_key(role: &GranteeIdentity) -> String {
    role.role_name().to_string()
}

#[derive(Debug)]
pub(crate) struct LakeState {
    pub account_id: String,
    pub region: String,
    pub bucket: String,
    pub coordinator_is_admin: bool,
    pub grant_semantics: GrantSemantics,
    pub propagation_delay: u32,
    pub pending_propagation: u32,
    pub clock_offset: Duration,
    pub databases: HashSet<String>,
    pub tables: HashMap<TableKey, SandboxTable>,
    pub roles: HashMap<String, SandboxRole>,
    /// `(role, table) -> columns`, kept in table schema order
    pub grants: HashMap<(String, TableKey), Vec<String>>,
    pub sessions: HashMap<String, IssuedSession>,
    pub issued: HashMap<String, IssuedTableCredentials>,
    pub next_id: u64,
}

impl LakeState {
    pub fn now(&self) -> DateTime<Utc> {
        Utc::now() + self.clock_offset
    }

    pub fn next_key(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{:012}", prefix, self.next_id)
    }
}

/// In-process data lake: catalog, permissions, identity and object storage.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SandboxLake {
    pub(crate) state: Arc<Mutex<LakeState>>,
}

impl Default for SandboxLake {
    fn default() -> Self {
        Self::new(DEFAULT_ACCOUNT_ID, DEFAULT_REGION)
    }
}

impl SandboxLake {
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> Self {
        let state = LakeState {
            account_id: account_id.into(),
            region: region.into(),
            bucket: DEFAULT_BUCKET.to_string(),
            coordinator_is_admin: true,
            grant_semantics: GrantSemantics::default(),
            propagation_delay: 0,
            pending_propagation: 0,
            clock_offset: Duration::zero(),
            databases: HashSet::new(),
            tables: HashMap::new(),
            roles: HashMap::new(),
            grants: HashMap::new(),
            sessions: HashMap::new(),
            issued: HashMap::new(),
            next_id: 0,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn account_id(&self) -> String {
        self.state.lock().account_id.clone()
    }

    pub fn region(&self) -> String {
        self.state.lock().region.clone()
    }

    pub fn set_grant_semantics(&self, semantics: GrantSemantics) {
        self.state.lock().grant_semantics = semantics;
    }

    /// Whether the coordinating identity may administer permissions.
    pub fn set_coordinator_admin(&self, is_admin: bool) {
        self.state.lock().coordinator_is_admin = is_admin;
    }

    /// Number of credential requests that fail after every grant.
    pub fn set_propagation_delay(&self, attempts: u32) {
        self.state.lock().propagation_delay = attempts;
    }

    /// Move the lake's clock forward; used to expire credentials.
    pub fn advance_clock(&self, by: Duration) {
        let mut state = self.state.lock();
        state.clock_offset += by;
    }

    pub fn create_database(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock();
        if !state.databases.insert(name.to_string()) {
            return Err(SandboxError::DatabaseExists(name.to_string()));
        }
        Ok(())
    }

    /// Register a table stored at `s3://{bucket}/{database}/{name}`; each
    /// batch becomes one data file.
    pub fn create_table(
        &self,
        database: &str,
        name: &str,
        file_format: FileFormat,
        files: Vec<RecordBatch>,
    ) -> Result<TableReference> {
        let mut state = self.state.lock();
        if !state.databases.contains(database) {
            return Err(SandboxError::UnknownDatabase(database.to_string()));
        }
        let table = TableReference::try_new(state.account_id.clone(), database, name)?;
        let key = table_key(&table);
        if state.tables.contains_key(&key) {
            return Err(SandboxError::TableExists(table.to_string()));
        }

        let schema = files
            .first()
            .map(|batch| batch.schema())
            .ok_or_else(|| SandboxError::EmptyTable(table.to_string()))?;
        if files.iter().any(|batch| batch.schema() != schema) {
            return Err(SandboxError::SchemaMismatch(table.to_string()));
        }

        let storage_path = format!("s3://{}/{}/{}", state.bucket, database, name);
        log::debug!("Sandbox table {} stored at {}", table, storage_path);
        state.tables.insert(
            key,
            SandboxTable {
                storage_path,
                file_format,
                schema,
                files,
            },
        );
        Ok(table)
    }

    /// Register an assumable role whose trust policy requires `required_tag`.
    pub fn create_role(&self, name: &str, required_tag: SessionTag) -> Result<GranteeIdentity> {
        let mut state = self.state.lock();
        let arn = format!("arn:aws:iam::{}:role/{}", state.account_id, name);
        let identity = GranteeIdentity::try_new(arn.clone())?;
        let key = role_key(&identity);
        if state.roles.contains_key(&key) {
            return Err(SandboxError::RoleExists(name.to_string()));
        }
        state.roles.insert(key, SandboxRole { arn, required_tag });
        Ok(identity)
    }

    /// Storage root of a registered table.
    pub fn storage_path(&self, table: &TableReference) -> Option<String> {
        self.state
            .lock()
            .tables
            .get(&table_key(table))
            .map(|t| t.storage_path.clone())
    }

    /// Columns currently granted to `role` on `table`, in schema order.
    pub fn granted_columns(&self, role: &GranteeIdentity, table: &TableReference) -> Vec<String> {
        self.state
            .lock()
            .grants
            .get(&(role_key(role), table_key(table)))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};

    fn batch(ids: Vec<i64>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("name", DataType::Utf8, false),
        ]));
        let names: Vec<String> = ids.iter().map(|i| format!("n{i}")).collect();
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(ids)) as ArrayRef,
                Arc::new(StringArray::from(names)) as ArrayRef,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_create_table_requires_database() {
        let lake = SandboxLake::default();
        let err = lake
            .create_table("db", "t", FileFormat::Csv, vec![batch(vec![1])])
            .unwrap_err();
        assert!(matches!(err, SandboxError::UnknownDatabase(_)));

        lake.create_database("db").unwrap();
        let table = lake
            .create_table("db", "t", FileFormat::Csv, vec![batch(vec![1]), batch(vec![2])])
            .unwrap();
        assert_eq!(
            lake.storage_path(&table).unwrap(),
            "s3://lakevend-sandbox/db/t"
        );
        assert!(matches!(
            lake.create_table("db", "t", FileFormat::Csv, vec![batch(vec![1])]),
            Err(SandboxError::TableExists(_))
        ));
        assert!(matches!(
            lake.create_table("db", "empty", FileFormat::Csv, vec![]),
            Err(SandboxError::EmptyTable(_))
        ));
    }

    #[test]
    fn test_roles_are_keyed_by_short_name() {
        let lake = SandboxLake::default();
        let tag = SessionTag::authorized_caller("flow").unwrap();
        let role = lake.create_role("app-role", tag.clone()).unwrap();
        assert_eq!(role.as_str(), "arn:aws:iam::123456789012:role/app-role");
        assert_eq!(role_key(&GranteeIdentity::try_new("app-role").unwrap()), role_key(&role));
        assert!(matches!(
            lake.create_role("app-role", tag),
            Err(SandboxError::RoleExists(_))
        ));
    }

    #[test]
    fn test_advance_clock() {
        let lake = SandboxLake::default();
        let before = lake.state.lock().now();
        lake.advance_clock(Duration::hours(2));
        assert!(lake.state.lock().now() - before >= Duration::hours(2));
    }
}
