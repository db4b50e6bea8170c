use serde::Serialize;
use serde_json::{Map, Value};

/// Database source name the gateway attaches Postgres under by default
pub const SOURCE: &str = "default";
/// Postgres schema holding the todos table
pub const SCHEMA: &str = "public";
/// Table name in Postgres
pub const TODO_TABLE: &str = "todos";
/// Name the table is exposed under in GraphQL, which yields the `todo`, `insert_todo_one`,
/// `update_todo_by_pk` and `delete_todo_by_pk` root fields
pub const GRAPHQL_NAME: &str = "todo";

/// Every column of the todos table, all of which are readable
pub const READABLE_COLUMNS: [&str; 5] = ["id", "title", "description", "completed", "createdAt"];
/// Columns clients may set on insert or update. The ID and creation time come from the database.
pub const WRITABLE_COLUMNS: [&str; 3] = ["title", "description", "completed"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualifiedTable {
    pub schema: String,
    pub name: String,
}

impl QualifiedTable {
    pub fn todos() -> Self {
        QualifiedTable {
            schema: SCHEMA.into(),
            name: TODO_TABLE.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableConfiguration {
    pub custom_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermissionArgs<P> {
    pub source: String,
    pub table: QualifiedTable,
    pub role: String,
    pub permission: P,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectPermission {
    pub columns: Vec<String>,
    pub filter: Map<String, Value>,
    pub allow_aggregations: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertPermission {
    pub columns: Vec<String>,
    pub check: Map<String, Value>,
    pub set: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatePermission {
    pub columns: Vec<String>,
    pub filter: Map<String, Value>,
    pub set: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletePermission {
    pub filter: Map<String, Value>,
}

/// A call to the gateway's metadata API. Serializes to `{"type": ..., "args": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "args", rename_all = "snake_case")]
pub enum MetadataRequest {
    DropInconsistentMetadata {},
    PgUntrackTable {
        source: String,
        table: QualifiedTable,
        cascade: bool,
    },
    PgTrackTable {
        source: String,
        table: QualifiedTable,
        configuration: TableConfiguration,
    },
    PgCreateSelectPermission(PermissionArgs<SelectPermission>),
    PgCreateInsertPermission(PermissionArgs<InsertPermission>),
    PgCreateUpdatePermission(PermissionArgs<UpdatePermission>),
    PgCreateDeletePermission(PermissionArgs<DeletePermission>),
    ReloadMetadata {},
}

impl MetadataRequest {
    /// The request's `type`, for logging and error messages
    pub fn operation(&self) -> &'static str {
        match self {
            Self::DropInconsistentMetadata {} => "drop_inconsistent_metadata",
            Self::PgUntrackTable { .. } => "pg_untrack_table",
            Self::PgTrackTable { .. } => "pg_track_table",
            Self::PgCreateSelectPermission(_) => "pg_create_select_permission",
            Self::PgCreateInsertPermission(_) => "pg_create_insert_permission",
            Self::PgCreateUpdatePermission(_) => "pg_create_update_permission",
            Self::PgCreateDeletePermission(_) => "pg_create_delete_permission",
            Self::ReloadMetadata {} => "reload_metadata",
        }
    }

    pub fn untrack_todos() -> Self {
        Self::PgUntrackTable {
            source: SOURCE.into(),
            table: QualifiedTable::todos(),
            cascade: true,
        }
    }

    pub fn track_todos() -> Self {
        Self::PgTrackTable {
            source: SOURCE.into(),
            table: QualifiedTable::todos(),
            configuration: TableConfiguration {
                custom_name: GRAPHQL_NAME.into(),
            },
        }
    }
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn args_for<P>(role: &str, permission: P) -> PermissionArgs<P> {
    PermissionArgs {
        source: SOURCE.into(),
        table: QualifiedTable::todos(),
        role: role.into(),
        permission,
    }
}

/// Select, insert, update and delete permissions for [role], none of which restrict rows
pub fn permission_requests(role: &str) -> Vec<MetadataRequest> {
    vec![
        MetadataRequest::PgCreateSelectPermission(args_for(
            role,
            SelectPermission {
                columns: columns(&READABLE_COLUMNS),
                filter: Map::new(),
                allow_aggregations: true,
            },
        )),
        MetadataRequest::PgCreateInsertPermission(args_for(
            role,
            InsertPermission {
                columns: columns(&WRITABLE_COLUMNS),
                check: Map::new(),
                set: Map::new(),
            },
        )),
        MetadataRequest::PgCreateUpdatePermission(args_for(
            role,
            UpdatePermission {
                columns: columns(&WRITABLE_COLUMNS),
                filter: Map::new(),
                set: Map::new(),
            },
        )),
        MetadataRequest::PgCreateDeletePermission(args_for(
            role,
            DeletePermission { filter: Map::new() },
        )),
    ]
}
