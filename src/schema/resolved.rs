//! Resolved entity model: declarations validated and flattened into columns for runtime use.

use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::schema::{Audit, FieldKind, ValidationRule};

pub const ID_COLUMN: &str = "id";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnRole {
    /// Part of the record key. Client-supplied for composite keys, store-assigned for `id`.
    Key,
    /// Ordinary data column, written on create and update.
    Field,
    /// created_at / updated_at / deleted_at, managed by the store.
    Audit,
}

#[derive(Clone, Debug)]
pub struct ColumnInfo {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
    pub hidden: bool,
    pub role: ColumnRole,
    pub rule: ValidationRule,
    pub pattern: Option<Regex>,
}

#[derive(Clone, Debug)]
pub struct ResolvedEntity {
    pub path_segment: &'static str,
    pub table_name: &'static str,
    pub label: &'static str,
    pub key_columns: Vec<&'static str>,
    /// Key columns first, then fields in declaration order, then audit columns.
    pub columns: Vec<ColumnInfo>,
    pub audit: Audit,
}

impl ResolvedEntity {
    pub fn is_composite(&self) -> bool {
        self.key_columns.len() > 1
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns a client supplies on create: composite key parts and fields.
    pub fn input_columns(&self) -> impl Iterator<Item = &ColumnInfo> {
        let composite = self.is_composite();
        self.columns
            .iter()
            .filter(move |c| c.role == ColumnRole::Field || (composite && c.role == ColumnRole::Key))
    }

    /// Columns rewritten by an update.
    pub fn writable_columns(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.iter().filter(|c| c.role == ColumnRole::Field)
    }

    pub fn has_audit_column(&self, name: &str) -> bool {
        self.audit.columns().contains(&name)
    }
}

#[derive(Clone, Debug)]
pub struct Catalog {
    entities: Vec<Arc<ResolvedEntity>>,
    entity_by_path: HashMap<&'static str, Arc<ResolvedEntity>>,
}

impl Catalog {
    pub(crate) fn new(entities: Vec<ResolvedEntity>) -> Self {
        let entities: Vec<Arc<ResolvedEntity>> = entities.into_iter().map(Arc::new).collect();
        let entity_by_path = entities.iter().map(|e| (e.path_segment, e.clone())).collect();
        Catalog {
            entities,
            entity_by_path,
        }
    }

    pub fn entities(&self) -> &[Arc<ResolvedEntity>] {
        &self.entities
    }

    pub fn entity_by_path(&self, path: &str) -> Option<&Arc<ResolvedEntity>> {
        self.entity_by_path.get(path)
    }
}
