//! Build the runtime catalog from entity declarations.

use regex::Regex;

use crate::error::CatalogError;
use crate::schema::resolved::{Catalog, ColumnInfo, ColumnRole, ResolvedEntity, ID_COLUMN};
use crate::schema::{validate, EntityDef, FieldKind, KeyDef, ValidationRule, DELETED_AT};

/// Validate declarations and resolve them into a catalog.
pub fn resolve(defs: &[EntityDef]) -> Result<Catalog, CatalogError> {
    validate(defs)?;

    let mut entities = Vec::with_capacity(defs.len());
    for def in defs {
        let key_columns = match &def.key {
            KeyDef::Serial => vec![ID_COLUMN],
            KeyDef::Composite(a, b) => vec![*a, *b],
        };

        let mut columns: Vec<ColumnInfo> = key_columns
            .iter()
            .map(|&name| ColumnInfo {
                name,
                kind: FieldKind::UInt,
                nullable: false,
                hidden: false,
                role: ColumnRole::Key,
                rule: ValidationRule {
                    required: matches!(def.key, KeyDef::Composite(..)),
                    ..ValidationRule::default()
                },
                pattern: None,
            })
            .collect();

        for f in &def.fields {
            let pattern = match f.rule.pattern {
                Some(p) => Some(Regex::new(p).map_err(|e| CatalogError::InvalidPattern {
                    entity: def.path_segment.to_string(),
                    field: f.name.to_string(),
                    reason: e.to_string(),
                })?),
                None => None,
            };
            columns.push(ColumnInfo {
                name: f.name,
                kind: f.kind,
                nullable: f.nullable,
                hidden: f.hidden,
                role: ColumnRole::Field,
                rule: f.rule.clone(),
                pattern,
            });
        }

        for &name in def.audit.columns() {
            columns.push(ColumnInfo {
                name,
                kind: FieldKind::Timestamp,
                nullable: name == DELETED_AT,
                hidden: false,
                role: ColumnRole::Audit,
                rule: ValidationRule::default(),
                pattern: None,
            });
        }

        entities.push(ResolvedEntity {
            path_segment: def.path_segment,
            table_name: def.table,
            label: def.label,
            key_columns,
            columns,
            audit: def.audit,
        });
    }

    Ok(Catalog::new(entities))
}
