//! Catalog validation: unique paths and fields, reserved names, key shape.

use std::collections::HashSet;

use crate::error::CatalogError;
use crate::schema::resolved::ID_COLUMN;
use crate::schema::{EntityDef, KeyDef, CREATED_AT, DELETED_AT, UPDATED_AT};

const RESERVED: &[&str] = &[ID_COLUMN, CREATED_AT, UPDATED_AT, DELETED_AT];

pub fn validate(defs: &[EntityDef]) -> Result<(), CatalogError> {
    if defs.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut path_segments = HashSet::new();
    for def in defs {
        if !path_segments.insert(def.path_segment) {
            return Err(CatalogError::DuplicatePathSegment(def.path_segment.to_string()));
        }

        let mut names = HashSet::new();
        if let KeyDef::Composite(a, b) = &def.key {
            if a == b {
                return Err(CatalogError::InvalidKey {
                    entity: def.path_segment.to_string(),
                    reason: format!("key columns must differ, got '{}' twice", a),
                });
            }
            for k in [*a, *b] {
                if RESERVED.contains(&k) {
                    return Err(CatalogError::ReservedField {
                        entity: def.path_segment.to_string(),
                        field: k.to_string(),
                    });
                }
                names.insert(k);
            }
        }

        for f in &def.fields {
            if RESERVED.contains(&f.name) {
                return Err(CatalogError::ReservedField {
                    entity: def.path_segment.to_string(),
                    field: f.name.to_string(),
                });
            }
            if !names.insert(f.name) {
                return Err(CatalogError::DuplicateField {
                    entity: def.path_segment.to_string(),
                    field: f.name.to_string(),
                });
            }
        }
    }

    Ok(())
}
