//! Entity declarations: table, key shape, audit columns and typed fields with validation rules.

use serde::Serialize;

/// Storage type of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Bool,
    UInt,
    Timestamp,
}

impl FieldKind {
    /// PostgreSQL type used for casts and column decoding.
    pub fn pg_type(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Bool => "boolean",
            FieldKind::UInt => "bigint",
            FieldKind::Timestamp => "timestamptz",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            FieldKind::Text => "a string",
            FieldKind::Bool => "a boolean",
            FieldKind::UInt => "a non-negative integer",
            FieldKind::Timestamp => "an RFC 3339 timestamp",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Email,
    Uuid,
    Url,
}

#[derive(Clone, Debug, Default)]
pub struct ValidationRule {
    pub required: bool,
    pub max_length: Option<usize>,
    pub format: Option<Format>,
    pub pattern: Option<&'static str>,
}

#[derive(Clone, Debug)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
    /// Never serialized in responses (hashes, secrets).
    pub hidden: bool,
    pub rule: ValidationRule,
}

impl FieldDef {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldDef {
            name,
            kind,
            nullable: false,
            hidden: false,
            rule: ValidationRule::default(),
        }
    }

    pub fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    pub fn uint(name: &'static str) -> Self {
        Self::new(name, FieldKind::UInt)
    }

    pub fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldKind::Timestamp)
    }

    pub fn required(mut self) -> Self {
        self.rule.required = true;
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.rule.max_length = Some(max);
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.rule.format = Some(format);
        self
    }

    pub fn pattern(mut self, pattern: &'static str) -> Self {
        self.rule.pattern = Some(pattern);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Server-managed timestamp columns carried by an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Audit {
    /// created_at, updated_at, deleted_at
    Full,
    /// created_at, updated_at
    Tracked,
    /// created_at
    Created,
    None,
}

pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";
pub const DELETED_AT: &str = "deleted_at";

impl Audit {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Audit::Full => &[CREATED_AT, UPDATED_AT, DELETED_AT],
            Audit::Tracked => &[CREATED_AT, UPDATED_AT],
            Audit::Created => &[CREATED_AT],
            Audit::None => &[],
        }
    }

    pub fn touches_updated_at(self) -> bool {
        matches!(self, Audit::Full | Audit::Tracked)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyDef {
    /// Store-assigned `id`.
    Serial,
    /// Two client-supplied foreign references, no surrogate id.
    Composite(&'static str, &'static str),
}

#[derive(Clone, Debug)]
pub struct EntityDef {
    pub path_segment: &'static str,
    pub table: &'static str,
    /// Human label used in response messages, e.g. "Role".
    pub label: &'static str,
    pub key: KeyDef,
    pub audit: Audit,
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    pub fn new(path_segment: &'static str, label: &'static str, key: KeyDef, audit: Audit) -> Self {
        EntityDef {
            path_segment,
            table: path_segment,
            label,
            key,
            audit,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}
