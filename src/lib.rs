//! Identity API: schema-driven REST CRUD backend for identity and access tables.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod pagination;
pub mod repository;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;

pub use auth::{JwtVerifier, Principal, TokenVerifier};
pub use error::{AppError, CatalogError, ConfigError};
pub use pagination::{Page, PageMeta, PageRequest};
pub use repository::{MemoryRepository, PgRepository, Repository};
pub use routes::{build_app, common_routes, entity_routes, API_PREFIX};
pub use schema::{builtin_entities, resolve, Catalog, ResolvedEntity};
pub use service::CrudService;
pub use settings::{JwtSettings, Settings};
pub use state::AppState;
