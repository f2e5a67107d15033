//! CrudService: generic CRUD over the entity catalog.

mod crud;
mod record;
mod validation;
pub use crud::{CrudService, UpdateMode};
pub use record::into_record;
pub use validation::RequestValidator;
