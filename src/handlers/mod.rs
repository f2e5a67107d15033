//! HTTP handlers for entity CRUD.

pub mod entity;
