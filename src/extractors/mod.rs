//! Request extractors.

mod principal;

pub use principal::CurrentUser;
