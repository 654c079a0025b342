//! `orgdesk-core` — domain building blocks shared by every other crate.
//!
//! This crate contains **pure domain** types plus the persistence contract
//! (`Directory`). It has no knowledge of HTTP, tokens or SQL.

pub mod directory;
pub mod entity;
pub mod error;
pub mod id;
pub mod model;

pub use directory::Directory;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{OrganisationId, UserId};
pub use model::{NewOrganisation, NewUser, Organisation, User};
