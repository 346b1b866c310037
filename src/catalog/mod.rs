/// Local media catalog, stored with diesel:
/// - db mod for the connection, users, tags and media content
/// - factory mod for turning guidebox records into catalog rows
/// - credits mod for movie genres and people
/// - collections mod for curated, single-type collections
/// - watching mod for watch lists and watch events
pub mod collections;
pub mod credits;
pub mod db;
pub mod factory;
pub mod watching;

pub use collections::{CollectionDraft, CollectionMember, ValidationError};
pub use db::Catalog;
