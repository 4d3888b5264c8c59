//! contact-store: the assistant's SQLite database
//!
//! Holds the address book imported from a delimited export, plus the
//! application and web launch shortcuts used by the open command. At runtime
//! the assistant only reads from it; [`import`] and the shortcut setters are
//! setup paths.

mod error;
pub use error::{Result, StoreError};

mod types;
pub use types::{
    Contact, ContactMatch, ImportReport, ImportSpec, LaunchTarget, MatchKind, ResolvedContact,
};

mod store;
pub use store::{default_db_path, ContactStore};

pub mod import;
pub use import::{import_delimited, import_file};

mod phone;
pub use phone::normalize_phone;

mod resolver;
pub use resolver::ContactResolver;
