//! Folio Domain - Core configuration types
//!
//! This crate defines the request tree, the user preferences document and
//! the rules that keep them consistent. All types here are pure Rust with
//! no I/O dependencies.

pub mod error;
pub mod id;
pub mod item;
pub mod migration;
pub mod preferences;
pub mod requests;
pub mod validation;

pub use error::{MigrationError, ValidationError, ValidationResult};
pub use id::generate_id;
pub use item::{HttpMethod, Item, ItemType, UnknownMethod};
pub use migration::migrate;
pub use preferences::{PREFERENCES_FILE_NAME, PREFERENCES_VERSION, ThemeMode, UserPreferences};
pub use requests::{CURRENT_VERSION, REQUESTS_FILE_NAME, RequestsConfig};
pub use validation::{MAX_FOLDER_DEPTH, validate};
