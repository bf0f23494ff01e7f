/// Data layer: history tables, profile indexes and redo cleaning.
///
/// Architecture:
/// ```text
///  history.data                 profiles.index
///        │                            │
///        ▼                            ▼
///   ┌──────────┐               ┌────────────┐
///   │  loader   │ preamble →   │  profiles   │ (model_number, id)
///   └──────────┘ RunHeader,    └────────────┘
///        │       ColumnIndex          │
///        ▼                            ▼
///   ┌──────────┐               ┌────────────┐
///   │   redo    │ mask over     │   redo      │
///   └──────────┘ model_number  └────────────┘
///        │                            │
///        ▼                            ▼
///     Table                   profile<N>.data paths
/// ```

pub mod error;
pub mod loader;
pub mod model;
pub mod profiles;
pub mod redo;

pub use error::LoadError;
pub use loader::{load, LoadOptions, MesaData};
pub use model::{ColumnIndex, HeaderValue, IndexEntry, RunHeader, Table, STEP_COLUMN};
pub use profiles::resolve_profile_paths;
