//! Downloaded file lifecycle: streaming cleanup and age-based sweeps

pub mod cleanup;
pub mod janitor;

// Re-export for convenience
pub use cleanup::DeleteOnDrop;
pub use janitor::{clean_old_files, spawn_clean};
