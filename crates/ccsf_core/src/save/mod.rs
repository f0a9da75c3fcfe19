//! Save/Load System
//!
//! Three on-disk shapes, tried in this order at boot:
//!
//! - local save: the whole document as `state.json`, written atomically
//! - bundle: one player-facing `ccsf_bundle_v1` file with a manifest and
//!   one entry per module, checksummed with SHA-256
//! - seed directory: `manifest.json` listing one JSON file per module
//!
//! Bundles and seeds are validated for referential integrity on the way in
//! and out.

pub mod bundle;
pub mod error;
pub mod integrity;
pub mod manager;

pub use bundle::{export_file_name, Bundle, BundleManifest, BUNDLE_TYPE, BUNDLE_VERSION};
pub use error::SaveError;
pub use integrity::{validate_state, IntegrityIssue};
pub use manager::{BootSource, Booted, SaveStore, SeedManifest, LOCAL_SAVE_FILE, SEED_MANIFEST_FILE};
