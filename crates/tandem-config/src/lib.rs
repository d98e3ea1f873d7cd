//! # tandem-config
//!
//! Configuration for tandem: the packages to build, their entry points and
//! the sibling packages each one embeds.
//!
//! Configuration is layered with `figment`: built-in defaults, then
//! `tandem.toml` (or the `tandem` field of `package.json`), then `TANDEM_*`
//! environment variables.
//!
//! ```toml
//! out_dir = "dist/packages"
//!
//! [defaults]
//! module_resolution = "static"
//!
//! [[packages]]
//! name = "@acme/core"
//! version = "1.0.0"
//! root = "build/core"
//! entries = [{ import = "build/core/index.js", types = "build/core/index.d.ts" }]
//! ```

mod config;
mod discovery;
mod error;
mod validation;

pub use config::{DEFAULT_LOCK_FILE, DEFAULT_MANIFEST, DEFAULT_OUT_DIR, PackageConfig, TandemConfig};
pub use discovery::{CONFIG_FILE, ConfigDiscovery, ENV_PREFIX, PACKAGE_JSON_FIELD, load_from};
pub use error::{ConfigError, ConfigIssue, Result};
