// ============================================================
// Layer 3 - Core Traits
// ============================================================
// The application layer asks for a configuration through this
// trait and never touches the file system itself. The JSON
// store in the infra layer is the one implementation today.

use anyhow::Result;
use crate::domain::hparams::HredConfig;

// ─── ConfigSource ─────────────────────────────────────────────────────────────
/// Anything that can hand out (and accept) an [`HredConfig`].
///
/// Implementations:
///   - JsonConfigStore → a pretty-printed JSON file on disk
pub trait ConfigSource {
    /// Load the configuration. Implementations validate before returning.
    fn load(&self) -> Result<HredConfig>;

    /// Persist the configuration.
    fn save(&self, cfg: &HredConfig) -> Result<()>;
}
