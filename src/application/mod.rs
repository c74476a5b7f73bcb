// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Orchestrates the other layers for one goal at a time.
//
// Rules for this layer:
//   - No model math (that's Layer 5)
//   - No printing (that's Layer 1)
//   - No direct file access (that's Layer 6)

use anyhow::Result;

use crate::domain::hparams::HredConfig;
use crate::domain::traits::ConfigSource;

/// Parameter counts per network for a config
pub mod describe_use_case;

/// One forward pass through every network over a dialogue
pub mod probe_use_case;

/// Load a config from `source`, or fall back to defaults when none is given.
pub fn resolve_config(source: Option<&dyn ConfigSource>) -> Result<HredConfig> {
    match source {
        Some(s) => s.load(),
        None => {
            tracing::info!("No config given, using defaults");
            Ok(HredConfig::default())
        }
    }
}
