// ════════════════════════════════════════════════════════════════
//  Configuration
// ════════════════════════════════════════════════════════════════

fn default_max_rows() -> usize {
    1_000_000
}

/// Limits applied when loading a dataset into memory.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct MemoryCursorConfig {
    /// Datasets with more rows are rejected at load time.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for MemoryCursorConfig {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
        }
    }
}
