#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub vsync: bool,
    pub max_anisotropy: u16,
    /// Starting size of the per-frame constant buffer heap. Grows on demand.
    pub constant_heap_bytes: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            vsync: true,
            max_anisotropy: 16,
            constant_heap_bytes: 256 * 1000,
        }
    }
}
