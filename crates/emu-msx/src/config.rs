//! Machine configuration.

/// Fill byte for fresh mapper RAM: `RET`, so a stray call returns.
pub const DEFAULT_MAPPER_FILL: u8 = 0xC9;

/// One NTSC frame.
pub const DEFAULT_VSYNC_MICROS: u64 = 16_600;

#[derive(Debug, Clone)]
pub struct MsxConfig {
    pub mapper_fill: u8,
    /// Period enforced by the WT16MS wait.
    pub vsync_micros: u64,
    /// Abort on unknown MSX-DOS functions instead of returning A=B=0.
    pub strict_dos: bool,
    /// Mark segments 12-15 (the ones paged in at boot) as owned by the
    /// system, so ALL_SEG never hands them out.
    pub reserve_boot_segments: bool,
    /// Register snapshots to keep (needs the `pc-history` feature).
    pub pc_history: usize,
}

impl Default for MsxConfig {
    fn default() -> Self {
        Self {
            mapper_fill: DEFAULT_MAPPER_FILL,
            vsync_micros: DEFAULT_VSYNC_MICROS,
            strict_dos: cfg!(debug_assertions),
            reserve_boot_segments: false,
            pc_history: 0,
        }
    }
}

impl MsxConfig {
    #[must_use]
    pub fn with_mapper_fill(mut self, fill: u8) -> Self {
        self.mapper_fill = fill;
        self
    }

    #[must_use]
    pub fn with_vsync_micros(mut self, micros: u64) -> Self {
        self.vsync_micros = micros;
        self
    }

    #[must_use]
    pub fn with_strict_dos(mut self, strict: bool) -> Self {
        self.strict_dos = strict;
        self
    }

    #[must_use]
    pub fn with_reserved_boot_segments(mut self, reserve: bool) -> Self {
        self.reserve_boot_segments = reserve;
        self
    }

    #[must_use]
    pub fn with_pc_history(mut self, capacity: usize) -> Self {
        self.pc_history = capacity;
        self
    }
}
