//! # Engine Primitives
//!
//! Hardcoded constants for the compatibility rule set, the auto-navigation
//! sequencer and the persistence format.
//!
//! These are compiled into the binary and are immutable at runtime. Every
//! default substituted for a missing or malformed catalog attribute lives here,
//! so the rules stay free of magic numbers.

// =============================================================================
// ATTRIBUTE DEFAULTS
// =============================================================================

/// Memory type assumed for a motherboard that does not declare one.
pub const DEFAULT_MEMORY_TYPE: &str = "DDR4";

/// Memory ceiling (GB) assumed for a motherboard that does not declare one.
pub const DEFAULT_MAX_MEMORY_GB: i64 = 128;

/// CPU thermal design power (W) assumed when the CPU does not declare one.
pub const DEFAULT_CPU_TDP_WATTS: i64 = 65;

/// GPU board power (W) assumed when the GPU does not declare one.
pub const DEFAULT_GPU_DRAW_WATTS: i64 = 250;

/// Fixed draw (W) for motherboard, memory, storage and fans.
pub const PLATFORM_OVERHEAD_WATTS: i64 = 100;

// =============================================================================
// POWER BUDGET
// =============================================================================

/// Sustained load a PSU should stay under, in percent of its rating.
pub const PSU_LOAD_LIMIT_PERCENT: i64 = 80;

/// Populated categories required before the power-budget rule is evaluated.
pub const POWER_BUDGET_MIN_POPULATED: usize = 4;

// =============================================================================
// STORAGE INTERFACE ADVISORY
// =============================================================================

/// Storage interface that triggers the slot advisory.
pub const FAST_STORAGE_INTERFACE: &str = "PCIe 4.0";

/// Substring a motherboard slot description must contain to host fast storage.
pub const PCIE_SLOT_MARKER: &str = "PCIe";

/// Interfaces offered as replacements when the board lacks PCIe slots.
pub const FALLBACK_STORAGE_INTERFACES: [&str; 2] = ["SATA", "PCIe 3.0"];

// =============================================================================
// NAVIGATION
// =============================================================================

/// Debounce before auto-advancing to the next category (milliseconds).
pub const AUTO_ADVANCE_DELAY_MS: u64 = 500;

/// Populated categories required before the completion dialog may show.
pub const COMPLETION_DIALOG_MIN_POPULATED: usize = 6;

// =============================================================================
// PERSISTENCE FORMAT
// =============================================================================

/// Magic bytes for a saved configuration record.
pub const MAGIC_BYTES: &[u8; 4] = b"USCF";

/// Current serialization format version.
///
/// Increment this when making breaking changes to the serialization format.
pub const FORMAT_VERSION: u8 = 1;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length of a saved configuration name.
pub const MAX_CONFIGURATION_NAME_LENGTH: usize = 128;

/// Maximum length of a single component note.
pub const MAX_NOTE_LENGTH: usize = 2048;

/// Maximum length of a catalog search query.
pub const MAX_QUERY_LENGTH: usize = 256;
