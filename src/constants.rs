//! Centralized tuning constants for the combo core.
//!
//! Per-attack values (durations, windows, damage) come from authored move-set
//! data; only cross-cutting defaults live here.

// =====================================================
// Input buffering
// =====================================================

/// Seconds the input buffer survives without a new symbol before it flushes.
/// A flush resolves any pending combo and resets the buffer.
pub const DEFAULT_COMBO_CLEAR_SECS: f32 = 0.7;

// =====================================================
// Hit detection
// =====================================================

/// Capacity of a controller's reusable hit-collider buffer.
/// Overlaps beyond this count are dropped for the frame.
pub const DEFAULT_HIT_BUFFER_CAPACITY: usize = 8;
