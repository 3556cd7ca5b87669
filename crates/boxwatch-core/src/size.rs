#![forbid(unsafe_code)]

//! The [`Size`] value type.

/// Inline and block dimensions of a box, in layout units.
///
/// `inline_size` runs along the line axis (width in horizontal writing
/// modes), `block_size` along the block axis (height). Both fields are
/// non-negative; [`Size::new`] clamps negative or NaN inputs to zero.
///
/// Comparison is exact `f64` equality: two sizes are equal only when
/// both dimensions match bit-for-bit, which is what the no-op update
/// suppression in the reactive layer relies on.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    /// Extent along the inline (line) axis.
    pub inline_size: f64,
    /// Extent along the block axis.
    pub block_size: f64,
}

impl Size {
    /// The zero size. Initial state when no element is available.
    pub const ZERO: Size = Size {
        inline_size: 0.0,
        block_size: 0.0,
    };

    /// Create a size, clamping negative or NaN dimensions to zero.
    #[must_use]
    pub fn new(inline_size: f64, block_size: f64) -> Self {
        Self {
            inline_size: inline_size.max(0.0),
            block_size: block_size.max(0.0),
        }
    }

    /// True when either dimension is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inline_size == 0.0 || self.block_size == 0.0
    }
}
