use core::fmt::{Binary, Display};

/// Set of active layers, one bit per layer index.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LayerState(u32);

impl LayerState {
    pub const MAX_LAYERS: u8 = 32;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// A state in which only `layer` is active.
    pub const fn only(layer: u8) -> Self {
        Self::empty().on(layer)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_on(self, layer: u8) -> bool {
        layer < Self::MAX_LAYERS && self.0 & (1 << layer) != 0
    }

    #[must_use]
    pub const fn on(self, layer: u8) -> Self {
        if layer < Self::MAX_LAYERS { Self(self.0 | (1 << layer)) } else { self }
    }

    #[must_use]
    pub const fn off(self, layer: u8) -> Self {
        if layer < Self::MAX_LAYERS { Self(self.0 & !(1 << layer)) } else { self }
    }

    #[must_use]
    pub const fn invert(self, layer: u8) -> Self {
        if layer < Self::MAX_LAYERS { Self(self.0 ^ (1 << layer)) } else { self }
    }

    #[must_use]
    pub const fn union(self, other: LayerState) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Index of the highest active layer, or 0 when no layer is active.
    pub const fn highest(self) -> u8 {
        if self.0 == 0 { 0 } else { (31 - self.0.leading_zeros()) as u8 }
    }

    /// Turns `third` on when both `first` and `second` are on, and off
    /// otherwise.
    #[must_use]
    pub const fn tri_layer(self, first: u8, second: u8, third: u8) -> Self {
        if self.is_on(first) && self.is_on(second) {
            self.on(third)
        } else {
            self.off(third)
        }
    }

    /// Active layers, from the highest to the lowest.
    pub fn iter_desc(self) -> impl Iterator<Item = u8> {
        (0..Self::MAX_LAYERS).rev().filter(move |l| self.is_on(*l))
    }
}

impl Display for LayerState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}

impl Binary for LayerState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Binary::fmt(&self.0, f)
    }
}
