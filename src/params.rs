
use std::{fmt, num::NonZeroUsize};

use crate::error::{Error, Result};

/// Side length of a square block, in samples of the plane it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockSize {
    B2 = 2,
    B4 = 4,
    B8 = 8,
    B16 = 16,
    B32 = 32,
}

impl BlockSize {
    pub const ALL: [Self; 5] = [Self::B32, Self::B16, Self::B8, Self::B4, Self::B2];

    #[must_use]
    pub const fn get(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn nonzero(self) -> NonZeroUsize {
        // SAFETY: the int value of this enum can never be zero
        unsafe { NonZeroUsize::new_unchecked(self as usize) }
    }

    /// Kernel-table slot for a luma block: 32, 16, 8, 4 map to 0..=3.
    ///
    /// A 4x4 luma block always lives in slot 3.
    #[must_use]
    pub const fn luma_slot(self) -> Option<usize> {
        match self {
            Self::B32 => Some(0),
            Self::B16 => Some(1),
            Self::B8 => Some(2),
            Self::B4 => Some(3),
            Self::B2 => None,
        }
    }

    /// Kernel-table slot for a chroma block: 16, 8, 4, 2 map to 0..=3.
    #[must_use]
    pub const fn chroma_slot(self) -> Option<usize> {
        match self {
            Self::B32 => None,
            Self::B16 => Some(0),
            Self::B8 => Some(1),
            Self::B4 => Some(2),
            Self::B2 => Some(3),
        }
    }

    #[must_use]
    pub const fn slot(self, plane: PlaneKind) -> Option<usize> {
        match plane {
            PlaneKind::Luma => self.luma_slot(),
            PlaneKind::Chroma => self.chroma_slot(),
        }
    }
}

impl TryFrom<usize> for BlockSize {
    type Error = Error;

    fn try_from(val: usize) -> Result<Self> {
        Ok(match val {
            2 => Self::B2,
            4 => Self::B4,
            8 => Self::B8,
            16 => Self::B16,
            32 => Self::B32,
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "block size must be 2, 4, 8, 16 or 32, got {val}"
                )));
            }
        })
    }
}

impl From<BlockSize> for usize {
    fn from(value: BlockSize) -> Self {
        value.get()
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{0}x{0}", self.get())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneKind {
    Luma,
    Chroma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChromaPlane {
    U = 0,
    V = 1,
}

/// Temporal blend factor in 1/1024 units.
///
/// `alpha` is the share of the first reference; the second gets `1024 - alpha`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Alpha(u16);

impl Alpha {
    pub const ONE: u16 = 1024;
    pub const SHIFT: u32 = 10;

    /// # Errors
    /// Returns `InvalidArgument` if `alpha` is above 1024.
    pub fn new(alpha: u16) -> Result<Self> {
        if alpha > Self::ONE {
            return Err(Error::InvalidArgument(format!(
                "alpha must be within 0..=1024, got {alpha}"
            )));
        }
        Ok(Self(alpha))
    }

    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn inverse(self) -> u16 {
        Self::ONE - self.0
    }
}

impl TryFrom<u16> for Alpha {
    type Error = Error;

    fn try_from(val: u16) -> Result<Self> {
        Self::new(val)
    }
}

/// Significant bits per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitDepth(u8);

impl BitDepth {
    pub const MAX: u8 = 16;
    pub const EIGHT: Self = Self(8);

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = Error;

    fn try_from(val: u8) -> Result<Self> {
        if val == 0 || val > Self::MAX {
            return Err(Error::UnsupportedConfiguration(format!(
                "bit depth must be within 1..={}, got {val}",
                Self::MAX
            )));
        }
        Ok(Self(val))
    }
}
