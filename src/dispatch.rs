
use std::fmt;

use log::debug;

use crate::{
    cpu::{CapabilityFlags, CapabilityProbe, CpuTier},
    error::{Error, Result},
    interpolate::{self, ChromaLineFn, LumaLineFn},
    params::{BitDepth, BlockSize, PlaneKind},
    sad::{self, SadFn},
    util::Pixel,
    weight::{self, WeightChecker},
};

/// Luma block sizes in slot order.
pub const LUMA_SIZES: [BlockSize; 4] = [BlockSize::B32, BlockSize::B16, BlockSize::B8, BlockSize::B4];
/// Chroma block sizes in slot order.
pub const CHROMA_SIZES: [BlockSize; 4] = [BlockSize::B16, BlockSize::B8, BlockSize::B4, BlockSize::B2];

/// Operations served by a [`KernelTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    InterpolateLuma,
    InterpolateChroma,
    Sad,
}

/// One selected kernel and the tier it was compiled for.
#[derive(Clone, Copy)]
pub struct Slot<F> {
    pub(crate) kernel: F,
    pub(crate) tier: CpuTier,
}

impl<F> Slot<F> {
    pub(crate) const fn new(kernel: F, tier: CpuTier) -> Self {
        Self { kernel, tier }
    }

    #[must_use]
    pub const fn tier(&self) -> CpuTier {
        self.tier
    }
}

/// The kernels chosen for one sample type, bit depth and set of capabilities.
///
/// Every slot is filled: sizes without an accelerated kernel get the scalar one.
/// The table is immutable once built and can be shared freely between threads.
#[derive(Clone, Copy)]
pub struct KernelTable<T: Pixel> {
    pub(crate) luma: [Slot<LumaLineFn<T>>; 4],
    pub(crate) chroma: [Slot<ChromaLineFn<T>>; 4],
    pub(crate) sad: [Slot<SadFn<T>>; 4],
    pub(crate) weight: WeightChecker,
    bit_depth: BitDepth,
}

impl<T: Pixel> KernelTable<T> {
    /// Selects the fastest kernel for every operation and block size.
    ///
    /// Accelerated kernels are only considered for 8-bit content stored as `u8`.
    ///
    /// The result depends on the host as well as on `caps` and `bit_depth`:
    /// `caps` is intersected with [`CapabilityFlags::host`] first, so flags naming
    /// instruction sets this CPU lacks are dropped. On a given machine the same
    /// arguments always produce the same table, and a table built from
    /// `caps` that the host fully supports is the same on every such machine.
    ///
    /// # Errors
    /// Returns `UnsupportedConfiguration` if `bit_depth` does not fit in `T`.
    pub fn build(caps: CapabilityFlags, bit_depth: BitDepth) -> Result<Self> {
        let storage_bits = size_of::<T>() * 8;
        if usize::from(bit_depth.get()) > storage_bits {
            return Err(Error::UnsupportedConfiguration(format!(
                "{}-bit content does not fit in {storage_bits}-bit samples",
                bit_depth.get()
            )));
        }

        let caps = caps & CapabilityFlags::host();
        let block_caps = if size_of::<T>() == 1 && bit_depth == BitDepth::EIGHT {
            caps
        } else {
            CapabilityFlags::empty()
        };

        let table = Self {
            luma: LUMA_SIZES.map(|size| interpolate::luma_line_kernel::<T>(size, block_caps)),
            chroma: CHROMA_SIZES.map(|size| interpolate::chroma_line_kernel::<T>(size, block_caps)),
            sad: LUMA_SIZES.map(|size| sad::sad_kernel::<T>(size, block_caps)),
            weight: weight::weight_checker(caps),
            bit_depth,
        };
        debug!(
            "kernel table for {}-bit content: {}",
            bit_depth.get(),
            table.summary()
        );
        Ok(table)
    }

    /// Builds a table from whatever `probe` reports.
    ///
    /// # Errors
    /// Returns `UnsupportedConfiguration` if `bit_depth` does not fit in `T`.
    pub fn from_probe(probe: &impl CapabilityProbe, bit_depth: BitDepth) -> Result<Self> {
        Self::build(probe.capabilities(), bit_depth)
    }

    /// A table made only of the scalar reference kernels.
    ///
    /// # Errors
    /// Returns `UnsupportedConfiguration` if `bit_depth` does not fit in `T`.
    pub fn scalar(bit_depth: BitDepth) -> Result<Self> {
        Self::build(CapabilityFlags::empty(), bit_depth)
    }

    #[must_use]
    pub const fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// The tier backing `op` for blocks of `size`, or `None` if the operation
    /// has no slot for that size.
    #[must_use]
    pub fn tier(&self, op: Operation, size: BlockSize) -> Option<CpuTier> {
        match op {
            Operation::InterpolateLuma => size.luma_slot().map(|i| self.luma[i].tier),
            Operation::InterpolateChroma => size.chroma_slot().map(|i| self.chroma[i].tier),
            Operation::Sad => size.luma_slot().map(|i| self.sad[i].tier),
        }
    }

    #[must_use]
    pub const fn weight_checker(&self) -> WeightChecker {
        self.weight
    }

    fn summary(&self) -> String {
        let describe = |sizes: &[BlockSize; 4], tiers: [CpuTier; 4]| {
            sizes
                .iter()
                .zip(tiers)
                .map(|(size, tier)| format!("{}={tier}", size.get()))
                .collect::<Vec<_>>()
                .join(",")
        };
        format!(
            "luma[{}] chroma[{}] sad[{}] weight[{}x{}]",
            describe(&LUMA_SIZES, self.luma.map(|s| s.tier)),
            describe(&CHROMA_SIZES, self.chroma.map(|s| s.tier)),
            describe(&LUMA_SIZES, self.sad.map(|s| s.tier)),
            self.weight.batch_width(),
            self.weight.tier(),
        )
    }
}

/// Looks up the slot for `size` in one plane's slot array.
pub(crate) fn lookup<F>(plane: PlaneKind, size: BlockSize, slots: &[Slot<F>; 4]) -> Result<&Slot<F>> {
    size.slot(plane)
        .map(|i| &slots[i])
        .ok_or_else(|| Error::InvalidArgument(format!("{plane:?} has no kernel for {size} blocks")))
}

impl<T: Pixel> fmt::Debug for KernelTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelTable")
            .field("bit_depth", &self.bit_depth.get())
            .field("kernels", &self.summary())
            .finish()
    }
}
