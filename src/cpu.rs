#[cfg(test)]
mod tests;

use std::{env, fmt, str::FromStr};

use bitflags::bitflags;
use log::warn;

use crate::error::Error;

/// Environment variable that caps the tier reported by [`HostProbe`].
pub const CPU_TARGET_ENV: &str = "MCFI_CPU_TARGET";

/// Acceleration tiers, ordered from least to most capable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CpuTier {
    Rust,
    Sse2,
    Sse4_1,
    Avx2,
}

impl CpuTier {
    pub const ALL: [Self; 4] = [Self::Rust, Self::Sse2, Self::Sse4_1, Self::Avx2];

    /// Every capability flag implied by running at this tier.
    #[must_use]
    pub const fn flags(self) -> CapabilityFlags {
        match self {
            Self::Rust => CapabilityFlags::empty(),
            Self::Sse2 => CapabilityFlags::SSE2,
            Self::Sse4_1 => CapabilityFlags::SSE2.union(CapabilityFlags::SSE4_1),
            Self::Avx2 => CapabilityFlags::SSE2
                .union(CapabilityFlags::SSE4_1)
                .union(CapabilityFlags::AVX2),
        }
    }
}

impl FromStr for CpuTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "rust" | "c" | "none" => Self::Rust,
            "sse2" => Self::Sse2,
            "sse4" | "sse4.1" | "sse4_1" => Self::Sse4_1,
            "avx2" => Self::Avx2,
            _ => {
                return Err(Error::UnsupportedConfiguration(format!(
                    "unknown cpu target '{s}', expected rust, sse2, sse4.1 or avx2"
                )));
            }
        })
    }
}

impl fmt::Display for CpuTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rust => "rust",
            Self::Sse2 => "sse2",
            Self::Sse4_1 => "sse4.1",
            Self::Avx2 => "avx2",
        })
    }
}

bitflags! {
    /// Instruction sets usable by the kernel dispatcher.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CapabilityFlags: u32 {
        const SSE2 = 1 << 0;
        const SSE4_1 = 1 << 1;
        const AVX2 = 1 << 2;
    }
}

impl CapabilityFlags {
    /// Instruction sets the running CPU actually has.
    ///
    /// Always empty on non-x86-64 targets or with the `no_simd` feature.
    #[must_use]
    pub fn host() -> Self {
        #[allow(unused_mut)]
        let mut flags = Self::empty();
        #[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))]
        {
            flags.set(Self::SSE2, crate::util::has_sse2());
            flags.set(Self::SSE4_1, crate::util::has_sse4());
            flags.set(Self::AVX2, crate::util::has_avx2());
        }
        flags
    }

    /// Highest tier whose requirements are all present.
    ///
    /// Tiers stack, so AVX2 without SSE4.1 only counts as SSE2.
    #[must_use]
    pub fn best_tier(self) -> CpuTier {
        CpuTier::ALL
            .into_iter()
            .rev()
            .find(|tier| self.contains(tier.flags()))
            .unwrap_or(CpuTier::Rust)
    }
}

/// Source of the capability flags handed to [`KernelTable::build`](crate::KernelTable::build).
pub trait CapabilityProbe {
    fn capabilities(&self) -> CapabilityFlags;
}

/// Probes the CPU this process runs on.
///
/// Honors [`CPU_TARGET_ENV`] as an upper bound; asking for more than the
/// host supports has no effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostProbe;

impl CapabilityProbe for HostProbe {
    fn capabilities(&self) -> CapabilityFlags {
        let detected = CapabilityFlags::host();
        match env::var(CPU_TARGET_ENV) {
            Ok(target) => match target.parse::<CpuTier>() {
                Ok(cap) => detected & cap.flags(),
                Err(e) => {
                    warn!("ignoring {CPU_TARGET_ENV}: {e}");
                    detected
                }
            },
            Err(_) => detected,
        }
    }
}

/// Fixed capabilities, for callers that already know what to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedProbe(pub CapabilityFlags);

impl CapabilityProbe for FixedProbe {
    fn capabilities(&self) -> CapabilityFlags {
        self.0
    }
}
