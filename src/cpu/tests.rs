use super::*;

#[test]
fn tiers_are_ordered() {
    assert!(CpuTier::Rust < CpuTier::Sse2);
    assert!(CpuTier::Sse2 < CpuTier::Sse4_1);
    assert!(CpuTier::Sse4_1 < CpuTier::Avx2);
}

#[test]
fn tier_flags_stack() {
    for pair in CpuTier::ALL.windows(2) {
        assert!(pair[1].flags().contains(pair[0].flags()));
    }
    assert!(CpuTier::Rust.flags().is_empty());
}

#[test]
fn best_tier_round_trips_tier_flags() {
    for tier in CpuTier::ALL {
        assert_eq!(tier.flags().best_tier(), tier);
    }
}

#[test]
fn best_tier_needs_the_whole_stack() {
    assert_eq!(CapabilityFlags::AVX2.best_tier(), CpuTier::Rust);
    assert_eq!(
        (CapabilityFlags::AVX2 | CapabilityFlags::SSE2).best_tier(),
        CpuTier::Sse2
    );
}

#[test]
fn parse_tier_names() {
    assert_eq!("rust".parse::<CpuTier>(), Ok(CpuTier::Rust));
    assert_eq!("SSE2".parse::<CpuTier>(), Ok(CpuTier::Sse2));
    assert_eq!("sse4.1".parse::<CpuTier>(), Ok(CpuTier::Sse4_1));
    assert_eq!(" avx2 ".parse::<CpuTier>(), Ok(CpuTier::Avx2));
    assert!(matches!(
        "avx512".parse::<CpuTier>(),
        Err(Error::UnsupportedConfiguration(_))
    ));
}

#[test]
fn display_parses_back() {
    for tier in CpuTier::ALL {
        assert_eq!(tier.to_string().parse::<CpuTier>(), Ok(tier));
    }
}

#[test]
fn host_probe_never_exceeds_host() {
    let host = CapabilityFlags::host();
    assert!(host.contains(HostProbe.capabilities()));
}

#[test]
fn fixed_probe_reports_its_flags() {
    let flags = CapabilityFlags::SSE2 | CapabilityFlags::SSE4_1;
    assert_eq!(FixedProbe(flags).capabilities(), flags);
}

#[cfg(feature = "no_simd")]
#[test]
fn no_simd_hides_every_instruction_set() {
    assert!(CapabilityFlags::host().is_empty());
}
