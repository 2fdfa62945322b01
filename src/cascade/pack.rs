//! Serialization of a cascade map into the lane-grouped GPU layout.

use super::layout::{
    CascadeParams, CascadeTable, GerstnerWaveComponent4, WaveLane, CASCADE_COUNT, LANES,
    MAX_WAVE_GROUPS,
};
use super::slicer::{CascadeMap, CascadeRange};

/// Whether every surviving component made it into the packed buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceOutcome {
    Complete,
    Truncated {
        /// Components longer than the coarsest cascade
        beyond_last_cascade: usize,
        /// Components that did not fit the buffer
        over_capacity: usize,
    },
}

impl SliceOutcome {
    pub fn dropped(&self) -> usize {
        match *self {
            SliceOutcome::Complete => 0,
            SliceOutcome::Truncated {
                beyond_last_cascade,
                over_capacity,
            } => beyond_last_cascade + over_capacity,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, SliceOutcome::Complete)
    }
}

/// Output of one synthesis pass, ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct PackedWaves {
    /// Always `MAX_WAVE_GROUPS` long; groups past the sentinel start are padding
    pub groups: Vec<GerstnerWaveComponent4>,
    pub cascades: CascadeTable,
    /// Cascades holding packed waves, `None` when there is nothing to generate
    pub range: Option<CascadeRange>,
    pub outcome: SliceOutcome,
}

impl PackedWaves {
    /// Buffers with no waves
    pub fn empty() -> Self {
        Self {
            groups: vec![GerstnerWaveComponent4::PADDING; MAX_WAVE_GROUPS],
            cascades: [CascadeParams::default(); CASCADE_COUNT + 1],
            range: None,
            outcome: SliceOutcome::Complete,
        }
    }

    /// Groups in use (start of the sentinel entry)
    pub fn group_count(&self) -> usize {
        self.cascades[CASCADE_COUNT].start_group as usize
    }

    /// Groups owned by a cascade
    ///
    /// # Panics
    /// * If `cascade >= CASCADE_COUNT`
    pub fn cascade_groups(&self, cascade: usize) -> &[GerstnerWaveComponent4] {
        let start = self.cascades[cascade].start_group as usize;
        let end = self.cascades[cascade + 1].start_group as usize;
        &self.groups[start..end]
    }

    /// Non-padding lanes of a cascade, in packing order
    ///
    /// # Panics
    /// * If `cascade >= CASCADE_COUNT`
    pub fn lanes(&self, cascade: usize) -> impl Iterator<Item = WaveLane> + '_ {
        self.cascade_groups(cascade).iter().flat_map(|group| {
            (0..LANES)
                .filter(move |&lane| !group.is_padding_lane(lane))
                .map(move |lane| group.lane(lane))
        })
    }

    /// First and last cascade as signed indices, -1 meaning "no waves"
    pub fn gpu_cascade_indices(&self) -> (i32, i32) {
        match self.range {
            Some(range) => (range.first as i32, range.last as i32),
            None => (-1, -1),
        }
    }

    /// Wave data buffer contents
    pub fn wave_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.groups)
    }

    /// Cascade table buffer contents
    pub fn cascade_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.cascades)
    }
}

/// Pack a cascade map into groups of four lanes
///
/// Each cascade starts on a fresh group; the tail of its last group is padded.
/// Waves that do not fit in `MAX_WAVE_GROUPS` are dropped and counted.
pub fn pack(map: &CascadeMap) -> PackedWaves {
    let mut packed = PackedWaves::empty();
    let mut next_group = 0usize;
    let mut over_capacity = 0usize;
    let mut first = None;
    let mut last = None;

    for cascade in 0..CASCADE_COUNT {
        packed.cascades[cascade] = CascadeParams {
            start_group: next_group as u32,
            cumulative_slope_variance: map.cumulative_slope_variance(cascade),
        };

        for chunk in map.waves(cascade).chunks(LANES) {
            if next_group == MAX_WAVE_GROUPS {
                over_capacity += chunk.len();
                continue;
            }
            let group = &mut packed.groups[next_group];
            for (lane, wave) in chunk.iter().enumerate() {
                group.set_lane(lane, &wave.lane);
            }
            next_group += 1;
            if first.is_none() {
                first = Some(cascade);
            }
            last = Some(cascade);
        }
    }

    packed.cascades[CASCADE_COUNT] = CascadeParams {
        start_group: next_group as u32,
        cumulative_slope_variance: map.cumulative_slope_variance(CASCADE_COUNT - 1),
    };

    packed.range = first
        .zip(last)
        .map(|(first, last)| CascadeRange { first, last });

    let beyond_last_cascade = map.beyond_last_cascade();
    packed.outcome = if beyond_last_cascade == 0 && over_capacity == 0 {
        SliceOutcome::Complete
    } else {
        SliceOutcome::Truncated {
            beyond_last_cascade,
            over_capacity,
        }
    };

    tracing::debug!(
        "Packed {} waves into {} groups, cascades {:?}",
        map.wave_count() - over_capacity,
        next_group,
        packed.range
    );

    packed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::layout::CascadeGrid;
    use crate::cascade::slicer::{slice, SliceSettings};
    use crate::params::OceanWaveSpectrum;
    use crate::spectrum::SpectrumSnapshot;

    fn settings() -> SliceSettings {
        SliceSettings {
            grid: CascadeGrid {
                resolution: 32,
                min_texels_per_wave: 3.0,
            },
            gravity: 9.81,
        }
    }

    fn map_for(wavelengths: Vec<f32>, amplitude: f32) -> CascadeMap {
        let count = wavelengths.len();
        let angles = (0..count).map(|i| (i as f32 * 37.0) % 180.0 - 90.0).collect();
        let snapshot = SpectrumSnapshot::from_parts(
            count.max(1),
            wavelengths,
            angles,
            vec![amplitude; count],
            vec![0.1; count],
        )
        .unwrap();
        let phases: Vec<f32> = (0..count).map(|i| i as f32 * 0.7).collect();
        slice(&snapshot, &phases, &OceanWaveSpectrum::default(), &settings()).unwrap()
    }

    #[test]
    fn test_single_component_single_group() {
        let packed = pack(&map_for(vec![10.0], 1.0));
        assert_eq!(packed.range, Some(CascadeRange { first: 7, last: 7 }));
        assert_eq!(packed.gpu_cascade_indices(), (7, 7));
        assert_eq!(packed.group_count(), 1);
        assert!(packed.outcome.is_complete());

        let non_zero = packed
            .groups
            .iter()
            .filter(|group| group.amplitude.iter().any(|&a| a != 0.0))
            .count();
        assert_eq!(non_zero, 1);

        // Unused lanes keep a non-zero 2π/λ
        let group = packed.groups[0];
        assert_eq!(group.two_pi_over_wavelength[1..], [1.0; 3]);
        assert_eq!(group.amplitude[1..], [0.0; 3]);

        for cascade in 0..=7 {
            assert_eq!(packed.cascades[cascade].start_group, 0);
        }
        for cascade in 8..=CASCADE_COUNT {
            assert_eq!(packed.cascades[cascade].start_group, 1);
        }
    }

    #[test]
    fn test_negligible_amplitudes_pack_nothing() {
        let packed = pack(&map_for(vec![1.0, 2.0, 4.0, 8.0], 0.0001));
        assert_eq!(packed.range, None);
        assert_eq!(packed.gpu_cascade_indices(), (-1, -1));
        assert_eq!(packed.group_count(), 0);
        for group in &packed.groups {
            assert_eq!(*group, GerstnerWaveComponent4::PADDING);
        }
    }

    #[test]
    fn test_table_invariants() {
        let wavelengths: Vec<f32> = (0..90).map(|i| 0.06 * 1.1f32.powi(i)).collect();
        let packed = pack(&map_for(wavelengths, 0.2));

        for pair in packed.cascades.windows(2) {
            assert!(pair[0].start_group <= pair[1].start_group);
            assert!(pair[0].cumulative_slope_variance <= pair[1].cumulative_slope_variance);
        }
        // Sentinel closes the data
        let used = packed.group_count();
        assert!(packed.groups[used..]
            .iter()
            .all(|group| *group == GerstnerWaveComponent4::PADDING));
        for group in &packed.groups[..used] {
            for lane in 0..LANES {
                if !group.is_padding_lane(lane) {
                    let direction = group.lane(lane).direction;
                    assert!((direction.length() - 1.0).abs() < 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_unpack_reproduces_placed_waves() {
        let wavelengths: Vec<f32> = (0..50).map(|i| 0.07 * 1.15f32.powi(i)).collect();
        let map = map_for(wavelengths, 0.3);
        let packed = pack(&map);

        let mut total = 0;
        for cascade in 0..CASCADE_COUNT {
            let placed: Vec<WaveLane> = map.waves(cascade).iter().map(|wave| wave.lane).collect();
            let unpacked: Vec<WaveLane> = packed.lanes(cascade).collect();
            assert_eq!(placed, unpacked, "cascade {cascade}");
            total += unpacked.len();
        }
        assert_eq!(total, 50);
    }

    #[test]
    fn test_over_capacity_truncates() {
        // 1100 waves in one band exceed the 1024 lanes available
        let count = 1100;
        let wavelengths: Vec<f32> = (0..count)
            .map(|i| 6.0 + 5.9 * i as f32 / count as f32)
            .collect();
        let packed = pack(&map_for(wavelengths, 1.0));

        assert_eq!(packed.group_count(), MAX_WAVE_GROUPS);
        assert_eq!(
            packed.outcome,
            SliceOutcome::Truncated {
                beyond_last_cascade: 0,
                over_capacity: count - MAX_WAVE_GROUPS * LANES,
            }
        );
        assert_eq!(packed.outcome.dropped(), 76);
        assert_eq!(packed.range, Some(CascadeRange { first: 7, last: 7 }));
    }

    #[test]
    fn test_buffer_sizes() {
        let packed = PackedWaves::empty();
        assert_eq!(packed.wave_bytes().len(), MAX_WAVE_GROUPS * 112);
        assert_eq!(packed.cascade_bytes().len(), (CASCADE_COUNT + 1) * 8);
    }

    #[test]
    #[should_panic]
    fn test_sentinel_is_not_a_cascade() {
        PackedWaves::empty().cascade_groups(CASCADE_COUNT);
    }
}
