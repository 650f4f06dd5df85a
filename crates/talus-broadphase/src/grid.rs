//! The uniform [`BinGrid`] covering one rank's halo-extended sub-domain.

use talus_core::{Axis, Vec3};

use crate::error::BroadphaseError;

/// Uniform 3D grid of bins over a rank's sub-domain plus halo margin.
///
/// Bin count per axis is `max(1, ceil(extent / (2·r)) / binning_factor)`
/// with `r` the maximum interaction radius and `binning_factor` a tunable
/// coarsening factor. Bodies are assigned to the single bin containing
/// their center; a body's sphere may well be larger than one bin, which is
/// why candidate generation always consults the 26 adjacent bins as well.
///
/// Positions slightly outside the grid (a ghost at the far edge of the
/// halo, accumulated float error) are clamped into the boundary bin rather
/// than rejected; the grid is a filter, not a validator.
#[derive(Clone, Debug)]
pub struct BinGrid {
    low: Vec3,
    cell: [f64; 3],
    dims: [usize; 3],
    bins: Vec<Vec<usize>>,
}

impl BinGrid {
    /// Size a grid over `[low, high]` for the given interaction radius.
    ///
    /// # Errors
    ///
    /// Returns [`BroadphaseError`] for inverted bounds, a non-positive
    /// radius, or a zero coarsening factor.
    pub fn new(
        low: Vec3,
        high: Vec3,
        interaction_radius: f64,
        binning_factor: u32,
    ) -> Result<Self, BroadphaseError> {
        if !low.strictly_below(&high) {
            return Err(BroadphaseError::InvalidExtent { low, high });
        }
        if !interaction_radius.is_finite() || interaction_radius <= 0.0 {
            return Err(BroadphaseError::InvalidRadius {
                radius: interaction_radius,
            });
        }
        if binning_factor == 0 {
            return Err(BroadphaseError::ZeroBinningFactor);
        }

        let mut dims = [1usize; 3];
        let mut cell = [0.0f64; 3];
        for axis in Axis::ALL {
            let i = axis.index();
            let extent = high.component(axis) - low.component(axis);
            let fine = (extent / (2.0 * interaction_radius)).ceil() as usize;
            dims[i] = (fine / binning_factor as usize).max(1);
            cell[i] = extent / dims[i] as f64;
        }
        let bins = vec![Vec::new(); dims[0] * dims[1] * dims[2]];
        Ok(Self {
            low,
            cell,
            dims,
            bins,
        })
    }

    /// Bin counts per axis.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of bins.
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    /// Entries binned so far.
    pub fn entry_count(&self) -> usize {
        self.bins.iter().map(Vec::len).sum()
    }

    /// Assign `entry_index` to the bin containing `position`.
    pub fn insert(&mut self, entry_index: usize, position: &Vec3) {
        let bin = self.bin_of(position);
        self.bins[bin].push(entry_index);
    }

    /// Remove all entries, keeping the bin structure.
    pub fn clear(&mut self) {
        for bin in &mut self.bins {
            bin.clear();
        }
    }

    /// 3D cell coordinate of `position`, clamped into the grid.
    pub fn cell_of(&self, position: &Vec3) -> [usize; 3] {
        let mut c = [0usize; 3];
        for axis in Axis::ALL {
            let i = axis.index();
            let offset = position.component(axis) - self.low.component(axis);
            let raw = (offset / self.cell[i]).floor();
            c[i] = (raw.max(0.0) as usize).min(self.dims[i] - 1);
        }
        c
    }

    /// Flat bin index of `position`.
    pub fn bin_of(&self, position: &Vec3) -> usize {
        let c = self.cell_of(position);
        self.flatten(c)
    }

    /// Flatten a 3D cell coordinate (x fastest).
    pub fn flatten(&self, c: [usize; 3]) -> usize {
        (c[2] * self.dims[1] + c[1]) * self.dims[0] + c[0]
    }

    /// Entries in the bin with flat index `bin`.
    pub fn bin(&self, bin: usize) -> &[usize] {
        &self.bins[bin]
    }

    /// Iterate over non-empty bins as `(cell coordinate, entries)`.
    pub fn occupied_bins(&self) -> impl Iterator<Item = ([usize; 3], &[usize])> {
        let dims = self.dims;
        self.bins
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.is_empty())
            .map(move |(flat, b)| {
                let x = flat % dims[0];
                let y = (flat / dims[0]) % dims[1];
                let z = flat / (dims[0] * dims[1]);
                ([x, y, z], b.as_slice())
            })
    }
}
