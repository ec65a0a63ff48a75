//! Expanding pulses and the pixel-space transform they are tested in.

use glam::Vec2;
use gridpulse_core::{
    CellCoord, BURST_RADIUS, CELL_SIZE, PULSE_OVERLAP_SLACK, PULSE_RADIUS_PER_ENERGY,
    PULSE_START_RADIUS,
};

/// Pixel position of the cell's upper-left corner.
#[must_use]
fn cell_origin(cell: CellCoord) -> Vec2 {
    Vec2::new(
        (cell.column() * CELL_SIZE) as f32,
        (cell.row() * CELL_SIZE) as f32,
    )
}

/// Pixel position of the cell's centre.
#[must_use]
pub fn cell_center(cell: CellCoord) -> Vec2 {
    cell_origin(cell) + Vec2::splat(CELL_SIZE as f32 / 2.0)
}

/// Role of a pulse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PulseKind {
    /// The player's pulse; destroys overlapping enemies while it expands.
    Charge,
    /// Cosmetic ring shown on kills and on death.
    Burst,
}

/// Result of growing a pulse by one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PulseProgress {
    /// The radius grew and the pulse stays active.
    Growing,
    /// The radius had already reached its target; the pulse is finished.
    Completed,
}

/// Expanding circle anchored at a fixed pixel centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
    kind: PulseKind,
    center: Vec2,
    radius: u32,
    target_radius: u32,
}

impl Pulse {
    /// Creates a pulse of any kind starting at [`PULSE_START_RADIUS`].
    #[must_use]
    pub const fn new(kind: PulseKind, center: Vec2, target_radius: u32) -> Self {
        Self {
            kind,
            center,
            radius: PULSE_START_RADIUS,
            target_radius,
        }
    }

    /// Player pulse centred on `origin`, sized by the energy spent.
    #[must_use]
    pub fn charge(origin: CellCoord, energy: u32) -> Self {
        Self::new(
            PulseKind::Charge,
            cell_center(origin),
            energy.saturating_mul(PULSE_RADIUS_PER_ENERGY),
        )
    }

    /// Cosmetic burst centred on `origin`.
    #[must_use]
    pub fn burst(origin: CellCoord) -> Self {
        Self::new(PulseKind::Burst, cell_center(origin), BURST_RADIUS)
    }

    /// Role of the pulse.
    #[must_use]
    pub const fn kind(&self) -> PulseKind {
        self.kind
    }

    /// Pixel centre of the pulse.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Current radius in pixels.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Radius in pixels at which the pulse completes.
    #[must_use]
    pub const fn target_radius(&self) -> u32 {
        self.target_radius
    }

    /// Grows the radius by one pixel, or reports completion once the target
    /// was reached on an earlier frame.
    pub fn step(&mut self) -> PulseProgress {
        if self.radius < self.target_radius {
            self.radius += 1;
            PulseProgress::Growing
        } else {
            PulseProgress::Completed
        }
    }

    /// Reports whether `point` lies within `radius + 2` pixels of the centre.
    /// The boundary is inclusive.
    #[must_use]
    pub fn overlaps(&self, point: Vec2) -> bool {
        let reach = self.radius.saturating_add(PULSE_OVERLAP_SLACK) as f32;
        self.center.distance(point) <= reach
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_center_sits_half_a_cell_inside() {
        assert_eq!(cell_center(CellCoord::new(0, 0)), Vec2::new(16.0, 16.0));
        assert_eq!(cell_center(CellCoord::new(3, 2)), Vec2::new(112.0, 80.0));
    }

    #[test]
    fn charge_grows_to_energy_scaled_target() {
        let mut pulse = Pulse::charge(CellCoord::new(2, 2), 1);
        assert_eq!(pulse.target_radius(), 10);
        assert_eq!(pulse.radius(), 2);

        for expected in 3..=10 {
            assert_eq!(pulse.step(), PulseProgress::Growing);
            assert_eq!(pulse.radius(), expected);
        }
        assert_eq!(pulse.step(), PulseProgress::Completed);
        assert_eq!(pulse.radius(), 10);
    }

    #[test]
    fn empty_charge_completes_immediately() {
        let mut pulse = Pulse::charge(CellCoord::new(2, 2), 0);
        assert_eq!(pulse.step(), PulseProgress::Completed);
    }

    #[test]
    fn overlap_boundary_is_inclusive() {
        let mut pulse = Pulse::new(PulseKind::Charge, Vec2::ZERO, 3);
        assert_eq!(pulse.step(), PulseProgress::Growing);
        assert_eq!(pulse.radius(), 3);

        // 3-4-5 triangle: exactly radius + 2 away.
        assert!(pulse.overlaps(Vec2::new(3.0, 4.0)));
        assert!(!pulse.overlaps(Vec2::new(3.0, 4.01)));
        assert!(pulse.overlaps(Vec2::new(0.0, 4.0)));
    }
}
