use std::collections::VecDeque;

use crate::cell::{CellId, MAX_LEVEL};
use crate::region::{CellRegion, CellRelation};

/// Default cell budget, matching the stock S2 region coverer.
pub const DEFAULT_MAX_CELLS: usize = 8;

/**
 * A bounded region coverer. Descends the cell hierarchy from the six face
 * cells, refining every cell that intersects the region until it is fully
 * contained, the level range is exhausted, or the cell budget runs out.
 * Levels outside `[min_level, max_level]` are never emitted.
 */
#[derive(Debug, Clone)]
pub struct ConstrainedCoverer {
    min_level: u8,
    max_level: u8,
    max_cells: usize,
}

impl Default for ConstrainedCoverer {
    fn default() -> ConstrainedCoverer {
        ConstrainedCoverer {
            min_level: 0,
            max_level: MAX_LEVEL as u8,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

impl ConstrainedCoverer {
    /**
     * A coverer constrained to `[min_level, max_level]`. A negative bound is
     * ignored and the corresponding default (0 or 30) stays in place.
     */
    pub fn new(min_level: i32, max_level: i32) -> ConstrainedCoverer {
        let mut coverer = ConstrainedCoverer::default();
        if max_level >= 0 {
            coverer.set_max_level(max_level as u8);
        }
        if min_level >= 0 {
            coverer.set_min_level(min_level as u8);
        }
        coverer
    }

    pub fn min_level(&self) -> u8 {
        self.min_level
    }

    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    pub fn max_cells(&self) -> usize {
        self.max_cells
    }

    pub fn set_min_level(&mut self, level: u8) {
        assert!(level <= self.max_level, "min_level above max_level");
        self.min_level = level;
    }

    pub fn set_max_level(&mut self, level: u8) {
        assert!(level as u64 <= MAX_LEVEL, "level above the S2 hierarchy");
        assert!(level >= self.min_level, "max_level below min_level");
        self.max_level = level;
    }

    pub fn set_max_cells(&mut self, max_cells: usize) {
        assert!(max_cells >= 1, "coverer needs a budget of at least one cell");
        self.max_cells = max_cells;
    }

    /**
     * An exterior covering: cells whose union covers every point of the
     * region. Cells still intersecting the boundary at `max_level` are kept,
     * so individual cells may overhang.
     */
    pub fn covering(&self, region: &dyn CellRegion) -> Vec<CellId> {
        let min = u64::from(self.min_level);
        let max = u64::from(self.max_level);
        let mut result = Vec::new();
        let mut queue: VecDeque<CellId> = CellId::face_cells().into();
        while let Some(cell) = queue.pop_front() {
            let relation = region.relation(cell);
            if relation == CellRelation::Disjoint {
                continue;
            }
            let level = cell.level();
            if level < min {
                queue.extend(cell.children());
            } else if relation == CellRelation::Contained
                || level == max
                || self.budget_spent(&result, &queue)
            {
                result.push(cell);
            } else {
                queue.extend(cell.children());
            }
        }
        result
    }

    /**
     * An interior covering: pairwise-disjoint cells lying entirely inside
     * the region. Boundary cells that are still not contained at `max_level`
     * are dropped, as are subtrees the budget cannot afford to refine.
     */
    pub fn interior_covering(&self, region: &dyn CellRegion) -> Vec<CellId> {
        let min = u64::from(self.min_level);
        let max = u64::from(self.max_level);
        let mut result = Vec::new();
        let mut queue: VecDeque<CellId> = CellId::face_cells().into();
        while let Some(cell) = queue.pop_front() {
            let relation = region.relation(cell);
            if relation == CellRelation::Disjoint {
                continue;
            }
            let level = cell.level();
            if relation == CellRelation::Contained && level >= min {
                result.push(cell);
            } else if level < max && !self.budget_spent(&result, &queue) {
                queue.extend(cell.children());
            }
        }
        result
    }

    // Subdividing swaps one candidate for four; refuse once the emitted and
    // pending counts leave no room for that.
    fn budget_spent(&self, result: &[CellId], queue: &VecDeque<CellId>) -> bool {
        result.len() + queue.len() + 3 >= self.max_cells
    }
}

#[cfg(test)]
mod tests {
    use geo_types::polygon;

    use super::*;
    use crate::region::PolygonRegion;

    #[test]
    fn constructor_applies_and_reports_bounds() {
        let coverer = ConstrainedCoverer::new(9, 10);
        assert_eq!(coverer.min_level(), 9);
        assert_eq!(coverer.max_level(), 10);
        assert_eq!(coverer.max_cells(), DEFAULT_MAX_CELLS);
    }

    #[test]
    fn negative_bounds_fall_back_to_defaults() {
        let coverer = ConstrainedCoverer::new(-1, 12);
        assert_eq!(coverer.min_level(), 0);
        assert_eq!(coverer.max_level(), 12);

        let coverer = ConstrainedCoverer::new(3, -1);
        assert_eq!(coverer.min_level(), 3);
        assert_eq!(coverer.max_level(), MAX_LEVEL as u8);
    }

    #[test]
    fn homogeneous_covering_stays_at_the_requested_level() {
        let region = PolygonRegion::from_polygon(
            &polygon![
                (x: 5.0, y: 5.0),
                (x: 15.0, y: 5.0),
                (x: 15.0, y: 15.0),
                (x: 5.0, y: 15.0),
            ],
            1e-1,
        );
        let mut coverer = ConstrainedCoverer::new(4, 4);
        coverer.set_max_cells(1_000);
        let covering = coverer.covering(&region);
        assert!(!covering.is_empty());
        assert!(covering.iter().all(|c| c.level() == 4));
    }

    #[test]
    fn covering_respects_level_bounds() {
        let region = PolygonRegion::from_polygon(
            &polygon![
                (x: 5.0, y: 5.0),
                (x: 15.0, y: 5.0),
                (x: 15.0, y: 15.0),
                (x: 5.0, y: 15.0),
            ],
            1e-1,
        );
        let mut coverer = ConstrainedCoverer::new(2, 6);
        coverer.set_max_cells(10_000);
        let covering = coverer.covering(&region);
        assert!(!covering.is_empty());
        assert!(covering
            .iter()
            .all(|c| (2..=6).contains(&(c.level() as u8))));
    }

    #[test]
    fn interior_cells_are_disjoint_and_inside() {
        let polygon = polygon![
            (x: 5.0, y: 5.0),
            (x: 15.0, y: 5.0),
            (x: 15.0, y: 15.0),
            (x: 5.0, y: 15.0),
        ];
        let region = PolygonRegion::from_polygon(&polygon, 1e-1);
        let mut coverer = ConstrainedCoverer::new(0, 7);
        coverer.set_max_cells(10_000);
        let interior = coverer.interior_covering(&region);
        assert!(!interior.is_empty());
        for (i, a) in interior.iter().enumerate() {
            assert!(a.level() <= 7);
            assert_eq!(region.relation(*a), CellRelation::Contained);
            for b in &interior[i + 1..] {
                assert!(!a.contains(*b) && !b.contains(*a));
            }
        }
    }
}
