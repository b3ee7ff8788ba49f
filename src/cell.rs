use s2::cell::Cell;
use s2::cellid::CellID;
use s2::latlng::LatLng;

use crate::error::{Error, Result};

/// Deepest level of the S2 hierarchy.
pub const MAX_LEVEL: u64 = 30;

const NUM_FACES: u64 = 6;
const POS_BITS: u64 = 2 * MAX_LEVEL + 1;

/**
 * A cell in the S2 hierarchy, addressed by its 64-bit id. The bit layout is
 * face (3 bits) followed by the Hilbert-curve position terminated by a
 * single set bit, so level extraction, parent walks, child expansion, and
 * level-order iteration are plain integer arithmetic on the id. Geometric
 * questions (vertices, areas, neighbors, leaf lookup from a coordinate) go
 * through the s2 library.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(u64);

impl CellId {
    pub fn from_id(id: u64) -> CellId {
        CellId(id)
    }

    /// The leaf cell containing the given coordinate, in degrees.
    pub fn from_point(lat: f64, lng: f64) -> CellId {
        CellId(CellID::from(LatLng::from_degrees(lat, lng)).0)
    }

    pub fn id(self) -> u64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.face() < NUM_FACES && (self.lsb() & 0x1555_5555_5555_5555) != 0
    }

    pub fn face(self) -> u64 {
        self.0 >> POS_BITS
    }

    pub fn level(self) -> u64 {
        debug_assert!(self.0 != 0);
        MAX_LEVEL - u64::from(self.0.trailing_zeros() >> 1)
    }

    fn lsb(self) -> u64 {
        self.0 & self.0.wrapping_neg()
    }

    fn lsb_for_level(level: u64) -> u64 {
        1 << (2 * (MAX_LEVEL - level))
    }

    /**
     * The ancestor of this cell at `target_level`. Walking to the cell's own
     * level is the identity; walking below it is an error.
     */
    pub fn parent_at(self, target_level: u64) -> Result<CellId> {
        let level = self.level();
        if target_level > level {
            return Err(Error::InvalidLevel(format!(
                "target level {target_level} is below cell level {level}"
            )));
        }
        let lsb = CellId::lsb_for_level(target_level);
        Ok(CellId((self.0 & lsb.wrapping_neg()) | lsb))
    }

    /// The immediate parent, one level up.
    pub fn parent(self) -> Result<CellId> {
        match self.level().checked_sub(1) {
            Some(target) => self.parent_at(target),
            None => Err(Error::InvalidLevel(
                "cell at level 0 has no parent".to_string(),
            )),
        }
    }

    /// The four children one level down. Callers never subdivide leaves.
    pub fn children(self) -> [CellId; 4] {
        debug_assert!(self.level() < MAX_LEVEL);
        let child_lsb = self.lsb() >> 2;
        let first = self.0 - self.lsb() + child_lsb;
        [
            CellId(first),
            CellId(first + 2 * child_lsb),
            CellId(first + 4 * child_lsb),
            CellId(first + 6 * child_lsb),
        ]
    }

    /// Whether `other` is this cell or one of its descendants.
    pub fn contains(self, other: CellId) -> bool {
        let lsb = self.lsb();
        self.0 - (lsb - 1) <= other.0 && other.0 <= self.0 + (lsb - 1)
    }

    /// The six level-0 face cells.
    pub fn face_cells() -> [CellId; 6] {
        let lsb = CellId::lsb_for_level(0);
        [0, 1, 2, 3, 4, 5].map(|face: u64| CellId((face << POS_BITS) | lsb))
    }

    /// First cell of the level-order traversal of `level`.
    pub fn begin(level: u64) -> CellId {
        CellId(CellId::lsb_for_level(level))
    }

    /// One-past-the-end sentinel of the traversal; not a valid cell.
    pub fn end(level: u64) -> CellId {
        CellId((NUM_FACES << POS_BITS) | CellId::lsb_for_level(level))
    }

    /// The following cell at the same level, possibly the `end` sentinel.
    pub fn next(self) -> CellId {
        CellId(self.0.wrapping_add(self.lsb() << 1))
    }

    /// Iterates every cell of a level, across all six faces.
    pub fn iter_at_level(level: u64) -> CellRange {
        CellRange {
            current: CellId::begin(level),
            end: CellId::end(level),
        }
    }

    /// Edge and vertex neighbors at the requested level, S2 semantics.
    pub fn neighbors_at(self, level: u64) -> Vec<CellId> {
        CellID(self.0)
            .all_neighbors(level)
            .into_iter()
            .map(|n| CellId(n.0))
            .collect()
    }

    pub fn token(self) -> String {
        CellID(self.0).to_token()
    }

    /// The geometric cell, for vertex and area queries.
    pub fn to_cell(self) -> Cell {
        Cell::from(CellID(self.0))
    }
}

/// Level-order cell iterator between `begin` and `end` bounds.
#[derive(Debug, Clone)]
pub struct CellRange {
    current: CellId,
    end: CellId,
}

impl Iterator for CellRange {
    type Item = CellId;

    fn next(&mut self) -> Option<CellId> {
        if self.current == self.end {
            return None;
        }
        let cell = self.current;
        self.current = self.current.next();
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_roundtrips_through_the_bit_layout() {
        let leaf = CellId::from_point(34.05, -118.25);
        assert_eq!(leaf.level(), MAX_LEVEL);
        for level in (0..=MAX_LEVEL).rev() {
            let ancestor = leaf.parent_at(level).unwrap();
            assert_eq!(ancestor.level(), level);
            assert!(ancestor.contains(leaf));
        }
    }

    #[test]
    fn parent_at_own_level_is_identity() {
        let cell = CellId::from_point(10.0, 10.0).parent_at(8).unwrap();
        assert_eq!(cell.parent_at(8).unwrap(), cell);
    }

    #[test]
    fn parent_below_level_zero_is_rejected() {
        let face = CellId::face_cells()[0];
        assert!(face.parent().is_err());
        assert!(face.parent_at(1).is_err());
    }

    #[test]
    fn children_partition_their_parent() {
        let cell = CellId::from_point(48.85, 2.35).parent_at(5).unwrap();
        let children = cell.children();
        for child in children {
            assert_eq!(child.level(), 6);
            assert!(cell.contains(child));
            assert_eq!(child.parent().unwrap(), cell);
        }
        assert_eq!(children[3].next(), cell.next().children()[0]);
    }

    #[test]
    fn level_zero_iteration_yields_the_six_faces() {
        let cells: Vec<CellId> = CellId::iter_at_level(0).collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells, CellId::face_cells().to_vec());
        for (face, cell) in cells.iter().enumerate() {
            assert_eq!(cell.face(), face as u64);
            assert!(cell.is_valid());
        }
    }

    #[test]
    fn level_two_iteration_covers_every_face_quadrant() {
        let cells: Vec<CellId> = CellId::iter_at_level(2).collect();
        assert_eq!(cells.len(), 6 * 16);
        assert!(cells.iter().all(|c| c.level() == 2 && c.is_valid()));
    }

    #[test]
    fn neighbors_at_same_level_touch_the_cell() {
        let cell = CellId::from_point(34.05, -118.25).parent_at(10).unwrap();
        let neighbors = cell.neighbors_at(10);
        assert_eq!(neighbors.len(), 8);
        assert!(neighbors.iter().all(|n| n.level() == 10));
        assert!(!neighbors.contains(&cell));
    }
}
