use crate::models::{BoundingBox, GridCell};

/// Signed distance from `cell` to the nearest face of `bounds`: the
/// smallest per-axis gap to either side. Zero on the box surface, negative
/// once outside on any axis (-1 for the one-cell shell around the box).
pub fn distance_to_box(cell: GridCell, bounds: &BoundingBox) -> i32 {
    (0..3)
        .map(|axis| {
            let c = cell.axis(axis);
            (bounds.max.axis(axis) - c).min(c - bounds.min.axis(axis))
        })
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_signed() {
        let b = BoundingBox::new(GridCell::ZERO, GridCell::new(6, 6, 6));
        assert_eq!(distance_to_box(GridCell::new(3, 3, 3), &b), 3);
        assert_eq!(distance_to_box(GridCell::new(3, 1, 3), &b), 1);
        assert_eq!(distance_to_box(GridCell::new(6, 3, 3), &b), 0);
        assert_eq!(distance_to_box(GridCell::new(7, 3, 3), &b), -1);
        assert_eq!(distance_to_box(GridCell::new(3, -2, 3), &b), -2);
    }

    #[test]
    fn one_step_changes_distance_by_at_most_one() {
        let b = BoundingBox::new(GridCell::new(-2, 0, 1), GridCell::new(4, 3, 9));
        for cell in b.inflate(2).cells() {
            let h = distance_to_box(cell, &b);
            for d in crate::models::Direction::ALL {
                assert!((distance_to_box(cell + d, &b) - h).abs() <= 1);
            }
        }
    }
}
