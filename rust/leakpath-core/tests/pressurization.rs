use std::sync::Arc;

use leakpath_core::block::{BlockDefinition, DoorFamily, MountPoint};
use leakpath_core::grid::{CubeGrid, ShipGrid};
use leakpath_core::models::{Direction, GridCell};
use leakpath_core::orientation::Orientation;
use leakpath_core::pressurization::{block_seals_face, is_face_sealed};

fn panel(normal: Direction) -> Arc<BlockDefinition> {
    Arc::new(BlockDefinition::cube("panel").with_mount_point(MountPoint::full(normal, GridCell::ONE)))
}

#[test]
fn one_sided_panel_seals_from_both_directions() {
    let a = GridCell::new(0, 0, 0);
    let b = GridCell::new(1, 0, 0);
    let mut g = ShipGrid::new("asym");
    // A seals its +X side; B is turned so its sealed side faces -Z instead
    g.place(panel(Direction::Right), a, Orientation::IDENTITY).unwrap();
    g.place(panel(Direction::Right), b, Orientation::new(Direction::Left, Direction::Up).unwrap()).unwrap();

    let block_a = g.block_at(a).unwrap();
    let block_b = g.block_at(b).unwrap();
    assert!(block_seals_face(block_a, a, Direction::Right));
    assert!(!block_seals_face(block_b, b, Direction::Left));
    assert!(block_seals_face(block_b, b, Direction::Forward));

    assert!(is_face_sealed(&g, a, Direction::Right));
    assert!(is_face_sealed(&g, b, Direction::Left));

    g.remove_at(a).unwrap();
    assert!(!is_face_sealed(&g, b, Direction::Left));
    assert!(!is_face_sealed(&g, a, Direction::Right));
}

#[test]
fn sealing_is_symmetric_across_a_face() {
    let mut g = ShipGrid::new("mix");
    let defs = [
        panel(Direction::Forward),
        panel(Direction::Up),
        Arc::new(BlockDefinition::cube("armor").with_full_mount_points()),
        Arc::new(BlockDefinition::cube("grate").with_airtight(false)),
        Arc::new(BlockDefinition::cube("door").with_door(DoorFamily::Slide)),
    ];
    let orientations: Vec<Orientation> = Orientation::all().collect();
    let mut i = 0;
    for x in 0..3 {
        for y in 0..3 {
            for z in 0..3 {
                if (x + y + z) % 4 == 3 {
                    continue;
                }
                let def = Arc::clone(&defs[i % defs.len()]);
                g.place(def, GridCell::new(x, y, z), orientations[(i * 7) % orientations.len()]).unwrap();
                i += 1;
            }
        }
    }
    let bounds = g.bounds().unwrap().inflate(1);
    for cell in bounds.cells() {
        for d in Direction::ALL {
            let next = cell + d;
            assert_eq!(
                is_face_sealed(&g, cell, d),
                is_face_sealed(&g, next, d.opposite()),
                "face {} -> {}",
                cell,
                next
            );
        }
    }
}

#[test]
fn door_frame_sides_stay_sealed_by_the_wall() {
    let door_cell = GridCell::new(1, 0, 0);
    let mut g = ShipGrid::new("frame");
    let armor = Arc::new(BlockDefinition::cube("armor").with_full_mount_points());
    let door = Arc::new(
        BlockDefinition::cube("door")
            .with_door(DoorFamily::Standard)
            .with_mount_point(MountPoint::full(Direction::Left, GridCell::ONE))
            .with_mount_point(MountPoint::full(Direction::Right, GridCell::ONE)),
    );
    g.place(Arc::clone(&armor), GridCell::new(0, 0, 0), Orientation::IDENTITY).unwrap();
    g.place(Arc::clone(&armor), GridCell::new(2, 0, 0), Orientation::IDENTITY).unwrap();
    let id = g.place(door, door_cell, Orientation::IDENTITY).unwrap();

    g.set_closed_ratio(id, 0.0).unwrap();
    // panel faces open, frame faces held by the wall
    assert!(!is_face_sealed(&g, door_cell, Direction::Forward));
    assert!(!is_face_sealed(&g, door_cell, Direction::Backward));
    assert!(is_face_sealed(&g, door_cell, Direction::Left));
    assert!(is_face_sealed(&g, door_cell, Direction::Right));

    g.set_closed_ratio(id, 1.0).unwrap();
    assert!(is_face_sealed(&g, door_cell, Direction::Forward));
    assert!(is_face_sealed(&g, door_cell, Direction::Up));
    // the door itself never claims its frame sides
    let block = g.block(id).unwrap();
    assert!(!block_seals_face(block, door_cell, Direction::Left));
}

#[test]
fn multi_cell_block_seals_only_its_outer_shell() {
    let mut g = ShipGrid::new("tank");
    let tank = BlockDefinition::try_new("tank", GridCell::new(1, 1, 3)).unwrap().with_full_mount_points();
    // local +Z length laid along world X
    let orientation = Orientation::new(Direction::Right, Direction::Up).unwrap();
    g.place(Arc::new(tank), GridCell::ZERO, orientation).unwrap();

    assert!(!is_face_sealed(&g, GridCell::new(0, 0, 0), Direction::Right));
    assert!(!is_face_sealed(&g, GridCell::new(1, 0, 0), Direction::Right));
    assert!(is_face_sealed(&g, GridCell::new(2, 0, 0), Direction::Right));
    assert!(is_face_sealed(&g, GridCell::new(0, 0, 0), Direction::Left));
    for x in 0..3 {
        assert!(is_face_sealed(&g, GridCell::new(x, 0, 0), Direction::Up));
        assert!(g.is_face_sealed(GridCell::new(x, 0, 0), Direction::Forward));
    }
}
