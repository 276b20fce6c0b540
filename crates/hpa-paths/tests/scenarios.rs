use hpa_core::{CellGrid, CellKind, Point};
use hpa_paths::{HierarchicalPathfinder, HpaConfig, PathError, Side, path_weight};

fn entrance_pairs_between(hpa: &HierarchicalPathfinder, cluster: Point, side: Side) -> Vec<(Point, Point)> {
    let c = hpa.clusters().get(cluster).unwrap();
    c.border_line(side)
        .filter_map(|(near, far)| {
            let a = hpa.graph().node_at(near)?;
            let b = hpa.graph().node_at(far)?;
            hpa.graph().has_connection(a, b).then_some((near, far))
        })
        .collect()
}

#[test]
fn single_opening_in_a_wall_column() {
    let mut grid = CellGrid::new(9, 9);
    for y in 0..9 {
        if y != 1 {
            grid.set_kind(Point::new(3, y), CellKind::Wall);
        }
    }
    let mut hpa = HierarchicalPathfinder::build(grid, HpaConfig::default()).unwrap();
    assert_eq!(hpa.cluster_size(), 3);

    let mut pairs = Vec::new();
    for y in 0..3 {
        pairs.extend(entrance_pairs_between(&hpa, Point::new(0, y), Side::Right));
    }
    assert_eq!(pairs, vec![(Point::new(2, 1), Point::new(3, 1))]);

    let path = hpa
        .find_path_hierarchical(Point::new(0, 0), Point::new(8, 8))
        .unwrap();
    assert!(path.contains(&Point::new(3, 1)));
    let i = path.iter().position(|&p| p == Point::new(3, 1)).unwrap();
    assert!(path[i + 1].x >= 4);
}

#[test]
fn wide_opening_gets_entrances_at_both_ends() {
    let mut grid = CellGrid::new(18, 18);
    for y in (0..2).chain(7..18) {
        grid.set_kind(Point::new(9, y), CellKind::Wall);
    }
    let config = HpaConfig {
        resolution: 2,
        ..HpaConfig::default()
    };
    let hpa = HierarchicalPathfinder::build(grid, config).unwrap();
    assert_eq!(hpa.cluster_size(), 9);
    let pairs = entrance_pairs_between(&hpa, Point::new(0, 0), Side::Right);
    assert_eq!(
        pairs,
        vec![
            (Point::new(8, 2), Point::new(9, 2)),
            (Point::new(8, 6), Point::new(9, 6)),
        ]
    );
    assert!(entrance_pairs_between(&hpa, Point::new(0, 1), Side::Right).is_empty());
}

#[test]
fn low_level_boundaries() {
    let grid = CellGrid::new(5, 5);
    let mut hpa = HierarchicalPathfinder::new(grid, HpaConfig::default()).unwrap();
    let b = hpa.grid().bounds();
    let p = Point::new(2, 2);
    assert_eq!(hpa.find_path_low_level(p, p, b), Err(PathError::SameCell(p)));
    for bad in [Point::new(-1, 2), Point::new(5, 0), Point::new(0, 5)] {
        assert_eq!(hpa.find_path_low_level(p, bad, b), Err(PathError::OutOfBounds(bad)));
        assert_eq!(hpa.find_path_low_level(bad, p, b), Err(PathError::OutOfBounds(bad)));
    }
    let path = hpa.find_path_low_level(Point::new(0, 0), Point::new(4, 1), b).unwrap();
    assert_eq!(path.first(), Some(&Point::new(0, 0)));
    assert_eq!(path.last(), Some(&Point::new(4, 1)));
    assert!((path_weight(&path) - (3.0 + std::f32::consts::SQRT_2)).abs() < 1e-4);
}

#[test]
fn walled_start_is_blocked_not_unreachable() {
    let grid = CellGrid::from_ascii(
        "\
......
......
......
......
......
#.....",
    )
    .unwrap();
    let config = HpaConfig {
        resolution: 2,
        ..HpaConfig::default()
    };
    let mut hpa = HierarchicalPathfinder::build(grid, config).unwrap();
    let wall = Point::new(0, 0);
    assert_eq!(
        hpa.find_path_hierarchical(wall, Point::new(5, 5)),
        Err(PathError::Blocked(wall))
    );
    assert_eq!(
        hpa.find_path_hierarchical(Point::new(5, 5), wall),
        Err(PathError::Blocked(wall))
    );
}

#[test]
fn unreachable_endpoint_reports_no_path() {
    // (1,1) is sealed inside the bottom-left cluster.
    let grid = CellGrid::from_ascii(
        "\
......
......
......
###...
#.#...
###...",
    )
    .unwrap();
    let config = HpaConfig {
        resolution: 2,
        ..HpaConfig::default()
    };
    let mut hpa = HierarchicalPathfinder::build(grid, config).unwrap();
    let nodes = hpa.graph().len();
    let connections = hpa.graph().connection_count();
    let err = hpa
        .find_path_hierarchical(Point::new(1, 1), Point::new(5, 5))
        .unwrap_err();
    assert!(err.is_no_path());
    assert_eq!(hpa.graph().len(), nodes);
    assert_eq!(hpa.graph().connection_count(), connections);
}
