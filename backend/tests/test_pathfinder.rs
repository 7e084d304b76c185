//! Integration tests for the Pathfinder
//!
//! A* must return shortest 8-connected paths, respect obstacles and the
//! confinement column, and agree with the greedy mover on open ground.

use robot_mission_core_rs::{Grid, Pathfinder, Position};

fn open_grid(width: i32, height: i32) -> Grid {
    Grid::new(width, height, [], Position::new(width - 1, 0))
}

#[test]
fn test_diagonal_path_on_open_grid() {
    let grid = open_grid(5, 5);
    let finder = Pathfinder::new(&grid);

    let path = finder.astar(Position::new(0, 0), Position::new(4, 4));
    assert_eq!(path.len(), 4);
    assert_eq!(path.last(), Some(&Position::new(4, 4)));
    assert!(!path.contains(&Position::new(0, 0)));
}

#[test]
fn test_path_length_matches_chebyshev_without_obstacles() {
    let grid = open_grid(9, 6);
    let finder = Pathfinder::new(&grid);

    for (start, goal) in [
        (Position::new(0, 0), Position::new(8, 5)),
        (Position::new(3, 5), Position::new(7, 0)),
        (Position::new(8, 2), Position::new(0, 3)),
    ] {
        assert_eq!(
            finder.path_len(start, goal),
            Some(start.chebyshev(goal) as usize)
        );
    }
}

#[test]
fn test_detours_around_wall() {
    // Wall on column 2 with a single gap at the bottom.
    let wall = (0..4).map(|y| Position::new(2, y));
    let grid = Grid::new(5, 5, wall, Position::new(4, 0));
    let finder = Pathfinder::new(&grid);

    let path = finder.astar(Position::new(0, 0), Position::new(4, 0));
    assert!(path.contains(&Position::new(2, 4)));
    for step in &path {
        assert!(grid.is_passable(*step));
    }
    let mut prev = Position::new(0, 0);
    for step in &path {
        assert_eq!(prev.chebyshev(*step), 1);
        prev = *step;
    }
}

#[test]
fn test_unreachable_goal_yields_empty_path() {
    let wall = (0..5).map(|y| Position::new(2, y));
    let grid = Grid::new(5, 5, wall, Position::new(4, 0));
    let finder = Pathfinder::new(&grid);

    assert!(finder.astar(Position::new(0, 0), Position::new(4, 4)).is_empty());
    assert_eq!(finder.path_len(Position::new(0, 0), Position::new(4, 4)), None);
}

#[test]
fn test_goal_equal_to_start() {
    let grid = open_grid(5, 5);
    let finder = Pathfinder::new(&grid);
    assert!(finder.astar(Position::new(2, 2), Position::new(2, 2)).is_empty());
    assert_eq!(finder.path_len(Position::new(2, 2), Position::new(2, 2)), Some(0));
}

#[test]
fn test_confined_search_stays_west() {
    let grid = open_grid(9, 3);
    let finder = Pathfinder::confined(&grid, 2);

    assert!(finder.astar(Position::new(0, 0), Position::new(5, 0)).is_empty());
    let path = finder.astar(Position::new(0, 0), Position::new(2, 2));
    assert_eq!(path.len(), 2);
    assert!(path.iter().all(|step| step.x <= 2));
}

#[test]
fn test_greedy_step_reduces_distance() {
    let grid = open_grid(9, 9);
    let finder = Pathfinder::new(&grid);
    let target = Position::new(7, 2);

    let mut pos = Position::new(0, 8);
    let mut steps = 0;
    while pos != target {
        let next = finder.step_towards(pos, target).unwrap();
        assert!(next.chebyshev(target) < pos.chebyshev(target));
        pos = next;
        steps += 1;
    }
    assert_eq!(steps, 7);
}

#[test]
fn test_greedy_stalls_behind_wall() {
    // Target straight east behind a full-height wall.
    let wall = (0..3).map(|y| Position::new(1, y));
    let grid = Grid::new(3, 3, wall, Position::new(2, 0));
    let finder = Pathfinder::new(&grid);

    assert_eq!(finder.step_towards(Position::new(0, 1), Position::new(2, 1)), None);
}
