use glam::IVec2;
use pacman_core::{
    constants::{speed, MapTile, CELL_UNITS, PLAYER_SPAWN, TUNNEL_LEFT_X, TUNNEL_RIGHT_X, TUNNEL_ROW_Y},
    events::GameCommand,
    map::{builder::Map, direction::Direction},
    systems::{advance, GameStage, MoveOutcome, Position, TurnPolicy, Velocity},
};
use rand::{rngs::SmallRng, seq::IndexedRandom, SeedableRng};
use speculoos::prelude::*;

mod common;

/// Every cell an agent at `position` overlaps.
fn overlapped_cells(position: IVec2) -> Vec<IVec2> {
    let xs = [position.x.div_euclid(CELL_UNITS), (position.x + CELL_UNITS - 1).div_euclid(CELL_UNITS)];
    let ys = [position.y.div_euclid(CELL_UNITS), (position.y + CELL_UNITS - 1).div_euclid(CELL_UNITS)];
    xs.iter().flat_map(|&x| ys.iter().map(move |&y| IVec2::new(x, y))).collect()
}

fn assert_on_open_grid(map: &Map, position: IVec2, who: &str) {
    assert!(
        position.x.rem_euclid(CELL_UNITS) == 0 || position.y.rem_euclid(CELL_UNITS) == 0,
        "{who} left the grid lines at {position}"
    );
    for cell in overlapped_cells(position) {
        assert_ne!(map.tile(cell), Some(MapTile::Wall), "{who} overlaps a wall at {cell} from {position}");
    }
}

#[test]
fn test_agents_stay_on_grid_and_out_of_walls() {
    let mut controller = common::playing_controller(common::SEED);
    let mut rng = SmallRng::seed_from_u64(7);

    for tick in 0..3000 {
        if tick % 11 == 0 {
            let direction = *Direction::DIRECTIONS.choose(&mut rng).unwrap();
            controller.send(GameCommand::MovePlayer(direction));
        }
        if controller.stage() == GameStage::GameOver {
            controller.send(GameCommand::StartNewGame);
        }
        controller.tick().unwrap();

        let snapshot = controller.snapshot();
        let map = controller.map();
        let player = snapshot.player.expect("player is always present");
        assert_on_open_grid(map, player.position, "player");
        for ghost in &snapshot.ghosts {
            assert_on_open_grid(map, ghost.agent.position, &ghost.ghost.to_string());
        }
    }
}

#[test]
fn test_player_blocked_by_wall_stops() {
    let map = Map::reference().unwrap();
    // Directly below the spawn is a wall.
    let velocity = Velocity {
        direction: None,
        next_direction: Some(Direction::Down),
        speed: speed::PLAYER,
    };
    let outcome = advance(&map, PLAYER_SPAWN, &velocity, TurnPolicy::Player);

    // The turn is refused, so the stationary player stays put.
    assert_that(&outcome).is_equal_to(MoveOutcome::Moved {
        from: PLAYER_SPAWN,
        to: PLAYER_SPAWN,
        direction: None,
    });

    let heading_up = Velocity {
        direction: Some(Direction::Up),
        next_direction: Some(Direction::Up),
        speed: speed::PLAYER,
    };
    assert_that(&advance(&map, PLAYER_SPAWN, &heading_up, TurnPolicy::Player)).is_equal_to(MoveOutcome::Blocked);
}

#[test]
fn test_tunnel_round_trip() {
    let map = Map::reference().unwrap();
    let start = IVec2::new(130, TUNNEL_ROW_Y);
    let mut position = start;
    let mut velocity = Velocity {
        direction: Some(Direction::Right),
        next_direction: Some(Direction::Right),
        speed: speed::PLAYER,
    };

    let step = |position: &mut IVec2, velocity: &mut Velocity| match advance(&map, *position, velocity, TurnPolicy::Player) {
        MoveOutcome::Moved { to, direction, .. } => {
            *position = to;
            velocity.direction = direction;
        }
        MoveOutcome::Blocked => panic!("blocked in the tunnel at {position}"),
    };

    // Out through the right edge.
    for _ in 0..30 {
        step(&mut position, &mut velocity);
        assert_that(&position.y).is_equal_to(TUNNEL_ROW_Y);
    }
    assert_that(&position.x).is_equal_to(TUNNEL_LEFT_X);

    // Reverse and come back through the left edge.
    velocity.next_direction = Some(Direction::Left);
    step(&mut position, &mut velocity);
    assert_that(&position.x).is_equal_to(TUNNEL_RIGHT_X);

    for _ in 0..30 {
        step(&mut position, &mut velocity);
    }
    assert_that(&position).is_equal_to(start);
}

#[test]
fn test_position_cell_rounds_to_nearest() {
    assert_that(&Position(IVec2::new(94, 160)).cell()).is_equal_to(IVec2::new(9, 16));
    assert_that(&Position(IVec2::new(95, 160)).cell()).is_equal_to(IVec2::new(10, 16));
    assert_that(&Position(IVec2::new(-5, 100)).cell()).is_equal_to(IVec2::new(0, 10));
}
