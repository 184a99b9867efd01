use std::time::Duration;

use pipeflow_core::{Direction, Event, Pipe, Position, Rotation};
use pipeflow_grid::Grid;
use pipeflow_system_flow::{FlowState, FlowSystem};

const START: Position = Position::new(2, 2);
const ONE_SECOND: Duration = Duration::from_secs(1);

fn board() -> Grid {
    let mut grid = Grid::new(5, 5);
    grid.set_start(START);
    grid
}

fn place(grid: &mut Grid, row: u32, col: u32, pipe: Pipe) {
    assert!(
        grid.place_pipe(Position::new(row, col), pipe),
        "placement at ({row}, {col}) should succeed"
    );
}

fn run_to_end(flow: &mut FlowSystem, grid: &mut Grid, events: &mut Vec<Event>) {
    for _ in 0..100 {
        if !flow.is_active() {
            return;
        }
        flow.update(grid, ONE_SECOND, events);
    }
    panic!("flow did not terminate within 100 ticks");
}

fn flow_ended(events: &[Event]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::FlowEnded { path_length } => Some(*path_length),
            _ => None,
        })
        .collect()
}

#[test]
fn single_straight_pipe_fills_and_ends_with_length_one() {
    let mut grid = board();
    place(&mut grid, 1, 2, Pipe::straight(Rotation::Deg0));
    let mut flow = FlowSystem::new(1.0);
    let mut events = Vec::new();

    flow.start(&mut grid, START, &mut events);
    assert_eq!(flow.current(), Some(Position::new(1, 2)));
    assert_eq!(flow.completed_cells(), 1);

    flow.update(&mut grid, ONE_SECOND, &mut events);

    let cell = grid.cell(Position::new(1, 2)).expect("cell exists");
    let water = cell
        .water_flows()
        .get(Direction::South)
        .expect("fluid entered from the south");
    assert!(water.is_full(), "pipe should be completely filled");
    assert!(cell.water_flows().is_fully_filled());
    assert!(!cell.can_enter_from_direction(Direction::South));
    assert!(!cell.can_enter_from_direction(Direction::North));

    assert_eq!(flow.state(), FlowState::End);
    assert_eq!(flow.completed_cells(), 1);
    assert_eq!(flow_ended(&events), vec![1]);
}

#[test]
fn start_without_a_connected_neighbour_ends_immediately() {
    let mut grid = board();
    place(&mut grid, 1, 2, Pipe::straight(Rotation::Deg90));
    let mut flow = FlowSystem::new(1.0);
    let mut events = Vec::new();

    flow.start(&mut grid, START, &mut events);

    assert_eq!(flow.state(), FlowState::End);
    assert_eq!(flow.completed_cells(), 0);
    assert_eq!(
        events,
        vec![
            Event::FlowStarted { start: START },
            Event::FlowEnded { path_length: 0 },
        ]
    );
    assert!(
        !grid
            .cell(Position::new(1, 2))
            .expect("cell exists")
            .has_water(),
        "a pipe that does not face the start must stay dry"
    );
}

#[test]
fn curved_pipe_turns_the_flow_east() {
    let mut grid = board();
    place(&mut grid, 1, 2, Pipe::straight(Rotation::Deg0));
    place(&mut grid, 0, 2, Pipe::curved(Rotation::Deg90));
    place(&mut grid, 0, 3, Pipe::straight(Rotation::Deg90));
    let mut flow = FlowSystem::new(1.0);
    let mut events = Vec::new();

    flow.start(&mut grid, START, &mut events);
    flow.update(&mut grid, ONE_SECOND, &mut events);
    assert_eq!(flow.current(), Some(Position::new(0, 2)));

    flow.update(&mut grid, ONE_SECOND, &mut events);
    assert_eq!(flow.current(), Some(Position::new(0, 3)));
    assert!(grid
        .cell(Position::new(0, 3))
        .and_then(|cell| cell.water_flows().get(Direction::West))
        .is_some());

    run_to_end(&mut flow, &mut grid, &mut events);
    assert_eq!(flow_ended(&events), vec![3]);
}

#[test]
fn partial_ticks_raise_the_level_gradually() {
    let mut grid = board();
    place(&mut grid, 1, 2, Pipe::straight(Rotation::Deg0));
    let mut flow = FlowSystem::new(0.5);
    let mut events = Vec::new();

    flow.start(&mut grid, START, &mut events);
    events.clear();
    flow.update(&mut grid, ONE_SECOND, &mut events);

    let level = grid
        .cell(Position::new(1, 2))
        .and_then(|cell| cell.water_flows().get(Direction::South))
        .map(|water| water.level())
        .expect("fluid entered");
    assert!((level - 0.5).abs() < 1e-6, "expected half fill, got {level}");
    assert!(flow.is_active());
    assert_eq!(
        events,
        vec![Event::CellUpdated {
            position: Position::new(1, 2)
        }]
    );
    assert!(
        !grid.place_pipe(Position::new(1, 2), Pipe::cross()),
        "a partly filled pipe cannot be replaced"
    );
}

#[test]
fn flow_ends_only_once() {
    let mut grid = board();
    place(&mut grid, 1, 2, Pipe::straight(Rotation::Deg0));
    let mut flow = FlowSystem::new(2.0);
    let mut events = Vec::new();

    flow.start(&mut grid, START, &mut events);
    run_to_end(&mut flow, &mut grid, &mut events);
    for _ in 0..5 {
        flow.update(&mut grid, ONE_SECOND, &mut events);
    }

    assert_eq!(flow_ended(&events), vec![1]);
}

#[test]
fn cross_pipe_is_traversed_on_both_axes() {
    let mut grid = board();
    place(&mut grid, 2, 3, Pipe::cross());
    place(&mut grid, 2, 4, Pipe::curved(Rotation::Deg270));
    place(&mut grid, 1, 4, Pipe::curved(Rotation::Deg180));
    place(&mut grid, 1, 3, Pipe::curved(Rotation::Deg90));
    place(&mut grid, 3, 3, Pipe::straight(Rotation::Deg0));
    let mut flow = FlowSystem::new(1.0);
    let mut events = Vec::new();

    flow.start(&mut grid, START, &mut events);
    run_to_end(&mut flow, &mut grid, &mut events);

    assert_eq!(flow_ended(&events), vec![6]);
    let cross = grid.cell(Position::new(2, 3)).expect("cell exists");
    assert_eq!(cross.water_flows().len(), 2, "cross should carry two flows");
    assert!(cross.water_flows().is_fully_filled());
    assert_eq!(cross.used_directions().len(), 4);
}

#[test]
fn closed_loop_terminates() {
    let mut grid = Grid::new(5, 5);
    let start = Position::new(3, 1);
    grid.set_start(start);
    place(&mut grid, 2, 1, Pipe::cross());
    place(&mut grid, 1, 1, Pipe::curved(Rotation::Deg90));
    place(&mut grid, 1, 2, Pipe::curved(Rotation::Deg180));
    place(&mut grid, 2, 2, Pipe::curved(Rotation::Deg270));
    let mut flow = FlowSystem::new(1.0);
    let mut events = Vec::new();

    flow.start(&mut grid, start, &mut events);
    run_to_end(&mut flow, &mut grid, &mut events);

    assert_eq!(flow_ended(&events), vec![5]);
}

#[test]
fn reset_leaves_the_grid_untouched() {
    let mut grid = board();
    place(&mut grid, 1, 2, Pipe::straight(Rotation::Deg0));
    let mut flow = FlowSystem::new(1.0);
    let mut events = Vec::new();

    flow.start(&mut grid, START, &mut events);
    flow.update(&mut grid, Duration::from_millis(250), &mut events);
    let snapshot = grid.clone();

    flow.reset();
    flow.reset();

    assert_eq!(flow.state(), FlowState::Idle);
    assert_eq!(flow.current(), None);
    assert_eq!(grid, snapshot);
}
