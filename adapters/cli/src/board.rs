use pipeflow_core::{Direction, Pipe, Rotation};
use pipeflow_grid::{Cell, CellKind, Grid};

/// Renders the grid as one line of box-drawing glyphs per row.
///
/// Pipes carrying fluid are drawn with heavy strokes.
pub(crate) fn render(grid: &Grid) -> String {
    let mut text = String::with_capacity((grid.width() as usize + 1) * grid.height() as usize);
    let mut row = 0;
    grid.for_each_cell(|cell| {
        if cell.position().row() != row {
            text.push('\n');
            row = cell.position().row();
        }
        text.push(glyph(cell));
    });
    text.push('\n');
    text
}

fn glyph(cell: &Cell) -> char {
    match cell.kind() {
        CellKind::Empty => '·',
        CellKind::Blocked => '█',
        CellKind::Start => 'S',
        CellKind::Pipe(pipe) => pipe_glyph(pipe, cell.has_water()),
    }
}

fn pipe_glyph(pipe: Pipe, wet: bool) -> char {
    let (light, heavy) = match pipe {
        Pipe::Cross => ('┼', '╋'),
        Pipe::Straight { .. } if pipe.has_connection(Direction::North) => ('│', '┃'),
        Pipe::Straight { .. } => ('─', '━'),
        Pipe::Curved { rotation } => match rotation {
            Rotation::Deg0 => ('└', '┗'),
            Rotation::Deg90 => ('┌', '┏'),
            Rotation::Deg180 => ('┐', '┓'),
            Rotation::Deg270 => ('┘', '┛'),
        },
    };
    if wet {
        heavy
    } else {
        light
    }
}
