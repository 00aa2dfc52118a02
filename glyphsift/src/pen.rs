use skrifa::outline::OutlinePen;
use zeno::{Command, Vector};

/// Pen that records an outline as a zeno path.
///
/// Move elements are held back until a segment follows them so contours
/// consisting of a lone move do not contribute to the path bounds.
#[derive(Default)]
pub struct PathPen {
    commands: Vec<Command>,
    pending_move: Option<Vector>,
}

impl PathPen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    fn flush_pending_move(&mut self) {
        if let Some(start) = self.pending_move.take() {
            self.commands.push(Command::MoveTo(start));
        }
    }
}

impl OutlinePen for PathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.pending_move = Some(Vector::new(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.flush_pending_move();
        self.commands.push(Command::LineTo(Vector::new(x, y)));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.flush_pending_move();
        self.commands
            .push(Command::QuadTo(Vector::new(cx0, cy0), Vector::new(x, y)));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.flush_pending_move();
        self.commands.push(Command::CurveTo(
            Vector::new(cx0, cy0),
            Vector::new(cx1, cy1),
            Vector::new(x, y),
        ));
    }

    fn close(&mut self) {
        if self.pending_move.take().is_none() {
            self.commands.push(Command::Close);
        }
    }
}
