//! The path sink protocol that every pipeline stage speaks.
//!
//! A *sink* consumes path commands. A *stage* is a sink that is handed its
//! downstream sink on every call instead of owning it; [`Chain`] glues a stage
//! to its downstream so the pair is itself a sink. Chains nest, which is how
//! the fixed pipelines in [`crate::pipeline`] are composed with static dispatch.

/// Consumer of straight-line path commands.
pub trait LineSink {
    fn move_to(&mut self, x0: f64, y0: f64);

    /// Hint that the next segment continues the current run with a real corner.
    fn line_join(&mut self) {}

    fn line_to(&mut self, x1: f64, y1: f64);

    fn close(&mut self);

    /// End of the current primitive.
    fn end(&mut self);
}

/// Consumer of full path commands, including curves.
pub trait PathSink: LineSink {
    fn quad_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);

    fn cubic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64);
}

impl<T: LineSink + ?Sized> LineSink for &mut T {
    fn move_to(&mut self, x0: f64, y0: f64) {
        (**self).move_to(x0, y0)
    }
    fn line_join(&mut self) {
        (**self).line_join()
    }
    fn line_to(&mut self, x1: f64, y1: f64) {
        (**self).line_to(x1, y1)
    }
    fn close(&mut self) {
        (**self).close()
    }
    fn end(&mut self) {
        (**self).end()
    }
}

impl<T: PathSink + ?Sized> PathSink for &mut T {
    fn quad_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        (**self).quad_to(x1, y1, x2, y2)
    }
    fn cubic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        (**self).cubic_to(x1, y1, x2, y2, x3, y3)
    }
}

/// A pipeline stage accepting line commands and forwarding to `S`.
pub trait LineStage<S: ?Sized> {
    fn move_to(&mut self, out: &mut S, x0: f64, y0: f64);
    fn line_join(&mut self, out: &mut S);
    fn line_to(&mut self, out: &mut S, x1: f64, y1: f64);
    fn close(&mut self, out: &mut S);
    fn end(&mut self, out: &mut S);
}

/// A pipeline stage that also accepts curves.
pub trait PathStage<S: ?Sized>: LineStage<S> {
    fn quad_to(&mut self, out: &mut S, x1: f64, y1: f64, x2: f64, y2: f64);
    #[allow(clippy::too_many_arguments)]
    fn cubic_to(&mut self, out: &mut S, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64);
}

/// A stage bound to its downstream sink.
pub struct Chain<'a, St: ?Sized, O> {
    stage: &'a mut St,
    out: O,
}

impl<'a, St: ?Sized, O> Chain<'a, St, O> {
    pub fn new(stage: &'a mut St, out: O) -> Self {
        Self { stage, out }
    }
}

impl<St, O> LineSink for Chain<'_, St, O>
where
    St: LineStage<O> + ?Sized,
{
    fn move_to(&mut self, x0: f64, y0: f64) {
        self.stage.move_to(&mut self.out, x0, y0)
    }
    fn line_join(&mut self) {
        self.stage.line_join(&mut self.out)
    }
    fn line_to(&mut self, x1: f64, y1: f64) {
        self.stage.line_to(&mut self.out, x1, y1)
    }
    fn close(&mut self) {
        self.stage.close(&mut self.out)
    }
    fn end(&mut self) {
        self.stage.end(&mut self.out)
    }
}

impl<St, O> PathSink for Chain<'_, St, O>
where
    St: PathStage<O> + ?Sized,
{
    fn quad_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.stage.quad_to(&mut self.out, x1, y1, x2, y2)
    }
    fn cubic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.stage.cubic_to(&mut self.out, x1, y1, x2, y2, x3, y3)
    }
}

/// One recorded path command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(f64, f64),
    LineJoin,
    LineTo(f64, f64),
    QuadTo(f64, f64, f64, f64),
    CubicTo(f64, f64, f64, f64, f64, f64),
    Close,
    End,
}

impl PathCommand {
    /// Send this command to a sink.
    pub fn replay<S: PathSink + ?Sized>(&self, sink: &mut S) {
        match *self {
            PathCommand::MoveTo(x, y) => sink.move_to(x, y),
            PathCommand::LineJoin => sink.line_join(),
            PathCommand::LineTo(x, y) => sink.line_to(x, y),
            PathCommand::QuadTo(x1, y1, x2, y2) => sink.quad_to(x1, y1, x2, y2),
            PathCommand::CubicTo(x1, y1, x2, y2, x3, y3) => {
                sink.cubic_to(x1, y1, x2, y2, x3, y3)
            }
            PathCommand::Close => sink.close(),
            PathCommand::End => sink.end(),
        }
    }

    /// End point of the command, if it has one.
    pub fn end_point(&self) -> Option<(f64, f64)> {
        match *self {
            PathCommand::MoveTo(x, y)
            | PathCommand::LineTo(x, y)
            | PathCommand::QuadTo(_, _, x, y)
            | PathCommand::CubicTo(_, _, _, _, x, y) => Some((x, y)),
            _ => None,
        }
    }
}

/// A sink that records every command it receives.
#[derive(Debug, Clone, Default)]
pub struct PathRecorder {
    pub commands: Vec<PathCommand>,
}

impl PathRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands without line-join hints.
    pub fn without_joins(&self) -> Vec<PathCommand> {
        self.commands
            .iter()
            .copied()
            .filter(|c| *c != PathCommand::LineJoin)
            .collect()
    }

    /// Split the recording into subpaths, each starting at a `MoveTo`.
    pub fn subpaths(&self) -> Vec<Vec<PathCommand>> {
        let mut out: Vec<Vec<PathCommand>> = Vec::new();
        for cmd in &self.commands {
            match cmd {
                PathCommand::MoveTo(..) => out.push(vec![*cmd]),
                PathCommand::LineJoin | PathCommand::End => {}
                _ => {
                    if let Some(last) = out.last_mut() {
                        last.push(*cmd);
                    }
                }
            }
        }
        out
    }
}

impl LineSink for PathRecorder {
    fn move_to(&mut self, x0: f64, y0: f64) {
        self.commands.push(PathCommand::MoveTo(x0, y0));
    }
    fn line_join(&mut self) {
        self.commands.push(PathCommand::LineJoin);
    }
    fn line_to(&mut self, x1: f64, y1: f64) {
        self.commands.push(PathCommand::LineTo(x1, y1));
    }
    fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }
    fn end(&mut self) {
        self.commands.push(PathCommand::End);
    }
}

impl PathSink for PathRecorder {
    fn quad_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.commands.push(PathCommand::QuadTo(x1, y1, x2, y2));
    }
    fn cubic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.commands
            .push(PathCommand::CubicTo(x1, y1, x2, y2, x3, y3));
    }
}
