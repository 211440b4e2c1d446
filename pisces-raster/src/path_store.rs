//! Append-only path command store with replay and transformed iteration.

use crate::error::RasterResult;
use crate::geometry::Bounds;
use crate::sink::{LineSink, PathCommand, PathSink};
use crate::transform::Affine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    MoveTo,
    LineJoin,
    LineTo,
    QuadTo,
    CubicTo,
    Close,
    End,
}

impl Verb {
    /// Number of coordinates stored for the verb.
    fn coord_count(self) -> usize {
        match self {
            Verb::MoveTo | Verb::LineTo => 2,
            Verb::QuadTo => 4,
            Verb::CubicTo => 6,
            Verb::LineJoin | Verb::Close | Verb::End => 0,
        }
    }
}

/// A recorded path.
///
/// The store is itself a [`PathSink`], so any producer can record into it, and
/// [`PathStore::produce`] replays it into any other sink without mutating it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathStore {
    verbs: Vec<Verb>,
    coords: Vec<f64>,
    x0: f64,
    y0: f64,
    sx0: f64,
    sy0: f64,
}

impl PathStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with room for `commands` commands, failing instead of aborting
    /// when the memory is not available.
    pub fn with_capacity(commands: usize) -> RasterResult<Self> {
        let mut store = Self::new();
        store.try_reserve(commands, commands.saturating_mul(2))?;
        Ok(store)
    }

    /// Reserve room for more commands and coordinates.
    pub fn try_reserve(&mut self, verbs: usize, coords: usize) -> RasterResult<()> {
        self.verbs.try_reserve(verbs)?;
        self.coords.try_reserve(coords)?;
        Ok(())
    }

    /// Number of recorded commands, hints included.
    pub fn len(&self) -> usize {
        self.verbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    pub fn clear(&mut self) {
        self.verbs.clear();
        self.coords.clear();
        self.x0 = 0.0;
        self.y0 = 0.0;
        self.sx0 = 0.0;
        self.sy0 = 0.0;
    }

    /// The point the next command starts from.
    pub fn current_point(&self) -> (f64, f64) {
        (self.x0, self.y0)
    }

    /// Rewrite the first command so the store continues (`true`) or starts
    /// (`false`) a subpath when appended elsewhere.
    pub fn join(&mut self, join: bool) {
        if let Some(first) = self.verbs.first_mut() {
            if join && *first == Verb::MoveTo {
                *first = Verb::LineTo;
            } else if !join && *first == Verb::LineTo {
                *first = Verb::MoveTo;
            }
        }
    }

    /// Iterate over the recorded commands.
    pub fn commands(&self) -> Commands<'_> {
        Commands {
            store: self,
            verb: 0,
            coord: 0,
        }
    }

    /// Replay every command into `sink`.
    pub fn produce<S: PathSink + ?Sized>(&self, sink: &mut S) {
        for cmd in self.commands() {
            cmd.replay(sink);
        }
    }

    /// Append another store's commands.
    ///
    /// With `join` the other store's leading `MoveTo` becomes a `LineTo`, so the two
    /// paths form one continuous subpath; without it a leading `LineTo` becomes a
    /// `MoveTo`. `End` markers of `other` are not copied. `other` is left untouched.
    pub fn append(&mut self, other: &PathStore, join: bool) {
        for (i, cmd) in other.commands().enumerate() {
            let cmd = if i == 0 { rewrite_lead(cmd, join) } else { cmd };
            if cmd != PathCommand::End {
                cmd.replay(self);
            }
        }
    }

    /// Append the segments produced by an iterator, with the same join rule as
    /// [`PathStore::append`].
    pub fn append_iter<I>(&mut self, segments: I, join: bool)
    where
        I: IntoIterator<Item = Segment>,
    {
        let mut join = join;
        for seg in segments {
            match seg {
                Segment::MoveTo(x, y) if join => {
                    join = false;
                    self.line_to(x, y);
                }
                Segment::MoveTo(x, y) => self.move_to(x, y),
                Segment::LineTo(x, y) => self.line_to(x, y),
                Segment::QuadTo(x1, y1, x2, y2) => self.quad_to(x1, y1, x2, y2),
                Segment::CubicTo(x1, y1, x2, y2, x3, y3) => {
                    self.cubic_to(x1, y1, x2, y2, x3, y3)
                }
                Segment::Close => self.close(),
            }
        }
    }

    /// Transform every stored coordinate in place.
    pub fn transform(&mut self, m: &Affine) {
        for pair in self.coords.chunks_exact_mut(2) {
            let (x, y) = m.apply(pair[0], pair[1]);
            pair[0] = x;
            pair[1] = y;
        }
        let (x0, y0) = m.apply(self.x0, self.y0);
        let (sx0, sy0) = m.apply(self.sx0, self.sy0);
        self.x0 = x0;
        self.y0 = y0;
        self.sx0 = sx0;
        self.sy0 = sy0;
    }

    /// Tight bounds of every stored point, control points included.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.coords.chunks_exact(2);
        let first = points.next()?;
        let (mut min_x, mut min_y) = (first[0], first[1]);
        let (mut max_x, mut max_y) = (min_x, min_y);
        for p in points {
            min_x = min_x.min(p[0]);
            max_x = max_x.max(p[0]);
            min_y = min_y.min(p[1]);
            max_y = max_y.max(p[1]);
        }
        Some(Bounds::from_extents(min_x, min_y, max_x, max_y))
    }

    /// Iterate the path as typed segments mapped through `transform`.
    ///
    /// Line-join hints are skipped and iteration stops at the first `End`.
    /// A store holding fewer than two commands yields nothing.
    pub fn iter(&self, transform: Option<Affine>) -> PathIter<'_> {
        PathIter {
            commands: self.commands(),
            transform,
            done: self.verbs.len() < 2,
        }
    }

    // Sink methods cannot report failure, so growth here is infallible.
    // Callers that need `RasterError::Allocation` reserve up front.
    fn push(&mut self, verb: Verb, coords: &[f64]) {
        self.verbs.push(verb);
        self.coords.extend_from_slice(coords);
    }
}

fn rewrite_lead(cmd: PathCommand, join: bool) -> PathCommand {
    match cmd {
        PathCommand::MoveTo(x, y) if join => PathCommand::LineTo(x, y),
        PathCommand::LineTo(x, y) if !join => PathCommand::MoveTo(x, y),
        other => other,
    }
}

impl LineSink for PathStore {
    fn move_to(&mut self, x0: f64, y0: f64) {
        self.push(Verb::MoveTo, &[x0, y0]);
        self.x0 = x0;
        self.sx0 = x0;
        self.y0 = y0;
        self.sy0 = y0;
    }

    fn line_join(&mut self) {
        self.push(Verb::LineJoin, &[]);
    }

    fn line_to(&mut self, x1: f64, y1: f64) {
        self.push(Verb::LineTo, &[x1, y1]);
        self.x0 = x1;
        self.y0 = y1;
    }

    fn close(&mut self) {
        self.push(Verb::Close, &[]);
        self.x0 = self.sx0;
        self.y0 = self.sy0;
    }

    fn end(&mut self) {
        self.push(Verb::End, &[]);
        self.x0 = 0.0;
        self.y0 = 0.0;
    }
}

impl PathSink for PathStore {
    fn quad_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.push(Verb::QuadTo, &[x1, y1, x2, y2]);
        self.x0 = x2;
        self.y0 = y2;
    }

    fn cubic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.push(Verb::CubicTo, &[x1, y1, x2, y2, x3, y3]);
        self.x0 = x3;
        self.y0 = y3;
    }
}

/// Iterator over the raw commands of a [`PathStore`].
#[derive(Debug, Clone)]
pub struct Commands<'a> {
    store: &'a PathStore,
    verb: usize,
    coord: usize,
}

impl Iterator for Commands<'_> {
    type Item = PathCommand;

    fn next(&mut self) -> Option<PathCommand> {
        let verb = *self.store.verbs.get(self.verb)?;
        let n = verb.coord_count();
        let c = &self.store.coords[self.coord..self.coord + n];
        self.verb += 1;
        self.coord += n;
        Some(match verb {
            Verb::MoveTo => PathCommand::MoveTo(c[0], c[1]),
            Verb::LineJoin => PathCommand::LineJoin,
            Verb::LineTo => PathCommand::LineTo(c[0], c[1]),
            Verb::QuadTo => PathCommand::QuadTo(c[0], c[1], c[2], c[3]),
            Verb::CubicTo => PathCommand::CubicTo(c[0], c[1], c[2], c[3], c[4], c[5]),
            Verb::Close => PathCommand::Close,
            Verb::End => PathCommand::End,
        })
    }
}

/// A typed path segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    QuadTo(f64, f64, f64, f64),
    CubicTo(f64, f64, f64, f64, f64, f64),
    Close,
}

/// Segment iterator that maps coordinates through an optional transform
/// without touching the store.
#[derive(Debug, Clone)]
pub struct PathIter<'a> {
    commands: Commands<'a>,
    transform: Option<Affine>,
    done: bool,
}

impl PathIter<'_> {
    fn map_point(&self, x: f64, y: f64) -> (f64, f64) {
        match &self.transform {
            Some(m) => m.apply(x, y),
            None => (x, y),
        }
    }
}

impl Iterator for PathIter<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if self.done {
            return None;
        }
        loop {
            let Some(cmd) = self.commands.next() else {
                self.done = true;
                return None;
            };
            let seg = match cmd {
                PathCommand::LineJoin => continue,
                PathCommand::End => {
                    self.done = true;
                    return None;
                }
                PathCommand::MoveTo(x, y) => {
                    let (x, y) = self.map_point(x, y);
                    Segment::MoveTo(x, y)
                }
                PathCommand::LineTo(x, y) => {
                    let (x, y) = self.map_point(x, y);
                    Segment::LineTo(x, y)
                }
                PathCommand::QuadTo(x1, y1, x2, y2) => {
                    let (x1, y1) = self.map_point(x1, y1);
                    let (x2, y2) = self.map_point(x2, y2);
                    Segment::QuadTo(x1, y1, x2, y2)
                }
                PathCommand::CubicTo(x1, y1, x2, y2, x3, y3) => {
                    let (x1, y1) = self.map_point(x1, y1);
                    let (x2, y2) = self.map_point(x2, y2);
                    let (x3, y3) = self.map_point(x3, y3);
                    Segment::CubicTo(x1, y1, x2, y2, x3, y3)
                }
                PathCommand::Close => Segment::Close,
            };
            return Some(seg);
        }
    }
}
