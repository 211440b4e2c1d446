//! Fixed-shape stage chains, one per draw mode.
//!
//! Stages are owned by the pipeline and only bound to each other, and to the
//! backend, for the duration of [`Pipeline::run`]. Every chain starts with a
//! single [`Transformer`]; an extra per-call transform is folded into it.

use crate::config::RenderConfig;
use crate::dasher::Dasher;
use crate::drawing_state::StrokeParams;
use crate::flattener::{Flattener, MIN_CHORD_LENGTH_SQ};
use crate::sink::{Chain, LineSink, PathSink};
use crate::stroker::Stroker;
use crate::transform::Affine;
use crate::transformer::Transformer;

/// Transformer → Flattener.
#[derive(Debug, Clone)]
pub struct FillPipeline {
    head: Transformer,
    flattener: Flattener,
}

/// Transformer → Flattener → Stroker.
#[derive(Debug, Clone)]
pub struct StrokePipeline {
    head: Transformer,
    flattener: Flattener,
    stroker: Stroker,
}

/// Transformer → Flattener → Dasher → Stroker.
#[derive(Debug, Clone)]
pub struct DashedStrokePipeline {
    head: Transformer,
    flattener: Flattener,
    dasher: Dasher,
    stroker: Stroker,
}

#[derive(Debug, Clone)]
pub enum Pipeline {
    Fill(FillPipeline),
    Stroke(StrokePipeline),
    DashedStroke(DashedStrokePipeline),
}

fn flattener(flatness: f64, config: &RenderConfig) -> Flattener {
    let mut flattener = Flattener::new(flatness);
    flattener.set_max_depth(config.max_subdivision_depth);
    flattener
}

impl Pipeline {
    pub fn fill(transform: &Affine, config: &RenderConfig) -> Self {
        Pipeline::Fill(FillPipeline {
            head: Transformer::new(transform),
            flattener: flattener(config.filler_flatness, config),
        })
    }

    /// Fill pipeline for glyph outlines.
    ///
    /// With subpixel antialiasing the flatness drops to the minimum chord
    /// length so small glyphs keep their shape.
    pub fn text_fill(transform: &Affine, config: &RenderConfig, subpixel_lg: u32) -> Self {
        let flatness = if subpixel_lg > 0 {
            MIN_CHORD_LENGTH_SQ
        } else {
            config.filler_flatness
        };
        Pipeline::Fill(FillPipeline {
            head: Transformer::new(transform),
            flattener: flattener(flatness, config),
        })
    }

    pub fn stroke(transform: &Affine, params: &StrokeParams, config: &RenderConfig) -> Self {
        let mut biased = *transform;
        biased.m02 += config.stroke_x_bias;
        biased.m12 += config.stroke_y_bias;
        let head = Transformer::new(&biased);
        let flattener = flattener(config.stroke_flatness, config);
        let stroker = Stroker::new(
            params.width,
            params.cap,
            params.join,
            params.miter_limit,
            transform,
        );
        match &params.dash {
            Some(dash) => Pipeline::DashedStroke(DashedStrokePipeline {
                head,
                flattener,
                dasher: Dasher::new(dash, transform),
                stroker,
            }),
            None => Pipeline::Stroke(StrokePipeline {
                head,
                flattener,
                stroker,
            }),
        }
    }

    /// The transform applied by the head stage.
    pub fn transform(&self) -> &Affine {
        match self {
            Pipeline::Fill(p) => p.head.transform(),
            Pipeline::Stroke(p) => p.head.transform(),
            Pipeline::DashedStroke(p) => p.head.transform(),
        }
    }

    /// Bind the chain to `out` and hand its input to `f`.
    ///
    /// When `pre` is given, user coordinates go through `pre` before the
    /// pipeline's own transform, still in a single head stage.
    pub fn run<O, R>(
        &mut self,
        pre: Option<&Affine>,
        out: &mut O,
        f: impl FnOnce(&mut dyn PathSink) -> R,
    ) -> R
    where
        O: LineSink + ?Sized,
    {
        match self {
            Pipeline::Fill(p) => {
                let mut collapsed = pre.map(|t| Transformer::chained(t, &p.head));
                let head = collapsed.as_mut().unwrap_or(&mut p.head);
                f(&mut Chain::new(head, Chain::new(&mut p.flattener, out)))
            }
            Pipeline::Stroke(p) => {
                let mut collapsed = pre.map(|t| Transformer::chained(t, &p.head));
                let head = collapsed.as_mut().unwrap_or(&mut p.head);
                f(&mut Chain::new(
                    head,
                    Chain::new(&mut p.flattener, Chain::new(&mut p.stroker, out)),
                ))
            }
            Pipeline::DashedStroke(p) => {
                let mut collapsed = pre.map(|t| Transformer::chained(t, &p.head));
                let head = collapsed.as_mut().unwrap_or(&mut p.head);
                f(&mut Chain::new(
                    head,
                    Chain::new(
                        &mut p.flattener,
                        Chain::new(&mut p.dasher, Chain::new(&mut p.stroker, out)),
                    ),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dasher::Dash;
    use crate::sink::{PathCommand, PathRecorder};
    use crate::style::{LineCap, LineJoin};

    fn extent(rec: &PathRecorder) -> (f64, f64, f64, f64) {
        let mut e = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for (x, y) in rec.commands.iter().filter_map(|c| c.end_point()) {
            e = (e.0.min(x), e.1.min(y), e.2.max(x), e.3.max(y));
        }
        e
    }

    #[test]
    fn test_fill_pipeline_flattens_and_transforms() {
        let mut p = Pipeline::fill(&Affine::from_translate(10.0, 0.0), &RenderConfig::default());
        let mut rec = PathRecorder::new();
        p.run(None, &mut rec, |s| {
            s.move_to(0.0, 0.0);
            s.quad_to(5.0, 10.0, 10.0, 0.0);
            s.end();
        });
        assert_eq!(rec.commands[0], PathCommand::MoveTo(10.0, 0.0));
        assert!(rec
            .commands
            .iter()
            .all(|c| !matches!(c, PathCommand::QuadTo(..) | PathCommand::CubicTo(..))));
        assert_eq!(rec.commands.last(), Some(&PathCommand::End));
    }

    #[test]
    fn test_pre_transform_is_collapsed() {
        let mut p = Pipeline::fill(&Affine::from_scale(2.0, 2.0), &RenderConfig::default());
        let mut rec = PathRecorder::new();
        let pre = Affine::from_translate(3.0, 4.0);
        p.run(Some(&pre), &mut rec, |s| s.move_to(1.0, 1.0));
        assert_eq!(rec.commands[0], PathCommand::MoveTo(8.0, 10.0));
        // the pipeline's own head is untouched
        assert_eq!(p.transform(), &Affine::from_scale(2.0, 2.0));
    }

    #[test]
    fn test_text_fill_flatness() {
        let config = RenderConfig::default();
        match Pipeline::text_fill(&Affine::identity(), &config, 3) {
            Pipeline::Fill(p) => assert_eq!(p.flattener.flatness(), MIN_CHORD_LENGTH_SQ),
            other => panic!("unexpected pipeline {:?}", other),
        }
        match Pipeline::text_fill(&Affine::identity(), &config, 0) {
            Pipeline::Fill(p) => assert_eq!(p.flattener.flatness(), config.filler_flatness),
            other => panic!("unexpected pipeline {:?}", other),
        }
    }

    #[test]
    fn test_stroke_bias_shifts_head_only() {
        let config = RenderConfig {
            stroke_x_bias: 0.5,
            stroke_y_bias: 0.25,
            ..RenderConfig::default()
        };
        let p = Pipeline::stroke(&Affine::identity(), &StrokeParams::default(), &config);
        assert_eq!(p.transform(), &Affine::from_translate(0.5, 0.25));
        assert!(matches!(p, Pipeline::Stroke(_)));
    }

    #[test]
    fn test_stroke_outline() {
        let params = StrokeParams::new(2.0, LineCap::Square, LineJoin::Miter, 10.0);
        let mut p = Pipeline::stroke(&Affine::identity(), &params, &RenderConfig::default());
        let mut rec = PathRecorder::new();
        p.run(None, &mut rec, |s| {
            s.move_to(0.0, 0.0);
            s.line_to(10.0, 0.0);
            s.end();
        });
        assert_eq!(extent(&rec), (-1.0, -1.0, 11.0, 1.0));
    }

    #[test]
    fn test_dashed_stroke_has_gaps() {
        let params = StrokeParams::default().with_dash(Dash::new(vec![2.0, 2.0], 0.0).unwrap());
        let mut p = Pipeline::stroke(&Affine::identity(), &params, &RenderConfig::default());
        assert!(matches!(p, Pipeline::DashedStroke(_)));
        let mut rec = PathRecorder::new();
        p.run(None, &mut rec, |s| {
            s.move_to(0.0, 0.0);
            s.line_to(10.0, 0.0);
            s.end();
        });
        // three dashes, each stroked into its own closed quad
        assert_eq!(rec.subpaths().len(), 3);
        let xs: Vec<f64> = rec.commands.iter().filter_map(|c| c.end_point()).map(|p| p.0).collect();
        assert!(!xs.iter().any(|x| *x > 2.0 + 1e-9 && *x < 4.0 - 1e-9));
    }
}
