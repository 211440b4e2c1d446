use anyhow::{bail, Context};
use clap::Parser;
use pisces_raster::{
    Affine, ArcParams, ArcType, Color, CycleMethod, Dash, LineSink, LinearGradient, Paint, Path,
    PathSink, RenderConfig, RenderContext, RoundRectParams, StrokeParams,
};

/// pisces-render: Rasterize a demo scene of every shape primitive to PNG
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Image width in pixels
    #[clap(long, default_value_t = 480)]
    pub width: i32,

    /// Image height in pixels
    #[clap(long, default_value_t = 320)]
    pub height: i32,

    /// Path to output PNG file to be created
    #[clap(short, long)]
    pub output: String,

    /// Stroke width for outlined shapes
    #[clap(short, long, default_value_t = 3.0)]
    pub line_width: f64,

    /// Dash pattern as comma separated lengths, e.g. 6,3
    #[clap(short, long)]
    pub dash: Option<String>,

    /// Background color as a CSS color string
    #[clap(short, long, default_value = "white")]
    pub background: String,

    /// Disable antialiasing
    #[clap(long)]
    pub no_antialias: bool,
}

fn parse_dash(pattern: &str) -> anyhow::Result<Dash> {
    let lengths = pattern
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid dash length: {s:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Dash::new(lengths, 0.0)?)
}

fn draw_scene(ctx: &mut RenderContext, args: &Args) -> anyhow::Result<()> {
    let cell_w = args.width as f64 / 4.0;
    let cell_h = args.height as f64 / 2.0;
    let pad = cell_w.min(cell_h) * 0.15;
    let (w, h) = (cell_w - 2.0 * pad, cell_h - 2.0 * pad);
    let cell = |col: u32, row: u32| (col as f64 * cell_w + pad, row as f64 * cell_h + pad);

    let mut stroke = StrokeParams::default();
    stroke.set_width(args.line_width);
    if let Some(pattern) = &args.dash {
        stroke = stroke.with_dash(parse_dash(pattern)?);
    }
    ctx.set_stroke(stroke);

    // Top row: filled primitives
    let (x, y) = cell(0, 0);
    let gradient = LinearGradient::new(x, y, x + w, y, CycleMethod::Pad)
        .with_stop(0.0, Color::BLUE)
        .with_stop(1.0, Color::ORANGE);
    ctx.set_paint(Paint::LinearGradient(gradient), &Affine::identity());
    ctx.fill_rect(x, y, w, h)?;

    ctx.set_color(Color::RED);
    let (x, y) = cell(1, 0);
    ctx.fill_oval(x, y, w, h)?;

    ctx.set_color(Color::GREEN.with_alpha(200));
    let (x, y) = cell(2, 0);
    ctx.fill_arc(&ArcParams {
        x,
        y,
        width: w,
        height: h,
        start_angle: 30.0,
        arc_angle: 300.0,
        arc_type: ArcType::Pie,
    })?;

    ctx.set_color(Color::MAGENTA);
    let (x, y) = cell(3, 0);
    ctx.fill_round_rect(&RoundRectParams {
        x,
        y,
        width: w,
        height: h,
        arc_width: w / 3.0,
        arc_height: h / 3.0,
    })?;

    // Bottom row: outlines
    ctx.set_color(Color::BLACK);
    let (x, y) = cell(0, 1);
    ctx.draw_rect(x, y, w, h)?;
    ctx.draw_line(x, y + h, x + w, y)?;

    ctx.set_color(Color::DARK_GRAY);
    let (x, y) = cell(1, 1);
    ctx.draw_oval(x, y, w, h)?;
    ctx.draw_arc(&ArcParams {
        x: x + w / 4.0,
        y: y + h / 4.0,
        width: w / 2.0,
        height: h / 2.0,
        start_angle: 0.0,
        arc_angle: 270.0,
        arc_type: ArcType::Open,
    })?;

    ctx.set_color(Color::BLUE);
    let (x, y) = cell(2, 1);
    ctx.draw_round_rect(&RoundRectParams {
        x,
        y,
        width: w,
        height: h,
        arc_width: w / 2.0,
        arc_height: w / 2.0,
    })?;

    ctx.set_color(Color::RED);
    let (x, y) = cell(3, 1);
    let mut wave = Path::new();
    wave.move_to(x, y + h / 2.0);
    wave.quad_to(x + w / 4.0, y, x + w / 2.0, y + h / 2.0);
    wave.cubic_to(x + 0.6 * w, y + h, x + 0.9 * w, y + h, x + w, y);
    ctx.draw(&wave)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args: Args = Args::parse();

    let background = match Color::parse(&args.background) {
        Ok(color) => color,
        Err(err) => bail!("Invalid background color: {}\n{}", args.background, err),
    };

    let mut ctx = RenderContext::builder(args.width, args.height)
        .config(RenderConfig::from_env())
        .antialiasing(!args.no_antialias)
        .build()?;
    ctx.surface_mut().fill(background.to_argb());

    draw_scene(&mut ctx, &args)?;

    let png = ctx.to_png()?;
    std::fs::write(&args.output, png)
        .with_context(|| format!("Failed to write output file: {}", args.output))?;
    log::info!("wrote {}x{} image to {}", args.width, args.height, args.output);
    Ok(())
}
