use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use polars::prelude::*;
use quadspline::{build_mesh, integrate_along_y, Mesh2D, PolySpline, Rect};
use serde::Serialize;
use serde_json::json;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;

use provenance::{MeshRecord, OutputRecord, RunRecord};

#[derive(Parser)]
#[command(name = "quadspline")]
#[command(about = "Build adaptive meshes and integrate them along y")]
struct Cmd {
    /// Free-form tags copied into every run record
    #[arg(long)]
    tag: Vec<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Evaluate a mesh on a regular grid and write it as CSV or Parquet
    Sample {
        #[command(flatten)]
        mesh: MeshArgs,
        #[arg(long, default_value_t = 101)]
        nx: usize,
        #[arg(long, default_value_t = 101)]
        ny: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Integrate a mesh along y against a weight and write the result as JSON
    Integrate {
        #[command(flatten)]
        mesh: MeshArgs,
        /// constant:<c>, linear, or samples:<n>
        #[arg(long, default_value = "constant:1", value_parser = parse_weight)]
        weight: WeightSpec,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the build's version and code revision as JSON
    Report,
}

#[derive(clap::Args, Clone, Copy)]
struct MeshArgs {
    #[arg(long, value_enum, default_value_t = Function::Sin3x)]
    function: Function,
    /// x_lo,y_lo,x_hi,y_hi
    #[arg(long, default_value = "0,0,1,1", value_parser = parse_domain)]
    domain: Rect,
    #[arg(long, default_value_t = 1e4)]
    precision: f64,
}

impl MeshArgs {
    fn build(&self) -> Result<Mesh2D> {
        let f = self.function;
        let mesh = build_mesh(&move |x: f64, y: f64| f.eval(x, y), self.domain, self.precision)
            .with_context(|| format!("building mesh for {:?}", self.function))?;
        Ok(mesh)
    }

    fn record(&self, mesh: &Mesh2D) -> MeshRecord {
        let name = format!("{:?}", self.function).to_lowercase();
        MeshRecord::new(name, self.domain, self.precision, &mesh.stats())
    }
}

/// Test surfaces. All stay positive on the unit square.
#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum Function {
    Affine,
    Sin3x,
    Gauss,
    Saddle,
}

impl Function {
    fn eval(self, x: f64, y: f64) -> f64 {
        match self {
            Function::Affine => 1.0 + 2.0 * x - 0.5 * y,
            Function::Sin3x => 2.0 + (3.0 * x).sin(),
            Function::Gauss => (-(x - 0.5).powi(2) - (y - 0.5).powi(2)).exp(),
            Function::Saddle => 2.0 + (x - 0.5) * (y - 0.5),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum WeightSpec {
    Constant(f64),
    Linear,
    Samples(usize),
}

impl WeightSpec {
    /// Weight over `[lo, hi]`. Sampled weights are a Gaussian bump centred on the range.
    fn build(self, lo: f64, hi: f64) -> Result<PolySpline> {
        let w = match self {
            WeightSpec::Constant(c) => PolySpline::constant(lo, hi, c)?,
            WeightSpec::Linear => PolySpline::new(vec![lo, hi], vec![vec![lo, 1.0]])?,
            WeightSpec::Samples(n) => {
                let step = (hi - lo) / (n.max(2) - 1) as f64;
                let ys: Vec<f64> = (0..n)
                    .map(|i| if i + 1 == n { hi } else { lo + step * i as f64 })
                    .collect();
                let mid = 0.5 * (lo + hi);
                let ws: Vec<f64> = ys.iter().map(|y| (-(y - mid).powi(2)).exp()).collect();
                PolySpline::from_samples(&ys, &ws)?
            }
        };
        Ok(w)
    }
}

fn parse_domain(s: &str) -> Result<Rect, String> {
    let v: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<_, _>>()?;
    let [x_lo, y_lo, x_hi, y_hi] = v[..] else {
        return Err(format!("expected 4 comma-separated numbers, got {}", v.len()));
    };
    Rect::new(x_lo, y_lo, x_hi, y_hi).map_err(|e| e.to_string())
}

fn parse_weight(s: &str) -> Result<WeightSpec, String> {
    match s.split_once(':') {
        None if s == "linear" => Ok(WeightSpec::Linear),
        Some(("constant", c)) => c
            .parse()
            .map(WeightSpec::Constant)
            .map_err(|e| format!("constant weight {c:?}: {e}")),
        Some(("samples", n)) => match n.parse::<usize>() {
            Ok(n) if n >= 3 => Ok(WeightSpec::Samples(n)),
            Ok(n) => Err(format!("need at least 3 samples, got {n}")),
            Err(e) => Err(format!("sample count {n:?}: {e}")),
        },
        _ => Err(format!("unknown weight {s:?}")),
    }
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Sample { mesh, nx, ny, out } => sample(&mesh, nx, ny, &out, cmd.tag),
        Action::Integrate { mesh, weight, out } => integrate(&mesh, weight, &out, cmd.tag),
        Action::Report => report(cmd.tag),
    }
}

fn ensure_parent(out: &Path) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}

fn sample(args: &MeshArgs, nx: usize, ny: usize, out: &Path, tags: Vec<String>) -> Result<()> {
    if nx == 0 || ny == 0 {
        bail!("grid must have at least one point per axis, got {nx}x{ny}");
    }
    let mesh = args.build()?;
    tracing::info!(
        function = ?args.function,
        quadrants = mesh.stats().quadrants,
        nx,
        ny,
        out = %out.display(),
        "sample"
    );
    let grid = mesh.sample_grid(nx, ny);
    let mut df = df!(
        "x" => grid.iter().map(|r| r[0]).collect::<Vec<_>>(),
        "y" => grid.iter().map(|r| r[1]).collect::<Vec<_>>(),
        "value" => grid.iter().map(|r| r[2]).collect::<Vec<_>>()
    )?;

    let parquet = match out.extension().and_then(|e| e.to_str()) {
        Some("parquet") => true,
        Some("csv") => false,
        other => bail!("unsupported output extension {other:?}; use .csv or .parquet"),
    };
    ensure_parent(out)?;
    let mut file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    if parquet {
        ParquetWriter::new(&mut file).finish(&mut df)?;
    } else {
        CsvWriter::new(&mut file).finish(&mut df)?;
    }

    RunRecord::new(args.record(&mesh), OutputRecord::Grid { nx, ny }, tags).write_next_to(out)?;
    Ok(())
}

/// Piece `k` holds coefficients of powers of `x - breakpoints[k]`.
#[derive(Serialize)]
struct SplineDoc<'a> {
    breakpoints: &'a [f64],
    pieces: Vec<&'a [f64]>,
    degree: usize,
    definite_integral: f64,
}

fn integrate(args: &MeshArgs, spec: WeightSpec, out: &Path, tags: Vec<String>) -> Result<()> {
    let mesh = args.build()?;
    let d = mesh.domain();
    let weight = spec.build(d.y_lo, d.y_hi)?;
    let g = integrate_along_y(&mesh, &weight)?;
    tracing::info!(
        function = ?args.function,
        weight = ?spec,
        pieces = g.num_pieces(),
        out = %out.display(),
        "integrate"
    );

    let doc = SplineDoc {
        breakpoints: g.breakpoints(),
        pieces: (0..g.num_pieces()).map(|k| g.coefficients_of_piece(k)).collect(),
        degree: g.degree(),
        definite_integral: g.definite_integral(),
    };
    ensure_parent(out)?;
    std::fs::write(out, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", out.display()))?;

    let output = OutputRecord::Spline {
        weight: format!("{spec:?}"),
        pieces: doc.pieces.len(),
        degree: doc.degree,
        definite_integral: doc.definite_integral,
    };
    RunRecord::new(args.record(&mesh), output, tags).write_next_to(out)?;
    Ok(())
}

fn report(tags: Vec<String>) -> Result<()> {
    let obj = json!({
        "code_rev": provenance::code_rev(),
        "version": quadspline::VERSION,
        "tags": tags
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
