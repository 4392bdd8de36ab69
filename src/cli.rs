use crate::build_info;
use crate::config::{FlowModel, SimulationConfig};
use crate::error::ConfigError;
use crate::export::*;
use crate::relax::SweepOrder;
use clap::Parser;
use std::path::PathBuf;

/// Steady channel flow past a beam, vorticity-streamfunction relaxation.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON configuration file. Flags below override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for output files, created if missing.
    #[arg(short, long, default_value = "results")]
    pub output_dir: PathBuf,

    /// Comma separated target Reynolds numbers.
    #[arg(short, long, value_delimiter = ',')]
    pub reynolds: Option<Vec<f64>>,

    /// Cells along the channel.
    #[arg(long)]
    pub nx: Option<i32>,

    /// Cells across the channel.
    #[arg(long)]
    pub ny: Option<i32>,

    /// Nominal convergence tolerance.
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Iteration cap per run.
    #[arg(short, long)]
    pub max_iterations: Option<usize>,

    /// The number of threads to use.
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Columns per task in parallel sweeps.
    #[arg(short, long)]
    pub chunk_size: Option<usize>,

    #[arg(long)]
    pub sweep_order: Option<SweepOrder>,

    #[arg(long)]
    pub model: Option<FlowModel>,

    /// Disable spike smoothing around the beam corners.
    #[arg(long)]
    pub no_corner_smoothing: bool,

    /// Iterations between progress reports.
    #[arg(long)]
    pub report_interval: Option<usize>,

    /// Also write a .vtu file per accepted run.
    #[arg(long)]
    pub write_vtk: bool,

    /// Also write PNG heat maps per accepted run.
    #[arg(short, long)]
    pub write_images: bool,

    /// trace, debug, info, warn or error.
    #[arg(short, long, default_value = "info")]
    pub log_level: tracing::Level,

    /// Print build information and quit
    #[arg(long)]
    pub build_info: bool,
}

impl Args {
    /// Parse the command line and set up the global thread pool.
    pub fn cli_setup(name: &str) -> anyhow::Result<Self> {
        let args = Args::parse();

        if args.build_info {
            build_info::print_report(name);
            std::process::exit(0);
        }

        let mut pool = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("rayon_thread_{}", i));
        if let Some(threads) = args.threads {
            pool = pool.num_threads(threads);
        }
        pool.build_global()?;

        Ok(args)
    }

    /// The config file, or the defaults, with every flag applied on top.
    pub fn simulation_config(&self) -> Result<SimulationConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(reynolds) = &self.reynolds {
            config.reynolds = reynolds.clone();
        }
        if let Some(nx) = self.nx {
            config.nx = nx;
        }
        if let Some(ny) = self.ny {
            config.ny = ny;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(sweep_order) = self.sweep_order {
            config.sweep_order = sweep_order;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if self.no_corner_smoothing {
            config.corner_smoothing = false;
        }
        if self.report_interval.is_some() {
            config.report_interval = self.report_interval;
        }
        Ok(config)
    }

    pub fn exporters(&self) -> Vec<Box<dyn Exporter>> {
        let mut exporters: Vec<Box<dyn Exporter>> =
            vec![Box::new(TabularExporter::new(&self.output_dir))];
        if self.write_vtk {
            exporters.push(Box::new(VtkExporter::new(&self.output_dir)));
        }
        if self.write_images {
            exporters.push(Box::new(HeatmapExporter::new(&self.output_dir)));
        }
        exporters
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join("summary.json")
    }
}
