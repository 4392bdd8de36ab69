use crate::error::ExportError;
use crate::export::*;
use crate::harness::FlowSolution;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

/// Whitespace separated `.dat` files, one row per node, readable by gnuplot
/// and numpy alike. Covers `0 <= i < nx`, `0 <= j < ny`.
pub struct TabularExporter {
    pub output_dir: PathBuf,
}

impl TabularExporter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        TabularExporter {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, field: &str, solution: &FlowSolution) -> PathBuf {
        self.output_dir.join(format!("{field}_{}.dat", solution.tag))
    }

    fn write_header<W: Write>(
        output: &mut W,
        title: &str,
        columns: &str,
        solution: &FlowSolution,
    ) -> std::io::Result<()> {
        let grid = &solution.grid;
        match solution.reynolds {
            Some(re) => writeln!(output, "# {title} - Re = {re}")?,
            None => writeln!(output, "# {title} - potential flow")?,
        }
        writeln!(output, "# Format: {columns}")?;
        writeln!(
            output,
            "# Parameters: Nx={} Ny={} h={}",
            grid.nx(),
            grid.ny(),
            grid.spacing()
        )
    }

    fn write_scalar(
        &self,
        field: &str,
        title: &str,
        column: &str,
        solution: &FlowSolution,
        value: impl Fn(i32, i32) -> f64,
    ) -> Result<(), ExportError> {
        let path = self.path(field, solution);
        tracing::debug!(?path, "writing");
        let write = || -> std::io::Result<()> {
            let mut output =
                std::io::BufWriter::new(std::fs::File::create(&path)?);
            let format = format!("x y {column}");
            Self::write_header(&mut output, title, &format, solution)?;
            let grid = &solution.grid;
            let h = grid.spacing();
            for i in 0..grid.nx() {
                for j in 0..grid.ny() {
                    let (x, y) = (i as f64 * h, j as f64 * h);
                    writeln!(output, "{x:.6} {y:.6} {:.6}", value(i, j))?;
                }
            }
            output.flush()
        };
        write().map_err(|e| ExportError::io(&path, e))
    }

    fn write_velocity(
        &self,
        solution: &FlowSolution,
    ) -> Result<(), ExportError> {
        let path = self.path("velocity_field", solution);
        tracing::debug!(?path, "writing");
        let write = || -> std::io::Result<()> {
            let mut output =
                std::io::BufWriter::new(std::fs::File::create(&path)?);
            Self::write_header(
                &mut output,
                "Velocity field",
                "x y vx vy magnitude",
                solution,
            )?;
            let h = solution.grid.spacing();
            for s in &solution.velocity {
                writeln!(
                    output,
                    "{:.6} {:.6} {:.6} {:.6} {:.6}",
                    s.i as f64 * h,
                    s.j as f64 * h,
                    s.vx,
                    s.vy,
                    s.magnitude()
                )?;
            }
            output.flush()
        };
        write().map_err(|e| ExportError::io(&path, e))
    }
}

impl Exporter for TabularExporter {
    fn name(&self) -> &'static str {
        "tabular"
    }

    fn export(&self, solution: &FlowSolution) -> Result<(), ExportError> {
        profiling::scope!("export::tabular");
        ensure_dir_exists(&self.output_dir)?;
        let state = &solution.state;
        self.write_scalar(
            "streamfunction",
            "Streamfunction",
            "psi",
            solution,
            |i, j| state.u(i, j),
        )?;
        self.write_scalar("vorticity", "Vorticity", "omega", solution, |i, j| {
            state.w(i, j)
        })?;
        self.write_velocity(solution)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::domain::*;
    use crate::grid::{Grid, Obstacle};

    fn solution() -> FlowSolution {
        let grid = Grid::new(8, 5, 1.0, 1.0, Obstacle::new(2, 1, 1)).unwrap();
        let mut state = FlowState::new(*grid.aabb());
        state.stream.par_set_values(|c| c[1] as f64 * 0.5, 4);
        state.set_w(3, 4, -1.25);
        FlowSolution::new("Re0.5".to_string(), Some(0.5), grid, state)
    }

    #[test]
    fn writes_three_files_test() {
        let dir = std::env::temp_dir().join(format!("beamflow_tabular_{}", std::process::id()));
        let exporter = TabularExporter::new(&dir);
        let solution = solution();
        exporter.export(&solution).unwrap();

        let stream = std::fs::read_to_string(dir.join("streamfunction_Re0.5.dat")).unwrap();
        let lines: Vec<&str> = stream.lines().collect();
        assert_eq!(lines[0], "# Streamfunction - Re = 0.5");
        assert_eq!(lines[1], "# Format: x y psi");
        assert_eq!(lines[2], "# Parameters: Nx=8 Ny=5 h=1");
        assert_eq!(lines.len(), 3 + 8 * 5);
        assert_eq!(lines[4], "0.000000 1.000000 0.500000");

        let vorticity = std::fs::read_to_string(dir.join("vorticity_Re0.5.dat")).unwrap();
        assert!(vorticity.contains("3.000000 4.000000 -1.250000\n"));

        let velocity = std::fs::read_to_string(dir.join("velocity_field_Re0.5.dat")).unwrap();
        assert_eq!(velocity.lines().count(), 3 + solution.velocity.len());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
