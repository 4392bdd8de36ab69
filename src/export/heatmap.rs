use crate::domain::*;
use crate::error::ExportError;
use crate::export::*;
use crate::grid::Grid;
use crate::harness::FlowSolution;
use std::path::{Path, PathBuf};

/// PNG heat maps of the streamfunction and the vorticity.
pub struct HeatmapExporter {
    pub output_dir: PathBuf,
}

impl HeatmapExporter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        HeatmapExporter {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, field: &str, solution: &FlowSolution) -> PathBuf {
        self.output_dir.join(format!("{field}_{}.png", solution.tag))
    }
}

/// One pixel per node, `j` growing upward. Values are scaled to `[0, 1]`
/// over the fluid nodes and mapped through TURBO, the beam is black.
pub fn heatmap(grid: &Grid, domain: &OwnedDomain<2>) -> image::RgbImage {
    let aabb = grid.aabb();
    let exclusive_bounds = aabb.exclusive_bounds();
    let fluid =
        |c: &crate::util::Coord<2>| !grid.is_inside_obstacle(c[0], c[1]);

    let (lo, hi) = aabb
        .coord_iter()
        .filter(fluid)
        .map(|c| domain.view(&c))
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let span = hi - lo;

    let gradient = colorous::TURBO;
    let (width, height) = (exclusive_bounds[0] as u32, exclusive_bounds[1] as u32);
    let mut img = image::RgbImage::new(width, height);
    for coord in aabb.coord_iter() {
        let x = coord[0] as u32;
        let y = (grid.ny() - coord[1]) as u32;
        let pixel = if fluid(&coord) {
            let v = domain.view(&coord);
            let r = if span > 0.0 { (v - lo) / span } else { 0.5 };
            image::Rgb(gradient.eval_continuous(r.clamp(0.0, 1.0)).as_array())
        } else {
            image::Rgb([0, 0, 0])
        };
        img.put_pixel(x, y, pixel);
    }
    img
}

impl Exporter for HeatmapExporter {
    fn name(&self) -> &'static str {
        "heatmap"
    }

    fn export(&self, solution: &FlowSolution) -> Result<(), ExportError> {
        profiling::scope!("export::heatmap");
        ensure_dir_exists(&self.output_dir)?;
        for (field, domain) in [
            ("stream", &solution.state.stream),
            ("vorticity", &solution.state.vorticity),
        ] {
            let path = self.path(field, solution);
            tracing::debug!(?path, "writing image");
            heatmap(&solution.grid, domain).save(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::grid::Obstacle;

    #[test]
    fn heatmap_test() {
        let grid = Grid::new(10, 6, 1.0, 1.0, Obstacle::new(3, 2, 2)).unwrap();
        let mut domain = OwnedDomain::new(*grid.aabb());
        domain.par_set_values(|c| c[1] as f64, 8);
        let img = heatmap(&grid, &domain);
        assert_eq!(img.dimensions(), (11, 7));

        // Beam is black, bottom row of the image is j = 0.
        assert_eq!(img.get_pixel(4, 6), &image::Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(4, 4), &image::Rgb([0, 0, 0]));
        assert_ne!(img.get_pixel(4, 3), &image::Rgb([0, 0, 0]));

        let low = image::Rgb(colorous::TURBO.eval_continuous(0.0).as_array());
        let high = image::Rgb(colorous::TURBO.eval_continuous(1.0).as_array());
        assert_eq!(img.get_pixel(0, 6), &low);
        assert_eq!(img.get_pixel(0, 0), &high);
    }
}
