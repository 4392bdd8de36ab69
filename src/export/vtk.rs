use crate::domain::*;
use crate::error::ExportError;
use crate::export::*;
use crate::harness::FlowSolution;
use crate::util::*;
use std::path::{Path, PathBuf};
use vtkio::model::*;

/// One `.vtu` unstructured grid of quads per solution, viewable in ParaView.
pub struct VtkExporter {
    pub output_dir: PathBuf,
}

impl VtkExporter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        VtkExporter {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, solution: &FlowSolution) -> PathBuf {
        self.output_dir.join(format!("flow_{}.vtu", solution.tag))
    }
}

/// Quads over the full lattice with `stream`, `vorticity` and `velocity`
/// point data. Velocity is zero where it is not defined.
pub fn flow_vtk(solution: &FlowSolution) -> Vtk {
    let aabb = solution.grid.aabb();
    let h = solution.grid.spacing();

    let buffer_size = aabb.buffer_size();
    let mut points = Vec::with_capacity(3 * buffer_size);
    for coord in aabb.coord_iter() {
        points.push((coord[0] as f64 * h) as f32);
        points.push((coord[1] as f64 * h) as f32);
        points.push(0.0);
    }

    // Counter clockwise quads from each cell's lower left node
    let cell_bounds = aabb.cell_bounds();
    let n_cells = cell_bounds.buffer_size();
    let mut connectivity = Vec::with_capacity(4 * n_cells);
    let mut offsets = Vec::with_capacity(n_cells);
    let mut offset = 4;
    for cell_coord in cell_bounds.coord_iter() {
        let corners = [
            cell_coord,
            cell_coord + vector![1, 0],
            cell_coord + vector![1, 1],
            cell_coord + vector![0, 1],
        ];
        for c in &corners {
            connectivity.push(aabb.coord_to_linear(c) as u64);
        }
        offsets.push(offset);
        offset += 4;
    }

    let mut velocity = vec![0.0f32; 3 * buffer_size];
    for s in &solution.velocity {
        let l = aabb.coord_to_linear(&vector![s.i, s.j]);
        velocity[3 * l] = s.vx as f32;
        velocity[3 * l + 1] = s.vy as f32;
    }

    let scalars = |name: &str, values: &[f64]| {
        Attribute::DataArray(DataArray {
            name: name.to_string(),
            elem: ElementType::Scalars {
                num_comp: 1,
                lookup_table: None,
            },
            data: IOBuffer::F32(values.iter().map(|v| *v as f32).collect()),
        })
    };

    Vtk {
        version: Version::Auto,
        title: solution.tag.clone(),
        byte_order: ByteOrder::LittleEndian,
        file_path: None,
        data: DataSet::inline(UnstructuredGridPiece {
            points: IOBuffer::F32(points),
            cells: Cells {
                cell_verts: VertexNumbers::XML {
                    connectivity,
                    offsets,
                },
                types: vec![CellType::Quad; n_cells],
            },
            data: Attributes {
                point: vec![
                    scalars("stream", solution.state.stream.buffer()),
                    scalars("vorticity", solution.state.vorticity.buffer()),
                    Attribute::DataArray(DataArray {
                        name: "velocity".to_string(),
                        elem: ElementType::Vectors,
                        data: IOBuffer::F32(velocity),
                    }),
                ],
                cell: vec![],
            },
        }),
    }
}

impl Exporter for VtkExporter {
    fn name(&self) -> &'static str {
        "vtk"
    }

    fn export(&self, solution: &FlowSolution) -> Result<(), ExportError> {
        profiling::scope!("export::vtk");
        ensure_dir_exists(&self.output_dir)?;
        let path = self.path(solution);
        tracing::debug!(?path, "writing vtk");
        flow_vtk(solution)
            .export(&path)
            .map_err(|e| ExportError::Vtk {
                path: path.clone(),
                message: format!("{e:?}"),
            })
    }
}
