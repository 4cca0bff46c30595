// ============================================================================
// scene.rs — Sim Engine
// Static scene: cube & ground geometry, per-object transforms, and the GPU
// buffers they live in for the lifetime of the window.
// ============================================================================

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::config::{
    CUBE_COLORS, CUBE_STEPS, GROUND_COLOR, GROUND_ORIGIN, GROUND_SPACING, GROUND_TILES,
    LIGHT_COLOR, LIGHT_POSITION, TRAJECTORY_COLOR, TRAJECTORY_OFFSET, TRAJECTORY_SCALE,
};
use crate::lorenz::TrajectoryPoint;

// ======================== Vertex & Uniform Structs ========================

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Per-draw model matrix and flat colour, fed as an instance-rate vertex
/// buffer (locations 2..=6).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ObjectInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 3],
    pub _pad: f32,
}

impl ObjectInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x3,
    ];

    pub fn new(model: Mat4, color: Vec3) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.to_array(),
            _pad: 0.0,
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ObjectInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LightUniforms {
    pub position: [f32; 3],
    pub _pad0: f32,
    pub color: [f32; 3],
    pub _pad1: f32,
}

impl Default for LightUniforms {
    fn default() -> Self {
        Self {
            position: LIGHT_POSITION.to_array(),
            _pad0: 0.0,
            color: LIGHT_COLOR.to_array(),
            _pad1: 0.0,
        }
    }
}

// ======================== Geometry ========================

const fn v(position: [f32; 3], normal: [f32; 3]) -> MeshVertex {
    MeshVertex { position, normal }
}

/// Unit cube, two triangles per face, per-face normals.
pub const CUBE_VERTICES: [MeshVertex; 36] = [
    v([-0.5, -0.5, -0.5], [0.0, 0.0, -1.0]),
    v([0.5, -0.5, -0.5], [0.0, 0.0, -1.0]),
    v([0.5, 0.5, -0.5], [0.0, 0.0, -1.0]),
    v([0.5, 0.5, -0.5], [0.0, 0.0, -1.0]),
    v([-0.5, 0.5, -0.5], [0.0, 0.0, -1.0]),
    v([-0.5, -0.5, -0.5], [0.0, 0.0, -1.0]),
    //
    v([-0.5, -0.5, 0.5], [0.0, 0.0, 1.0]),
    v([0.5, -0.5, 0.5], [0.0, 0.0, 1.0]),
    v([0.5, 0.5, 0.5], [0.0, 0.0, 1.0]),
    v([0.5, 0.5, 0.5], [0.0, 0.0, 1.0]),
    v([-0.5, 0.5, 0.5], [0.0, 0.0, 1.0]),
    v([-0.5, -0.5, 0.5], [0.0, 0.0, 1.0]),
    //
    v([-0.5, 0.5, 0.5], [-1.0, 0.0, 0.0]),
    v([-0.5, 0.5, -0.5], [-1.0, 0.0, 0.0]),
    v([-0.5, -0.5, -0.5], [-1.0, 0.0, 0.0]),
    v([-0.5, -0.5, -0.5], [-1.0, 0.0, 0.0]),
    v([-0.5, -0.5, 0.5], [-1.0, 0.0, 0.0]),
    v([-0.5, 0.5, 0.5], [-1.0, 0.0, 0.0]),
    //
    v([0.5, 0.5, 0.5], [1.0, 0.0, 0.0]),
    v([0.5, 0.5, -0.5], [1.0, 0.0, 0.0]),
    v([0.5, -0.5, -0.5], [1.0, 0.0, 0.0]),
    v([0.5, -0.5, -0.5], [1.0, 0.0, 0.0]),
    v([0.5, -0.5, 0.5], [1.0, 0.0, 0.0]),
    v([0.5, 0.5, 0.5], [1.0, 0.0, 0.0]),
    //
    v([-0.5, -0.5, -0.5], [0.0, -1.0, 0.0]),
    v([0.5, -0.5, -0.5], [0.0, -1.0, 0.0]),
    v([0.5, -0.5, 0.5], [0.0, -1.0, 0.0]),
    v([0.5, -0.5, 0.5], [0.0, -1.0, 0.0]),
    v([-0.5, -0.5, 0.5], [0.0, -1.0, 0.0]),
    v([-0.5, -0.5, -0.5], [0.0, -1.0, 0.0]),
    //
    v([-0.5, 0.5, -0.5], [0.0, 1.0, 0.0]),
    v([0.5, 0.5, -0.5], [0.0, 1.0, 0.0]),
    v([0.5, 0.5, 0.5], [0.0, 1.0, 0.0]),
    v([0.5, 0.5, 0.5], [0.0, 1.0, 0.0]),
    v([-0.5, 0.5, 0.5], [0.0, 1.0, 0.0]),
    v([-0.5, 0.5, -0.5], [0.0, 1.0, 0.0]),
];

/// Unit quad in the XY plane, facing -Z.
pub const GROUND_VERTICES: [MeshVertex; 4] = [
    v([0.5, 0.5, 0.0], [0.0, 0.0, -1.0]),   // top right
    v([0.5, -0.5, 0.0], [0.0, 0.0, -1.0]),  // bottom right
    v([-0.5, -0.5, 0.0], [0.0, 0.0, -1.0]), // bottom left
    v([-0.5, 0.5, 0.0], [0.0, 0.0, -1.0]),  // top left
];

pub const GROUND_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

// ======================== Transforms ========================

/// Model matrices for the ground grid, row-major over (j, i). Each tile is
/// laid flat into the XZ plane.
pub fn ground_models() -> Vec<Mat4> {
    let flatten = Mat4::from_rotation_x((-90.0f32).to_radians());
    let mut models = Vec::with_capacity((GROUND_TILES * GROUND_TILES) as usize);
    for j in 0..GROUND_TILES {
        for i in 0..GROUND_TILES {
            let offset = Vec3::new(
                GROUND_ORIGIN + GROUND_SPACING * j as f32,
                0.0,
                GROUND_ORIGIN + GROUND_SPACING * i as f32,
            );
            models.push(Mat4::from_translation(offset) * flatten);
        }
    }
    models
}

/// Cube model matrices. The translations accumulate: each cube is placed
/// relative to the previous one.
pub fn cube_models() -> Vec<Mat4> {
    CUBE_STEPS
        .iter()
        .scan(Mat4::IDENTITY, |model, step| {
            *model *= Mat4::from_translation(*step);
            Some(*model)
        })
        .collect()
}

pub fn trajectory_model() -> Mat4 {
    Mat4::from_translation(TRAJECTORY_OFFSET) * Mat4::from_scale(Vec3::splat(TRAJECTORY_SCALE))
}

pub fn ground_instances() -> Vec<ObjectInstance> {
    ground_models()
        .into_iter()
        .map(|model| ObjectInstance::new(model, GROUND_COLOR))
        .collect()
}

pub fn cube_instances() -> Vec<ObjectInstance> {
    cube_models()
        .into_iter()
        .zip(CUBE_COLORS)
        .map(|(model, color)| ObjectInstance::new(model, color))
        .collect()
}

// ======================== SceneBuffers ========================

/// A vertex buffer with its element count.
pub struct CountedBuffer {
    pub buffer: wgpu::Buffer,
    pub count: u32,
}

/// All GPU buffers for the scene. Uploaded once and never rewritten, except
/// for the light uniform which is left writable.
pub struct SceneBuffers {
    pub cube_vertices: CountedBuffer,
    pub cube_instances: CountedBuffer,

    pub ground_vertices: wgpu::Buffer,
    pub ground_indices: CountedBuffer,
    pub ground_instances: CountedBuffer,

    pub trajectory_vertices: CountedBuffer,
    pub trajectory_instance: wgpu::Buffer,

    pub light_buffer: wgpu::Buffer,
}

impl SceneBuffers {
    pub fn new(device: &wgpu::Device, trajectory: &[TrajectoryPoint]) -> Self {
        let ground = ground_instances();
        let cubes = cube_instances();
        let line = [ObjectInstance::new(trajectory_model(), TRAJECTORY_COLOR)];

        Self {
            cube_vertices: CountedBuffer {
                buffer: vertex_buffer(device, "cube_vertices", bytemuck::cast_slice(&CUBE_VERTICES)),
                count: CUBE_VERTICES.len() as u32,
            },
            cube_instances: CountedBuffer {
                buffer: vertex_buffer(device, "cube_instances", bytemuck::cast_slice(&cubes)),
                count: cubes.len() as u32,
            },
            ground_vertices: vertex_buffer(
                device,
                "ground_vertices",
                bytemuck::cast_slice(&GROUND_VERTICES),
            ),
            ground_indices: CountedBuffer {
                buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("ground_indices"),
                    contents: bytemuck::cast_slice(&GROUND_INDICES),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                count: GROUND_INDICES.len() as u32,
            },
            ground_instances: CountedBuffer {
                buffer: vertex_buffer(device, "ground_instances", bytemuck::cast_slice(&ground)),
                count: ground.len() as u32,
            },
            trajectory_vertices: CountedBuffer {
                buffer: vertex_buffer(device, "trajectory_vertices", bytemuck::cast_slice(trajectory)),
                count: trajectory.len() as u32,
            },
            trajectory_instance: vertex_buffer(
                device,
                "trajectory_instance",
                bytemuck::cast_slice(&line),
            ),
            light_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("light_uniforms"),
                contents: bytemuck::bytes_of(&LightUniforms::default()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            }),
        }
    }
}

fn vertex_buffer(device: &wgpu::Device, label: &str, contents: &[u8]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage: wgpu::BufferUsages::VERTEX,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_ground_grid_layout() {
        let models = ground_models();
        assert_eq!(models.len(), 100);

        let first = models[0].transform_point3(Vec3::ZERO);
        assert!((first - Vec3::new(-2.54, 0.0, -2.54)).length() < EPS);

        // (j = 0, i = 1) steps along Z; (j = 1, i = 0) along X.
        let next_z = models[1].transform_point3(Vec3::ZERO);
        assert!((next_z - Vec3::new(-2.54, 0.0, -1.52)).length() < EPS);
        let next_x = models[10].transform_point3(Vec3::ZERO);
        assert!((next_x - Vec3::new(-1.52, 0.0, -2.54)).length() < EPS);
    }

    #[test]
    fn test_ground_tiles_lie_flat() {
        for model in ground_models() {
            for vertex in GROUND_VERTICES {
                let p = model.transform_point3(Vec3::from_array(vertex.position));
                assert!(p.y.abs() < EPS, "tile vertex off the ground: {:?}", p);
            }
        }
    }

    #[test]
    fn test_cube_translations_accumulate() {
        let centres: Vec<Vec3> = cube_models()
            .iter()
            .map(|m| m.transform_point3(Vec3::ZERO))
            .collect();
        let expected = [
            Vec3::new(4.0, 0.5, 0.0),
            Vec3::new(4.0, 0.5, 4.0),
            Vec3::new(0.0, 0.5, 4.0),
            Vec3::new(0.0, 0.5, 0.0),
        ];
        assert_eq!(centres.len(), expected.len());
        for (got, want) in centres.iter().zip(expected) {
            assert!((*got - want).length() < EPS, "{:?} != {:?}", got, want);
        }
    }

    #[test]
    fn test_cubes_rest_on_ground() {
        for model in cube_models() {
            let lowest = CUBE_VERTICES
                .iter()
                .map(|v| model.transform_point3(Vec3::from_array(v.position)).y)
                .fold(f32::INFINITY, f32::min);
            assert!(lowest.abs() < EPS);
        }
    }

    #[test]
    fn test_cube_colors() {
        let cubes = cube_instances();
        assert_eq!(cubes[0].color, [0.0, 0.5, 0.31]);
        assert!(cubes[1..].iter().all(|c| c.color == [1.0, 0.5, 0.31]));
    }

    #[test]
    fn test_trajectory_model() {
        let p = trajectory_model().transform_point3(Vec3::new(10.0, 20.0, 30.0));
        assert!((p - Vec3::new(2.0, 3.0, 3.0)).length() < EPS);
    }

    #[test]
    fn test_cube_normals_are_unit_axes() {
        for vertex in CUBE_VERTICES {
            let n = Vec3::from_array(vertex.normal);
            assert!((n.length() - 1.0).abs() < EPS);
            // Every vertex sits on the face its normal points out of.
            assert!((Vec3::from_array(vertex.position).dot(n) - 0.5).abs() < EPS);
        }
    }

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<ObjectInstance>(), 80);
        assert_eq!(std::mem::size_of::<MeshVertex>(), 24);
        assert_eq!(std::mem::size_of::<LightUniforms>(), 32);
        assert!(GROUND_INDICES.iter().all(|&i| (i as usize) < GROUND_VERTICES.len()));
    }
}
