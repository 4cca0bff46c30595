// ============================================================================
// lorenz.rs — Sim Engine
// Fixed-step forward Euler integration of the Lorenz system.
// ============================================================================

use bytemuck::{Pod, Zeroable};

// ======================== Parameters ========================

/// Lorenz system coefficients and solver settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LorenzParams {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
    pub dt: f64,
    pub steps: usize,
}

impl Default for LorenzParams {
    fn default() -> Self {
        Self {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
            dt: 0.01,
            steps: 10_000,
        }
    }
}

// ======================== Trajectory ========================

/// One integrated state, narrowed to `f32` and laid out for direct upload as a
/// line-strip vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TrajectoryPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl TrajectoryPoint {
    pub const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TrajectoryPoint>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Integrate from `seed` for `params.steps` steps.
///
/// Point `i` is the state after `i + 1` steps; the seed itself is not emitted.
/// State is carried in `f64` and only narrowed on output. Inputs are not
/// validated: a non-finite seed yields a non-finite trajectory.
pub fn compute_trajectory(seed: [f64; 3], params: &LorenzParams) -> Vec<TrajectoryPoint> {
    let LorenzParams {
        sigma,
        rho,
        beta,
        dt,
        steps,
    } = *params;
    let [mut x, mut y, mut z] = seed;

    let mut trajectory = Vec::with_capacity(steps);
    for _ in 0..steps {
        let dx = sigma * (y - x) * dt;
        let dy = (x * (rho - z) - y) * dt;
        let dz = (x * y - beta * z) * dt;

        x += dx;
        y += dy;
        z += dz;

        trajectory.push(TrajectoryPoint {
            x: x as f32,
            y: y as f32,
            z: z as f32,
        });
    }
    trajectory
}

/// Canonical trajectory (σ=10, ρ=28, β=8/3, dt=0.01, 10 000 steps).
pub fn compute_lorenz(x0: f64, y0: f64, z0: f64) -> Vec<TrajectoryPoint> {
    compute_trajectory([x0, y0, z0], &LorenzParams::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_step_count() {
        assert_eq!(compute_lorenz(1.0, 1.0, 1.0).len(), 10_000);
        assert_eq!(compute_lorenz(-3.0, 0.5, 20.0).len(), 10_000);

        let short = LorenzParams {
            steps: 7,
            ..Default::default()
        };
        assert_eq!(compute_trajectory([1.0, 1.0, 1.0], &short).len(), 7);

        let none = LorenzParams {
            steps: 0,
            ..Default::default()
        };
        assert!(compute_trajectory([1.0, 1.0, 1.0], &none).is_empty());
    }

    #[test]
    fn test_first_point_canonical_seed() {
        let p = compute_lorenz(1.0, 1.0, 1.0)[0];
        assert!((p.x - 1.0).abs() < EPS);
        assert!((p.y - 1.26).abs() < EPS);
        // z = 1 + (1·1 − 8/3·1)·0.01
        assert!((p.z - (1.0 + (1.0 - 8.0 / 3.0) * 0.01) as f32).abs() < EPS);
        assert!((p.z - 0.983_333).abs() < EPS);
    }

    #[test]
    fn test_second_point_follows_from_first() {
        // Hand-computed second step, carried in f64 like the solver.
        let (x, y, z) = (1.0f64, 1.26f64, 1.0 + (1.0 - 8.0 / 3.0) * 0.01);
        let x2 = x + 10.0 * (y - x) * 0.01;
        let y2 = y + (x * (28.0 - z) - y) * 0.01;
        let z2 = z + (x * y - 8.0 / 3.0 * z) * 0.01;

        let p = compute_lorenz(1.0, 1.0, 1.0)[1];
        assert!((p.x - x2 as f32).abs() < EPS);
        assert!((p.y - y2 as f32).abs() < EPS);
        assert!((p.z - z2 as f32).abs() < EPS);
    }

    #[test]
    fn test_reproducible() {
        let a = compute_lorenz(1.0, 1.0, 1.0);
        let b = compute_lorenz(1.0, 1.0, 1.0);
        assert!(a
            .iter()
            .zip(&b)
            .all(|(p, q)| p.x.to_bits() == q.x.to_bits()
                && p.y.to_bits() == q.y.to_bits()
                && p.z.to_bits() == q.z.to_bits()));
    }

    #[test]
    fn test_diverges_from_seed() {
        let trajectory = compute_lorenz(1.0, 1.0, 1.0);
        let p = trajectory[99];
        let dist = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt();
        assert!(dist > 5.0, "trajectory stayed near origin: {:?}", p);
    }

    #[test]
    fn test_origin_is_fixed_point() {
        let trajectory = compute_lorenz(0.0, 0.0, 0.0);
        assert!(trajectory.iter().all(|p| *p == TrajectoryPoint::zeroed()));
    }

    #[test]
    fn test_non_finite_seed_propagates() {
        let trajectory = compute_lorenz(f64::NAN, 1.0, 1.0);
        assert_eq!(trajectory.len(), 10_000);
        assert!(trajectory[0].x.is_nan());
        assert!(trajectory.last().is_some_and(|p| p.y.is_nan()));
    }

    #[test]
    fn test_point_layout() {
        assert_eq!(std::mem::size_of::<TrajectoryPoint>(), 12);
        let points = [TrajectoryPoint { x: 1.0, y: 2.0, z: 3.0 }];
        let floats: &[f32] = bytemuck::cast_slice(&points);
        assert_eq!(floats, &[1.0, 2.0, 3.0]);
    }
}
