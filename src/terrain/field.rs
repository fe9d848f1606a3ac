use std::f32::consts::PI;

use super::random::RandomSource;
use super::topology::planar_coordinates;
use super::{MapConfig, TerrainError};

/// One sampled perturbation event: a circle on the map plane and a signed,
/// already-halved displacement applied with cosine falloff.
#[derive(Debug, Clone, Copy)]
struct CirclePass {
    center_x: f32,
    center_z: f32,
    radius: f32,
    displacement: f32,
}

impl CirclePass {
    /// Draws in source order: center x, center z, radius, sign, magnitude.
    /// Sign is flipped negative when the raw draw falls below the threshold,
    /// then the magnitude is halved to keep individual deltas gentle.
    fn sample<R: RandomSource + ?Sized>(config: &MapConfig, rng: &mut R) -> Self {
        let center_x = rng.uniform(0.0, config.map_size);
        let center_z = rng.uniform(0.0, config.map_size);
        let radius = rng.uniform(0.0, config.max_circle_radius);
        let sign = if rng.uniform(0.0, 1.0) < config.sign_flip_threshold {
            -1.0
        } else {
            1.0
        };
        let displacement = sign * rng.uniform(0.0, config.max_displacement) / 2.0;
        Self {
            center_x,
            center_z,
            radius,
            displacement,
        }
    }
}

/// The mutable height channel over a [`GridTopology`](super::GridTopology)
/// grid. Starts flat and accumulates circle passes; every other coordinate of
/// the grid stays fixed.
#[derive(Debug, Clone)]
pub struct HeightField {
    config: MapConfig,
    // Same planar lattice the topology stores, from the same generator.
    xs: Vec<f32>,
    zs: Vec<f32>,
    heights: Vec<f32>,
}

impl HeightField {
    /// Create a flat field for the configured grid.
    ///
    /// # Errors
    ///
    /// Returns the corresponding [`TerrainError`] when the configuration
    /// fails [`MapConfig::validate`].
    pub fn new(config: MapConfig) -> Result<Self, TerrainError> {
        config.validate()?;
        let (xs, zs) = planar_coordinates(config.side_count, config.map_size);
        Ok(Self {
            config,
            xs,
            zs,
            heights: vec![0.0; config.vertex_count()],
        })
    }

    /// Current heights, row-major, one entry per grid vertex.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Zero every height, returning the field to its initial flat state.
    pub fn reset(&mut self) {
        self.heights.fill(0.0);
    }

    /// Apply `count` sequential circle passes.
    ///
    /// Passes are never batched: each one samples its own circle and lands on
    /// the heights left by the previous pass, so the caller sees exactly
    /// `count` accumulation events.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidIterations`] for `count == 0`.
    pub fn apply_iterations<R: RandomSource + ?Sized>(
        &mut self,
        count: u32,
        rng: &mut R,
    ) -> Result<(), TerrainError> {
        if count == 0 {
            return Err(TerrainError::InvalidIterations);
        }
        for _ in 0..count {
            self.apply_pass(rng);
        }
        Ok(())
    }

    /// Apply a single circle pass.
    pub fn apply_pass<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let pass = CirclePass::sample(&self.config, rng);
        for ((height, &x), &z) in self.heights.iter_mut().zip(&self.xs).zip(&self.zs) {
            let dx = pass.center_x - x;
            let dz = pass.center_z - z;
            // Distance normalized so the circle edge lands at 1.0.
            let nd = 2.0 * (dx * dx + dz * dz).sqrt() / pass.radius;
            if nd.abs() <= 1.0 {
                *height += pass.displacement * (1.0 + (nd * PI).cos());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::random::ScriptedRandom;
    use super::super::{GridTopology, SeededRandom};
    use super::*;

    /// 5x5 grid over 10 units puts a vertex exactly at the map center (5, 5).
    fn center_vertex_config() -> MapConfig {
        MapConfig {
            side_count: 5,
            map_size: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_field_is_flat() {
        let field = HeightField::new(MapConfig::default()).unwrap();
        assert_eq!(field.heights().len(), 6400);
        assert!(field.heights().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = MapConfig {
            side_count: 1,
            ..Default::default()
        };
        assert_eq!(
            HeightField::new(config).unwrap_err(),
            TerrainError::InvalidDimension(1)
        );
    }

    #[test]
    fn test_rejects_degenerate_sampling_ranges() {
        // Zero-width draw ranges would abort inside the circle sampler, so
        // construction must refuse them before any pass can run.
        let no_radius = MapConfig {
            max_circle_radius: 0.0,
            ..Default::default()
        };
        assert_eq!(
            HeightField::new(no_radius).unwrap_err(),
            TerrainError::InvalidCircleRadius(0.0)
        );

        let no_displacement = MapConfig {
            max_displacement: 0.0,
            ..Default::default()
        };
        assert_eq!(
            HeightField::new(no_displacement).unwrap_err(),
            TerrainError::InvalidDisplacement(0.0)
        );
    }

    #[test]
    fn test_pass_centers_align_with_topology_positions() {
        // side_count 7 gives a non-representable step (10/6); an exact peak
        // of 2d at vertex k requires the field to measure distance against
        // the very same coordinates the topology stores.
        let config = MapConfig {
            side_count: 7,
            ..Default::default()
        };
        let topo = GridTopology::build(config.side_count, config.map_size).unwrap();
        let mut field = HeightField::new(config).unwrap();

        let k = 3 * 7 + 5;
        let mut rng = ScriptedRandom::new(&[topo.xs[k], topo.zs[k], 5.0, 0.5, 1.0]);
        field.apply_iterations(1, &mut rng).unwrap();

        assert_eq!(field.heights()[k], 1.0);
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let mut field = HeightField::new(center_vertex_config()).unwrap();
        let mut rng = SeededRandom::from_seed(0);
        assert_eq!(
            field.apply_iterations(0, &mut rng).unwrap_err(),
            TerrainError::InvalidIterations
        );
        // Validation happens before any mutation.
        assert!(field.heights().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_dome_at_exact_center() {
        // Draws: cx=5, cz=5, r=5, sign draw 0.5 (>= 0.3, stays positive),
        // magnitude 1.0. Halved displacement d = 0.5; the vertex at the
        // center gains d * (1 + cos(0)) = 1.0 exactly.
        let mut field = HeightField::new(center_vertex_config()).unwrap();
        let mut rng = ScriptedRandom::new(&[5.0, 5.0, 5.0, 0.5, 1.0]);
        field.apply_iterations(1, &mut rng).unwrap();

        // Vertex 12 = row 2, col 2 = (5.0, 5.0)
        assert_eq!(field.heights()[12], 1.0);

        // Everything farther than r/2 = 2.5 from the center is untouched:
        // corners are at distance sqrt(50).
        assert_eq!(field.heights()[0], 0.0);
        assert_eq!(field.heights()[4], 0.0);
        assert_eq!(field.heights()[20], 0.0);
        assert_eq!(field.heights()[24], 0.0);
    }

    #[test]
    fn test_cosine_falloff_vanishes_at_circle_edge() {
        let mut field = HeightField::new(center_vertex_config()).unwrap();
        let mut rng = ScriptedRandom::new(&[5.0, 5.0, 5.0, 0.5, 1.0]);
        field.apply_iterations(1, &mut rng).unwrap();

        // Vertex 7 = (2.5, 5.0) lies exactly on the circle edge (nd = 1);
        // the falloff term 1 + cos(pi) leaves it at essentially zero.
        assert!(field.heights()[7].abs() < 1e-6);
    }

    #[test]
    fn test_crater_when_sign_draw_below_threshold() {
        // Sign draw 0.1 < 0.3 forces a negative displacement.
        let mut field = HeightField::new(center_vertex_config()).unwrap();
        let mut rng = ScriptedRandom::new(&[5.0, 5.0, 5.0, 0.1, 1.0]);
        field.apply_iterations(1, &mut rng).unwrap();

        assert_eq!(field.heights()[12], -1.0);
    }

    #[test]
    fn test_passes_accumulate_sequentially() {
        let script = [5.0, 5.0, 5.0, 0.5, 1.0];
        let mut field = HeightField::new(center_vertex_config()).unwrap();
        let mut rng = ScriptedRandom::new(&[script, script].concat());
        field.apply_iterations(2, &mut rng).unwrap();

        // Two identical passes stack to 2.0 at the center.
        assert_eq!(field.heights()[12], 2.0);
    }

    #[test]
    fn test_per_pass_delta_is_bounded() {
        let config = MapConfig::default();
        let mut field = HeightField::new(config).unwrap();
        let mut rng = SeededRandom::from_seed(1234);

        let mut previous = field.heights().to_vec();
        for _ in 0..200 {
            field.apply_pass(&mut rng);
            for (before, after) in previous.iter().zip(field.heights()) {
                let delta = after - before;
                assert!(
                    delta.abs() <= config.max_displacement,
                    "pass delta {} exceeds bound",
                    delta
                );
            }
            previous = field.heights().to_vec();
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = MapConfig::default();
        let mut a = HeightField::new(config).unwrap();
        let mut b = HeightField::new(config).unwrap();

        let mut rng_a = SeededRandom::from_seed(99);
        let mut rng_b = SeededRandom::from_seed(99);
        a.apply_iterations(50, &mut rng_a).unwrap();
        b.apply_iterations(50, &mut rng_b).unwrap();

        assert_eq!(a.heights(), b.heights());
    }

    #[test]
    fn test_reset_restores_flat_field() {
        let mut field = HeightField::new(center_vertex_config()).unwrap();
        let mut rng = SeededRandom::from_seed(5);
        field.apply_iterations(10, &mut rng).unwrap();
        assert!(field.heights().iter().any(|&h| h != 0.0));

        field.reset();
        assert!(field.heights().iter().all(|&h| h == 0.0));
    }
}
