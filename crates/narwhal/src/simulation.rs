use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::force::Force;
use crate::node::Node;
use crate::random::{RandomSource, XorShift64Star};

/// Upper bound on [`Simulation::run`] when alpha never drops below `alpha_min`.
pub const MAX_RUN_TICKS: usize = 10_000;

/// Cooling schedule and integration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationOptions {
    pub alpha: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub alpha_target: f64,
    pub velocity_decay: f64,
    /// Scale of the phyllotaxis spiral used to place unpositioned nodes.
    pub initial_radius: f64,
    pub initial_angle: f64,
    /// Seed for the jitter source. Identical seeds give bit-identical runs.
    pub random_seed: u64,
}

impl SimulationOptions {
    /// Per-tick decay that takes alpha from 1 to `alpha_min` in `ticks` ticks.
    pub fn decay_for(alpha_min: f64, ticks: u32) -> f64 {
        1.0 - alpha_min.powf(1.0 / f64::from(ticks))
    }
}

impl Default for SimulationOptions {
    fn default() -> Self {
        let alpha_min = 0.001;
        Self {
            alpha: 1.0,
            alpha_min,
            alpha_decay: Self::decay_for(alpha_min, 300),
            alpha_target: 0.0,
            velocity_decay: 0.6,
            initial_radius: 10.0,
            // Golden angle.
            initial_angle: std::f64::consts::PI * (3.0 - 5.0_f64.sqrt()),
            random_seed: 42,
        }
    }
}

/// Drives the node set through cooling, force application and integration.
pub struct Simulation<D = ()> {
    nodes: Vec<Node<D>>,
    options: SimulationOptions,
    alpha: f64,
    forces: IndexMap<String, Box<dyn Force<D>>>,
    rng: Box<dyn RandomSource>,
}

impl<D> Simulation<D> {
    pub fn new(nodes: Vec<Node<D>>, options: SimulationOptions) -> Self {
        let rng = Box::new(XorShift64Star::new(options.random_seed));
        Self::with_random_source(nodes, options, rng)
    }

    /// Uses a caller-supplied jitter source instead of one seeded from `options.random_seed`.
    pub fn with_random_source(
        nodes: Vec<Node<D>>,
        options: SimulationOptions,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let mut sim = Self {
            nodes,
            alpha: options.alpha,
            options,
            forces: IndexMap::new(),
            rng,
        };
        sim.init_nodes();
        sim
    }

    /// Assigns indices and fills in missing positions and velocities.
    fn init_nodes(&mut self) {
        let SimulationOptions {
            initial_radius,
            initial_angle,
            ..
        } = self.options;

        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.index = i;
            if node.fixed {
                if node.vx.is_nan() || node.vy.is_nan() {
                    node.vx = 0.0;
                    node.vy = 0.0;
                }
                continue;
            }
            if let Some(fx) = node.fx {
                node.x = fx;
            }
            if let Some(fy) = node.fy {
                node.y = fy;
            }
            if node.x.is_nan() || node.y.is_nan() {
                let radius = initial_radius * (0.5 + i as f64).sqrt();
                let angle = initial_angle * i as f64;
                node.x = radius * angle.cos();
                node.y = radius * angle.sin();
            }
            if node.vx.is_nan() || node.vy.is_nan() {
                node.vx = 0.0;
                node.vy = 0.0;
            }
        }
        tracing::debug!(nodes = self.nodes.len(), "simulation nodes initialized");
    }

    /// Re-runs node initialization and re-initializes every registered force.
    ///
    /// Call after editing nodes through [`Simulation::nodes_mut`].
    pub fn initialize(&mut self) -> Result<()> {
        self.init_nodes();
        for force in self.forces.values_mut() {
            force.initialize(&self.nodes)?;
        }
        Ok(())
    }

    /// Registers `force` under `name`, initializing it against the current nodes.
    ///
    /// Replacing an existing name keeps its position in the application order and returns the
    /// previous force.
    pub fn add_force<F>(
        &mut self,
        name: impl Into<String>,
        mut force: F,
    ) -> Result<Option<Box<dyn Force<D>>>>
    where
        F: Force<D> + 'static,
    {
        let name = name.into();
        force.initialize(&self.nodes)?;
        tracing::debug!(force = %name, "force registered");
        Ok(self.forces.insert(name, Box::new(force)))
    }

    pub fn remove_force(&mut self, name: &str) -> Result<Box<dyn Force<D>>> {
        let force = self
            .forces
            .shift_remove(name)
            .ok_or_else(|| Error::ForceNotFound {
                name: name.to_string(),
            })?;
        tracing::debug!(force = %name, "force removed");
        Ok(force)
    }

    pub fn force(&self, name: &str) -> Option<&dyn Force<D>> {
        self.forces.get(name).map(|f| f.as_ref())
    }

    /// Registered force names, in application order.
    pub fn force_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.forces.keys().map(String::as_str)
    }

    /// Advances the simulation by `iterations` ticks.
    pub fn tick(&mut self, iterations: usize) {
        for _ in 0..iterations {
            self.alpha += (self.options.alpha_target - self.alpha) * self.options.alpha_decay;
            tracing::trace!(alpha = self.alpha, "tick");

            for force in self.forces.values_mut() {
                force.apply(&mut self.nodes, self.alpha, self.rng.as_mut());
            }

            let decay = self.options.velocity_decay;
            for node in self.nodes.iter_mut().filter(|n| !n.fixed) {
                match node.fx {
                    Some(fx) => {
                        node.x = fx;
                        node.vx = 0.0;
                    }
                    None => {
                        node.vx *= decay;
                        node.x += node.vx;
                    }
                }
                match node.fy {
                    Some(fy) => {
                        node.y = fy;
                        node.vy = 0.0;
                    }
                    None => {
                        node.vy *= decay;
                        node.y += node.vy;
                    }
                }
            }
        }
    }

    /// Ticks until alpha cools below `alpha_min`, returning the number of ticks taken.
    ///
    /// Stops after [`MAX_RUN_TICKS`] if the schedule never gets there (e.g. `alpha_target` at or
    /// above `alpha_min`).
    pub fn run(&mut self) -> usize {
        let mut ticks = 0;
        while self.alpha >= self.options.alpha_min && ticks < MAX_RUN_TICKS {
            self.tick(1);
            ticks += 1;
        }
        if self.alpha >= self.options.alpha_min {
            tracing::warn!(
                ticks,
                alpha = self.alpha,
                "simulation stopped before alpha reached alpha_min"
            );
        } else {
            tracing::debug!(ticks, alpha = self.alpha, "simulation converged");
        }
        ticks
    }

    /// The node closest to `(x, y)`, optionally restricted to within `radius`.
    ///
    /// Ties go to the earliest node.
    pub fn find(&self, x: f64, y: f64, radius: Option<f64>) -> Option<&Node<D>> {
        let mut best = radius.map_or(f64::INFINITY, |r| r * r);
        let mut closest = None;
        for node in &self.nodes {
            let dx = x - node.x;
            let dy = y - node.y;
            let d2 = dx * dx + dy * dy;
            if d2 < best {
                best = d2;
                closest = Some(node);
            }
        }
        closest
    }

    pub fn nodes(&self) -> &[Node<D>] {
        &self.nodes
    }

    /// Mutable node access. Velocity and pin edits take effect on the next tick; structural
    /// edits need [`Simulation::initialize`].
    pub fn nodes_mut(&mut self) -> &mut [Node<D>] {
        &mut self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node<D>> {
        self.nodes
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut SimulationOptions {
        &mut self.options
    }
}

impl<D: std::fmt::Debug> std::fmt::Debug for Simulation<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("nodes", &self.nodes)
            .field("options", &self.options)
            .field("alpha", &self.alpha)
            .field("forces", &self.forces.keys().collect::<Vec<_>>())
            .field("rng", &self.rng)
            .finish()
    }
}
