//! World simulation engine - main simulation loop.

use crate::config::Config;
use crate::environment::Environment;
use crate::genetics::Genome;
use crate::organism::{Organism, OrganismId};
use crate::stats::{Stats, StatsHistory};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// The simulation world
pub struct World {
    // Population, every member alive
    pub organisms: Vec<Organism>,

    // Environment
    pub environment: Environment,

    // State
    pub time: u64,

    // Configuration
    pub config: Config,

    // Statistics
    pub stats: Stats,
    pub stats_history: StatsHistory,

    // ID generation
    next_organism_id: OrganismId,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl World {
    /// Create a new world with the given configuration
    pub fn new(config: Config) -> Self {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new, empty world with a specific seed for reproducibility
    ///
    /// A zero `grid_size` is raised to a single cell.
    pub fn new_with_seed(mut config: Config, seed: u64) -> Self {
        if config.world.grid_size == 0 {
            log::warn!("grid_size 0 is not a valid dish, using a 1x1 grid");
            config.world.grid_size = 1;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let environment = Environment::new(&config.world, &mut rng);
        let stats_history = StatsHistory::new(config.logging.stats_interval);

        Self {
            organisms: Vec::new(),
            environment,
            time: 0,
            config,
            stats: Stats::new(),
            stats_history,
            next_organism_id: 0,
            rng,
            seed,
        }
    }

    /// Seed `count` copies of `genome` at uniformly random positions
    pub fn populate(&mut self, genome: &Genome, count: usize) {
        let size = self.config.world.grid_size as f32;

        let mut placements = Vec::with_capacity(count);
        for _ in 0..count {
            let id = self.next_id();
            let x = self.rng.gen_range(0.0..size);
            let y = self.rng.gen_range(0.0..size);
            placements.push((id, x, y));
        }

        // Expression is pure in the genome, so it can run in parallel
        let config = &self.config;
        let seeded: Vec<Organism> = placements
            .into_par_iter()
            .map(|(id, x, y)| Organism::new(id, genome.clone(), x, y, config))
            .collect();

        self.organisms.extend(seeded);
    }

    /// Create an organism from `genome` at a given position
    pub fn spawn(&mut self, genome: Genome, x: f32, y: f32) -> OrganismId {
        let id = self.next_id();
        let organism = Organism::new(id, genome, x, y, &self.config);
        self.organisms.push(organism);
        id
    }

    /// Add an existing organism; dead organisms are not admitted
    pub fn add_organism(&mut self, organism: Organism) {
        if organism.is_alive() {
            self.next_organism_id = self.next_organism_id.max(organism.id + 1);
            self.organisms.push(organism);
        }
    }

    /// Main simulation step.
    ///
    /// Organisms are processed in population order, each reading the cell it
    /// starts the tick on. Survivors keep their order; offspring are appended
    /// after all survivors in birth order.
    pub fn tick(&mut self) {
        self.environment.update(&self.config.world, &mut self.rng);
        let size = self.environment.size();

        let current = std::mem::take(&mut self.organisms);
        let mut survivors = Vec::with_capacity(current.len());
        let mut offspring = Vec::new();
        let mut deaths = 0;

        for mut org in current {
            let (cx, cy) = org.cell(size);
            let (light, nutrient) = self.environment.sense(org.x, org.y);

            org.move_in(&self.environment.light, &mut self.rng, &self.config);
            org.metabolize(light, nutrient, &self.config);

            if !org.is_alive() {
                deaths += 1;
                continue;
            }

            let child_id = self.next_organism_id;
            if let Some(child) = org.reproduce(child_id, &mut self.rng, &self.config) {
                self.next_organism_id += 1;
                self.environment
                    .nutrient
                    .deplete(cx, cy, self.config.world.birth_depletion);
                offspring.push(child);
            }
            survivors.push(org);
        }

        let births = offspring.len();
        survivors.append(&mut offspring);
        self.organisms = survivors;
        self.time = self.environment.tick;

        self.update_stats(births, deaths);
    }

    /// Update statistics
    fn update_stats(&mut self, births: usize, deaths: usize) {
        self.stats.tick = self.time;
        self.stats.births = births;
        self.stats.deaths = deaths;
        self.stats.update(&self.organisms);

        log::trace!(
            "tick {}: population={} births={} deaths={}",
            self.time,
            self.stats.population,
            births,
            deaths
        );

        // Record history
        let interval = self.config.logging.stats_interval;
        if interval > 0 && self.time % interval == 0 {
            self.stats_history.record(self.stats.clone());
        }
    }

    /// Run simulation for specified number of ticks
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Run simulation with callback for progress updates
    pub fn run_with_callback<F>(&mut self, ticks: u64, mut callback: F)
    where
        F: FnMut(&World, u64),
    {
        for i in 0..ticks {
            self.tick();
            callback(self, i);
        }
    }

    /// Organism with the highest fitness; the first one on ties
    pub fn fittest(&self) -> Option<&Organism> {
        self.organisms
            .iter()
            .reduce(|best, org| if org.fitness > best.fitness { org } else { best })
    }

    /// Fresh statistics for the current population
    pub fn statistics(&self) -> Stats {
        let mut stats = Stats {
            tick: self.time,
            births: self.stats.births,
            deaths: self.stats.deaths,
            ..Stats::default()
        };
        stats.update(&self.organisms);
        stats
    }

    /// Get current population count
    pub fn population(&self) -> usize {
        self.organisms.len()
    }

    /// Check if population is extinct
    pub fn is_extinct(&self) -> bool {
        self.organisms.is_empty()
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn next_id(&mut self) -> OrganismId {
        let id = self.next_organism_id;
        self.next_organism_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.world.grid_size = 40;
        config
    }

    fn seeded_world(seed: u64, count: usize) -> World {
        let mut world = World::new_with_seed(test_config(), seed);
        world.populate(&Genome::starter(), count);
        world
    }

    #[test]
    fn test_world_creation() {
        let world = seeded_world(1, 30);

        assert_eq!(world.population(), 30);
        assert_eq!(world.time, 0);
        assert!(world.organisms.iter().all(|o| o.x >= 0.0 && o.x < 40.0));

        let mut ids: Vec<_> = world.organisms.iter().map(|o| o.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 30);
    }

    #[test]
    fn test_world_tick() {
        let mut world = seeded_world(2, 30);
        world.tick();

        assert_eq!(world.time, 1);
        assert_eq!(world.environment.tick, 1);
        assert_eq!(world.stats.tick, 1);
    }

    #[test]
    fn test_population_all_alive_and_on_torus() {
        let mut world = seeded_world(3, 30);

        for _ in 0..200 {
            world.tick();
            for org in &world.organisms {
                assert!(org.is_alive());
                assert!(org.x >= 0.0 && org.x < 40.0);
                assert!(org.y >= 0.0 && org.y < 40.0);
            }
        }
    }

    #[test]
    fn test_starving_organism_removed() {
        let mut world = World::new_with_seed(test_config(), 4);
        world.spawn(Genome::starter(), 5.0, 5.0);
        world.organisms[0].energy = 0.001;
        world.organisms[0].phenotype.efficiency = 0.0;

        world.tick();

        assert!(world.is_extinct());
        assert_eq!(world.stats.deaths, 1);
        assert!(world.fittest().is_none());
    }

    #[test]
    fn test_birth_depletes_nutrients() {
        let mut config = test_config();
        config.world.flicker_probability = 0.0;
        let mut world = World::new_with_seed(config, 5);
        world.spawn(Genome::starter(), 12.5, 7.5);
        world.organisms[0].energy = 100.0;

        let before = world.environment.nutrient.get(12, 7);
        world.tick();

        assert_eq!(world.population(), 2);
        assert_eq!(world.stats.births, 1);
        assert_eq!(world.organisms[0].offspring_count, 1);
        assert_eq!(world.organisms[1].generation, 1);

        let expected = ((before + 0.002).min(1.0) - 0.15).max(0.0);
        assert!((world.environment.nutrient.get(12, 7) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_fittest_first_maximum() {
        let mut world = seeded_world(6, 4);
        world.organisms[1].fitness = 5.0;
        world.organisms[2].fitness = 5.0;

        let best = world.fittest().unwrap();
        assert_eq!(best.id, world.organisms[1].id);
    }

    #[test]
    fn test_statistics_empty_world() {
        let world = World::new_with_seed(test_config(), 7);
        let stats = world.statistics();

        assert_eq!(stats.population, 0);
        assert_eq!(stats.avg_fitness, 0.0);
        assert_eq!(stats.max_fitness, 0.0);
        assert_eq!(stats.avg_energy, 0.0);
        assert_eq!(stats.avg_genome_length, 0.0);
        assert_eq!(stats.avg_active_genes, 0.0);
    }

    #[test]
    fn test_reproducibility() {
        let mut world1 = seeded_world(42, 30);
        let mut world2 = seeded_world(42, 30);

        world1.run(150);
        world2.run(150);

        assert_eq!(world1.statistics(), world2.statistics());
        let genomes1: Vec<_> = world1.organisms.iter().map(|o| o.genome.clone()).collect();
        let genomes2: Vec<_> = world2.organisms.iter().map(|o| o.genome.clone()).collect();
        assert_eq!(genomes1, genomes2);
    }

    #[test]
    fn test_stats_history_interval() {
        let mut config = test_config();
        config.logging.stats_interval = 10;
        let mut world = World::new_with_seed(config, 8);
        world.populate(&Genome::starter(), 10);

        world.run(100);

        assert_eq!(world.stats_history.snapshots.len(), 10);
        assert_eq!(world.stats_history.population_series()[0].0, 10);
    }

    #[test]
    fn test_add_organism_skips_dead() {
        let mut world = World::new_with_seed(test_config(), 9);
        let config = world.config.clone();
        let mut corpse = Organism::new(50, Genome::starter(), 1.0, 1.0, &config);
        corpse.alive = false;

        world.add_organism(corpse);
        assert!(world.is_extinct());

        world.add_organism(Organism::new(50, Genome::starter(), 1.0, 1.0, &config));
        assert_eq!(world.population(), 1);
        assert_eq!(world.spawn(Genome::starter(), 2.0, 2.0), 51);
    }

    #[test]
    fn test_zero_grid_becomes_single_cell() {
        let mut config = test_config();
        config.world.grid_size = 0;
        let mut world = World::new_with_seed(config, 10);
        world.populate(&Genome::starter(), 5);

        assert_eq!(world.environment.size(), 1);
        assert_eq!(world.population(), 5);

        world.run(5);
        for org in &world.organisms {
            assert!(org.x >= 0.0 && org.x < 1.0);
            assert!(org.y >= 0.0 && org.y < 1.0);
        }
    }
}
