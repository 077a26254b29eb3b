//! Mock data source
//!
//! Produces synthetic exposition text that changes on every fetch. Counters
//! grow by a random amount, gauges wander. Samples carry `start`, `end` and
//! `status` labels so that default aggregation has something to collapse.
//! Only used when no real source is configured and mock data is requested.

use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Default seed, so that runs are reproducible
pub const DEFAULT_SEED: u64 = 0x6d65_7472_6963_73;

const PATHS: [&str; 3] = ["/api/v1/system/ping", "/api/v1/search", "/api/v1/upload"];
const STATUSES: [&str; 3] = ["200", "404", "500"];
const POOLS: [&str; 2] = ["heap", "nonheap"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Configuration for [`Mock`]
pub struct Config {
    /// Seed of the random number generator
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self { seed: DEFAULT_SEED }
    }
}

/// The mock source
#[derive(Debug)]
pub struct Mock {
    rng: SmallRng,
    generation: u64,
    requests: Vec<f64>,
    memory: Vec<f64>,
}

impl Mock {
    /// Create a new [`Mock`] instance
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(config.seed),
            generation: 0,
            requests: vec![0.0; PATHS.len() * STATUSES.len()],
            memory: vec![64.0 * 1024.0 * 1024.0; POOLS.len()],
        }
    }

    /// Produce the next batch of metrics text
    pub fn fetch(&mut self) -> String {
        self.generation += 1;
        let start = self.generation * 1000;
        let end = start + 999;

        let mut out = String::new();
        out.push_str("# HELP app_http_requests_total Requests served by path and status.\n");
        out.push_str("# TYPE app_http_requests_total counter\n");
        for (idx, count) in self.requests.iter_mut().enumerate() {
            *count += f64::from(self.rng.random_range(0..50u32));
            let path = PATHS[idx / STATUSES.len()];
            let status = STATUSES[idx % STATUSES.len()];
            out.push_str(&format!(
                "app_http_requests_total{{path=\"{path}\",status=\"{status}\",start=\"{start}\",end=\"{end}\"}} {count}\n"
            ));
        }

        out.push_str("# HELP app_memory_bytes Memory in use by pool.\n");
        out.push_str("# TYPE app_memory_bytes gauge\n");
        for (pool, bytes) in POOLS.iter().zip(self.memory.iter_mut()) {
            let delta = self.rng.random_range(-1_048_576.0..1_048_576.0);
            *bytes = (*bytes + delta).max(0.0);
            out.push_str(&format!("app_memory_bytes{{pool=\"{pool}\"}} {bytes}\n"));
        }

        out.push_str("# TYPE app_up gauge\n");
        out.push_str("app_up 1\n");
        out
    }
}
