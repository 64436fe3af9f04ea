use dotenvy::dotenv;
use std::env;

pub struct Config {
    /// World speed multiplier: divides build and training times.
    pub speed: i8,
    /// Seconds between world ticks.
    pub tick_interval_secs: u64,
    /// Max villages processed concurrently within one tick.
    pub tick_workers: usize,
    /// Max due queue entries applied per village per tick.
    pub tick_batch_size: usize,
    /// Fraction of the carried cost returned on cancellation.
    pub refund_fraction: f64,
    pub construction_queue_limit: usize,
    pub training_queue_limit: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let speed = match env::var("OPPIDUM_SERVER_SPEED") {
            Ok(val) => val.parse::<i8>().unwrap_or(1).clamp(1, 5),
            Err(_) => 1,
        };

        let tick_interval_secs = match env::var("OPPIDUM_TICK_INTERVAL_SECS") {
            Ok(val) => val.parse::<u64>().unwrap_or(5).max(1),
            Err(_) => 5,
        };

        let tick_workers = match env::var("OPPIDUM_TICK_WORKERS") {
            Ok(val) => val.parse::<usize>().unwrap_or(4).max(1),
            Err(_) => 4,
        };

        let tick_batch_size = match env::var("OPPIDUM_TICK_BATCH_SIZE") {
            Ok(val) => val.parse::<usize>().unwrap_or(100).max(1),
            Err(_) => 100,
        };

        let refund_fraction = match env::var("OPPIDUM_REFUND_FRACTION") {
            Ok(val) => val.parse::<f64>().unwrap_or(0.5).clamp(0.0, 1.0),
            Err(_) => 0.5,
        };

        let construction_queue_limit = match env::var("OPPIDUM_CONSTRUCTION_QUEUE_LIMIT") {
            Ok(val) => val.parse::<usize>().unwrap_or(2).max(1),
            Err(_) => 2,
        };

        let training_queue_limit = match env::var("OPPIDUM_TRAINING_QUEUE_LIMIT") {
            Ok(val) => val.parse::<usize>().unwrap_or(5).max(1),
            Err(_) => 5,
        };

        Self {
            speed,
            tick_interval_secs,
            tick_workers,
            tick_batch_size,
            refund_fraction,
            construction_queue_limit,
            training_queue_limit,
        }
    }
}
