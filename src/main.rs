use std::time::{Duration, Instant};

use junction_sim::{SimConfig, Simulation};

fn main() {
    let frames: Option<u64> = match std::env::args().nth(1) {
        Some(arg) => match arg.parse() {
            Ok(n) => Some(n),
            Err(_) => {
                eprintln!("invalid frame count: {}", arg);
                std::process::exit(1);
            }
        },
        None => None,
    };

    let config = SimConfig::default();
    let tick = Duration::from_secs(1) / config.tick_rate;
    let mut sim = Simulation::new(config);

    println!("Simulating...");
    let mut next_tick = Instant::now();
    let mut last_report = Instant::now();
    loop {
        sim.step();

        if last_report.elapsed() >= Duration::from_secs(1) {
            println!(
                "t={}ms green={} vehicles={}",
                sim.now_ms(),
                sim.green_road(),
                sim.vehicle_count()
            );
            last_report = Instant::now();
        }

        if let Some(n) = frames {
            if sim.frame() >= n {
                break;
            }
        }

        // Carry leftover frame time forward so pacing error never
        // accumulates and the tick rate stays at its target.
        next_tick += tick;
        let now = Instant::now();
        if next_tick > now {
            std::thread::sleep(next_tick - now);
        } else {
            next_tick = now;
        }
    }
}
