use std::hash::RandomState;

use clap::Parser;
use robin_map::HashMap;
use robin_map::MAX_LOAD_PERCENT;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Percentage of keys to remove after filling, to show the effect of
    /// cluster repair on probe lengths.
    #[arg(short = 'r', long = "remove_percent", default_value_t = 0)]
    remove_percent: u64,
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating HashMap with target capacity: {}",
        args.target_capacity
    );

    let mut map: HashMap<u64, u64, RandomState> = HashMap::with_capacity(args.target_capacity);

    println!("Actual slots: {}", map.capacity());
    println!("Filling map up to {MAX_LOAD_PERCENT}% load with u64 keys...");

    let num_values = map.capacity() * MAX_LOAD_PERCENT / 100;
    for i in 0..num_values as u64 {
        let inserted = map.insert(i, i);
        assert!(inserted, "Key already exists in map: {i}");
    }

    println!("Inserted {} values into map", map.len());
    println!(
        "Final load factor: {:.2}%",
        (map.len() as f64 / map.capacity() as f64) * 100.0
    );

    map.probe_histogram().print();
    map.debug_stats().print();

    if args.remove_percent > 0 {
        let mut removed = 0;
        for i in 0..num_values as u64 {
            if i % 100 < args.remove_percent && map.remove(&i).is_some() {
                removed += 1;
            }
        }

        println!();
        println!("Removed {removed} values");
        map.probe_histogram().print();
        map.debug_stats().print();
    }
}
