//! Map coloring with the finite-domain solver.
//!
//! Color mainland Australia with three colors so that no two
//! neighboring territories share one. AC-3 prunes what it can; the
//! backtracking search finishes the job.
//!
//! Run with: `cargo run --example map_coloring`

use std::collections::BTreeSet;

use hearsay::solver::{solve, Constraint, Domains};

const COLORS: [&str; 3] = ["red", "green", "blue"];

const TERRITORIES: [&str; 7] = ["WA", "NT", "SA", "Q", "NSW", "V", "T"];

const BORDERS: [(&str, &str); 9] = [
    ("WA", "NT"),
    ("WA", "SA"),
    ("NT", "SA"),
    ("NT", "Q"),
    ("SA", "Q"),
    ("SA", "NSW"),
    ("SA", "V"),
    ("Q", "NSW"),
    ("NSW", "V"),
];

fn main() {
    let domains: Domains = TERRITORIES
        .iter()
        .map(|t| {
            let all: BTreeSet<i64> = (0..COLORS.len() as i64).collect();
            (t.to_string(), all)
        })
        .collect();

    let constraints: Vec<Constraint> = BORDERS
        .iter()
        .map(|(x, y)| Constraint::binary(*x, *y, |a, b| a != b))
        .collect();

    match solve(&domains, &constraints) {
        Ok(solution) => {
            println!("A 3-coloring of mainland Australia (plus Tasmania):");
            for territory in TERRITORIES {
                let color = COLORS[solution[territory] as usize];
                println!("  {territory:4} {color}");
            }
        }
        Err(e) => println!("no coloring: {e}"),
    }
}
