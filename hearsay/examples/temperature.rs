//! A bidirectional temperature converter: °F = °C × 9/5 + 32.
//!
//! The constraint network is the *relation* between the two scales,
//! not a function from one to the other — assert either end and the
//! other is derived. Retract the assertion and everything derived from
//! it vanishes.
//!
//! Run with: `cargo run --example temperature`

use hearsay::arith::{adder, constant, multiplier};
use hearsay::lattice::Value;
use hearsay::network::Network;

fn show(net: &Network, name: &str, cell: hearsay::cell::CellId) {
    println!("  {name} = {}", net.read_cell(cell).unwrap());
}

fn main() {
    let mut net = Network::new();

    // celsius × ratio = scaled;  scaled + offset = fahrenheit
    let celsius = net.create_cell();
    let ratio = net.create_cell();
    let scaled = net.create_cell();
    let offset = net.create_cell();
    let fahrenheit = net.create_cell();

    multiplier(&mut net, celsius, ratio, scaled).unwrap();
    adder(&mut net, scaled, offset, fahrenheit).unwrap();

    constant(&mut net, ratio, 9.0 / 5.0, "nine-fifths").unwrap();
    constant(&mut net, offset, 32.0, "thirty-two").unwrap();

    println!("=== Forward: assert 100 °C ===");
    net.add_content(celsius, Value::Number(100.0), "thermometer")
        .unwrap();
    show(&net, "celsius", celsius);
    show(&net, "fahrenheit", fahrenheit);

    println!("\n=== Retract the thermometer reading ===");
    net.retract_content(celsius, "thermometer").unwrap();
    show(&net, "celsius", celsius);
    show(&net, "fahrenheit", fahrenheit);

    println!("\n=== Backward: assert 32 °F ===");
    net.add_content(fahrenheit, Value::Number(32.0), "weather-report")
        .unwrap();
    show(&net, "fahrenheit", fahrenheit);
    show(&net, "celsius", celsius);

    println!("\nWho is responsible for the celsius value?");
    for informant in net.support_of(celsius).unwrap() {
        println!("  - {informant}");
    }
}
