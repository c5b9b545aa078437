//! Digit Walk
//!
//! Runs the five-state digit machine over a few input sequences and
//! prints how each run ends.
//!
//! Key concepts:
//! - States declared as tables with `table_states!`
//! - One engine per run; engines are never restarted
//! - Transition logging through `tracing`
//!
//! Run with: RUST_LOG=info cargo run --example digit_walk

use stepwise::collection::StateDefinition;
use stepwise::config::FsmConfig;
use stepwise::effects::Fsm;
use stepwise::input::InputSource;
use stepwise::table_states;

fn digit_states() -> Vec<StateDefinition> {
    table_states! {
        Start: initial { "1" => S1 };
        S1 { "3" => S3, "2" => S2 };
        S2 { "4" => End };
        S3 { "3" => S3, "2" => S2, "1" => S1 };
        End: terminal;
    }
    .expect("digit table is well formed")
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Digit Walk Example ===\n");

    let runs: [&[&'static str]; 3] = [
        &["1", "3", "1", "3", "3", "2", "4"],
        &["1", "2", "1", "4"],
        &["1", "3"],
    ];

    for values in runs {
        let inputs = InputSource::from_values("value", values.to_vec());
        let mut fsm = match Fsm::with_config(digit_states(), inputs, FsmConfig::default()) {
            Ok(fsm) => fsm,
            Err(error) => {
                println!("invalid machine: {error}");
                continue;
            }
        };

        match fsm.run(&()).await {
            Ok(outcome) => println!(
                "{values:?}: {:?} in '{}' after {} steps",
                outcome.status, outcome.state, outcome.steps
            ),
            Err(error) => println!("{values:?}: failed: {error}"),
        }

        let path: Vec<&str> = fsm
            .history()
            .get_path()
            .into_iter()
            .map(|id| id.as_str())
            .collect();
        println!("  path: {}", path.join(" -> "));
    }

    println!("\n=== Example Complete ===");
}
