use clap::Parser;
use kiseki::prelude::*;
use std::fs;
use std::process;
use std::time::Instant;

/// A routine graph compilation and code generation engine CLI
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the routine `{nodes, edges}` JSON file
    routine_path: String,

    /// Optional path to the device registry JSON file
    #[arg(short, long)]
    devices: Option<String>,

    /// The code generation target
    #[arg(short, long, value_enum, default_value_t = GeneratorChoice::Encoder)]
    target: GeneratorChoice,

    /// Initial pose as "x,y,heading" in field inches/degrees
    #[arg(short, long, default_value = "72,72,0")]
    pose: String,

    /// Write the generated source here instead of stdout
    #[arg(short, long)]
    output: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let total_start = Instant::now();

    let routine_json = fs::read_to_string(&cli.routine_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read routine file '{}': {}",
            &cli.routine_path, e
        ))
    });
    let definition = RoutineDefinition::from_json_str(&routine_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse routine JSON: {}", e)));

    let devices = match &cli.devices {
        Some(path) => {
            let json = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read devices file '{}': {}", path, e))
            });
            DeviceRegistry::from_json_str(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse devices JSON: {}", e)))
        }
        None => {
            eprintln!("No device registry provided. Using the stock mecanum layout.");
            DeviceRegistry::default()
        }
    };

    let initial = parse_pose(&cli.pose)
        .unwrap_or_else(|| exit_with_error(&format!("Invalid pose '{}'", cli.pose)));

    let graph = definition
        .into_graph()
        .unwrap_or_else(|e| exit_with_error(&format!("Routine validation failed: {}", e)));
    let waypoints = derive_waypoints(&graph, initial);

    let source = generate(cli.target, &graph, &waypoints, &devices)
        .unwrap_or_else(|e| exit_with_error(&format!("Code generation failed: {}", e)));

    match &cli.output {
        Some(path) => {
            fs::write(path, &source).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write '{}': {}", path, e))
            });
            eprintln!(
                "Generated {} target to '{}' in {:.2?} ({} waypoints)",
                cli.target,
                path,
                total_start.elapsed(),
                waypoints.len()
            );
        }
        None => print!("{}", source),
    }
}

fn parse_pose(text: &str) -> Option<Pose> {
    let parts: Vec<f64> = text
        .split(',')
        .map(|p| p.trim().parse().ok())
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        [x, y, heading] => Some(Pose::new(*x, *y, *heading)),
        _ => None,
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}
