//! Retail demand simulator entry point: CLI wiring and config-driven runs.

use std::path::{Path, PathBuf};
use std::process;

use tracing_subscriber::EnvFilter;

use retail_sim::config::ScenarioConfig;
use retail_sim::context::SimContext;
use retail_sim::io::export::export_csv;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    history_path: Option<PathBuf>,
    product: Option<String>,
    discount_override: Option<i32>,
    competitor_override: Option<i32>,
    seed_override: Option<u64>,
    list_products: bool,
    forecast_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("retail-sim - Recursive daily demand forecaster with pricing what-ifs");
    eprintln!();
    eprintln!("Usage: retail-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --history <path>         Load the product catalog from CSV");
    eprintln!("  --product <name>         Product to forecast (default: first in catalog)");
    eprintln!("  --discount <i32>         Price change in percent, e.g. -20");
    eprintln!("  --competitor <i32>       Competitor price change in percent");
    eprintln!("  --seed <u64>             Override synthetic data seed");
    eprintln!("  --list-products          Print catalog products and exit");
    eprintln!("  --forecast-out <path>    Export the forecast table to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after the run");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
    eprintln!("Set RUST_LOG (e.g. RUST_LOG=debug) to control log verbosity.");
}

/// Returns the value following a flag, exiting with a message if absent.
fn flag_value<'a>(args: &'a [String], i: usize, flag: &str, what: &str) -> &'a str {
    match args.get(i) {
        Some(v) => v,
        None => {
            eprintln!("error: {flag} requires {what}");
            process::exit(1);
        }
    }
}

/// Parses a flag value, exiting with a message if it is malformed.
fn parse_value<T: std::str::FromStr>(raw: &str, flag: &str, ty: &str) -> T {
    raw.parse::<T>().unwrap_or_else(|_| {
        eprintln!("error: {flag} value \"{raw}\" is not a valid {ty}");
        process::exit(1);
    })
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        history_path: None,
        product: None,
        discount_override: None,
        competitor_override: None,
        seed_override: None,
        list_products: false,
        forecast_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                cli.scenario_path = Some(flag_value(&args, i, flag, "a path argument").into());
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(flag_value(&args, i, flag, "a name argument").into());
            }
            "--history" => {
                i += 1;
                cli.history_path = Some(flag_value(&args, i, flag, "a path argument").into());
            }
            "--product" => {
                i += 1;
                cli.product = Some(flag_value(&args, i, flag, "a product name").into());
            }
            "--discount" => {
                i += 1;
                let raw = flag_value(&args, i, flag, "an i32 argument");
                cli.discount_override = Some(parse_value(raw, flag, "i32"));
            }
            "--competitor" => {
                i += 1;
                let raw = flag_value(&args, i, flag, "an i32 argument");
                cli.competitor_override = Some(parse_value(raw, flag, "i32"));
            }
            "--seed" => {
                i += 1;
                let raw = flag_value(&args, i, flag, "a u64 argument");
                cli.seed_override = Some(parse_value(raw, flag, "u64"));
            }
            "--list-products" => {
                cli.list_products = true;
            }
            "--forecast-out" => {
                i += 1;
                cli.forecast_out = Some(flag_value(&args, i, flag, "a path argument").into());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let raw = flag_value(&args, i, flag, "a u16 argument");
                cli.port = parse_value(raw, flag, "u16");
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if cli.scenario_path.is_some() && cli.preset.is_some() {
        eprintln!("error: --scenario and --preset are mutually exclusive");
        process::exit(1);
    }

    cli
}

/// Loads the scenario and applies CLI overrides.
fn load_config(cli: &CliArgs) -> ScenarioConfig {
    let loaded = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)
    } else {
        Ok(ScenarioConfig::baseline())
    };
    let mut scenario = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(ref product) = cli.product {
        scenario.simulation.product = Some(product.clone());
    }
    if let Some(d) = cli.discount_override {
        scenario.simulation.discount_delta = d;
    }
    if let Some(c) = cli.competitor_override {
        scenario.simulation.competitor_delta = c;
    }
    if let Some(seed) = cli.seed_override {
        scenario.history.seed = seed;
    }
    if let Some(ref path) = cli.history_path {
        scenario.history.source = "csv".to_string();
        scenario.history.path = Some(path.clone());
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    scenario
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();
    let scenario = load_config(&cli);

    let ctx = SimContext::from_config(&scenario, None).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    if cli.list_products {
        for product in ctx.catalog().products() {
            println!("{product}");
        }
        return;
    }

    let product = ctx
        .resolve_product(scenario.simulation.product.as_deref())
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            process::exit(1);
        });
    let adjustment = scenario.adjustment();

    let (days, kpi) = ctx
        .forecast_with_kpi(&product, adjustment)
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            process::exit(1);
        });

    let comparison = ctx
        .compare(
            &product,
            adjustment.discount_delta,
            &scenario.scenarios,
            scenario.simulation.parallel_scenarios,
        )
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            process::exit(1);
        });

    println!("Product: {product}");
    for d in &days {
        let marker = if scenario
            .simulation
            .days_of_interest
            .contains(&d.record.day_of_month())
        {
            "  <<"
        } else {
            ""
        };
        println!("{d}{marker}");
    }

    println!("\n{kpi}");
    println!("\n{comparison}");

    if let Some(ref path) = cli.forecast_out {
        if let Err(e) = export_csv(&days, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Forecast written to {path}");
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(retail_sim::api::AppState {
            product,
            adjustment,
            kpi,
            forecast: days,
            scenarios: comparison,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(retail_sim::api::serve(state, addr));
    }
}
