use log::info;
use phasegraph_runner::{AnalysisConfig, RegimeAnalyzer, SyntheticConfig, regime_switch_series};

fn print_help() {
    eprintln!(
        r#"PhaseGraph - regime detection on a synthetic regime-switch series

USAGE:
    phasegraph [CONFIG]

ARGS:
    CONFIG              Optional JSON configuration file

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (e.g. info, phasegraph_engine=debug)
"#
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1).map(String::as_str) {
        Some("--help" | "-h") => {
            print_help();
            return Ok(());
        }
        Some(path) => {
            info!("Loading configuration from: {}", path);
            AnalysisConfig::from_file(path)?
        }
        None => AnalysisConfig::default(),
    };

    let seed = config.engine.seed;
    let analyzer = RegimeAnalyzer::new(config)?;
    let series = regime_switch_series(&SyntheticConfig::default(), seed)?;
    let report = analyzer.analyze(&series)?;

    println!("{}", serde_json::to_string_pretty(&report.summary())?);
    Ok(())
}
