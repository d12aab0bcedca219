use anyhow::Result;
use clap::Parser;
use log::{debug, info};

use stylegen::cli::Args;
use stylegen::codegen::Generator;
use stylegen::codegen::writer::ArtifactWriter;
use stylegen::config::Config;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    // Console logging (respects RUST_LOG if set)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    debug!("Command-line args: {:?}", args);

    let config = Config::from_env_and_cli(args.output_root);
    debug!("Config: {:?}", config);

    let spec = config.load_spec()?;
    let generator = Generator::new(&spec);

    if let Some(dir) = &config.shader_dir {
        generator.check_shaders(dir)?;
    }

    let writer = ArtifactWriter::new(&config.output_root, config.dry_run);
    let report = generator.generate(&writer)?;
    if config.dry_run && !report.would_update.is_empty() {
        info!("Dry run: {} files are outdated", report.would_update.len());
    }
    Ok(())
}
