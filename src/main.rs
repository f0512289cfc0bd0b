use log::info;

use rasterbundle::config::LoadConfig;
use rasterbundle::inputs;
use rasterbundle::loader::Loader;

const USAGE: &str = "usage: rasterbundle [--config FILE] [PATH...]";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config_path = None;
    let mut paths = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => config_path = Some(args.next().ok_or(USAGE)?),
            "--help" | "-h" => {
                println!("{}", USAGE);
                return Ok(());
            }
            _ => paths.push(arg),
        }
    }

    let config = match config_path {
        Some(path) => LoadConfig::from_file(path)?,
        None => LoadConfig::default(),
    };

    // Command line paths come before the configured ones
    paths.extend(config.inputs().iter().cloned());
    if paths.is_empty() {
        return Err(USAGE.into());
    }
    let config = config.with_inputs(paths);
    let names = inputs::expand(config.inputs(), config.extensions())?;

    let loader = Loader::gdal(config);
    for name in &names {
        let bundle = loader.load_all(name)?;
        info!("{}:\n{}", name, bundle);
        for array in bundle.arrays() {
            info!(
                "  {} [{}] dims {:?}, {} metadata entries",
                array.name(),
                array.storage(),
                array.dims(),
                array.metadata().len()
            );
        }
    }

    Ok(())
}
