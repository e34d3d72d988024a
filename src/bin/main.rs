use georoute::config::{parse_config, Config};
use georoute::geo::{GeoIp, LookupError};

use anyhow::Context;

async fn async_main(config: Config, addresses: Vec<String>) -> anyhow::Result<()> {
    simple_logger::init_with_level(config.log_level)?;

    let geoip = GeoIp::load(&config).await?;

    for address in &addresses {
        match geoip.try_lookup_str(address) {
            Ok(coordinate) => {
                println!("{address}\t{},{}", coordinate.latitude, coordinate.longitude)
            }
            Err(LookupError::NotFound) | Err(LookupError::DatabaseUnavailable) => {
                println!("{address}\t-")
            }
            Err(error @ LookupError::Addr(_)) => {
                return Err(error).context(format!("cannot resolve {address:?}"))
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "georoute.toml".to_owned());
    let addresses: Vec<String> = args.collect();

    let config = parse_config(&config_path)?;

    #[cfg(feature = "multi-thread")]
    let mut runtime_builder = {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        if let Some(threads) = config.threads {
            builder.worker_threads(threads.get());
        }
        builder
    };
    #[cfg(not(feature = "multi-thread"))]
    let mut runtime_builder = tokio::runtime::Builder::new_current_thread();
    let runtime = runtime_builder.enable_all().build()?;

    runtime.block_on(async_main(config, addresses))
}
