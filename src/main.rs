use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use prayer_times::{
    aladhan::AladhanClient,
    chat,
    client::{FormClient, LocationPrefill, ProxyClient},
    config::Config,
    error::ClientError,
    geocode::ReverseGeocoder,
    history::{FileStore, RecentSearches},
    server,
    service::PrayerService,
    suggest,
};

#[derive(Parser, Debug)]
#[command(name = "prayer-times", version, about = "Islamic prayer times by city")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP proxy (default)
    Serve,
    /// Look up prayer times through a running proxy
    Lookup {
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        country: Option<String>,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Prefill city and country from coordinates
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Proxy URL, overrides the configured one
        #[arg(long)]
        server: Option<String>,
    },
    /// List recent searches, newest first
    Recent,
    /// Autocomplete a city or country name
    Suggest {
        field: Field,
        text: String,
    },
    /// Ask an assistant for prayer times in plain language
    Chat,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Field {
    City,
    Country,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => server::start_server(&config).await?,
        Commands::Lookup {
            city,
            country,
            date,
            lat,
            lon,
            server,
        } => {
            let server_url = server.unwrap_or_else(|| config.client.server_url.clone());
            let mut form = FormClient::new(
                ProxyClient::new(server_url),
                ReverseGeocoder::new(&config.geocode.base_url),
                RecentSearches::load(history_store(&config)?),
            );

            let (mut city, mut country) = (city.unwrap_or_default(), country.unwrap_or_default());
            if let (Some(lat), Some(lon)) = (lat, lon) {
                match form.detect_location(lat, lon).await {
                    LocationPrefill::Detected(place) => {
                        info!("Detected: {}, {}", place.city, place.country);
                        if city.is_empty() {
                            city = place.city;
                        }
                        if country.is_empty() {
                            country = place.country;
                        }
                    }
                    LocationPrefill::Hint(hint) => warn!("{hint}"),
                }
            }

            let date = date.unwrap_or_else(FormClient::<FileStore>::today);
            match form.submit(&city, &country, &date).await {
                Ok(result) => {
                    println!("{}, {} ({})", result.city, result.country, result.date);
                    for (name, time) in result.timings.iter() {
                        println!("  {name:<8} {time}");
                    }
                }
                Err(ClientError::Request(e)) => {
                    warn!("Request failed: {}", e);
                    anyhow::bail!(prayer_times::client::GENERIC_FAILURE);
                }
                Err(e) => anyhow::bail!(e),
            }
        }
        Commands::Recent => {
            let store = history_store(&config)?;
            debug!("Reading recent searches from {}", store.path().display());
            let history = RecentSearches::load(store);
            if history.entries().is_empty() {
                println!("No recent searches");
            }
            for entry in history.entries() {
                println!(
                    "{}, {}  ({})",
                    entry.city,
                    entry.country,
                    entry.timestamp.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Commands::Suggest { field, text } => {
            let found = match field {
                Field::City => suggest::suggest_cities(&text),
                Field::Country => suggest::suggest_countries(&text),
            };
            for name in found {
                println!("{name}");
            }
        }
        Commands::Chat => {
            let provider = AladhanClient::new(&config.upstream.base_url, config.upstream.method);
            let service = PrayerService::new(Arc::new(provider));
            chat::run(&config.chat.model, service).await?;
        }
    }

    Ok(())
}

fn history_store(config: &Config) -> Result<FileStore, ClientError> {
    match &config.client.history_path {
        Some(path) => Ok(FileStore::new(path)),
        None => FileStore::default_location(),
    }
}
