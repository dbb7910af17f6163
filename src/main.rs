use clap::{Parser, Subcommand};
use museum_exhibits::catalog::{self, ExhibitQuery, WorkbookSource};
use museum_exhibits::render::Listing;
use museum_exhibits::{config, export, logging, output, photos, server};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "museum-exhibits")]
#[command(about = "Museum exhibit catalog backed by an Excel workbook")]
#[command(long_about = "\
Museum exhibit catalog backed by an Excel workbook

The workbook's active sheet must start with a header row naming these columns
(any order, extra columns ignored):

  ID_Экспоната  Название_экспоната  Название_музея  Описание  Эпоха/Период
  Категория  Дата_поступления  Фото_файл  История_связанная_с_Воронежем

Photos are looked up in the photo directory, first match wins:
  {id}.png → {id}.jpg → {id}.jpeg → {id}.webp → Фото_файл

Settings (first match wins): APP_* environment, .env, museum.toml, defaults.
Run 'museum-exhibits gen-config' to generate a documented museum.toml.")]
#[command(version)]
struct Cli {
    /// Settings file
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the catalog over HTTP
    Serve {
        /// Override the bind address
        #[arg(long)]
        host: Option<String>,
        /// Override the port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Write the catalog as a static site
    Export {
        /// Output directory (wiped first)
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// List exhibits, optionally filtered
    List {
        /// Case-insensitive search in name, description, museum, category, period
        #[arg(long)]
        query: Option<String>,
        /// Exact museum name (case-insensitive)
        #[arg(long)]
        museum: Option<String>,
        /// Exact category (case-insensitive)
        #[arg(long)]
        category: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show one exhibit
    Show {
        /// Exhibit identifier
        id: i64,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Validate the workbook without serving anything
    Check,
    /// Print a stock museum.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let load_settings = || config::load_settings(&cli.config);

    match cli.command {
        Command::Serve { host, port } => {
            let mut settings = load_settings()?;
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            settings.validate()?;
            logging::init(&settings)?;
            tokio::runtime::Runtime::new()?.block_on(server::serve(settings))?;
        }
        Command::Export { output: output_dir } => {
            let settings = load_settings()?;
            logging::init(&settings)?;
            let report = export::export_site(&settings, &output_dir)?;
            output::print_export_output(&report, &output_dir);
        }
        Command::List {
            query,
            museum,
            category,
            json,
        } => {
            let settings = load_settings()?;
            logging::init_console()?;
            let filters = ExhibitQuery {
                q: query,
                museum,
                category,
            };
            let source = WorkbookSource::new(&settings.xlsx_path);
            let exhibits: Vec<_> = catalog::list_exhibits(&source, &filters)?
                .iter()
                .map(photos::sanitize_photo_field)
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&exhibits)?);
            } else {
                output::print_exhibit_list(&exhibits);
            }
        }
        Command::Show { id, json } => {
            let settings = load_settings()?;
            logging::init_console()?;
            let source = WorkbookSource::new(&settings.xlsx_path);
            let listing = Listing::resolve(catalog::get_exhibit(&source, id)?, &settings.photos_dir);
            if json {
                println!("{}", serde_json::to_string_pretty(&listing.exhibit)?);
            } else {
                output::print_exhibit_detail(&listing);
            }
        }
        Command::Check => {
            let settings = load_settings()?;
            logging::init_console()?;
            let source = WorkbookSource::new(&settings.xlsx_path);
            let exhibits = catalog::list_exhibits(&source, &ExhibitQuery::default())?;
            output::print_check_output(source.path(), exhibits.len());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
