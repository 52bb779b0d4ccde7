use clap::{Parser, Subcommand};
use memdoc::cli::{self as prog_cli, OutputMode};
use memdoc::config::load_config;
use memdoc::utils::logger;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "memdoc", version, about = "Query NDJSON files with document filters, updates and pipelines", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to a config file (TOML). Falls back to MEMDOC_CONFIG, ./memdoc.toml, ~/.config/memdoc.toml")]
    config: Option<PathBuf>,
    #[arg(long, help = "Print reports as key=value pairs instead of JSON")]
    plain: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Find documents matching a filter; prints NDJSON to stdout")]
    Find {
        #[arg(help = "NDJSON data file")]
        data: PathBuf,
        #[arg(help = "Filter JSON (e.g., {\"age\": {\"$gte\": 21}})")]
        filter: String,
        #[arg(long, help = "Projection fields comma-separated (e.g., name,address.city)")]
        project: Option<String>,
        #[arg(long, allow_hyphen_values = true, help = "Sort spec comma-separated; -age,+name")]
        sort: Option<String>,
        #[arg(long, help = "Limit results")]
        limit: Option<usize>,
        #[arg(long, help = "Skip N results")]
        skip: Option<usize>,
    },
    #[command(about = "Count documents matching a filter")]
    Count {
        data: PathBuf,
        filter: String,
    },
    #[command(about = "Apply an update document ($set, $unset, $push, $pull) to matching documents")]
    Update {
        data: PathBuf,
        filter: String,
        update: String,
        #[arg(long, help = "Update only the first match")]
        one: bool,
        #[arg(long, help = "Write the result back to the data file")]
        write: bool,
    },
    #[command(about = "Delete matching documents")]
    Delete {
        data: PathBuf,
        filter: String,
        #[arg(long, help = "Delete only the first match")]
        one: bool,
        #[arg(long, help = "Write the result back to the data file")]
        write: bool,
    },
    #[command(about = "Run an aggregation pipeline (JSON array of stages); prints NDJSON")]
    Aggregate {
        data: PathBuf,
        pipeline: String,
        #[arg(long, help = "Save an $out result as <out>.ndjson next to the data file")]
        write: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let cfg = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };
    // file logging only when a log directory is configured
    if cfg.log_dir.is_some()
        && let Err(e) = logger::configure_logging(&cfg.log_settings())
    {
        eprintln!("warning: logging disabled: {e}");
    }

    let cmd = match cli.command {
        Commands::Find { data, filter, project, sort, limit, skip } => {
            prog_cli::Command::Find { data, filter_json: filter, project, sort, limit, skip }
        }
        Commands::Count { data, filter } => prog_cli::Command::Count { data, filter_json: filter },
        Commands::Update { data, filter, update, one, write } => {
            prog_cli::Command::Update { data, filter_json: filter, update_json: update, one, write }
        }
        Commands::Delete { data, filter, one, write } => {
            prog_cli::Command::Delete { data, filter_json: filter, one, write }
        }
        Commands::Aggregate { data, pipeline, write } => {
            prog_cli::Command::Aggregate { data, pipeline_json: pipeline, write }
        }
    };
    let mode = if cli.plain { OutputMode::Plain } else { OutputMode::Json };
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    if let Err(e) = prog_cli::run_with_format(cmd, &cfg, mode, &mut lock) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
