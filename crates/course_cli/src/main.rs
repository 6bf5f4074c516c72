//! Course catalog command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration from flags and `COURSE_*` environment values.
//! - Open the SQLite store, seed it once, and run one API handler.
//! - Print the response status and JSON body.

use clap::{Parser, Subcommand};
use course_api::ApiResponse;
use course_core::db::open_db;
use course_core::{
    default_catalog, init_logging, CourseConfig, CourseService, CourseStore, SqliteCourseStore,
};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

/// Manage the course catalog stored in a SQLite file.
#[derive(Parser, Debug)]
#[command(name = "course", version)]
#[command(about = "Course catalog CRUD over a SQLite document table", long_about = None)]
struct Args {
    /// SQLite database file (overrides COURSE_DB_PATH)
    #[arg(short, long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error (overrides COURSE_LOG_LEVEL)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files (overrides COURSE_LOG_DIR)
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Skip seeding the default catalog into an empty database
    #[arg(long)]
    no_seed: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print version and status
    Health,
    /// List all courses
    List,
    /// Show one course
    Get { id: String },
    /// Create a course from a JSON body; a non-empty `id` is kept
    Create { json: String },
    /// Replace a course from a JSON body carrying its `id`
    Update { json: String },
    /// Delete a course; unknown ids are not an error
    Delete { id: String },
    /// Create a course from a request body (name, language, level, description)
    CreateDto { json: String },
    /// Update a course from a request body carrying its `id`
    UpdateDto { json: String },
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(response) => {
            println!("{}", response.status);
            if !response.body.is_null() {
                println!("{:#}", response.body);
            }
            if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(message) => {
            eprintln!("course: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ApiResponse, String> {
    let config = resolve_config(&args)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let response = match &args.command {
        Command::Health => course_api::health(),
        command => {
            let conn = open_db(&config.db_path).map_err(|err| {
                format!("failed to open `{}`: {err}", config.db_path.display())
            })?;
            let store = SqliteCourseStore::try_new(&conn).map_err(|err| err.to_string())?;
            let service = CourseService::new(store);

            if config.seed_defaults {
                let inserted = service
                    .bootstrap_seed(&default_catalog())
                    .map_err(|err| format!("seeding failed: {err}"))?;
                info!("event=cli_seed module=cli status=ok inserted={inserted}");
            }
            dispatch(&service, command)
        }
    };
    Ok(response)
}

fn dispatch<S: CourseStore>(service: &CourseService<S>, command: &Command) -> ApiResponse {
    match command {
        Command::Health => course_api::health(),
        Command::List => course_api::list_courses(service),
        Command::Get { id } => course_api::get_course(service, id),
        Command::Create { json } => course_api::create_course(service, json),
        Command::Update { json } => course_api::update_course(service, json),
        Command::Delete { id } => course_api::delete_course(service, id),
        Command::CreateDto { json } => course_api::create_course_from_request(service, json),
        Command::UpdateDto { json } => course_api::update_course_from_request(service, json),
    }
}

fn resolve_config(args: &Args) -> Result<CourseConfig, String> {
    let mut config = CourseConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(path) = &args.database {
        config.db_path = path.clone();
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &args.log_dir {
        config.log_dir = Some(dir.clone());
    }
    if args.no_seed {
        config.seed_defaults = false;
    }
    Ok(config)
}
