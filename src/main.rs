//! Command-line front end for the student registry.
//!
//! Each invocation resolves the data directory and configuration, opens the
//! configured store, loads a [`Registry`](student_registry::Registry), runs a
//! single operation and prints the outcome. All rules live in the library.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use student_registry::Backend;
use tracing_subscriber::EnvFilter;

/// Manage students and the courses they are enrolled in.
#[derive(Parser)]
#[command(name = "student-registry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the records and registry.toml
    #[arg(global = true, short, long)]
    data_dir: Option<PathBuf>,

    /// Storage backend, overriding registry.toml
    #[arg(global = true, short, long, value_enum)]
    backend: Option<BackendArg>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Files,
    Sqlite,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Files => Backend::Files,
            BackendArg::Sqlite => Backend::Sqlite,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Add, edit, remove or list students
    #[command(subcommand)]
    Student(StudentCommand),

    /// Add, edit, remove or list courses
    #[command(subcommand)]
    Course(CourseCommand),

    /// Case-insensitive search across every field
    Search {
        query: String,

        /// Search courses instead of students
        #[arg(short, long)]
        courses: bool,

        /// Sort matching students by ID
        #[arg(short, long)]
        sort_by_id: bool,
    },
}

#[derive(Subcommand)]
enum StudentCommand {
    /// Register a new student
    Add(StudentFields),

    /// Edit a student; omitted fields keep their current value
    Update {
        /// Current ID of the student
        id: String,

        #[command(flatten)]
        fields: StudentEdits,
    },

    /// Remove a student
    Delete { id: String },

    /// Show one student
    Show { id: String },

    /// List every student
    List {
        /// Sort by ID instead of insertion order
        #[arg(short, long)]
        sort_by_id: bool,
    },
}

#[derive(Args)]
struct StudentFields {
    #[arg(long)]
    id: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    middle_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    level: String,
    #[arg(long)]
    gender: String,
    /// Leave out to register the student without a course
    #[arg(long, default_value = "")]
    course: String,
}

#[derive(Args)]
struct StudentEdits {
    /// New ID for the student
    #[arg(long = "new-id")]
    new_id: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    middle_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    level: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    /// Pass an empty string to clear the course
    #[arg(long)]
    course: Option<String>,
}

#[derive(Subcommand)]
enum CourseCommand {
    /// Register a new course
    Add { code: String, name: String },

    /// Rename and/or retitle a course; enrolled students follow a rename
    Update {
        /// Current course code
        code: String,
        #[arg(long = "new-code")]
        new_code: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },

    /// Remove a course; enrolled students keep their record without a course
    Delete { code: String },

    /// Show a course and its students
    Show { code: String },

    /// List every course
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match commands::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", commands::surface_error(&err));
            ExitCode::FAILURE
        }
    }
}
