use clap::{Parser, Subcommand};
use std::path::PathBuf;

const EXIT_SUCCESS: i32 = 0;
const EXIT_STORAGE: i32 = 2;
const EXIT_IMPORT: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive grade editor (default if no subcommand)
    Tui,
    /// Print every course with its total score
    List,
    /// Write all courses to a JSON file
    Export {
        /// Output path, or "-" for stdout (defaults to export_file from config)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Replace all courses with the contents of a JSON export
    Import {
        /// Path to a file written by `export`
        path: PathBuf,
    },
    /// Add a course with one empty item
    Add {
        /// Course name
        name: String,
    },
}

#[derive(Parser, Debug)]
#[command(name = "grade-calc")]
#[command(about = "Weighted course grade calculator", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/grade-calc/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory holding the course store (overrides data_dir from config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    grade_calc::logging::init(cli.verbose);

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match grade_calc::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = grade_calc::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data_dir());
    tracing::debug!(data_dir = %data_dir.display(), "resolved data directory");
    let mut registry = grade_calc::open_registry(&data_dir, config.naming());

    match command {
        Commands::Tui => {
            let theme = grade_calc::tui::Theme::from_config(config.theme.as_deref());
            let app = grade_calc::tui::App::new(
                registry,
                config.export_file().to_string(),
                config.flash_duration(),
                grade_calc::tui::resolve_theme(theme),
            );
            if let Err(e) = grade_calc::tui::run_tui(app).await {
                eprintln!("TUI error: {:#}", e);
                std::process::exit(EXIT_STORAGE);
            }
        }
        Commands::List => {
            let use_colors = grade_calc::output::should_use_colors();
            let courses = registry.courses();

            if cli.verbose && !courses.is_empty() {
                for course in courses {
                    println!(
                        "{}",
                        grade_calc::output::format_course_detail(course, use_colors)
                    );
                    println!();
                }
            } else {
                println!(
                    "{}",
                    grade_calc::output::format_course_table(courses, use_colors)
                );
            }
            println!(
                "{}",
                grade_calc::output::format_stats(&registry.stats(), use_colors)
            );
        }
        Commands::Export { output } => {
            let json = match registry.export_to_json() {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("Export failed: {:#}", e);
                    std::process::exit(EXIT_STORAGE);
                }
            };

            let target = output.unwrap_or_else(|| config.export_file().to_string());
            if target == "-" {
                println!("{}", json);
            } else {
                let path = PathBuf::from(&target);
                if let Err(e) = grade_calc::registry::write_export_file(&path, &json) {
                    eprintln!("Export failed: {:#}", e);
                    std::process::exit(EXIT_STORAGE);
                }
                println!(
                    "Exported {} courses to {}",
                    registry.courses().len(),
                    path.display()
                );
            }
        }
        Commands::Import { path } => {
            let text = match grade_calc::registry::read_import_file(&path) {
                Ok(text) => text,
                Err(e) => {
                    eprintln!("Import failed: {:#}", e);
                    std::process::exit(EXIT_IMPORT);
                }
            };

            match registry.import_from_json(&text) {
                Ok(count) => println!("Imported {} courses from {}", count, path.display()),
                Err(e) => {
                    eprintln!("Import failed: {}", e);
                    eprintln!("Existing courses were left unchanged.");
                    std::process::exit(EXIT_IMPORT);
                }
            }
        }
        Commands::Add { name } => match registry.add_course(Some(&name)) {
            Ok(_) => {
                println!("Added course: {}", name);
                println!(
                    "{}",
                    grade_calc::output::format_stats(&registry.stats(), false)
                );
            }
            Err(e) => {
                eprintln!("Failed to save course: {:#}", e);
                std::process::exit(EXIT_STORAGE);
            }
        },
    }

    std::process::exit(EXIT_SUCCESS);
}
