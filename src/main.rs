//! CLI for inspecting and validating mutant-construction configurations.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use mutaforge::Configuration;

#[derive(Parser)]
#[command(name = "mutaforge")]
#[command(author, version, about = "Language-independent mutant construction engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file without starting anything
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "mutaforge.yml")]
        config: PathBuf,
    },

    /// List the languages a configuration registers
    Languages {
        /// Path to the configuration file
        #[arg(short, long, default_value = "mutaforge.yml")]
        config: PathBuf,
    },

    /// List the operators a configuration registers
    Operators {
        /// Path to the configuration file
        #[arg(short, long, default_value = "mutaforge.yml")]
        config: PathBuf,

        /// Restrict the listing to operators of one language
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Show an example configuration
    Example,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Languages { config } => list_languages(&config),
        Commands::Operators { config, language } => list_operators(&config, language.as_deref()),
        Commands::Example => {
            print_example();
            ExitCode::SUCCESS
        }
    }
}

fn load(config_path: &PathBuf) -> Option<Configuration> {
    match Configuration::load(config_path) {
        Ok(configuration) => Some(configuration),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            None
        }
    }
}

fn validate(config_path: &PathBuf) -> ExitCode {
    println!("{}", "Loading configuration...".dimmed());
    let Some(configuration) = load(config_path) else {
        return ExitCode::FAILURE;
    };
    println!(
        "{} {} language(s) and {} operator(s) registered",
        "✓".green().bold(),
        configuration.languages().len(),
        configuration.operators().len()
    );
    ExitCode::SUCCESS
}

fn list_languages(config_path: &PathBuf) -> ExitCode {
    let Some(configuration) = load(config_path) else {
        return ExitCode::FAILURE;
    };
    for language in configuration.languages().iter() {
        println!(
            "{} [{}]",
            language.name().bold(),
            language.file_endings().join(", ")
        );
    }
    ExitCode::SUCCESS
}

fn list_operators(config_path: &PathBuf, language: Option<&str>) -> ExitCode {
    let Some(configuration) = load(config_path) else {
        return ExitCode::FAILURE;
    };
    if let Some(name) = language {
        if !configuration.languages().supports(name) {
            eprintln!("{}: no language registered with name: {}", "Error".red().bold(), name);
            return ExitCode::FAILURE;
        }
    }
    let operators: Vec<_> = match language {
        Some(name) => configuration.operators().for_language(name).collect(),
        None => configuration.operators().iter().collect(),
    };
    for operator in operators {
        println!(
            "{} ({})",
            operator.name().bold(),
            operator.languages().join(", ")
        );
        println!("  match:   {}", operator.match_template().dimmed());
        println!("  rewrite: {}", operator.rewrite_template().dimmed());
    }
    ExitCode::SUCCESS
}

fn print_example() {
    let example = r#"# Example mutaforge.yml configuration file
version: "1.0"

languages:
  - name: c
    file-endings: [".c", ".h"]
  - name: python
    file-endings: [".py"]

operators:
  # Negate the condition of a C-style if statement
  - name: NEGATE_IF_CONDITION_CSTYLE
    languages: [c]
    match: "if (:[1])"
    rewrite: "if (!(:[1]))"

  # Flip addition to subtraction between single terms
  - name: FLIP_ARITHMETIC_PLUS
    languages: [c, python]
    match: ":[1] + :[2]"
    rewrite: ":[1] - :[2]"
    constraints:
      - type: is-single-term
        hole: "1"
      - type: is-single-term
        hole: "2"

  # Delete the body of a conditional branch
  - name: DELETE_CONDITIONAL_BODY_CSTYLE
    languages: [c]
    match: "if (:[1]) { :[2] }"
    rewrite: "if (:[1]) { }"
"#;

    println!("{}", example);
}
