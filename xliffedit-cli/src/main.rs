mod edit;
mod stats;
mod validation;
mod view;

use clap::{Parser, Subcommand};

use crate::{
    edit::run_set_command,
    stats::print_stats,
    validation::run_validate_command,
    view::{ViewOptions, print_view},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// View translation units grouped by file.
    View {
        /// The XLIFF file to view
        #[arg(short, long)]
        input: String,

        /// Only show units whose source, target or note contains this text (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,

        /// Only show units without a translation
        #[arg(long)]
        only_untranslated: bool,

        /// Only show file groups translating into this language
        #[arg(short, long)]
        lang: Option<String>,

        /// Display full values without truncation
        #[arg(long)]
        full: bool,
    },

    /// Print translation progress per file group.
    Stats {
        /// The XLIFF file to inspect
        #[arg(short, long)]
        input: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check that every translation keeps the format specifiers of its source.
    Validate {
        /// The XLIFF file to check
        #[arg(short, long)]
        input: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Set or remove the target of one translation unit.
    Set {
        /// The XLIFF file to edit
        #[arg(short, long)]
        input: String,

        /// The `original` name of the file group holding the unit
        #[arg(short, long)]
        file: String,

        /// The unit id; `&#10;` stands for a line break
        #[arg(short, long)]
        key: String,

        /// New target text; omit to remove the target
        #[arg(short, long)]
        value: Option<String>,

        /// Write to this path instead of editing in place
        #[arg(short, long)]
        output: Option<String>,

        /// Save even if format specifiers are missing from the new target
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let args = Args::parse();

    let result = match args.commands {
        Commands::View {
            input,
            search,
            only_untranslated,
            lang,
            full,
        } => print_view(
            &input,
            &ViewOptions {
                search,
                only_untranslated,
                lang,
                full,
            },
        ),
        Commands::Stats { input, json } => print_stats(&input, json),
        Commands::Validate { input, json } => run_validate_command(&input, json),
        Commands::Set {
            input,
            file,
            key,
            value,
            output,
            force,
        } => run_set_command(input, file, key, value, output, force),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
