use clap::{Parser, Subcommand};
use notegarden::{config, generate, links::LinkTable, output, scan};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "notegarden")]
#[command(about = "Static site generator for Obsidian-style note vaults")]
#[command(long_about = "\
Static site generator for Obsidian-style note vaults

Your filesystem is the data source. Directories become categories, markdown
files become pages, and everything else is copied as media. Wiki-style
[[links]] and ![[embeds]] are resolved by name against the whole vault.

Vault structure:

  notes/
  ├── notes.md                     # Root description (optional)
  ├── Sourdough.md                 # Note → sourdough.html
  ├── Recipes/                     # Category → recipes.html
  │   ├── Recipes.md               # Category description (optional)
  │   ├── Pancakes.md              # Nested note → pancakes.html
  │   └── crumb.jpg                # Media → media/crumb.jpg
  └── .obsidian/                   # Hidden entries are skipped

Names must be unique across the whole vault: [[Pancakes]] works from any
note, so two pages named Pancakes would be ambiguous and fail the build.

Front matter keys: title, description, header, header-caption, children.

Run 'notegarden gen-config' to generate a documented config file, and
'notegarden gen-template' to print the stock page template.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = "notegarden.toml", global = true)]
    config: PathBuf,

    /// Fail on unresolvable links and embeds instead of dropping them
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the site: scan, resolve, render, copy media and static files
    Build,
    /// Scan the vault and report its structure without writing output
    Check,
    /// Print a stock config file with all options documented
    GenConfig,
    /// Print the stock page template
    GenTemplate,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let mut config = config::load_config(&cli.config)?;
            if cli.strict {
                config.strict = true;
            }
            let stats = generate::generate(&config)?;
            output::print_generate_summary(&stats);
        }
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            let vault = scan::scan(
                std::path::Path::new(&config.input_directory),
                &config.media_directory,
            )?;
            let links = LinkTable::build(&vault);
            output::print_scan_summary(&vault);
            println!("{} names in the link table", links.len());
            println!("Vault is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::GenTemplate => {
            print!("{}", generate::stock_template());
        }
    }

    Ok(())
}
