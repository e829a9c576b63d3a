use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use strata::areas::repository::Repository;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "strata",
    version = "0.1.0",
    about = "A local version-control storage engine",
    long_about = "Stores file content in a content-addressed object database, \
    tracks staged files in an index and detects changes with block deltas.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(
        name = "add",
        about = "Stage files into the index",
        long_about = "This command stores the content of the given files and records them in the index. \
        Directories are expanded recursively. If any file fails, the index is left untouched."
    )]
    Add {
        #[arg(index = 1, required = true, help = "Files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the content of a stored object. \
        The digest may be abbreviated as long as it is unambiguous."
    )]
    CatFile {
        #[arg(index = 1, help = "The object digest or a unique prefix of it")]
        sha: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object database",
        long_about = "This command computes the digest of a file's content and can store it in the object database."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(
        name = "ls-files",
        about = "List the files recorded in the index"
    )]
    LsFiles {
        #[arg(short, long, help = "Show mode and object digest of each entry")]
        stage: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let pwd = std::env::current_dir()?;

    match &cli.command {
        Commands::Init { path } => {
            let path = path.clone().unwrap_or_else(|| pwd.to_string_lossy().to_string());
            let mut repository = Repository::new(&path, Box::new(std::io::stdout()))?;

            repository.init().await?
        }
        Commands::Add { paths } => {
            let mut repository =
                Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))?;

            repository.add(paths).await?
        }
        Commands::CatFile { sha } => {
            let mut repository =
                Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))?;

            repository.cat_file(sha)?
        }
        Commands::HashObject { write, file } => {
            let mut repository =
                Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))?;

            repository.hash_object(file, *write).await?
        }
        Commands::LsFiles { stage } => {
            let mut repository =
                Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))?;

            repository.ls_files(*stage).await?
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
