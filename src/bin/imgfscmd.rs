//! imgFS Command Line Tool
//!
//! One container operation per invocation.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use imgfs::storage::ListEntry;
use imgfs::{Container, CreateOptions, ListFormat, OpenMode, Resolution, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// imgFS CLI
#[derive(Parser, Debug)]
#[command(name = "imgfscmd")]
#[command(about = "Command line tool for imgFS containers")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new, empty container
    Create {
        /// Container file
        path: PathBuf,

        /// Number of image slots
        #[arg(long = "max_files")]
        max_files: Option<u32>,

        /// Thumbnail resolution
        #[arg(long = "thumb_res", num_args = 2, value_names = ["W", "H"])]
        thumb_res: Option<Vec<u16>>,

        /// Small resolution
        #[arg(long = "small_res", num_args = 2, value_names = ["W", "H"])]
        small_res: Option<Vec<u16>>,
    },

    /// Print the header and every valid record
    List {
        /// Container file
        path: PathBuf,

        /// Print image ids as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Insert an image file under a name
    Insert {
        /// Container file
        path: PathBuf,

        /// Image id
        name: String,

        /// Image file to store
        file: PathBuf,
    },

    /// Extract an image to <name>_<res>.jpg
    Read {
        /// Container file
        path: PathBuf,

        /// Image id
        name: String,

        /// original, small or thumbnail
        #[arg(default_value = "original")]
        resolution: String,
    },

    /// Delete an image
    Delete {
        /// Container file
        path: PathBuf,

        /// Image id
        name: String,
    },
}

/// Long options that are also accepted with a single dash
const SINGLE_DASH_OPTIONS: [&str; 3] = ["-max_files", "-thumb_res", "-small_res"];

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let argv = std::env::args().map(|arg| {
        if SINGLE_DASH_OPTIONS.contains(&arg.as_str()) {
            format!("-{}", arg)
        } else {
            arg
        }
    });
    let args = Args::parse_from(argv);

    if let Err(e) = run(args.command) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Create {
            path,
            max_files,
            thumb_res,
            small_res,
        } => {
            let defaults = CreateOptions::default();
            let options = CreateOptions {
                max_files: max_files.unwrap_or(defaults.max_files),
                thumb_res: pair(thumb_res).unwrap_or(defaults.thumb_res),
                small_res: pair(small_res).unwrap_or(defaults.small_res),
            };
            options.validate()?;
            let container = Container::create(&path, options)?;
            println!("{} item(s) written", options.max_files as u64 + 1);
            container.close();
        }

        Commands::List { path, json } => {
            let container = Container::open(&path, OpenMode::ReadOnly)?;
            if json {
                println!("{}", container.list(ListFormat::Names).to_json()?);
            } else {
                print_listing(&container);
            }
            container.close();
        }

        Commands::Insert { path, name, file } => {
            let bytes = fs::read(&file)?;
            let mut container = Container::open(&path, OpenMode::ReadWrite)?;
            container.insert(&bytes, &name)?;
            container.close();
        }

        Commands::Read {
            path,
            name,
            resolution,
        } => {
            let resolution: Resolution = resolution.parse()?;
            let mut container = Container::open(&path, OpenMode::ReadWrite)?;
            let bytes = container.read(&name, resolution)?;
            container.close();
            let out = output_name(&name, resolution);
            fs::write(&out, bytes)?;
        }

        Commands::Delete { path, name } => {
            let mut container = Container::open(&path, OpenMode::ReadWrite)?;
            container.delete(&name)?;
            container.close();
        }
    }
    Ok(())
}

/// `[w, h]` from clap's two values
fn pair(values: Option<Vec<u16>>) -> Option<(u16, u16)> {
    match values.as_deref() {
        Some([w, h]) => Some((*w, *h)),
        _ => None,
    }
}

fn print_listing(container: &Container) {
    println!("{}", container.header());
    let mut any = false;
    for entry in container.list(ListFormat::Verbose) {
        if let ListEntry::Record { record, .. } = entry {
            println!("{}", record);
            any = true;
        }
    }
    if !any {
        println!("<< empty imgFS >>");
    }
}

/// File the `read` command writes: `<name>_<suffix>.jpg`
fn output_name(name: &str, resolution: Resolution) -> PathBuf {
    let file = format!("{}_{}.jpg", name, resolution.suffix());
    // Ids may contain path separators; keep the output in the current dir
    Path::new(".").join(file.replace(['/', '\\'], "_"))
}
