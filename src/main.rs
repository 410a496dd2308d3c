//! sprig CLI - minimal version control command line interface

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sprig::ops::{
    add, branches, clone_repo, commit, create_branch, diff_blobs, fsck, log, merge, status,
    switch_branch,
};
use sprig::{read_blob, read_commit, resolve_object, Repo};

#[derive(Parser)]
#[command(name = "sprig")]
#[command(about = "minimal content-addressed version control")]
#[command(version)]
struct Cli {
    /// repository root (the directory containing .sprig)
    #[arg(short, long, default_value = ".", env = "SPRIG_REPO")]
    repo: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// initialize a new repository
    Init {
        /// directory to create the repository in
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// stage files for the next commit
    Add {
        /// files to stage
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// commit staged files on the current branch
    Commit {
        /// commit message
        message: String,
    },

    /// show history of the current branch
    Log {
        /// maximum number of commits to show
        #[arg(short = 'n', long)]
        max_count: Option<usize>,
    },

    /// create a branch at the current commit
    CreateBranch {
        /// branch name
        name: String,
    },

    /// make another branch the active one
    SwitchBranch {
        /// branch name
        name: String,
    },

    /// list branches
    Branches,

    /// merge a branch into the current branch
    Merge {
        /// branch to merge
        name: String,
    },

    /// copy a repository to a new location
    Clone {
        /// source repository root
        source: PathBuf,

        /// destination directory
        destination: PathBuf,
    },

    /// show a line diff between two blobs
    Showdiff {
        /// old blob hash or unique prefix
        hash1: String,

        /// new blob hash or unique prefix
        hash2: String,
    },

    /// show current branch and staged files
    Status,

    /// show contents of an object
    CatFile {
        /// object type (blob, commit)
        object_type: String,

        /// object hash or unique prefix
        object: String,
    },

    /// verify repository integrity
    Fsck,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> sprig::Result<()> {
    match cli.command {
        Commands::Init { path } => match Repo::init(&path) {
            Ok(_) => println!("initialized sprig repository at {}", path.display()),
            Err(sprig::Error::AlreadyInitialized(_)) => {
                println!("sprig repository already initialized at {}", path.display())
            }
            Err(e) => return Err(e),
        },

        Commands::Add { files } => {
            let repo = Repo::open(&cli.repo)?;
            for file in files {
                let entry = add(&repo, &file)?;
                println!("added {}", entry);
            }
        }

        Commands::Commit { message } => {
            let repo = Repo::open(&cli.repo)?;
            let hash = commit(&repo, &message)?;
            println!("{}", hash);
        }

        Commands::Log { max_count } => {
            let repo = Repo::open(&cli.repo)?;
            for entry in log(&repo, max_count)? {
                println!("{}", entry);
            }
        }

        Commands::CreateBranch { name } => {
            let repo = Repo::open(&cli.repo)?;
            match create_branch(&repo, &name)? {
                Some(tip) => println!("created branch {} at {}", name, tip.short()),
                None => println!("created branch {} (no commits yet)", name),
            }
        }

        Commands::SwitchBranch { name } => {
            let repo = Repo::open(&cli.repo)?;
            switch_branch(&repo, &name)?;
            println!("switched to branch {}", name);
        }

        Commands::Branches => {
            let repo = Repo::open(&cli.repo)?;
            for branch in branches(&repo)? {
                println!("{}", branch);
            }
        }

        Commands::Merge { name } => {
            let repo = Repo::open(&cli.repo)?;
            let hash = merge(&repo, &name)?;
            println!("{}", hash);
        }

        Commands::Clone {
            source,
            destination,
        } => {
            let (_, stats) = clone_repo(&source, &destination)?;
            println!(
                "cloned {} to {} ({} files, {} bytes)",
                source.display(),
                destination.display(),
                stats.files,
                stats.bytes
            );
        }

        Commands::Showdiff { hash1, hash2 } => {
            let repo = Repo::open(&cli.repo)?;
            for line in diff_blobs(&repo, &hash1, &hash2)? {
                println!("{}", line);
            }
        }

        Commands::Status => {
            let repo = Repo::open(&cli.repo)?;
            print!("{}", status(&repo)?);
        }

        Commands::CatFile {
            object_type,
            object,
        } => {
            let repo = Repo::open(&cli.repo)?;
            let hash = resolve_object(&repo, &object)?;

            match object_type.as_str() {
                "blob" => {
                    let data = read_blob(&repo, &hash)?;
                    io::stdout().write_all(&data).map_err(|e| sprig::Error::Io {
                        path: "stdout".into(),
                        source: e,
                    })?;
                }
                "commit" => {
                    let commit = read_commit(&repo, &hash)?;
                    for parent in commit.parents() {
                        println!("parent {}", parent);
                    }
                    println!("timestamp {}", commit.timestamp);
                    for file in &commit.files {
                        println!("file {} {}", file.hash, file.path);
                    }
                    println!();
                    println!("{}", commit.message);
                }
                _ => {
                    return Err(sprig::Error::InvalidObjectType(object_type));
                }
            }
        }

        Commands::Fsck => {
            let repo = Repo::open(&cli.repo)?;
            let report = fsck(&repo)?;
            print!("{}", report);

            if !report.is_ok() {
                return Err(sprig::Error::CheckFailed(report.problem_count()));
            }
        }
    }

    Ok(())
}
