use crate::adapter::HttpApiFs;
use crate::config::HttpApiFsConfig;
use crate::filesystem::{FileSystem, ListFilter, ListOptions};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hafs")]
#[command(about = "Browse and edit a remote HTTP file store", long_about = None)]
pub struct Cli {
    /// API endpoint URL
    #[arg(short, long, env = "HAFS_URL")]
    pub url: Option<String>,

    #[arg(short = 'U', long, env = "HAFS_USERNAME")]
    pub username: Option<String>,

    #[arg(short = 'P', long, env = "HAFS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// TOML or JSON config file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    Ls {
        #[arg(default_value = "/")]
        path: String,
        #[arg(long, conflicts_with = "files_only")]
        dirs_only: bool,
        #[arg(long)]
        files_only: bool,
        /// Print absolute paths
        #[arg(short, long)]
        full: bool,
        /// Only names matching this glob, e.g. '*.txt'
        #[arg(long)]
        pattern: Option<String>,
    },
    Stat {
        path: String,
    },
    Cat {
        path: String,
    },
    Get {
        remote: String,
        local: PathBuf,
    },
    Put {
        local: PathBuf,
        remote: String,
    },
    Mkdir {
        path: String,
        #[arg(short, long)]
        parents: bool,
    },
    Rm {
        path: String,
    },
    Rmdir {
        path: String,
    },
    Mv {
        src: String,
        dst: String,
        /// Replace an existing destination
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn load_config(&self) -> Result<HttpApiFsConfig> {
        let mut config = match &self.config {
            Some(path) => HttpApiFsConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => HttpApiFsConfig::default(),
        };
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if self.username.is_some() {
            config.username = self.username.clone();
        }
        if self.password.is_some() {
            config.password = self.password.clone();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn run(self) -> Result<()> {
        let config = self.load_config()?;
        tracing::info!("Connecting to {}", config.url);
        let fs = HttpApiFs::connect(&config)?;
        let stdout = std::io::stdout();
        execute(&self.command, &fs, &mut stdout.lock())
    }
}

/// Runs one subcommand against any [`FileSystem`], writing output to `out`.
pub fn execute<F: FileSystem>(command: &Command, fs: &F, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Ls {
            path,
            dirs_only,
            files_only,
            full,
            pattern,
        } => {
            let filter = if *dirs_only {
                ListFilter::DirsOnly
            } else if *files_only {
                ListFilter::FilesOnly
            } else {
                ListFilter::All
            };
            let options = ListOptions {
                filter,
                wildcard: pattern.clone(),
                full: *full,
                refresh: false,
            };
            for name in fs.listdir(path, &options)? {
                writeln!(out, "{}", name)?;
            }
        }
        Command::Stat { path } => {
            let info = fs.getinfo(path)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?;
        }
        Command::Cat { path } => {
            let mut file = fs.open(path, "rb")?;
            out.write_all(&file.read()?)?;
            file.close();
        }
        Command::Get { remote, local } => {
            let mut file = fs.open(remote, "rb")?;
            let data = file.read()?;
            file.close();
            std::fs::write(local, &data)
                .with_context(|| format!("writing {}", local.display()))?;
            writeln!(out, "{} -> {} ({} bytes)", remote, local.display(), data.len())?;
        }
        Command::Put { local, remote } => {
            let data =
                std::fs::read(local).with_context(|| format!("reading {}", local.display()))?;
            let mut file = fs.open(remote, "wb")?;
            file.write(&data)?;
            file.close();
            writeln!(out, "{} -> {} ({} bytes)", local.display(), remote, data.len())?;
        }
        Command::Mkdir { path, parents } => fs.makedir(path, *parents, *parents)?,
        Command::Rm { path } => fs.remove(path)?,
        Command::Rmdir { path } => fs.removedir(path)?,
        Command::Mv { src, dst, force } => fs.rename(src, dst, *force)?,
    }
    Ok(())
}
