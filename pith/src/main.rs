use clap::Parser as ClapParser;
use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use log::{error, info};
use pith::{FileSystem, Runtime};

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project directory or `.pith` file
    #[arg(default_value = ".", help = "Project directory or .pith file to load")]
    project: PathBuf,

    /// Log at debug level and dump the loaded program
    #[arg(short, long)]
    debug: bool,
}

/// Host file system backed by `std::fs`.
struct NativeFileSystem;

impl FileSystem for NativeFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, contents)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }
}

fn run(cli: &Cli) -> pith::ExecutionResult {
    let mut runtime = Runtime::new(NativeFileSystem);
    runtime.load_project(&cli.project)?;

    if !runtime.lex_errors().is_empty() {
        log::warn!("{} characters skipped while lexing", runtime.lex_errors().len());
    }
    if cli.debug {
        print!("{}", runtime.debug_state());
    }

    if runtime.run_named_slot("init")? {
        info!("ran init");
    }
    if let Some(view) = runtime.mount_ui()? {
        print!("{}", view.borrow().describe());
    }
    runtime.run_named_slot("main")?;
    runtime.run_named_slot("exit")?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.debug {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
