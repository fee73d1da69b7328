pub mod catalog;
pub mod cli;
pub mod discovery;
pub mod fields;
pub mod io_utils;
pub mod normalize;
pub mod report;
pub mod session;
pub mod table;

use std::{
    env,
    io::{self, Write},
    sync::OnceLock,
};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::Cli,
    session::{Session, SessionOptions},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("price_catalog", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let options = SessionOptions::from_cli(&cli)?;
    info!(
        "Scanning {:?} for price lists marked '{}'",
        options.dir, options.marker
    );
    debug!("Session options: {options:?}");

    let mut session = Session::new(options);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    session.reload(&mut out)?;
    if cli.queries.is_empty() {
        let stdin = io::stdin();
        session.run_interactive(stdin.lock(), &mut out)?;
    } else {
        session.run_queries(&cli.queries, &mut out)?;
    }
    out.flush()?;
    Ok(())
}
