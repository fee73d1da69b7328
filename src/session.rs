//! Interactive search session over one catalog.
//!
//! The session owns the [`Catalog`] for its whole lifetime: it is filled by
//! [`Session::reload`] and read by every query. Console output goes to a
//! caller-supplied writer so the loop can be driven from tests.

use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    catalog::{Catalog, LoadReport, ReadOptions},
    cli::Cli,
    discovery, io_utils, report, table,
};

pub const EXIT_COMMAND: &str = "exit";
pub const PROMPT: &str = "Введите запрос ('exit' - выход): ";

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub dir: PathBuf,
    pub marker: String,
    pub read: ReadOptions,
    /// Per-query report; `None` disables it.
    pub find_output: Option<PathBuf>,
    /// Whole-catalog report; `None` disables it.
    pub all_output: Option<PathBuf>,
}

impl SessionOptions {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let encoding = io_utils::resolve_encoding(cli.input_encoding.as_deref())?;
        let (find_output, all_output) = if cli.no_export {
            (None, None)
        } else {
            (Some(cli.find_output.clone()), Some(cli.all_output.clone()))
        };
        Ok(Self {
            dir: cli.dir.clone(),
            marker: cli.marker.clone(),
            read: ReadOptions {
                delimiter: cli.delimiter,
                encoding,
            },
            find_output,
            all_output,
        })
    }
}

/// True only for the exit command itself, ignoring case and surrounding spaces.
pub fn is_exit_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(EXIT_COMMAND)
}

pub struct Session {
    catalog: Catalog,
    options: SessionOptions,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            catalog: Catalog::new(),
            options,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Reloads every price list in the configured directory, replacing the
    /// catalog, then refreshes the whole-catalog report.
    pub fn reload<W: Write>(&mut self, out: &mut W) -> Result<LoadReport> {
        let paths = discovery::list_price_files(&self.options.dir, &self.options.marker)?;
        if paths.is_empty() {
            warn!(
                "No price lists matching '{}' in {:?}",
                self.options.marker, self.options.dir
            );
        }
        let load = self.catalog.load(&paths, &self.options.read);
        for diagnostic in &load.diagnostics {
            writeln!(out, "Ошибка: {diagnostic}")?;
        }
        writeln!(
            out,
            "Загружено позиций: {} (файлов: {}, пропущено строк: {}, пропущено файлов: {})",
            load.rows_loaded, load.files_loaded, load.rows_skipped, load.files_skipped
        )?;
        self.export_all(out)?;
        Ok(load)
    }

    /// Runs one query: prints the ranked table and writes the reports.
    /// A malformed pattern is reported on `out` and leaves the catalog as is.
    pub fn find<W: Write>(&mut self, query: &str, out: &mut W) -> Result<()> {
        {
            let results = match self.catalog.search(query) {
                Ok(results) => results,
                Err(err) => {
                    warn!("{err}");
                    writeln!(out, "Ошибка в запросе: {err}")?;
                    return Ok(());
                }
            };
            info!("Query '{query}' returned {} row(s)", results.len());
            write!(out, "{}", table::render_entries(results.iter().copied()))?;
            if let Some(path) = &self.options.find_output {
                report::write_results_report(path, results.iter().copied())
                    .with_context(|| format!("Exporting search results to {path:?}"))?;
                writeln!(out, "Результаты поиска сохранены в файл: {}", path.display())?;
            }
        }
        self.export_all(out)
    }

    pub fn run_queries<W: Write>(&mut self, queries: &[String], out: &mut W) -> Result<()> {
        for query in queries {
            self.find(query, out)?;
        }
        Ok(())
    }

    /// Prompts for queries until the exit command or end of input.
    pub fn run_interactive<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        let mut lines = input.lines();
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;
            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };
            let line = line.context("Reading query from input")?;
            if is_exit_command(&line) {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            self.find(&line, out)?;
        }
        writeln!(out, "Работа завершена!")?;
        Ok(())
    }

    fn export_all<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let Some(path) = &self.options.all_output else {
            return Ok(());
        };
        report::write_catalog_report(path, &mut self.catalog)
            .with_context(|| format!("Exporting catalog to {path:?}"))?;
        writeln!(
            out,
            "Общие данные всего ассортимента сохранены в файл {}",
            path.display()
        )?;
        Ok(())
    }
}
