use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;

use crate::{
    discovery::DEFAULT_MARKER,
    report::{DEFAULT_ALL_OUTPUT, DEFAULT_FIND_OUTPUT},
};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Search vendor price lists and rank items by price per kilogram",
    long_about = None
)]
pub struct Cli {
    /// Directory scanned for price lists
    #[arg(short = 'd', long = "dir", default_value = ".")]
    pub dir: PathBuf,
    /// Case-insensitive fragment a file name must contain to be loaded
    #[arg(long, default_value = DEFAULT_MARKER)]
    pub marker: String,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the price lists (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// HTML file receiving the results of each search
    #[arg(long = "find-output", default_value = DEFAULT_FIND_OUTPUT)]
    pub find_output: PathBuf,
    /// HTML file receiving the whole catalog sorted by price per kilogram
    #[arg(long = "all-output", default_value = DEFAULT_ALL_OUTPUT)]
    pub all_output: PathBuf,
    /// Run these queries and exit instead of prompting
    #[arg(short = 'q', long = "query", action = clap::ArgAction::Append)]
    pub queries: Vec<String>,
    /// Do not write HTML reports
    #[arg(long = "no-export")]
    pub no_export: bool,
}

const NAMED_DELIMITERS: [(&str, u8); 4] = [
    ("comma", b','),
    ("semicolon", b';'),
    ("tab", b'\t'),
    ("pipe", b'|'),
];

/// Accepts a delimiter name (`tab`, `semicolon`...) or a single ASCII character.
pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    if let Some((_, byte)) = NAMED_DELIMITERS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
    {
        return Ok(*byte);
    }
    match value.as_bytes() {
        [] => Err("Delimiter cannot be empty".to_string()),
        [byte] if byte.is_ascii() => Ok(*byte),
        _ if value.chars().count() == 1 => {
            Err(format!("Delimiter '{value}' is not an ASCII character"))
        }
        _ => Err(format!(
            "Delimiter '{value}' must be one character or one of: {}",
            NAMED_DELIMITERS.iter().map(|(name, _)| name).join(", ")
        )),
    }
}
