use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

type InputResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Load a typed request either from the given JSON file or, when no path was
/// passed, from piped stdin. An interactive terminal with no file is an
/// error: every command needs a model to work on.
pub fn read_request<T: DeserializeOwned>(path: &Option<String>) -> InputResult<T> {
    if let Some(path) = path {
        return read_json_file(path);
    }
    match read_piped_stdin()? {
        Some(contents) => {
            let value = serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse stdin as JSON: {e}"))?;
            Ok(value)
        }
        None => Err("--input <file.json> or piped stdin required".into()),
    }
}

fn read_json_file<T: DeserializeOwned>(path: &str) -> InputResult<T> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(format!("File not found: {path}").into());
    }
    if !p.is_file() {
        return Err(format!("Not a file: {path}").into());
    }
    let contents =
        fs::read_to_string(p).map_err(|e| format!("Failed to read '{path}': {e}"))?;
    let value =
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse '{path}': {e}"))?;
    Ok(value)
}

/// Read stdin only when data is actually being piped in.
fn read_piped_stdin() -> InputResult<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}
