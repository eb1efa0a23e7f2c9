use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialise an input document piped on stdin.
///
/// `None` means there is nothing to read (an interactive terminal or an
/// empty pipe) and the command should build its input from flags.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut piped = String::new();
    io::stdin().lock().read_to_string(&mut piped)?;
    if piped.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&piped)
        .map(Some)
        .map_err(|e| format!("Invalid input on stdin: {}", e).into())
}
