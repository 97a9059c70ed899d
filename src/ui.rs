//! Line-based prompts used before the TUI starts.

use crate::error::{AppError, Result};
use std::io::{self, BufRead, Write};

/// Print `prompt` and read one trimmed line from `input`.
///
/// End of input is reported as an error rather than an empty answer.
pub fn prompt_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<String> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(AppError::InvalidInput("no input".to_string()));
    }
    Ok(line.trim().to_string())
}

/// Prompt the user to enter a playlist ID via stdin.
///
/// # Examples
///
/// ```no_run
/// let id = playlist_watcher::ui::prompt_playlist_id()?;
/// println!("Opening {}", id);
/// # Ok::<(), playlist_watcher::error::AppError>(())
/// ```
pub fn prompt_playlist_id() -> Result<String> {
    let id = prompt_line(&mut io::stdin().lock(), &mut io::stdout(), "Enter playlist ID: ")?;
    validate_playlist_id(&id)
}

/// Prompt for the authorization code shown after granting access.
pub fn prompt_auth_code() -> Result<String> {
    let code = prompt_line(
        &mut io::stdin().lock(),
        &mut io::stdout(),
        "Enter the code from that page here: ",
    )?;
    if code.is_empty() {
        return Err(AppError::InvalidInput("authorization code is empty".to_string()));
    }
    Ok(code)
}

/// Check a playlist ID before it is used in a file name or a request.
///
/// Accepts a bare ID or a playlist URL with a `list=` parameter.
pub fn validate_playlist_id(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let id = trimmed
        .split_once("list=")
        .map(|(_, rest)| rest.split('&').next().unwrap_or_default())
        .unwrap_or(trimmed);

    if id.is_empty() {
        return Err(AppError::InvalidInput("playlist ID is empty".to_string()));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(AppError::InvalidInput(format!("'{}' is not a playlist ID", id)));
    }
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_line_trims() {
        let mut input = Cursor::new("  PLabc  \n");
        let mut output = Vec::new();

        let answer = prompt_line(&mut input, &mut output, "ID: ").unwrap();
        assert_eq!(answer, "PLabc");
        assert_eq!(output, b"ID: ");
    }

    #[test]
    fn test_prompt_line_eof() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert!(matches!(
            prompt_line(&mut input, &mut output, "> "),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_bare_id() {
        assert_eq!(
            validate_playlist_id("PLrAXtmErZgOeiKm4sgNOknGvNjby9efdf").unwrap(),
            "PLrAXtmErZgOeiKm4sgNOknGvNjby9efdf"
        );
    }

    #[test]
    fn test_validate_url() {
        let id = validate_playlist_id("https://www.youtube.com/playlist?list=PL123_-x&si=abc").unwrap();
        assert_eq!(id, "PL123_-x");
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(validate_playlist_id("").is_err());
        assert!(validate_playlist_id("../../etc/passwd").is_err());
        assert!(validate_playlist_id("list=").is_err());
    }
}
