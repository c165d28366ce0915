use std::io::{self, Write};
use std::process::{Command, Stdio};

/// Expand SCSS to CSS by piping the text through the external `sassc`
/// binary. The preprocessor is an opaque text-to-text transform; SCSS
/// syntax is never parsed here.
pub fn expand(source: &str) -> io::Result<String> {
    let mut child = Command::new("sassc")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(source.as_bytes())?;
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!(
                "sassc failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        ));
    }
    String::from_utf8(output.stdout)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
