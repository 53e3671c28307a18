use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one name per line to `path`, creating parent directories as needed.
/// An existing file is overwritten.
pub fn write_lines<P, I, S>(path: P, lines: I) -> Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
        }
    }

    let file = File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    let mut written = 0;
    for line in lines {
        writeln!(writer, "{}", line.as_ref())?;
        written += 1;
    }
    writer.flush().with_context(|| format!("Failed to write file: {:?}", path))?;
    Ok(written)
}
