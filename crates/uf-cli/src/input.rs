use std::io::BufRead;

/// Feed every input URL to `f`: positional arguments when given, lines of
/// `reader` otherwise. Surrounding whitespace is trimmed, blank lines skipped.
pub fn for_each_url<R, F>(args: &[String], reader: R, mut f: F) -> Result<(), String>
where
    R: BufRead,
    F: FnMut(&str) -> Result<(), String>,
{
    if args.is_empty() {
        for_each_line(reader, f)
    } else {
        for arg in args {
            let trimmed = arg.trim();
            if !trimmed.is_empty() {
                f(trimmed)?;
            }
        }
        Ok(())
    }
}

pub fn for_each_line<R, F>(reader: R, mut f: F) -> Result<(), String>
where
    R: BufRead,
    F: FnMut(&str) -> Result<(), String>,
{
    for line in reader.lines() {
        let line = line.map_err(|e| format!("Failed to read input: {}", e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        f(trimmed)?;
    }
    Ok(())
}
