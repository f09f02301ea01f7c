use std::collections::HashSet;
use std::io::Write;

/// Line writer with optional de-duplication. Empty lines are never written.
pub struct Emitter<W: Write> {
    out: W,
    seen: Option<HashSet<String>>,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W, unique: bool) -> Self {
        Self {
            out,
            seen: unique.then(HashSet::new),
        }
    }

    pub fn emit(&mut self, line: String) -> Result<(), String> {
        if line.is_empty() {
            return Ok(());
        }
        if let Some(seen) = &mut self.seen {
            if seen.contains(&line) {
                return Ok(());
            }
            writeln!(self.out, "{}", line).map_err(|e| format!("Failed to write output: {}", e))?;
            seen.insert(line);
            return Ok(());
        }
        writeln!(self.out, "{}", line).map_err(|e| format!("Failed to write output: {}", e))
    }

    pub fn emit_all(&mut self, lines: Vec<String>) -> Result<(), String> {
        for line in lines {
            self.emit(line)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), String> {
        self.out
            .flush()
            .map_err(|e| format!("Failed to flush output: {}", e))
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}
