//! Interaction Logger
//!
//! Append-only JSONL interaction logging, one interaction per line.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use universe_events::Interaction;

/// Writes interactions to a JSONL file
pub struct InteractionLogger {
    writer: Option<BufWriter<File>>,
    interaction_count: u64,
}

impl InteractionLogger {
    /// Create a new logger writing to the specified path, truncating it
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            interaction_count: 0,
        })
    }

    /// Create a logger that discards interactions
    pub fn null() -> Self {
        Self {
            writer: None,
            interaction_count: 0,
        }
    }

    pub fn interaction_count(&self) -> u64 {
        self.interaction_count
    }

    /// Log an interaction to the file
    pub fn log(&mut self, interaction: &Interaction) -> std::io::Result<()> {
        self.interaction_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = interaction.to_jsonl()?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Log multiple interactions
    pub fn log_batch(&mut self, interactions: &[Interaction]) -> std::io::Result<()> {
        for interaction in interactions {
            self.log(interaction)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for InteractionLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush interaction logger: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;
    use universe_events::fixtures::sample_interactions;

    #[test]
    fn test_interaction_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interactions.jsonl");

        let interactions = sample_interactions();
        let mut logger = InteractionLogger::new(&path).unwrap();
        logger.log_batch(&interactions).unwrap();
        logger.flush().unwrap();
        assert_eq!(logger.interaction_count(), 5);

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 5);

        let parsed = Interaction::from_jsonl(&lines[3]).unwrap();
        assert_eq!(parsed, interactions[3]);
    }

    #[test]
    fn test_drop_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dropped.jsonl");

        {
            let mut logger = InteractionLogger::new(&path).unwrap();
            logger.log(&sample_interactions()[0]).unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_null_logger() {
        let mut logger = InteractionLogger::null();
        logger.log_batch(&sample_interactions()).unwrap();
        assert_eq!(logger.interaction_count(), 5);
    }
}
