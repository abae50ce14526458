use std::{
    collections::HashMap,
    fs::File,
    io::BufWriter,
    path::PathBuf,
};

use csv::Writer;
use thiserror::Error;

pub type ResultWriter = Writer<BufWriter<File>>;

#[derive(Debug, Error)]
pub enum ResultErrors {
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("no result writer with id {0}")]
    WriterNotFound(u32),
}

/// Owns one csv writer per result file under `result_path`.
pub struct ResultManager {
    writers: HashMap<u32, ResultWriter>,
    pub result_path: PathBuf,
    next_id: u32,
}

impl ResultManager {
    pub fn new(result_path: PathBuf) -> Self {
        Self {
            writers: HashMap::new(),
            result_path,
            next_id: 0,
        }
    }

    /// Creates `<result_path>/<name>.csv`, writes the header row and returns the writer id.
    pub fn new_writer(&mut self, name: &str, headers: &[&str]) -> Result<u32, ResultErrors> {
        std::fs::create_dir_all(&self.result_path)?;

        let filename = name.to_string() + ".csv";
        let file = File::create(self.result_path.join(filename))?;
        let mut writer = Writer::from_writer(BufWriter::new(file));
        writer.write_record(headers)?;

        let id = self.next_id;
        self.writers.insert(id, writer);
        self.next_id += 1;
        Ok(id)
    }

    pub fn write_record(&mut self, id: u32, content: &[String]) -> Result<(), ResultErrors> {
        let writer = self
            .writers
            .get_mut(&id)
            .ok_or(ResultErrors::WriterNotFound(id))?;
        writer.write_record(content)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ResultErrors> {
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.result_path.join(name.to_string() + ".csv")
    }
}

/// Implemented by anything that streams its state into a `ResultManager`.
pub trait SwingResult {
    /// Initializes the result file for this component
    fn new_result(&mut self, results: &mut ResultManager) -> Result<(), ResultErrors>;
    // Writes the next entry in the result file
    fn write_result(&self, results: &mut ResultManager) -> Result<(), ResultErrors>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let mut results = ResultManager::new(dir.path().join("run"));
        let id = results.new_writer("trace", &["t", "x"]).unwrap();
        results
            .write_record(id, &["0".to_string(), "1.5".to_string()])
            .unwrap();
        results.flush().unwrap();

        let contents = std::fs::read_to_string(results.path_of("trace")).unwrap();
        assert_eq!(contents, "t,x\n0,1.5\n");
    }

    #[test]
    fn test_unknown_writer() {
        let dir = tempdir().unwrap();
        let mut results = ResultManager::new(dir.path().to_path_buf());
        assert!(matches!(
            results.write_record(7, &[]),
            Err(ResultErrors::WriterNotFound(7))
        ));
    }

    #[test]
    fn test_ids_are_sequential() {
        let dir = tempdir().unwrap();
        let mut results = ResultManager::new(dir.path().to_path_buf());
        assert_eq!(results.new_writer("a", &["t"]).unwrap(), 0);
        assert_eq!(results.new_writer("b", &["t"]).unwrap(), 1);
    }
}
