use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Configuration {
    pub data_dir: PathBuf,
    pub db_file: String,
    pub export_dir: PathBuf,
    pub table: Option<String>,
    pub log_file: Option<PathBuf>,
    pub reset: bool,
}

impl Configuration {
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }
}
