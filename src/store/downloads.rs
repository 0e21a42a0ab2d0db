use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;

/// File sink for exported artifacts: practice-sheet PDFs and chart
/// snapshots land in the user's download directory.
pub struct Downloads {
    base_dir: PathBuf,
}

impl Downloads {
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Save PDF bytes as `practice_sheet_<millis>.pdf`. The timestamp keeps
    /// successive exports from clobbering each other.
    pub fn save_pdf(&self, bytes: &[u8]) -> Result<PathBuf> {
        let name = format!("practice_sheet_{}.pdf", Local::now().timestamp_millis());
        self.write(&name, bytes)
    }

    /// Save a rendered chart as `practice_progress_<date>.txt`.
    pub fn save_chart_snapshot(&self, lines: &[String]) -> Result<PathBuf> {
        let name = format!("practice_progress_{}.txt", Local::now().format("%Y-%m-%d"));
        let mut content = lines.join("\n");
        content.push('\n');
        self.write(&name, content.as_bytes())
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.base_dir.join(name);
        let tmp_path = path.with_extension("tmp");

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(path)
    }
}
