use anyhow::anyhow;
use formatx::formatx;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use strum::EnumIter;

/// The files a completed run is reported in.
#[derive(Clone, Copy, Debug, EnumIter, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ReportFile {
    Parameters,
    Summary,
    PeriodDetails,
    Proposals,
    Response,
}

impl ReportFile {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFile::Response => "json",
            ReportFile::Parameters
            | ReportFile::Summary
            | ReportFile::PeriodDetails
            | ReportFile::Proposals => "csv",
        }
    }
}

/// Somewhere report files can be written to.
pub trait Output: Debug {
    fn writer_for(&self, file: ReportFile) -> anyhow::Result<impl Write>;
    /// Whether writing to this output has no effect, so report writing can be skipped entirely.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each report file into a directory, naming it from a template with two positional
/// placeholders: the file's key followed by its extension, e.g. `"depot__{}.{}"`.
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }

    fn file_name_for(&self, file: ReportFile) -> anyhow::Result<String> {
        formatx!(&self.file_template, file.to_string(), file.extension()).map_err(|err| {
            anyhow!(
                "Could not make a file name for {file} from template '{}': {err:?}",
                self.file_template
            )
        })
    }
}

impl Output for FileOutput {
    fn writer_for(&self, file: ReportFile) -> anyhow::Result<impl Write> {
        let path = self.directory_path.join(self.file_name_for(file)?);
        Ok(BufWriter::new(File::create(path)?))
    }
}

impl Output for &FileOutput {
    fn writer_for(&self, file: ReportFile) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for(self, file)
    }
}

/// Discards every report file.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for(&self, _file: ReportFile) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}
