#![no_main]

use libfuzzer_sys::fuzz_target;
use lighting_savings::output::{Output, ReportFile};
use lighting_savings::{run_project, ProjectFlags};
use std::io;
use std::io::{BufReader, Cursor, Write};

fuzz_target!(|data: &[u8]| {
    let _run = run_project(
        BufReader::new(Cursor::new(data)),
        SinkOutput::default(),
        &ProjectFlags::all(),
    );
});

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for(&self, _file: ReportFile) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        // report as a real output so fuzzing also exercises the report writers
        false
    }
}
