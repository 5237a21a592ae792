use super::*;

fn secs_since_unix_epoch() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|dur| dur.as_secs_f64())
        .unwrap_or(0.)
}
impl FileLogger {
    pub fn new(tag: impl Into<String>, file: std::fs::File) -> Self {
        Self(tag.into(), file)
    }
}
impl VecLogger {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into(), Default::default())
    }
    pub fn contents(&self) -> &[u8] {
        &self.1
    }
}
impl LogSink {
    pub(crate) fn logger_for(&self, tag: &str) -> Result<Box<dyn Logger>, SimulationError> {
        Ok(match self {
            LogSink::Discard => Box::new(DummyLogger),
            LogSink::Memory => Box::new(VecLogger::new(tag)),
            LogSink::Directory(dir) => {
                let path = dir.join(format!("{}.log", tag));
                let file = std::fs::File::create(&path)
                    .map_err(|_| SimulationError::LogSetup(path.clone()))?;
                Box::new(FileLogger::new(tag, file))
            }
        })
    }
}
/////////////////
impl Logger for DummyLogger {
    fn line_writer(&mut self) -> Option<&mut dyn std::io::Write> {
        None
    }
}
impl Logger for VecLogger {
    fn line_writer(&mut self) -> Option<&mut dyn std::io::Write> {
        let _ = write!(&mut self.1, "{} at {:.6} ", self.0, secs_since_unix_epoch());
        Some(self)
    }
    fn dump_log(&self, w: &mut dyn std::io::Write) {
        let _ = w.write_all(&self.1);
    }
}
impl Logger for FileLogger {
    fn line_writer(&mut self) -> Option<&mut dyn std::io::Write> {
        let _ = write!(&mut self.1, "{} at {:.6} ", self.0, secs_since_unix_epoch());
        Some(&mut self.1)
    }
}
///////////////////
impl std::io::Write for VecLogger {
    fn flush(&mut self) -> Result<(), std::io::Error> {
        Ok(())
    }
    fn write(&mut self, data: &[u8]) -> Result<usize, std::io::Error> {
        self.1.extend_from_slice(data);
        Ok(data.len())
    }
}
