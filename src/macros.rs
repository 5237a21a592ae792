macro_rules! log {
    ($logger:expr, $($arg:tt)*) => {{
        if !cfg!(feature = "no_logging") {
            if let Some(w) = $logger.line_writer() {
                let _ = writeln!(w, $($arg)*);
            }
        }
    }};
}
