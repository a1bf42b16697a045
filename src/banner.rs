//! Startup banner rendering.

use std::io::{self, Write};

use crate::builder::BannerMode;

/// Banner shown when a context starts with `banner-mode` set to `console` or `log`.
pub const DEFAULT_BANNER: &str = r"
   ___         _           _     _  _ _                     _
  / __|___ _ _| |_ _____ _| |_  | || (_)___ _ _ __ _ _ _ __| |_ _  _
 | (__/ _ \ ' \  _/ -_) \ /  _| | __ | / -_) '_/ _` | '_/ _| ' \ || |
  \___\___/_||_\__\___/_\_\\__| |_||_|_\___|_| \__,_|_| \__|_||_\_, |
                                                                |__/
";

/// Presents `banner` according to `mode`.
///
/// `Console` writes the banner followed by a version line to `out`; `Log`
/// emits each non-blank line as an info event; `Off` does nothing.
pub fn print_banner<W: Write>(mode: BannerMode, banner: &str, out: &mut W) -> io::Result<()> {
    match mode {
        BannerMode::Off => Ok(()),
        BannerMode::Console => {
            out.write_all(banner.as_bytes())?;
            writeln!(out, " :: {} ::  (v{})", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))?;
            writeln!(out)?;
            out.flush()
        }
        BannerMode::Log => {
            for line in banner.lines().filter(|l| !l.trim().is_empty()) {
                tracing::info!(target: "banner", "{line}");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::Level;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn test_off_writes_nothing() {
        let mut out = Vec::new();
        print_banner(BannerMode::Off, DEFAULT_BANNER, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_console_writes_banner_and_version() {
        let mut out = Vec::new();
        print_banner(BannerMode::Console, "HELLO\n", &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HELLO\n"));
        assert!(text.contains(env!("CARGO_PKG_VERSION")));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn log_banner_at(level: Level, banner: &str) -> (String, Vec<u8>) {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_max_level(level)
            .with_ansi(false)
            .without_time()
            .finish();

        let mut out = Vec::new();
        tracing::subscriber::with_default(subscriber, || {
            print_banner(BannerMode::Log, banner, &mut out).unwrap();
        });
        (captured.text(), out)
    }

    #[test]
    fn test_log_mode_emits_info_events() {
        let (logged, out) = log_banner_at(Level::INFO, "HELLO\n\n  \nWORLD\n");

        assert!(out.is_empty());
        let lines: Vec<&str> = logged.lines().collect();
        assert_eq!(lines.len(), 2, "blank banner lines are skipped: {logged:?}");
        assert!(lines[0].contains("INFO") && lines[0].contains("banner: HELLO"));
        assert!(lines[1].contains("INFO") && lines[1].contains("banner: WORLD"));
    }

    #[test]
    fn test_log_mode_filtered_below_info() {
        let (logged, _) = log_banner_at(Level::WARN, DEFAULT_BANNER);
        assert!(logged.is_empty());
    }
}
