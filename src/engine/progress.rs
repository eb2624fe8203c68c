use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DURATION_RE: Regex =
        Regex::new(r"Duration:\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("valid duration pattern");
    static ref TIME_RE: Regex =
        Regex::new(r"time=\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("valid time pattern");
}

fn to_seconds(caps: &regex::Captures<'_>) -> Option<f64> {
    let h: f64 = caps.get(1)?.as_str().parse().ok()?;
    let m: f64 = caps.get(2)?.as_str().parse().ok()?;
    let s: f64 = caps.get(3)?.as_str().parse().ok()?;
    Some(h * 3600.0 + m * 60.0 + s)
}

/// Turns the engine's log output into progress ratios.
///
/// The first `Duration:` line fixes the media length; every later `time=` line
/// yields the processed fraction of it.
#[derive(Debug, Default)]
pub struct ProgressParser {
    duration: Option<f64>,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Feeds one log line, returning a ratio in `[0, 1]` when the line reports progress.
    pub fn feed(&mut self, line: &str) -> Option<f64> {
        if self.duration.is_none() {
            if let Some(caps) = DURATION_RE.captures(line) {
                self.duration = to_seconds(&caps).filter(|d| *d > 0.0);
                return None;
            }
        }

        let duration = self.duration?;
        let caps = TIME_RE.captures(line)?;
        let current = to_seconds(&caps)?;
        Some((current / duration).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_fraction_of_duration() {
        let mut parser = ProgressParser::new();
        assert_eq!(parser.feed("  Duration: 00:01:40.00, start: 0.000000, bitrate: 2000 kb/s"), None);
        assert_eq!(parser.duration(), Some(100.0));

        let ratio = parser
            .feed("frame=  250 fps= 50 q=28.0 size=    1024kB time=00:00:25.00 bitrate= 335.5kbits/s speed=2.0x")
            .unwrap();
        assert!((ratio - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn ignores_time_before_duration_is_known() {
        let mut parser = ProgressParser::new();
        assert_eq!(parser.feed("time=00:00:05.00"), None);
    }

    #[test]
    fn unknown_duration_never_reports() {
        let mut parser = ProgressParser::new();
        assert_eq!(parser.feed("  Duration: N/A, bitrate: N/A"), None);
        assert_eq!(parser.feed("frame=1 time=00:00:00.04"), None);
    }

    #[test]
    fn clamps_overshoot() {
        let mut parser = ProgressParser::new();
        parser.feed("Duration: 00:00:10.00");
        assert_eq!(parser.feed("time=00:00:10.50"), Some(1.0));
    }
}
