use std::io::{self, Write};
use chrono::{Local, TimeZone};
use crate::error::Result;
use crate::interfaces::renderer::Renderer;
use crate::types::observation::WindowRow;

/// Moves the cursor to the start of the previous line and clears it.
const CLEAR_PREVIOUS_LINE: &str = "\x1b[F\x1b[K";

/// Redraws the window in place on a terminal, one line per entry:
///
/// ```text
/// [2023-11-14T23:13:20] BTC → USD: SMA(1): $50,000.00
/// ```
pub struct TerminalRenderer<W: Write + Send, Tz: TimeZone = Local> {
    out: W,
    tz: Tz,
    asset_label: String,
    quote_label: String,
    redraw: bool,
    lines_drawn: usize,
}

impl TerminalRenderer<io::Stdout, Local> {
    pub fn stdout(asset_label: &str, quote_label: &str, redraw: bool) -> Self {
        TerminalRenderer::new(io::stdout(), Local, asset_label, quote_label, redraw)
    }
}

impl<W: Write + Send, Tz: TimeZone> TerminalRenderer<W, Tz>
where
    Tz::Offset: std::fmt::Display,
{
    pub fn new(out: W, tz: Tz, asset_label: &str, quote_label: &str, redraw: bool) -> Self {
        TerminalRenderer {
            out,
            tz,
            asset_label: asset_label.to_string(),
            quote_label: quote_label.to_string(),
            redraw,
            lines_drawn: 0,
        }
    }

    pub fn format_row(&self, row: &WindowRow) -> String {
        let ts = row.observation.timestamp;
        format!(
            "[{}] {} → {}: SMA({}): ${}",
            ts.format_in(&self.tz).unwrap_or_else(|| ts.to_string()),
            self.asset_label,
            self.quote_label,
            row.position,
            row.observation.value.to_grouped_string(),
        )
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send, Tz: TimeZone + Send> Renderer for TerminalRenderer<W, Tz>
where
    Tz::Offset: std::fmt::Display,
{
    fn render(&mut self, rows: &[WindowRow]) -> Result<()> {
        let mut frame = String::new();
        if self.redraw {
            for _ in 0..self.lines_drawn {
                frame.push_str(CLEAR_PREVIOUS_LINE);
            }
        }
        for row in rows {
            frame.push_str(&self.format_row(row));
            frame.push('\n');
        }

        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        self.lines_drawn = rows.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::types::observation::Observation;
    use crate::types::price::Price;
    use crate::types::timestamp::Timestamp;

    fn row(position: usize, ts: i64, value: f64) -> WindowRow {
        WindowRow {
            position,
            observation: Observation::new(Timestamp::from_epoch_secs(ts), Price::from_f64(value).unwrap()),
        }
    }

    fn renderer(redraw: bool) -> TerminalRenderer<Vec<u8>, Utc> {
        TerminalRenderer::new(Vec::new(), Utc, "BTC", "USD", redraw)
    }

    #[test]
    fn formats_row_like_ticker_line() {
        let r = renderer(true);
        assert_eq!(
            r.format_row(&row(1, 1_700_000_000, 50000.0)),
            "[2023-11-14T22:13:20] BTC → USD: SMA(1): $50,000.00"
        );
    }

    #[test]
    fn first_frame_has_no_clear_sequences() {
        let mut r = renderer(true);
        r.render(&[row(1, 1_700_000_000, 1.0)]).unwrap();
        let out = String::from_utf8(r.into_inner()).unwrap();
        assert!(!out.contains(CLEAR_PREVIOUS_LINE));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn redraw_clears_previously_drawn_lines() {
        let mut r = renderer(true);
        r.render(&[row(1, 1, 1.0), row(2, 2, 2.0)]).unwrap();
        r.render(&[row(1, 1, 1.0), row(2, 2, 2.0), row(3, 3, 3.0)]).unwrap();
        let out = String::from_utf8(r.into_inner()).unwrap();
        assert_eq!(out.matches(CLEAR_PREVIOUS_LINE).count(), 2);
        assert!(out.ends_with("SMA(3): $3.00\n"));
    }

    #[test]
    fn append_mode_never_clears() {
        let mut r = renderer(false);
        r.render(&[row(1, 1, 1.0)]).unwrap();
        r.render(&[row(1, 1, 1.0), row(2, 2, 2.0)]).unwrap();
        let out = String::from_utf8(r.into_inner()).unwrap();
        assert!(!out.contains(CLEAR_PREVIOUS_LINE));
        assert_eq!(out.lines().count(), 3);
    }
}
