//! Timeline command: a text drawing of one day.

use std::io::Write;

use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use safehours_core::{Activity, SegmentKind, TimelineSegment, day_timeline};

use super::util::{format_day, format_duration};

/// Cells in the strip; each covers half an hour.
const CELLS: i64 = 48;
const CELL_MINUTES: i64 = 30;

fn segment_label(kind: SegmentKind) -> &'static str {
    match kind {
        SegmentKind::Pre => "pre",
        SegmentKind::Core(kind) => kind.as_str(),
        SegmentKind::Post => "post",
    }
}

fn cell_glyph(segments: &[TimelineSegment], from: NaiveDateTime, to: NaiveDateTime) -> char {
    let touching = segments
        .iter()
        .filter(|s| s.start < to && s.end > from)
        .map(|s| s.kind);
    let mut glyph = '·';
    for kind in touching {
        match kind {
            SegmentKind::Core(_) => return '█',
            SegmentKind::Pre | SegmentKind::Post => glyph = '░',
        }
    }
    glyph
}

/// Draws the day as a 24-hour strip followed by the segment list.
pub fn format_timeline(segments: &[TimelineSegment], date: NaiveDate) -> Result<String> {
    use std::fmt::Write as _;

    let mut output = String::new();
    writeln!(output, "TIMELINE: {}", format_day(date))?;
    writeln!(output)?;

    if segments.is_empty() {
        writeln!(output, "No activities on this day.")?;
        return Ok(output);
    }

    let midnight = date.and_time(NaiveTime::MIN);
    let strip: String = (0..CELLS)
        .map(|cell| {
            let from = midnight + Duration::minutes(cell * CELL_MINUTES);
            cell_glyph(segments, from, from + Duration::minutes(CELL_MINUTES))
        })
        .collect();
    writeln!(output, "00    03    06    09    12    15    18    21    24")?;
    writeln!(output, "{strip}")?;
    writeln!(output)?;

    for segment in segments {
        // Pre buffers can start on the previous day
        let start = if segment.start.date() < date {
            format!("{} (-1d)", segment.start.format("%H:%M"))
        } else {
            segment.start.format("%H:%M").to_string()
        };
        writeln!(
            output,
            "{start:>13}-{}  {:<17} {}",
            segment.end.format("%H:%M"),
            segment_label(segment.kind),
            format_duration(segment.length())
        )?;
    }
    Ok(output)
}

pub fn run<W: Write>(writer: &mut W, activities: &[Activity], date: NaiveDate) -> Result<()> {
    let segments = day_timeline(activities, date);
    write!(writer, "{}", format_timeline(&segments, date)?)?;
    Ok(())
}
