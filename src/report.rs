//! Plain-text cycle stack
//!
//! One block per reported core (no core header in aggregate mode), one line
//! per entry with its CPI, its percent of the core's stack and its percent of
//! elapsed time, then a total line whose last column is absolute seconds.

use crate::pipeline::{CoreSeries, StackReport};
use std::io::{self, Write};

const HEADER: &str = "                     CPI      CPI %     Time %";

/// Write the text stack of `report` to `out`
pub fn write_text<W: Write>(out: &mut W, report: &StackReport) -> io::Result<()> {
    writeln!(out, "{}", HEADER)?;
    for series in &report.series {
        if !report.aggregated {
            writeln!(out, "Core {}", series.core)?;
        }
        write_core(out, report, series)?;
    }
    Ok(())
}

fn write_core<W: Write>(
    out: &mut W,
    report: &StackReport,
    series: &CoreSeries,
) -> io::Result<()> {
    let projector = report.projector();
    let stack = &series.stack;

    for (name, value) in &stack.entries {
        writeln!(
            out,
            "  {:<15}    {:6.2}    {:6.2}%    {:6.2}%",
            name,
            projector.rate(*value, series.core),
            100.0 * stack.share(*value),
            100.0 * projector.fraction(*value)
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "  {:<15}    {:6.2}    {:6.2}%    {:6.2}s",
        "total",
        projector.rate(stack.total, series.core),
        100.0 * stack.share(stack.total),
        projector.absolute_time(stack.total)
    )
}

/// Text stack of `report` as a string
pub fn render_text(report: &StackReport) -> String {
    let mut buffer = Vec::new();
    // writes to a Vec cannot fail
    let _ = write_text(&mut buffer, report);
    String::from_utf8_lossy(&buffer).into_owned()
}
