//! Output formatting for grouped lookup results

use crate::group::ResultGroup;
use serde::Serialize;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print groups to stdout, one label line followed by its targets
pub fn print_groups(groups: &[ResultGroup], choice: ColorChoice) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(choice);
    write_groups(&mut stdout, groups)
}

/// Write groups to any color-capable writer
pub fn write_groups<W: WriteColor>(out: &mut W, groups: &[ResultGroup]) -> io::Result<()> {
    for group in groups {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
        write!(out, "{}", group.label)?;
        out.reset()?;
        if group.label != group.key {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
            write!(out, " [{}]", group.key)?;
            out.reset()?;
        }
        writeln!(out)?;

        for target in &group.targets {
            write!(out, "  ")?;
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            let scope = if target.scope.is_empty() {
                "(global)"
            } else {
                target.scope.as_str()
            };
            write!(out, "{}", scope)?;
            out.reset()?;
            writeln!(out, "  {}", target.url)?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonResults<'a> {
    query: &'a str,
    groups: &'a [ResultGroup],
}

/// Write groups as a single JSON document
pub fn write_json<W: Write>(out: &mut W, query: &str, groups: &[ResultGroup]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &JsonResults { query, groups })?;
    writeln!(out)
}
