//! Handles all user-facing output for the CLI.
//!
//! JSON goes to stdout unadorned so it can be piped into a code generator.
//! The summary view is colorized with `termcolor` when stdout is a terminal.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ir::{FileDescriptor, MessageRef};

/// Writes the IR as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write>(out: &mut W, file: &FileDescriptor) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, file)?;
    writeln!(out)
}

/// Prints the IR as JSON to stdout.
pub fn print_json(file: &FileDescriptor) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_json(&mut lock, file)
}

/// Writes a human-readable listing of every method and its messages.
pub fn write_summary<W: WriteColor>(out: &mut W, file: &FileDescriptor) -> io::Result<()> {
    if file.is_empty() {
        writeln!(out, "no methods declared")?;
        return Ok(());
    }

    for method in file {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        write!(out, "{}", method.name)?;
        out.reset()?;
        writeln!(out, "({}) -> {}", method.request.name, method.response.name)?;
        write_message(out, "request", &method.request)?;
        write_message(out, "response", &method.response)?;
    }

    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    writeln!(out, "{} method(s)", file.len())?;
    out.reset()
}

fn write_message<W: WriteColor>(out: &mut W, role: &str, message: &MessageRef) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_dimmed(true))?;
    write!(out, "  {:<9}", role)?;
    out.reset()?;
    writeln!(out, "{}", message.name)?;
    for (name, type_expr) in message.descriptor.iter() {
        writeln!(out, "    {}: {}", name, type_expr)?;
    }
    Ok(())
}

/// Prints the summary to stdout, colored when stdout is a terminal.
pub fn print_summary(file: &FileDescriptor) -> io::Result<()> {
    let choice = if io::IsTerminal::is_terminal(&io::stdout()) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_summary(&mut stdout, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;
    use termcolor::NoColor;

    #[test]
    fn test_summary_lists_fields_in_order() {
        let file = parse(
            "message Req { b: int32, a: string } message Resp {} method Call(Req) -> Resp;",
        )
        .unwrap();
        let mut out = NoColor::new(Vec::new());
        write_summary(&mut out, &file).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(
            text,
            "Call(Req) -> Resp\n  request  Req\n    b: int32\n    a: string\n  response Resp\n1 method(s)\n"
        );
    }

    #[test]
    fn test_summary_empty() {
        let mut out = NoColor::new(Vec::new());
        write_summary(&mut out, &FileDescriptor::new()).unwrap();
        assert_eq!(out.into_inner(), b"no methods declared\n");
    }

    #[test]
    fn test_json_ends_with_newline() {
        let mut out = Vec::new();
        write_json(&mut out, &FileDescriptor::new()).unwrap();
        assert_eq!(out, b"[]\n");
    }
}
