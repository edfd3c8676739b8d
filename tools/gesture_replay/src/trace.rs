use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{bail, Context, Result};
use touchgrass::{FingerId, Point, TouchEvent, TouchEventKind};

const HEADER: &str = "kind,ms,phase,id,x,y";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TraceSample {
    Touch(TouchEvent),
    Timer { ms: u32 },
}

impl TraceSample {
    pub fn ms(&self) -> u32 {
        match self {
            TraceSample::Touch(event) => event.time,
            TraceSample::Timer { ms } => *ms,
        }
    }
}

pub fn parse_trace(path: &Path) -> Result<Vec<TraceSample>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    let mut last_ms = 0u32;
    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.with_context(|| format!("failed to read {}:{line_no}", path.display()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == HEADER {
            continue;
        }

        let sample = parse_line(trimmed)
            .with_context(|| format!("{}:{line_no} invalid trace line", path.display()))?;
        if sample.ms() < last_ms {
            bail!(
                "{}:{line_no} timestamp {} goes backwards (previous {last_ms})",
                path.display(),
                sample.ms()
            );
        }
        last_ms = sample.ms();
        out.push(sample);
    }

    Ok(out)
}

pub fn parse_line(line: &str) -> Result<TraceSample> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    match parts.as_slice() {
        ["timer", ms] => Ok(TraceSample::Timer {
            ms: parse_field(ms, "ms")?,
        }),
        ["touch", ms, phase, id, x, y] => {
            let kind = match *phase {
                "down" => TouchEventKind::Down,
                "move" => TouchEventKind::Motion,
                "up" => TouchEventKind::Up,
                other => bail!("unknown touch phase '{other}'"),
            };
            Ok(TraceSample::Touch(TouchEvent::new(
                kind,
                parse_field(ms, "ms")?,
                parse_field::<FingerId>(id, "id")?,
                Point::new(parse_field(x, "x")?, parse_field(y, "y")?),
            )))
        }
        [kind, ..] => bail!(
            "expected 'touch,<ms>,<down|move|up>,<id>,<x>,<y>' or 'timer,<ms>', got '{kind}' with {} columns",
            parts.len()
        ),
        [] => bail!("empty line"),
    }
}

fn parse_field<T>(raw: &str, field: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .with_context(|| format!("invalid {field} '{raw}'"))
}

/// Expected event tokens, one per line. Blank lines and `#` comments are skipped.
pub fn parse_expected(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut tokens = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}:{}", path.display(), line_no + 1))?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        tokens.push(token.to_ascii_lowercase());
    }

    Ok(tokens)
}
