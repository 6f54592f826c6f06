//! AppleScript-backed store adapter for the macOS Notes app.
//!
//! Queries are issued by generating a complete AppleScript program per
//! query mode and running it through `osascript`. The four date modes
//! each get their own template; the range case is generated as one
//! dedicated script rather than by stacking the forward and backward
//! clauses onto a shared template.

use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeZone, Timelike, Utc};
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use super::{NoteStore, Projection, StoreError};
use crate::domain::{Note, NoteId, QueryMode};

/// Wall-clock bound for simple reads and single-note updates.
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Wall-clock bound for multi-clause filter queries.
const QUERY_TIMEOUT: Duration = Duration::from_secs(120);

/// Field separator inside one note record (ASCII unit separator).
const FIELD_SEP: char = '\u{1f}';

/// Separator between note records (ASCII record separator).
const RECORD_SEP: char = '\u{1e}';

/// Store adapter that talks to Notes.app via `osascript`.
pub struct AppleScriptStore {
    verbose: bool,
}

impl AppleScriptStore {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn run(&self, script: &str, timeout: Duration) -> Result<String, StoreError> {
        if self.verbose {
            eprintln!("running osascript ({} bytes of script)", script.len());
        }
        run_osascript(script, timeout)
    }
}

impl NoteStore for AppleScriptStore {
    fn list(
        &self,
        mode: &QueryMode,
        max: usize,
        projection: Projection,
    ) -> Result<Vec<Note>, StoreError> {
        let script = match mode {
            QueryMode::Latest => latest_script(max, projection),
            QueryMode::Forward(from) => forward_script(*from, max, projection),
            QueryMode::Backward(to) => backward_script(*to, max, projection),
            QueryMode::Range(from, to) => range_script(*from, *to, max, projection),
        };
        let timeout = match mode {
            QueryMode::Latest => READ_TIMEOUT,
            _ => QUERY_TIMEOUT,
        };
        let raw = self.run(&script, timeout)?;
        parse_records(&raw)
    }

    fn update(&mut self, id: &NoteId, title: &str, body: &str) -> Result<(), StoreError> {
        let script = format!(
            r#"tell application "Notes"
	set targetNote to note id "{id}" of default account
	set name of targetNote to "{title}"
	set body of targetNote to "{body}"
end tell"#,
            id = escape(id.as_str()),
            title = escape(title),
            body = escape(body),
        );
        self.run(&script, READ_TIMEOUT)?;
        Ok(())
    }
}

/// Shared AppleScript handlers: zero-padding, a locale-safe timestamp
/// formatter, and locale-safe date construction from components.
///
/// Dates are never written as `date "..."` literals because those are
/// parsed with the user's locale (day/month ordering varies); bounds
/// are assembled field by field instead.
const SCRIPT_PRELUDE: &str = r#"on pad2(n)
	set s to n as string
	if (count of s) < 2 then set s to "0" & s
	return s
end pad2

on stamp(d)
	set t to time of d
	return ((year of d) as string) & "-" & pad2((month of d) as integer) & "-" & pad2(day of d) & " " & pad2(t div 3600) & ":" & pad2((t mod 3600) div 60) & ":" & pad2(t mod 60)
end stamp

on boundDate(y, m, d, secs)
	set b to current date
	set day of b to 1
	set year of b to y
	set month of b to m
	set day of b to d
	set time of b to secs
	return b
end boundDate
"#;

/// The expression emitted for the body field under each projection.
fn body_expr(projection: Projection) -> &'static str {
    match projection {
        Projection::Full => "(plaintext of n)",
        Projection::Headers => "\"\"",
    }
}

fn emit_record(projection: Projection) -> String {
    format!(
        "set out to out & (id of n as string) & fieldSep & (name of n as string) & fieldSep & {body} & fieldSep & my stamp(creation date of n) & fieldSep & my stamp(md) & recSep",
        body = body_expr(projection)
    )
}

/// Renders a UTC bound as an AppleScript `boundDate(...)` call in the
/// store's local time.
fn bound_call(bound: DateTime<Utc>) -> String {
    let local = bound.with_timezone(&Local);
    format!(
        "my boundDate({y}, {m}, {d}, {secs})",
        y = local.year(),
        m = local.month(),
        d = local.day(),
        secs = local.num_seconds_from_midnight(),
    )
}

fn latest_script(max: usize, projection: Projection) -> String {
    format!(
        r#"{prelude}
set fieldSep to character id 31
set recSep to character id 30
set out to ""
set matched to 0
tell application "Notes"
	repeat with n in notes of default account
		set md to modification date of n
		{emit}
		set matched to matched + 1
		if matched is greater than or equal to {max} then exit repeat
	end repeat
end tell
return out"#,
        prelude = SCRIPT_PRELUDE,
        emit = emit_record(projection),
        max = max,
    )
}

fn forward_script(from: DateTime<Utc>, max: usize, projection: Projection) -> String {
    format!(
        r#"{prelude}
set fieldSep to character id 31
set recSep to character id 30
set fromDate to {from}
set out to ""
set matched to 0
tell application "Notes"
	repeat with n in notes of default account
		set md to modification date of n
		if md is greater than or equal to fromDate then
			{emit}
			set matched to matched + 1
			if matched is greater than or equal to {max} then exit repeat
		end if
	end repeat
end tell
return out"#,
        prelude = SCRIPT_PRELUDE,
        from = bound_call(from),
        emit = emit_record(projection),
        max = max,
    )
}

fn backward_script(to: DateTime<Utc>, max: usize, projection: Projection) -> String {
    format!(
        r#"{prelude}
set fieldSep to character id 31
set recSep to character id 30
set toDate to {to}
set out to ""
set matched to 0
tell application "Notes"
	repeat with n in notes of default account
		set md to modification date of n
		if md is less than or equal to toDate then
			{emit}
			set matched to matched + 1
			if matched is greater than or equal to {max} then exit repeat
		end if
	end repeat
end tell
return out"#,
        prelude = SCRIPT_PRELUDE,
        to = bound_call(to),
        emit = emit_record(projection),
        max = max,
    )
}

fn range_script(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    max: usize,
    projection: Projection,
) -> String {
    format!(
        r#"{prelude}
set fieldSep to character id 31
set recSep to character id 30
set fromDate to {from}
set toDate to {to}
set out to ""
set matched to 0
tell application "Notes"
	repeat with n in notes of default account
		set md to modification date of n
		if md is greater than or equal to fromDate and md is less than or equal to toDate then
			{emit}
			set matched to matched + 1
			if matched is greater than or equal to {max} then exit repeat
		end if
	end repeat
end tell
return out"#,
        prelude = SCRIPT_PRELUDE,
        from = bound_call(from),
        to = bound_call(to),
        emit = emit_record(projection),
        max = max,
    )
}

/// Escapes a Rust string for embedding in a double-quoted AppleScript
/// string literal.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Parses the delimited record stream returned by the query scripts.
fn parse_records(raw: &str) -> Result<Vec<Note>, StoreError> {
    let mut notes = Vec::new();
    for record in raw.split(RECORD_SEP) {
        let record = record.trim_matches(['\n', '\r']);
        if record.is_empty() {
            continue;
        }
        let fields: Vec<&str> = record.splitn(5, FIELD_SEP).collect();
        let &[id, title, body, created, modified] = fields.as_slice() else {
            return Err(StoreError::MalformedRecord(format!(
                "expected 5 fields, got {}",
                fields.len()
            )));
        };
        notes.push(Note::new(
            NoteId::new(id),
            title,
            body,
            parse_stamp(created)?,
            parse_stamp(modified)?,
        ));
    }
    Ok(notes)
}

/// Parses a `stamp(...)` timestamp, interpreting it in the store's
/// local timezone.
fn parse_stamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
        .map_err(|e| StoreError::MalformedRecord(format!("bad timestamp {s:?}: {e}")))?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| StoreError::MalformedRecord(format!("nonexistent local time {s:?}")))?;
    Ok(local.with_timezone(&Utc))
}

/// Runs a script through `osascript` with a wall-clock timeout.
///
/// Output is drained on separate threads while the child is polled, so
/// a chatty script cannot deadlock on a full pipe.
fn run_osascript(script: &str, timeout: Duration) -> Result<String, StoreError> {
    let mut child = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| StoreError::Unavailable(format!("failed to launch osascript: {e}")))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| StoreError::Unavailable("osascript stdout not captured".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| StoreError::Unavailable("osascript stderr not captured".to_string()))?;

    let out_rx = drain(stdout);
    let err_rx = drain(stderr);

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(StoreError::Timeout {
                        seconds: timeout.as_secs(),
                    });
                }
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                return Err(StoreError::Unavailable(format!(
                    "failed waiting for osascript: {e}"
                )));
            }
        }
    };

    let stdout_text = out_rx.recv().unwrap_or_default();
    let stderr_text = err_rx.recv().unwrap_or_default();

    if !status.success() {
        let detail = stderr_text.trim().to_string();
        // -1743 is the Apple Events "not authorized" error code.
        if detail.contains("-1743") || detail.contains("Not authorized") {
            return Err(StoreError::PermissionDenied(detail));
        }
        return Err(StoreError::Unavailable(format!(
            "osascript exited with {status}: {detail}"
        )));
    }

    Ok(stdout_text)
}

/// Reads a child pipe to EOF on a background thread.
fn drain(mut pipe: impl Read + Send + 'static) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = String::new();
        let _ = pipe.read_to_string(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_delimited_records() {
        let raw = format!(
            "n1{f}Title{f}Body line{f}2025-04-01 09:30:00{f}2025-04-02 10:00:00{r}",
            f = FIELD_SEP,
            r = RECORD_SEP,
        );
        let notes = parse_records(&raw).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id().as_str(), "n1");
        assert_eq!(notes[0].title(), "Title");
        assert_eq!(notes[0].body(), "Body line");
    }

    #[test]
    fn empty_output_is_zero_records() {
        assert!(parse_records("").unwrap().is_empty());
        assert!(parse_records("\n").unwrap().is_empty());
    }

    #[test]
    fn body_may_contain_field_separator_free_newlines() {
        let raw = format!(
            "n1{f}T{f}line one\nline two{f}2025-04-01 00:00:00{f}2025-04-01 00:00:00{r}",
            f = FIELD_SEP,
            r = RECORD_SEP,
        );
        let notes = parse_records(&raw).unwrap();
        assert_eq!(notes[0].body(), "line one\nline two");
    }

    #[test]
    fn short_record_is_malformed() {
        let raw = format!("only{f}two{r}", f = FIELD_SEP, r = RECORD_SEP);
        let err = parse_records(&raw).unwrap_err();
        assert!(matches!(err, StoreError::MalformedRecord(_)));
    }

    #[test]
    fn bad_timestamp_is_malformed() {
        let raw = format!(
            "n1{f}T{f}B{f}April first{f}2025-04-01 00:00:00{r}",
            f = FIELD_SEP,
            r = RECORD_SEP,
        );
        assert!(matches!(
            parse_records(&raw).unwrap_err(),
            StoreError::MalformedRecord(_)
        ));
    }

    #[test]
    fn escape_handles_quotes_and_newlines() {
        assert_eq!(escape(r#"a "b" c"#), r#"a \"b\" c"#);
        assert_eq!(escape("line1\nline2"), "line1\\nline2");
        assert_eq!(escape(r"back\slash"), r"back\\slash");
    }

    #[test]
    fn range_script_is_a_single_dedicated_template() {
        let from = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 4, 30, 0, 0, 0).unwrap();
        let script = range_script(from, to, 100, Projection::Full);
        // Both bounds must live in one compound condition, not in
        // separately stacked clauses.
        assert!(script.contains("is greater than or equal to fromDate and md is less than or equal to toDate"));
        assert!(script.contains("set fromDate to"));
        assert!(script.contains("set toDate to"));
    }

    #[test]
    fn bound_dates_are_built_from_components() {
        let from = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        let script = forward_script(from, 10, Projection::Full);
        assert!(script.contains("my boundDate("));
        assert!(!script.contains("date \""));
    }

    #[test]
    fn headers_projection_skips_bodies() {
        let script = latest_script(5, Projection::Headers);
        assert!(!script.contains("plaintext of n"));
    }
}
