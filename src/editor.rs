//! The "new event" form shown by providers when running in a terminal.

use std::io::{self, BufRead, Write};

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

const DEFAULT_DURATION_MINS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

/// Asks for title, start and duration. `Ok(None)` means the user cancelled,
/// either with an empty title or by closing the input.
pub fn prompt_new_event<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    calendar_title: &str,
    now: DateTime<Local>,
) -> io::Result<Option<Draft>> {
    writeln!(output, "New event in \"{calendar_title}\" (empty title cancels)")?;

    let Some(title) = ask(input, output, "Title: ")? else {
        return Ok(None);
    };
    if title.is_empty() {
        return Ok(None);
    }

    let start = loop {
        let Some(answer) = ask(input, output, "Starts (HH:MM or YYYY-MM-DD HH:MM): ")? else {
            return Ok(None);
        };
        match parse_start(&answer, now) {
            Some(start) => break start,
            None => writeln!(output, "Could not read \"{answer}\" as a time")?,
        }
    };

    let duration = loop {
        let prompt = format!("Duration in minutes [{DEFAULT_DURATION_MINS}]: ");
        let Some(answer) = ask(input, output, &prompt)? else {
            return Ok(None);
        };
        match parse_duration(&answer) {
            Some(d) => break d,
            None => writeln!(output, "Duration must be a positive number of minutes")?,
        }
    };

    Ok(Some(Draft {
        title,
        start,
        end: start + duration,
    }))
}

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// A bare time means its next occurrence: today, or tomorrow if already past.
pub fn parse_start(text: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let naive = if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M") {
        dt
    } else {
        let time = NaiveTime::parse_from_str(text, "%H:%M").ok()?;
        let today: NaiveDate = now.date_naive();
        let candidate = today.and_time(time);
        if candidate < now.naive_local() {
            today.succ_opt()?.and_time(time)
        } else {
            candidate
        }
    };
    naive.and_local_timezone(Local).earliest()
}

pub fn parse_duration(text: &str) -> Option<Duration> {
    if text.is_empty() {
        return Some(Duration::minutes(DEFAULT_DURATION_MINS));
    }
    match text.parse::<i64>() {
        Ok(mins) if mins > 0 => Some(Duration::minutes(mins)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use std::io::Cursor;

    fn now() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 6, 3, 14, 0, 0)
            .single()
            .expect("unambiguous local time")
    }

    #[test]
    fn bare_time_rolls_over_to_tomorrow_when_past() {
        let later = parse_start("15:30", now()).unwrap();
        assert_eq!(later.date_naive(), now().date_naive());
        assert_eq!((later.hour(), later.minute()), (15, 30));

        let earlier = parse_start("09:00", now()).unwrap();
        assert_eq!(earlier.date_naive(), now().date_naive().succ_opt().unwrap());
    }

    #[test]
    fn full_date_is_taken_as_is() {
        let start = parse_start("2024-07-01 08:15", now()).unwrap();
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert!(parse_start("tomorrow", now()).is_none());
    }

    #[test]
    fn duration_defaults_and_rejects_nonsense() {
        assert_eq!(parse_duration(""), Some(Duration::minutes(60)));
        assert_eq!(parse_duration("45"), Some(Duration::minutes(45)));
        assert_eq!(parse_duration("0"), None);
        assert_eq!(parse_duration("-5"), None);
        assert_eq!(parse_duration("soon"), None);
    }

    #[test]
    fn form_retries_bad_input() {
        let mut input = Cursor::new("Retro\nlater\n16:00\nx\n30\n");
        let mut output = Vec::new();
        let draft = prompt_new_event(&mut input, &mut output, "Work", now())
            .unwrap()
            .unwrap();

        assert_eq!(draft.title, "Retro");
        assert_eq!((draft.start.hour(), draft.start.minute()), (16, 0));
        assert_eq!(draft.end - draft.start, Duration::minutes(30));
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Could not read \"later\""));
        assert!(shown.contains("positive number of minutes"));
    }

    #[test]
    fn empty_title_or_closed_input_cancels() {
        let mut output = Vec::new();
        let mut empty = Cursor::new("\n");
        assert!(prompt_new_event(&mut empty, &mut output, "Work", now())
            .unwrap()
            .is_none());

        let mut closed = Cursor::new("Retro\n");
        assert!(prompt_new_event(&mut closed, &mut output, "Work", now())
            .unwrap()
            .is_none());
    }
}
