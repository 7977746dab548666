//! WebVTT subtitle parsing
//!
//! Converts the textual body of a WebVTT file into an ordered list of timed
//! transcript lines. Malformed cues are skipped, never fatal: the parser
//! resumes at the next cue boundary so one bad timing line cannot lose the
//! rest of the file.

use serde::{Deserialize, Serialize};

/// The ` --> ` separator that marks a cue timing line
const TIMING_SEPARATOR: &str = " --> ";

/// Errors from WebVTT parsing
#[derive(thiserror::Error, Debug)]
pub enum VttError {
    #[error("subtitle body is empty")]
    Empty,
}

/// A single timed line of transcript text. Transient: produced by the parser,
/// consumed by the indexer, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    /// Cue start in fractional seconds
    pub start_time: f64,
    /// Cue end in fractional seconds
    pub end_time: f64,
    /// Cue text; multi-line bodies are joined with single newlines
    pub text: String,
}

/// Parse a WebVTT body into transcript lines.
///
/// Rules: the leading `WEBVTT` header line and `NOTE` blocks are stripped;
/// a cue is a timing line containing ` --> `, followed by text lines up to a
/// blank line or EOF; cues with no text body are dropped; malformed timing
/// lines are skipped. Fails only when the input is empty after header
/// stripping.
pub fn parse_vtt(content: &str) -> Result<Vec<TranscriptLine>, VttError> {
    let lines: Vec<&str> = content.lines().map(|l| l.trim_end_matches('\r')).collect();

    let mut transcript = Vec::new();
    let mut saw_content = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if line.is_empty() || is_header_line(line) {
            i += 1;
            continue;
        }

        // NOTE blocks run until the next blank line
        if line == "NOTE" || line.starts_with("NOTE ") || line.starts_with("NOTE\t") {
            saw_content = true;
            i += 1;
            while i < lines.len() && !lines[i].trim().is_empty() {
                i += 1;
            }
            continue;
        }

        saw_content = true;

        if line.contains(TIMING_SEPARATOR) {
            match parse_timing_line(line) {
                Some((start_time, end_time)) => {
                    i += 1;
                    let mut body: Vec<&str> = Vec::new();
                    while i < lines.len() {
                        let text = lines[i].trim();
                        if text.is_empty() || text.contains(TIMING_SEPARATOR) {
                            break;
                        }
                        body.push(text);
                        i += 1;
                    }
                    let text = body.join("\n").trim().to_string();
                    if !text.is_empty() {
                        transcript.push(TranscriptLine { start_time, end_time, text });
                    }
                    continue;
                }
                None => {
                    // Malformed timing: skip the line and resume scanning
                    i += 1;
                    continue;
                }
            }
        }

        // Anything else (cue identifiers, stray settings) is ignored
        i += 1;
    }

    if !saw_content {
        return Err(VttError::Empty);
    }

    Ok(transcript)
}

/// The file header, optionally carrying trailing text (`WEBVTT - title`)
fn is_header_line(line: &str) -> bool {
    line == "WEBVTT" || line.starts_with("WEBVTT ") || line.starts_with("WEBVTT\t")
}

/// Parse `HH:MM:SS.mmm --> HH:MM:SS.mmm`, ignoring trailing cue settings
fn parse_timing_line(line: &str) -> Option<(f64, f64)> {
    let (start_raw, rest) = line.split_once(TIMING_SEPARATOR)?;
    // Everything after the second timestamp and a space is cue settings
    let end_raw = rest.split_whitespace().next()?;

    let start = parse_timestamp(start_raw.trim())?;
    let end = parse_timestamp(end_raw)?;
    Some((start, end))
}

/// Parse a single `HH:MM:SS.mmm` timestamp into fractional seconds
fn parse_timestamp(raw: &str) -> Option<f64> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours: u64 = parts[0].parse().ok()?;
    let minutes: u64 = parts[1].parse().ok()?;
    let seconds: f64 = parts[2].parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_cue() {
        let body = "WEBVTT\n\n00:00:01.000 --> 00:00:03.500\nKo te aroha.\n";
        let lines = parse_vtt(body).unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].start_time, 1.0);
        assert_eq!(lines[0].end_time, 3.5);
        assert_eq!(lines[0].text, "Ko te aroha.");
    }

    #[test]
    fn test_timestamp_conversion() {
        assert_eq!(parse_timestamp("01:01:01.000"), Some(3661.0));
        assert_eq!(parse_timestamp("00:00:00.500"), Some(0.5));
        assert_eq!(parse_timestamp("10:30:05.250"), Some(37805.25));
        assert_eq!(parse_timestamp("00:00"), None);
        assert_eq!(parse_timestamp("xx:00:00.000"), None);
        assert_eq!(parse_timestamp("00:00:-1.0"), None);
    }

    #[test]
    fn test_malformed_cue_does_not_lose_later_cues() {
        let body = "WEBVTT\n\n\
            00:00:01.000 --> 00:00:02.000\nTuatahi.\n\n\
            garbage --> more garbage\nLost text.\n\n\
            00:00:05.000 --> 00:00:06.000\nTuatoru.\n";
        let lines = parse_vtt(body).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Tuatahi.");
        assert_eq!(lines[1].text, "Tuatoru.");
    }

    #[test]
    fn test_note_blocks_and_cue_identifiers_are_stripped() {
        let body = "WEBVTT - kupu reel\n\n\
            NOTE\nThis block is metadata\nacross two lines\n\n\
            intro-cue\n00:00:01.000 --> 00:00:02.000\nKia ora.\n";
        let lines = parse_vtt(body).unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Kia ora.");
    }

    #[test]
    fn test_multiline_text_joined_with_newlines() {
        let body = "WEBVTT\n\n00:00:01.000 --> 00:00:04.000\nHe waiata\nmō te whānau\n";
        let lines = parse_vtt(body).unwrap();

        assert_eq!(lines[0].text, "He waiata\nmō te whānau");
    }

    #[test]
    fn test_cue_without_text_is_dropped() {
        let body = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\n\n00:00:03.000 --> 00:00:04.000\nKōrero.\n";
        let lines = parse_vtt(body).unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Kōrero.");
    }

    #[test]
    fn test_cue_settings_are_ignored() {
        let body = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000 align:start position:10%\nTitiro mai.\n";
        let lines = parse_vtt(body).unwrap();

        assert_eq!(lines[0].end_time, 2.0);
        assert_eq!(lines[0].text, "Titiro mai.");
    }

    #[test]
    fn test_back_to_back_cues_without_blank_separator() {
        let body = "WEBVTT\n\n\
            00:00:01.000 --> 00:00:02.000\nTahi.\n\
            00:00:02.000 --> 00:00:03.000\nRua.\n";
        let lines = parse_vtt(body).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text, "Rua.");
    }

    #[test]
    fn test_non_monotonic_cues_are_retained() {
        let body = "WEBVTT\n\n\
            00:00:10.000 --> 00:00:12.000\nMuri.\n\n\
            00:00:01.000 --> 00:00:02.000\nMua.\n";
        let lines = parse_vtt(body).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].start_time, 10.0);
        assert_eq!(lines[1].start_time, 1.0);
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(parse_vtt(""), Err(VttError::Empty)));
        assert!(matches!(parse_vtt("WEBVTT\n\n"), Err(VttError::Empty)));
    }

    #[test]
    fn test_file_with_no_valid_cues_is_ok_but_empty() {
        let body = "WEBVTT\n\nbad --> cue\n";
        let lines = parse_vtt(body).unwrap();
        assert!(lines.is_empty());
    }
}
