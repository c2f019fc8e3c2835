//! Stateless classifier for downloader status lines
//!
//! Turns free-text output lines into typed progress/info events. The
//! classifier keeps no memory of prior lines, so it cannot detect stalled or
//! repeated percentages — it only reports what a single line says.

use crate::types::JobEvent;

/// Marker the tool puts on download-status lines
const DOWNLOAD_MARKER: &str = "[download]";

/// Fixed message emitted for merge/remux chatter instead of the raw line
const MERGING_MESSAGE: &str = "Merging video and audio tracks...";

/// Classify one trimmed output line.
///
/// Returns `None` for the common case of lines carrying no reportable
/// signal (tool banners, playlist notices, retries). A progress line whose
/// percent token does not parse also yields `None`: a garbled line must
/// never fail the job, it is simply not reported.
pub fn classify(line: &str) -> Option<JobEvent> {
    if line.contains(DOWNLOAD_MARKER) {
        if line.contains('%') {
            return parse_progress(line);
        }
        // Destination announcements share the [download] marker but carry a
        // path instead of a percentage.
        if line.contains("Destination:") {
            return Some(JobEvent::Info {
                message: line.to_string(),
            });
        }
        return None;
    }

    if line.contains("Merging formats") || line.contains("ffmpeg") {
        return Some(JobEvent::Info {
            message: MERGING_MESSAGE.to_string(),
        });
    }

    None
}

/// Extract percent/size/speed/eta from a status line such as
/// `[download]  45.8% of 123.45MiB at 2.34MiB/s ETA 00:30`.
///
/// The `of`/`at`/`ETA` markers are matched as whole tokens; each may be
/// absent independently.
fn parse_progress(line: &str) -> Option<JobEvent> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let percent_token = tokens.iter().find(|token| token.contains('%'))?;
    let numeric = &percent_token[..percent_token.find('%')?];
    let percent: f64 = numeric.parse().ok()?;

    let mut size = None;
    let mut speed = None;
    let mut eta = None;
    for pair in tokens.windows(2) {
        match pair[0] {
            "of" => size = Some(pair[1].to_string()),
            "at" => speed = Some(pair[1].to_string()),
            "ETA" => eta = Some(pair[1].to_string()),
            _ => {}
        }
    }

    Some(JobEvent::Progress {
        percent,
        size,
        speed,
        eta,
    })
}
