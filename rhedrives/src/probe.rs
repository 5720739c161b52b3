//! Disc probing through `cdparanoia -Q`.
//!
//! cdparanoia prints the audio table of contents on stderr:
//!
//! ```text
//! track        length               begin        copy pre ch
//! ===========================================================
//!   1.    16352 [03:38.02]        0 [00:00.00]    no   no  2
//!   2.    18225 [04:03.00]    16352 [03:38.02]    no   no  2
//! TOTAL   34577 [07:41.02]    (audio only)
//! ```

use std::time::Duration;

use rheutils::cmd;
use tracing::debug;

use crate::errors::DriveError;
use crate::model::{DiscToc, DriveId, MediaState, TocEntry};

/// cdparanoia can spin a sleeping drive up before answering.
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Queries the drive's table of contents.
///
/// `Ok(None)` means the drive answered but holds no readable audio disc.
pub async fn query_toc(
    paranoia_bin: &str,
    device: &DriveId,
) -> Result<Option<DiscToc>, DriveError> {
    let out = cmd::run(
        paranoia_bin,
        &["-Q", "-d", device.as_str()],
        PROBE_TIMEOUT,
    )
    .await?;

    if !out.success() {
        debug!("cdparanoia -Q on {} failed: {}", device, out.stderr.trim());
        if stderr_says_no_disc(&out.stderr) {
            return Ok(None);
        }
        return Err(DriveError::Probe {
            device: device.clone(),
            message: out.stderr.trim().to_string(),
        });
    }

    Ok(parse_toc(&out.stderr))
}

/// Probes what the drive currently holds.
///
/// Probe failures degrade to [`MediaState::Unknown`]: listing drives must
/// keep working on a machine where cdparanoia is absent or confused.
pub async fn media_state(paranoia_bin: &str, device: &DriveId) -> MediaState {
    match query_toc(paranoia_bin, device).await {
        Ok(Some(toc)) if toc.track_count() > 0 => MediaState::AudioDisc {
            tracks: toc.track_count(),
        },
        Ok(Some(_)) => MediaState::DataDisc,
        Ok(None) => MediaState::NoDisc,
        Err(err) => {
            debug!("media probe failed on {}: {}", device, err);
            MediaState::Unknown
        }
    }
}

fn stderr_says_no_disc(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("unable to open disc") || lower.contains("no disc")
}

/// Parses the cdparanoia TOC listing. Returns `None` when no track rows and
/// no TOTAL footer are present (not a TOC listing at all).
pub(crate) fn parse_toc(stderr: &str) -> Option<DiscToc> {
    let mut entries = Vec::new();
    let mut total_sectors = None;

    for line in stderr.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("TOTAL") {
            total_sectors = rest
                .split_whitespace()
                .next()
                .and_then(|v| v.parse::<u64>().ok());
            continue;
        }

        // "  1.    16352 [03:38.02]        0 [00:00.00]    no   no  2"
        let Some((number, rest)) = trimmed.split_once('.') else {
            continue;
        };
        let Ok(track) = number.trim().parse::<u32>() else {
            continue;
        };
        let mut fields = rest.split_whitespace();
        let Some(Ok(sectors)) = fields.next().map(|v| v.parse::<u64>()) else {
            continue;
        };
        // Skip the "[mm:ss.ff]" length field
        let Some(Ok(begin)) = fields.nth(1).map(|v| v.parse::<u64>()) else {
            continue;
        };

        entries.push(TocEntry {
            track,
            sectors,
            begin,
        });
    }

    match (entries.is_empty(), total_sectors) {
        (true, None) => None,
        (_, total) => {
            let total_sectors =
                total.unwrap_or_else(|| entries.iter().map(|e| e.sectors).sum());
            Some(DiscToc {
                entries,
                total_sectors,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOC_OUTPUT: &str = "\
cdparanoia III release 10.2 (September 11, 2008)

Table of contents (audio tracks only):
track        length               begin        copy pre ch
===========================================================
  1.    16352 [03:38.02]        0 [00:00.00]    no   no  2
  2.    18225 [04:03.00]    16352 [03:38.02]    no   no  2
  3.    13660 [03:02.10]    34577 [07:41.02]    no   no  2
TOTAL   48237 [10:43.12]    (audio only)
";

    #[test]
    fn parses_tracks_and_total() {
        let toc = parse_toc(TOC_OUTPUT).unwrap();
        assert_eq!(toc.track_count(), 3);
        assert_eq!(
            toc.entries[0],
            TocEntry {
                track: 1,
                sectors: 16352,
                begin: 0
            }
        );
        assert_eq!(
            toc.entries[2],
            TocEntry {
                track: 3,
                sectors: 13660,
                begin: 34577
            }
        );
        assert_eq!(toc.total_sectors, 48237);
    }

    #[test]
    fn banner_only_output_is_not_a_toc() {
        let stderr = "cdparanoia III release 10.2\n\nUnable to open disc.\n";
        assert!(parse_toc(stderr).is_none());
        assert!(stderr_says_no_disc(stderr));
    }

    #[test]
    fn total_without_tracks_reads_as_empty_toc() {
        let toc = parse_toc("TOTAL   0 [00:00.00]    (audio only)\n").unwrap();
        assert_eq!(toc.track_count(), 0);
        assert_eq!(toc.total_sectors, 0);
    }

    #[test]
    fn missing_total_falls_back_to_sum_of_tracks() {
        let stderr = "  1.    100 [00:01.25]        0 [00:00.00]    no   no  2\n  2.    200 [00:02.50]      100 [00:01.25]    no   no  2\n";
        let toc = parse_toc(stderr).unwrap();
        assert_eq!(toc.total_sectors, 300);
    }
}
