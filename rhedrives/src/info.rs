//! Parser for the kernel cdrom info table (`/proc/sys/dev/cdrom/info`).
//!
//! The table is line-oriented: a `label:` prefix followed by one
//! tab-separated column per registered drive. The kernel lists the most
//! recently registered drive first; we reverse so callers see drives in
//! registration order.

use std::collections::HashMap;

use crate::errors::DriveError;

/// Raw per-drive capability rows, keyed by lowercased row label.
#[derive(Debug, Clone)]
pub(crate) struct InfoTable {
    /// Drive names in registration order (`sr0` before `sr1`).
    pub names: Vec<String>,
    rows: HashMap<String, Vec<String>>,
}

impl InfoTable {
    /// `true` when the capability row holds `1` for the named drive.
    pub fn capability(&self, row: &str, drive_index: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|values| values.get(drive_index))
            .map(|v| v == "1")
            .unwrap_or(false)
    }
}

pub(crate) fn parse_info_table(content: &str) -> Result<InfoTable, DriveError> {
    let mut names: Option<Vec<String>> = None;
    let mut rows = HashMap::new();

    for line in content.lines() {
        let Some((label, values)) = line.split_once(':') else {
            continue;
        };
        let label = label.trim().to_lowercase();
        let values: Vec<String> = values
            .split_whitespace()
            .map(|v| v.to_string())
            .collect();

        if label == "drive name" {
            // Newest drive first in the kernel table
            let mut ordered = values;
            ordered.reverse();
            names = Some(ordered);
        } else {
            let mut ordered = values;
            ordered.reverse();
            rows.insert(label, ordered);
        }
    }

    let names = names.ok_or_else(|| {
        DriveError::InfoFormat("missing 'drive name' row".to_string())
    })?;

    Ok(InfoTable { names, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_DRIVES: &str = "\
CD-ROM information, Id: cdrom.c 3.20 2003/12/17

drive name:\t\tsr1\tsr0
drive speed:\t\t1\t24
drive # of slots:\t1\t1
Can close tray:\t\t1\t1
Can open tray:\t\t1\t1
Can lock tray:\t\t1\t1
Can change speed:\t1\t1
Can select disk:\t0\t0
Can read multisession:\t1\t1
Can read MCN:\t\t1\t1
Reports media changed:\t1\t1
Can play audio:\t\t0\t1
Can write CD-R:\t\t1\t0
";

    #[test]
    fn parses_names_in_registration_order() {
        let table = parse_info_table(TWO_DRIVES).unwrap();
        assert_eq!(table.names, vec!["sr0", "sr1"]);
    }

    #[test]
    fn capabilities_follow_the_reversed_columns() {
        let table = parse_info_table(TWO_DRIVES).unwrap();
        // sr0 is index 0 after reversal
        assert!(table.capability("can play audio", 0));
        assert!(!table.capability("can play audio", 1));
        assert!(!table.capability("can write cd-r", 0));
        assert!(table.capability("can write cd-r", 1));
        assert!(table.capability("can close tray", 0));
    }

    #[test]
    fn unknown_rows_and_indices_read_as_false() {
        let table = parse_info_table(TWO_DRIVES).unwrap();
        assert!(!table.capability("can levitate", 0));
        assert!(!table.capability("can play audio", 7));
    }

    #[test]
    fn empty_table_is_an_error() {
        let err = parse_info_table("CD-ROM information\n").unwrap_err();
        assert!(matches!(err, DriveError::InfoFormat(_)));
    }

    #[test]
    fn single_drive_table() {
        let table =
            parse_info_table("drive name:\tsr0\nCan play audio:\t1\n").unwrap();
        assert_eq!(table.names, vec!["sr0"]);
        assert!(table.capability("can play audio", 0));
    }
}
