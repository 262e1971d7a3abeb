//! VMDK descriptor parsing, for linked-clone/export operations.

/// One extent line from a VMDK descriptor: `RW <size> <type> "<filename>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extent {
    pub size_sectors: u64,
    pub extent_type: String,
    pub filename: String,
}

/// Parses a descriptor file line by line. Comments (`#`) and blank lines are
/// ignored; only extent lines contribute.
pub fn parse_extents(descriptor: &str) -> Vec<Extent> {
    descriptor
        .lines()
        .filter_map(|line| parse_extent_line(line.trim()))
        .collect()
}

fn parse_extent_line(line: &str) -> Option<Extent> {
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let mut parts = line.splitn(4, ' ');
    let access = parts.next()?;
    if access != "RW" {
        return None;
    }
    let size_sectors: u64 = parts.next()?.parse().ok()?;
    let extent_type = parts.next()?.to_string();
    let rest = parts.next()?.trim();
    let filename = rest.strip_prefix('"')?.strip_suffix('"')?.to_string();
    Some(Extent {
        size_sectors,
        extent_type,
        filename,
    })
}

/// Reconstructs a base datastore path for an extent filename: `[ds] dir/<filename>`.
pub fn base_datastore_path(datastore: &str, dir: &str, filename: &str) -> String {
    if dir.is_empty() {
        format!("[{datastore}] {filename}")
    } else {
        format!("[{datastore}] {dir}/{filename}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_extent_lines_and_skips_comments_and_blanks() {
        let descriptor = r#"
# Disk DescriptorFile
version=1
# Extent description
RW 20971520 VMFS "disk-flat.vmdk"

RW 2048 VMFSSPARSE "disk-000001-delta.vmdk"
"#;
        let extents = parse_extents(descriptor);
        assert_eq!(
            extents,
            vec![
                Extent {
                    size_sectors: 20971520,
                    extent_type: "VMFS".to_string(),
                    filename: "disk-flat.vmdk".to_string(),
                },
                Extent {
                    size_sectors: 2048,
                    extent_type: "VMFSSPARSE".to_string(),
                    filename: "disk-000001-delta.vmdk".to_string(),
                },
            ]
        );
    }

    #[test]
    fn reconstructs_base_datastore_path() {
        assert_eq!(
            base_datastore_path("ds1", "vm-folder", "disk-flat.vmdk"),
            "[ds1] vm-folder/disk-flat.vmdk"
        );
        assert_eq!(base_datastore_path("ds1", "", "disk-flat.vmdk"), "[ds1] disk-flat.vmdk");
    }
}
