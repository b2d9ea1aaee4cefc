//! XN extraction from compiled `.xe` binaries
//!
//! An `.xe` file embeds the XN description the program was built for in a
//! sector of type 8. The sector is read with the XMOS `xesection` tool:
//! run without a sector number it lists the sectors, run with one it dumps
//! that sector's contents.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::XnError;

/// Default name of the sector dump tool, looked up on `PATH`
pub const DEFAULT_XESECTION: &str = "xesection";

/// Sector type holding the XN document
const XN_SECTOR_TYPE: u32 = 8;

/// True if the path looks like an `.xe` binary
pub fn is_container(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xe"))
}

/// Find the XN sector number in `xesection` listing output
///
/// Listing lines look like `Sector 3: type: 8 ...`.
pub fn find_xn_sector(listing: &str) -> Option<u32> {
    listing.lines().find_map(|line| {
        let rest = line.strip_prefix("Sector ")?;
        let (number, rest) = rest.split_once(':')?;
        let sector_type = rest.trim_start().strip_prefix("type:")?.trim_start();
        let type_digits = sector_type
            .split(|c: char| !c.is_ascii_digit())
            .next()?;

        if type_digits.parse::<u32>().ok()? == XN_SECTOR_TYPE {
            number.parse().ok()
        } else {
            None
        }
    })
}

/// Cut the XML document out of a sector dump
pub fn extract_xml(dump: &str) -> Option<&str> {
    let start = dump.find('<')?;
    let end = dump.rfind('>')?;
    dump.get(start..=end)
}

/// Read the XN document embedded in an `.xe` binary using `tool`
pub fn extract_from_container(path: &Path, tool: &Path) -> Result<String, XnError> {
    let listing = run_tool(tool, &[path.as_os_str()])?;
    let sector = find_xn_sector(&listing).ok_or_else(|| {
        XnError::Container(format!("no XN sector in {}", path.display()))
    })?;
    debug!(sector, path = %path.display(), "Found XN sector");

    let sector_arg = sector.to_string();
    let dump = run_tool(tool, &[path.as_os_str(), OsStr::new(&sector_arg)])?;
    extract_xml(&dump)
        .map(str::to_string)
        .ok_or_else(|| XnError::Container(format!("sector {} holds no XML", sector)))
}

fn run_tool(tool: &Path, args: &[&OsStr]) -> Result<String, XnError> {
    let output = Command::new(tool).args(args).output()?;
    if !output.status.success() {
        return Err(XnError::Container(format!(
            "{} exited with {}: {}",
            tool.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
Sector 0: type: 1 (elf) length: 10240
Sector 1: type: 4 (goto) length: 0
Sector 2: type: 8 (xn) length: 3072
Sector 3: type: 9 (config) length: 512
";

    #[test]
    fn test_is_container() {
        assert!(is_container(Path::new("app.xe")));
        assert!(is_container(Path::new("bin/APP.XE")));
        assert!(!is_container(Path::new("board.xn")));
        assert!(!is_container(Path::new("xe")));
    }

    #[test]
    fn test_find_xn_sector() {
        assert_eq!(find_xn_sector(LISTING), Some(2));
    }

    #[test]
    fn test_find_xn_sector_exact_type() {
        let listing = "Sector 0: type: 80 (other)\nSector 4: type: 8\n";
        assert_eq!(find_xn_sector(listing), Some(4));
        assert_eq!(find_xn_sector("Sector 1: type: 1 (elf)\n"), None);
    }

    #[test]
    fn test_extract_xml() {
        let dump = "header bytes <Network xmlns=\"http://www.xmos.com\"/>\0\0\0\0\0";
        assert_eq!(
            extract_xml(dump),
            Some("<Network xmlns=\"http://www.xmos.com\"/>")
        );
        assert_eq!(extract_xml("no markup here"), None);
    }

    #[test]
    fn test_missing_tool_is_io_error() {
        let err = extract_from_container(
            Path::new("app.xe"),
            Path::new("/nonexistent/xesection-for-tests"),
        )
        .unwrap_err();
        assert!(matches!(err, XnError::Io(_)));
    }
}
