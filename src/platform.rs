/// Volume capacity probe for storage snapshots.
///
/// Windows asks `GetDiskFreeSpaceExW`, Unix asks `statvfs`. Free space is
/// the amount available to the calling user, matching what a file manager
/// shows.
use catsleuth_core::providers::{DiskStat, DiskUsage};
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeStat;

impl DiskStat for VolumeStat {
    fn stat(&self, path: &Path) -> io::Result<DiskUsage> {
        volume_usage(path)
    }
}

#[cfg(windows)]
fn volume_usage(path: &Path) -> io::Result<DiskUsage> {
    use std::os::windows::ffi::OsStrExt;
    use windows::core::PCWSTR;
    use windows::Win32::Storage::FileSystem::GetDiskFreeSpaceExW;

    let wide: Vec<u16> = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    let mut free_caller: u64 = 0;
    let mut total: u64 = 0;
    unsafe {
        GetDiskFreeSpaceExW(
            PCWSTR(wide.as_ptr()),
            Some(&mut free_caller as *mut u64),
            Some(&mut total as *mut u64),
            None,
        )
    }
    .map_err(io::Error::from)?;

    Ok(DiskUsage {
        free: free_caller,
        total,
    })
}

#[cfg(unix)]
fn volume_usage(path: &Path) -> io::Result<DiskUsage> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    // SAFETY: `statvfs` is plain old data and fully written on success.
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }

    let block = stat.f_frsize as u64;
    Ok(DiskUsage {
        free: (stat.f_bavail as u64).saturating_mul(block),
        total: (stat.f_blocks as u64).saturating_mul(block),
    })
}

#[cfg(not(any(unix, windows)))]
fn volume_usage(path: &Path) -> io::Result<DiskUsage> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("no volume probe for {} on this platform", path.display()),
    ))
}
