use std::ffi::{CStr, OsStr};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Returns the calling user's home directory from the password database.
///
/// `$HOME` is not consulted.
///
/// # Errors
/// [Error::NoHomeDir] if the user has no password entry, [Error::Io] if the
/// lookup itself fails.
pub fn home_dir() -> Result<PathBuf> {
    let uid = unsafe { libc::getuid() };
    let mut buf_len: usize = 1024;

    loop {
        let mut buf = vec![0 as libc::c_char; buf_len];
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut found: *mut libc::passwd = std::ptr::null_mut();

        let rc = unsafe { libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut found) };
        if rc == libc::ERANGE {
            buf_len = buf_len.saturating_mul(2);
            continue;
        }
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc).into());
        }
        if found.is_null() || pwd.pw_dir.is_null() {
            return Err(Error::NoHomeDir(uid));
        }

        // pw_dir points into `buf`, which is still alive here.
        let dir = unsafe { CStr::from_ptr(pwd.pw_dir) };
        return Ok(PathBuf::from(OsStr::from_bytes(dir.to_bytes())));
    }
}
