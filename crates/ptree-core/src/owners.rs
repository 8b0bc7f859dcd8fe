//! Owner-name resolution.
//!
//! The tree only ever needs two questions answered: what is the login name
//! for a uid (uid transitions, `-u`), and what uid does a login name map to
//! (`--user`). [`SystemUsers`] asks the passwd database; [`StaticUsers`] is
//! a fixed table for tests and recorded snapshots.

use ptree_common::{Error, OwnerId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use tracing::trace;

/// Lookup of login names by uid and back.
pub trait OwnerDirectory {
    /// Login name for `uid`, or `None` when the database has no entry.
    fn name_of(&self, uid: OwnerId) -> Option<String>;

    /// Uid for `name`. `Ok(None)` means the user does not exist; `Err` means
    /// the database itself could not be consulted.
    fn uid_of(&self, name: &str) -> Result<Option<OwnerId>, Error>;
}

/// The host's passwd database, with uid lookups memoized for the run.
#[derive(Debug, Default)]
pub struct SystemUsers {
    names: RefCell<HashMap<OwnerId, Option<String>>>,
}

impl SystemUsers {
    pub fn new() -> Self {
        Self::default()
    }
}

const INITIAL_BUFFER: usize = 1024;
const MAX_BUFFER: usize = 1 << 20;

impl OwnerDirectory for SystemUsers {
    fn name_of(&self, uid: OwnerId) -> Option<String> {
        if let Some(cached) = self.names.borrow().get(&uid) {
            return cached.clone();
        }
        let name = lookup_by_uid(uid);
        trace!(%uid, name = ?name, "resolved owner");
        self.names.borrow_mut().insert(uid, name.clone());
        name
    }

    fn uid_of(&self, name: &str) -> Result<Option<OwnerId>, Error> {
        let Ok(c_name) = CString::new(name) else {
            return Ok(None);
        };
        let mut buffer = vec![0 as libc::c_char; INITIAL_BUFFER];
        loop {
            // SAFETY: all pointers reference live locals; getpwnam_r writes
            // strings only into `buffer` and reports its length limit.
            let mut entry: libc::passwd = unsafe { std::mem::zeroed() };
            let mut found: *mut libc::passwd = std::ptr::null_mut();
            let rc = unsafe {
                libc::getpwnam_r(
                    c_name.as_ptr(),
                    &mut entry,
                    buffer.as_mut_ptr(),
                    buffer.len(),
                    &mut found,
                )
            };
            match rc {
                0 if found.is_null() => return Ok(None),
                0 => return Ok(Some(OwnerId(entry.pw_uid))),
                libc::ERANGE if buffer.len() < MAX_BUFFER => {
                    buffer.resize(buffer.len() * 2, 0);
                }
                // Some libcs report "no such user" through these.
                libc::ENOENT | libc::ESRCH | libc::EBADF | libc::EPERM => return Ok(None),
                code => {
                    return Err(Error::UserLookup(
                        std::io::Error::from_raw_os_error(code).to_string(),
                    ))
                }
            }
        }
    }
}

fn lookup_by_uid(uid: OwnerId) -> Option<String> {
    let mut buffer = vec![0 as libc::c_char; INITIAL_BUFFER];
    loop {
        // SAFETY: as in `uid_of`; pw_name points into `buffer` on success.
        let mut entry: libc::passwd = unsafe { std::mem::zeroed() };
        let mut found: *mut libc::passwd = std::ptr::null_mut();
        let rc = unsafe {
            libc::getpwuid_r(
                uid.0,
                &mut entry,
                buffer.as_mut_ptr(),
                buffer.len(),
                &mut found,
            )
        };
        if rc == libc::ERANGE && buffer.len() < MAX_BUFFER {
            buffer.resize(buffer.len() * 2, 0);
            continue;
        }
        if rc != 0 || found.is_null() || entry.pw_name.is_null() {
            return None;
        }
        let name = unsafe { CStr::from_ptr(entry.pw_name) };
        return Some(name.to_string_lossy().into_owned());
    }
}

/// A fixed uid/name table.
#[derive(Debug, Clone, Default)]
pub struct StaticUsers {
    users: Vec<(OwnerId, String)>,
}

impl StaticUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, uid: u32, name: impl Into<String>) -> Self {
        self.users.push((OwnerId(uid), name.into()));
        self
    }
}

impl OwnerDirectory for StaticUsers {
    fn name_of(&self, uid: OwnerId) -> Option<String> {
        self.users
            .iter()
            .find(|(id, _)| *id == uid)
            .map(|(_, name)| name.clone())
    }

    fn uid_of(&self, name: &str) -> Result<Option<OwnerId>, Error> {
        Ok(self
            .users
            .iter()
            .find(|(_, n)| n == name)
            .map(|(id, _)| *id))
    }
}
