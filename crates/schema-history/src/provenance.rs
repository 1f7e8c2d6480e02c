// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Best-effort creation metadata (when, who, where).
//!
//! None of these lookups may fail generation creation: a missing user or
//! host simply leaves the field empty.

/// Creation metadata recorded with a new generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub created_at_millis: i64,
    pub user: Option<String>,
    pub host: Option<String>,
}

impl Provenance {
    /// Capture the current time, user and host.
    pub fn capture() -> Self {
        Self {
            created_at_millis: chrono::Utc::now().timestamp_millis(),
            user: current_user(),
            host: current_host(),
        }
    }

    /// Timestamp only.
    pub fn timestamp_only() -> Self {
        Self {
            created_at_millis: chrono::Utc::now().timestamp_millis(),
            user: None,
            host: None,
        }
    }
}

fn current_user() -> Option<String> {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.is_empty());
    if user.is_none() {
        log::debug!("[provenance] current user unknown");
    }
    user
}

fn current_host() -> Option<String> {
    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .or_else(|| std::env::var("HOSTNAME").ok().filter(|h| !h.is_empty()));
    if host.is_none() {
        log::debug!("[provenance] current host unknown");
    }
    host
}

mod hostname {
    pub fn get() -> std::io::Result<std::ffi::OsString> {
        #[cfg(unix)]
        {
            use std::ffi::OsString;
            use std::os::unix::ffi::OsStringExt;

            let mut buf = vec![0u8; 256];
            // SAFETY: buf is valid for writes of buf.len() bytes.
            let ret = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
            if ret == 0 {
                let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
                buf.truncate(len);
                Ok(OsString::from_vec(buf))
            } else {
                Err(std::io::Error::last_os_error())
            }
        }
        #[cfg(not(unix))]
        {
            Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "hostname lookup not supported",
            ))
        }
    }
}
