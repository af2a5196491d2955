//! Parsers for the text output of OS introspection tools.
//!
//! Every parser is pure and tolerant: rows that are not listening sockets,
//! or that are too short or malformed, are skipped rather than failing the
//! whole scan. When a port appears on several rows the last row wins.

use std::collections::HashMap;

use crate::domain::{ListenerInfo, ProcessInfo};

use super::utils::Utils;

/// Parse `netstat -ano -p tcp` output (Windows).
///
/// Expected format:
/// ```text
///   Proto  Local Address          Foreign Address        State           PID
///   TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       1020
///   TCP    [::]:445               [::]:0                 LISTENING       4
/// ```
pub fn parse_windows_netstat(output: &str) -> HashMap<u16, ListenerInfo> {
    let mut listeners = HashMap::new();

    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            continue;
        }
        if !fields[0].eq_ignore_ascii_case("TCP") {
            continue;
        }
        if fields[3].to_uppercase() != "LISTENING" {
            continue;
        }

        let port = Utils::parse_port(fields[1]);
        if port == 0 {
            continue;
        }
        let pid = fields[4].parse().unwrap_or(0);

        listeners.insert(port, ListenerInfo::new(pid, fields[1]));
    }

    listeners
}

/// Parse `lsof -nP -iTCP -sTCP:LISTEN` output (macOS, most Unixes).
///
/// Expected format:
/// ```text
/// COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
/// node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
/// ```
pub fn parse_lsof(output: &str) -> HashMap<u16, ListenerInfo> {
    let mut listeners = HashMap::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("COMMAND") {
            continue;
        }
        if !line.contains("(LISTEN)") {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            continue;
        }
        let pid = fields[1].parse().unwrap_or(0);

        let Some(address) = lsof_address(line) else {
            continue;
        };
        let port = Utils::parse_port(address);
        if port == 0 {
            continue;
        }

        listeners.insert(port, ListenerInfo::new(pid, address));
    }

    listeners
}

/// The NAME token between the `TCP ` marker and ` (LISTEN)`.
fn lsof_address(line: &str) -> Option<&str> {
    let start = line.find("TCP ")?;
    let segment = &line[start + 4..];
    let segment = match segment.find(" (LISTEN)") {
        Some(end) => &segment[..end],
        None => segment,
    };
    segment.split_whitespace().last()
}

/// Parse `netstat -lntp` output (Linux net-tools).
///
/// Expected format:
/// ```text
/// Proto Recv-Q Send-Q Local Address   Foreign Address  State   PID/Program name
/// tcp        0      0 0.0.0.0:22      0.0.0.0:*        LISTEN  1000/sshd
/// tcp6       0      0 :::8080         :::*             LISTEN  2000/java
/// ```
pub fn parse_unix_netstat(output: &str) -> HashMap<u16, ListenerInfo> {
    let mut listeners = HashMap::new();

    for line in output.lines() {
        if !line.contains("LISTEN") {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            continue;
        }

        let local = fields[3];
        let port = Utils::parse_port(local);
        if port == 0 {
            continue;
        }

        // "-" when the owner is hidden from the current user.
        let last = fields[fields.len() - 1];
        let pid = match last.find('/') {
            Some(idx) if idx > 0 => last[..idx].parse().unwrap_or(0),
            _ => 0,
        };

        listeners.insert(port, ListenerInfo::new(pid, local));
    }

    listeners
}

/// Process name from `tasklist /FO CSV /NH` output.
///
/// Returns `None` for the "INFO: No tasks are running..." message and any
/// other line that is not quoted CSV.
pub fn parse_tasklist_name(output: &str) -> Option<String> {
    let line = output.lines().map(str::trim).find(|l| !l.is_empty())?;
    if !line.contains("\",\"") {
        return None;
    }
    Utils::split_csv_line(line)
        .into_iter()
        .next()
        .filter(|name| !name.is_empty())
}

/// Apply `wmic ... /FORMAT:LIST` `Key=Value` lines to a process record.
pub fn apply_wmic_list(output: &str, info: &mut ProcessInfo) {
    for line in output.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("CommandLine=") {
            info.command_line = value.to_string();
        } else if let Some(value) = line.strip_prefix("ExecutablePath=") {
            info.exe_path = value.to_string();
        }
    }
}
