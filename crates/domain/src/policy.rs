//! Blocklist parsing, RPZ rendering and bundle versioning.
//!
//! Everything here is pure: text in, domain sets and zone files out. The
//! compile use case owns orchestration (what to fetch, where to write).

use crate::blocklist::BlocklistFormat;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// Cut a line at the first `#` or `;` comment marker.
fn strip_comment(line: &str) -> &str {
    match line.find(['#', ';']) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Normalize one domain candidate into stored form, or reject it.
///
/// Lowercases, strips `||` adblock prefixes, leading `*.`/`.` and the
/// trailing dot. Rejects URLs, bracketed IPv6 literals, paths, wildcards
/// and anything containing whitespace.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let s = strip_comment(raw).trim().to_ascii_lowercase();
    if s.is_empty() {
        return None;
    }
    let s = s.strip_prefix("||").unwrap_or(&s);
    if s.starts_with("http://") || s.starts_with("https://") {
        return None;
    }
    let s = s.trim_start_matches(['*', '.']).trim_end_matches('.');
    if s.is_empty() {
        return None;
    }
    if s.contains(char::is_whitespace)
        || s.contains('/')
        || s.contains('[')
        || s.contains('*')
    {
        return None;
    }
    Some(s.to_string())
}

/// Parse a fetched blocklist body into a normalized domain set.
///
/// Unparseable lines are skipped, never fatal; a hostile list body can at
/// worst contribute nothing.
pub fn parse_blocklist_text(text: &str, format: BlocklistFormat) -> BTreeSet<String> {
    let mut out = BTreeSet::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('!') {
            continue;
        }

        match format {
            BlocklistFormat::Hosts => {
                // 0.0.0.0 example.com
                let stripped = strip_comment(line);
                let mut parts = stripped.split_whitespace();
                let _addr = parts.next();
                if let Some(host) = parts.next() {
                    if let Some(d) = normalize_domain(host) {
                        out.insert(d);
                    }
                }
            }
            BlocklistFormat::Domains => {
                if let Some(d) = normalize_domain(line) {
                    out.insert(d);
                }
            }
            BlocklistFormat::Adblock => {
                let stripped = strip_comment(line).trim();
                let s = stripped.strip_prefix("||").unwrap_or(stripped);
                let s = s.strip_suffix('^').unwrap_or(s);
                if s.contains('$') || s.contains('/') || s.contains('[') || s.contains("://") {
                    continue;
                }
                if s.contains('*') {
                    continue;
                }
                if let Some(d) = normalize_domain(s) {
                    out.insert(d);
                }
            }
        }
    }

    out
}

fn zone_header(serial: i64, banner: &str) -> String {
    format!(
        "$TTL 300\n\
         @ IN SOA localhost. hostmaster.localhost. {serial} 3600 600 604800 300\n\
         @ IN NS localhost.\n\
         ; {banner}\n"
    )
}

/// Render the combined block zone: every domain rewritten to NXDOMAIN
/// (`CNAME .`).
pub fn render_rpz_zone(domains: &BTreeSet<String>, policy_name: &str, serial: i64) -> String {
    let mut zone = zone_header(serial, &format!("policy: {policy_name}"));
    for d in domains {
        zone.push_str(d);
        zone.push_str(". CNAME .\n");
    }
    zone
}

/// Render the whitelist zone: every domain passed through (`rpz-passthru.`).
pub fn render_rpz_whitelist(domains: &BTreeSet<String>, serial: i64) -> String {
    let mut zone = zone_header(serial, "whitelist (rpz-passthru)");
    for d in domains {
        zone.push_str(d);
        zone.push_str(". CNAME rpz-passthru.\n");
    }
    zone
}

/// Render the emergency override: a valid zone with no rules, served while
/// blocking is disabled or paused.
pub fn render_empty_zone(serial: i64) -> String {
    zone_header(serial, "BLOCKING DISABLED - emergency mode")
}

/// Full SHA-256 hex of a file body.
pub fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    hex(&digest)
}

/// 16-hex-char checksum served alongside each RPZ file in the config bundle.
pub fn checksum16(content: &str) -> String {
    let mut h = content_hash(content);
    h.truncate(16);
    h
}

/// Compute the 12-hex bundle version from per-file content hashes and
/// `domain=servers` forward-zone rules.
///
/// Inputs are sorted before hashing so the version is a deterministic
/// function of committed policy, independent of iteration order. Callers
/// must hash zone files rendered with serial 0 (the on-disk serial is
/// wall-clock and would defeat change detection).
pub fn bundle_version(file_hashes: &[String], forward_rules: &[String]) -> String {
    let mut files: Vec<&str> = file_hashes.iter().map(String::as_str).collect();
    files.sort_unstable();
    let mut rules: Vec<&str> = forward_rules.iter().map(String::as_str).collect();
    rules.sort_unstable();

    let canonical = serde_json::to_string(&(files, rules)).unwrap_or_default();
    let mut version = content_hash(&canonical);
    version.truncate(12);
    version
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
