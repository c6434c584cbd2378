use super::PlatformExtensions;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn shared_memory(pid: u32) -> Option<u64> {
        // /proc/{pid}/statm: size resident shared text lib data dt (in pages)
        let path = format!("/proc/{pid}/statm");
        let contents = std::fs::read_to_string(path).ok()?;
        let pages = parse_statm_shared(&contents)?;
        Some(pages.saturating_mul(page_size()))
    }
}

fn parse_statm_shared(contents: &str) -> Option<u64> {
    contents.split_whitespace().nth(2)?.parse().ok()
}

fn page_size() -> u64 {
    // SAFETY: sysconf has no preconditions and only reads a system constant.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 { size as u64 } else { 4096 }
}
