pub trait PlatformExtensions {
    /// Shared (file-backed) resident memory of `pid` in bytes.
    fn shared_memory(pid: u32) -> Option<u64>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod other;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(not(target_os = "linux"))]
use other as platform_impl;

pub fn shared_memory(pid: u32) -> Option<u64> {
    platform_impl::Platform::shared_memory(pid)
}
