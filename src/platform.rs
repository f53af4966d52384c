//! Host platform tag for naming the aggregate archive

/// Host platform tag, `<os>-<arch>`
///
/// The aggregate archive is keyed by this tag, so archives built on
/// different hosts never collide.
pub fn host_tag() -> String {
    format!("{}-{}", os_name(), arch_name())
}

fn os_name() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else {
        "linux"
    }
}

fn arch_name() -> &'static str {
    if cfg!(target_arch = "aarch64") {
        "arm64"
    } else {
        "x86_64"
    }
}
