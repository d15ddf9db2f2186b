use std::env;
use std::path::PathBuf;

const WATCHED_VARIABLES: [&str; 4] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"];

fn warn(message: &str) {
    println!("cargo:warning={message}");
}

/// FFmpeg install inside a vcpkg tree, if `VCPKG_ROOT` is set.
fn vcpkg_ffmpeg_dir() -> Option<PathBuf> {
    let root = env::var_os("VCPKG_ROOT")?;
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    Some(PathBuf::from(root).join("installed").join(triplet))
}

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // ffmpeg-sys-next finds FFmpeg through pkg-config everywhere but Windows.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") || env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    match vcpkg_ffmpeg_dir() {
        None => warn(
            "FFMPEG_DIR is not set. On Windows, install FFmpeg via vcpkg and point FFMPEG_DIR at it so seekframe can link.",
        ),
        Some(dir) if dir.exists() => {
            warn(&format!(
                "Found vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to make discovery explicit.",
                dir.display(),
            ));
            if env::var_os("VCPKGRS_DYNAMIC").is_none() {
                warn("Set VCPKGRS_DYNAMIC=1 when linking against a dynamic vcpkg FFmpeg build.");
            }
        }
        Some(dir) => warn(&format!(
            "VCPKG_ROOT is set but {} does not contain an FFmpeg install.",
            dir.display(),
        )),
    }
}
