use std::env;
use std::path::Path;

const WATCHED_VARIABLES: [&str; 4] = ["FFMPEG_DIR", "PKG_CONFIG_PATH", "VCPKG_ROOT", "VCPKGRS_TRIPLET"];

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // ffmpeg-sys-next finds FFmpeg through pkg-config everywhere except
    // Windows, where it needs FFMPEG_DIR or a vcpkg install.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }
    if let Some(directory) = env::var_os("FFMPEG_DIR") {
        if !Path::new(&directory).join("include").is_dir() {
            println!(
                "cargo:warning=FFMPEG_DIR={} has no include/ directory; clipcut needs the FFmpeg development headers.",
                Path::new(&directory).display(),
            );
        }
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!(
            "cargo:warning=clipcut links against FFmpeg. Set FFMPEG_DIR to an FFmpeg install with headers and libraries, or install FFmpeg through vcpkg and set VCPKG_ROOT."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = Path::new(&vcpkg_root).join("installed").join(triplet);
    if candidate.is_dir() {
        println!(
            "cargo:warning=Using vcpkg FFmpeg at {}; set FFMPEG_DIR to pin it.",
            candidate.display(),
        );
    } else {
        println!(
            "cargo:warning=No vcpkg FFmpeg found at {}.",
            candidate.display(),
        );
    }
}
