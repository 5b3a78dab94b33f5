//! Build script: embeds a git hash for version strings and runs pre-flight
//! checks for GPU feature flags before whisper-rs-sys starts compiling.

use std::process::Command;

fn main() {
    // Embed git short hash for version string
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        && output.status.success()
    {
        let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=GIT_HASH={}", hash);
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");

    if cfg!(feature = "cuda") && Command::new("nvcc").arg("--version").output().is_err() {
        panic!(
            "\n`nvcc` not found. The cuda feature needs the CUDA toolkit installed.\n\
             Install from https://developer.nvidia.com/cuda-downloads or build\n\
             without CUDA: cargo build --release\n"
        );
    }
    if cfg!(feature = "vulkan")
        && Command::new("vulkaninfo")
            .arg("--summary")
            .output()
            .is_err()
    {
        panic!(
            "\n`vulkaninfo` not found. The vulkan feature needs the Vulkan SDK.\n\
             Install from https://vulkan.lunarg.com/ or build without Vulkan.\n"
        );
    }
    if cfg!(feature = "hipblas") && Command::new("rocminfo").output().is_err() {
        panic!(
            "\n`rocminfo` not found. The hipblas feature needs ROCm installed.\n\
             Install from https://rocm.docs.amd.com/ or build without HipBLAS.\n"
        );
    }
}
