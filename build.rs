fn main() {
    // Only the native shell needs the Tauri context generated.
    #[cfg(feature = "desktop")]
    tauri_build::build();
}
