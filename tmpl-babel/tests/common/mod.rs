//! Shared helpers for integration tests.

use std::fs;
use std::path::PathBuf;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn read_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

/// Write an executable shell script that mimics `chrome --print-to-pdf=<path>`.
///
/// The rendered HTML handed to the browser is copied next to the script as
/// `last-input.html` so tests can inspect what would have been printed.
#[cfg(unix)]
pub fn write_stub_chrome() -> (tempfile::TempDir, PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let script_path = dir.path().join("fake-chrome.sh");
    let script = format!(
        r#"#!/bin/sh
OUTPUT=""
INPUT=""
for arg in "$@"; do
  case $arg in
    --print-to-pdf=*)
      OUTPUT="${{arg#*=}}"
      ;;
    file://*)
      INPUT="${{arg#file://}}"
      ;;
  esac
done
if [ -z "$OUTPUT" ]; then
  echo "missing output" >&2
  exit 1
fi
cp "$INPUT" "{dir}/last-input.html"
printf '%%PDF-1.7\n%%%%EOF\n' > "$OUTPUT"
exit 0
"#,
        dir = dir.path().display()
    );
    fs::write(&script_path, script).unwrap();
    let mut perms = fs::metadata(&script_path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script_path, perms).unwrap();
    (dir, script_path)
}
