//! Shell scripts standing in for the encoder binary.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Writes an executable `/bin/sh` script named `name` into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod script");
    path
}

/// Writes a fake `ffmpeg` that speaks the progress protocol.
///
/// Besides `-i`, it understands three test-only flags:
///
/// - `-fake_size <bytes> <path>` creates `path` with `bytes` zero bytes
/// - `-fake_copy_input <path>` copies the current input to `path`
/// - `-fake_exit <code>` sets the exit status
///
/// Every other argument is ignored. The script emits one progress snapshot
/// (2 s, 1000 bytes) and two log lines split by a carriage return.
pub fn fake_encoder(dir: &Path) -> PathBuf {
    write_script(dir, "ffmpeg", FAKE_ENCODER)
}

const FAKE_ENCODER: &str = r#"input=""
code=0
printf 'ffmpeg version fake\n' >&2
while [ $# -gt 0 ]; do
  case "$1" in
    -i) input="$2"; shift 2 ;;
    -fake_copy_input) cp "$input" "$2"; shift 2 ;;
    -fake_exit) code="$2"; shift 2 ;;
    -fake_size) head -c "$2" /dev/zero > "$3"; shift 3 ;;
    *) shift ;;
  esac
done
printf 'total_size=1000\nout_time_us=2000000\nprogress=continue\n'
printf 'frame=1 size=1kB\rframe=2 size=2kB\r\n' >&2
printf 'total_size=2000\nprogress=end\n'
exit "$code"
"#;
