//! Bridge harness and fake downloader scripts

use std::path::PathBuf;
use tempfile::TempDir;
use tokio::io::DuplexStream;
use tokio::task::JoinHandle;
use ytdlp_bridge::{Bridge, Config, Result, ToolConfig};

/// A shell script standing in for the yt-dlp executable
pub struct FakeTool {
    /// Keeps the script directory alive for the test's duration
    _dir: TempDir,
    /// Path of the executable script
    pub path: PathBuf,
}

/// Write an executable `#!/bin/sh` script that plays the downloader's part.
#[cfg(unix)]
pub fn fake_tool(body: &str) -> FakeTool {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("create script dir");
    let path = dir.path().join("yt-dlp");
    let mut file = std::fs::File::create(&path).expect("create script");
    writeln!(file, "#!/bin/sh\n{body}").expect("write script");
    let mut perms = file.metadata().expect("script metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("mark executable");
    FakeTool { _dir: dir, path }
}

/// Config pinned to an explicit tool path, with short probe timeouts
pub fn config_with_tool(path: PathBuf) -> Config {
    Config {
        tool: ToolConfig {
            ytdlp_path: Some(path),
            probe_timeout_secs: 5,
            formats_timeout_secs: 5,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Config whose candidate list resolves to nothing
pub fn config_without_tool() -> Config {
    Config {
        tool: ToolConfig {
            candidates: vec!["nonexistent-downloader-binary-xyz".to_string()],
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A bridge wired over in-memory pipes, running on its own task
pub struct BridgeHarness {
    /// Client end of the request channel (the bridge's stdin)
    pub requests: DuplexStream,
    /// Client end of the event channel (the bridge's stdout)
    pub events: DuplexStream,
    /// The running loop; resolves when the bridge terminates
    pub handle: JoinHandle<Result<()>>,
}

/// Boot a bridge over duplex pipes. Must be called inside a tokio runtime.
pub fn boot(config: Config) -> BridgeHarness {
    let (requests, bridge_in) = tokio::io::duplex(256 * 1024);
    let (bridge_out, events) = tokio::io::duplex(256 * 1024);
    let bridge = Bridge::new(config, bridge_out);
    let handle = tokio::spawn(async move { bridge.run(bridge_in).await });
    BridgeHarness {
        requests,
        events,
        handle,
    }
}
