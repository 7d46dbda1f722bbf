//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;

/// Path of a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// The `sandcheck` binary with a clean configuration environment.
pub fn sandcheck(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sandcheck").unwrap();
    cmd.current_dir(config_dir)
        .env("SANDCHECK_CONFIG", config_dir.join("sandcheck-test.toml"))
        .env_remove("SANDCHECK_DISABLED_RULES")
        .env_remove("SANDCHECK_OUTPUT_FORMAT")
        .env_remove("SANDCHECK_HEADERS_WEIGHT_FOR_STRATEGY")
        .env_remove("SANDCHECK_HEADERS_CONSISTENT_OPERATION_POINTS")
        .env_remove("RUST_LOG");
    cmd
}

pub const MPD_OK: &str = r#"<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" xmlns:sand="urn:mpeg:dash:schema:sand:2016">
  <sand:Channel id="0" schemeIdUri="urn:mpeg:dash:sand:channel:websocket:2016" endpoint="ws://cdn3.example.com"/>
</MPD>"#;

pub const MPD_KO: &str = r#"<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" xmlns:sand="urn:mpeg:dash:schema:sand:2016">
  <sand:Channel id="0" schemeIdUri="urn:mpeg:dash:sand:channel:http:2016"/>
</MPD>"#;

pub const MESSAGE_OK: &str = r#"<SANDMessage xmlns="urn:mpeg:dash:schema:sandmessage:2016"><QoSInformation pl="1"/></SANDMessage>"#;

pub const MESSAGE_KO: &str = r#"<SANDMessage xmlns="urn:mpeg:dash:schema:sandmessage:2016"><Throughput/></SANDMessage>"#;
