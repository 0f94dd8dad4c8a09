use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Unsigned token for a `Proprietaire` account.
#[allow(dead_code)]
pub const OWNER_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJyb2xlIjoiUHJvcHJpZXRhaXJlIiwiZW1haWwiOiJtYXJpZUBleGFtcGxlLmNvbSIsIm5vbSI6IkN1cmllIiwicHJlbm9tIjoiTWFyaWUiLCJ1c2VyX2lkIjo3LCJleHAiOjQxMDI0NDQ4MDB9.sig";

/// Unsigned token for a `Responsable` account.
#[allow(dead_code)]
pub const MANAGER_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJyb2xlIjoiUmVzcG9uc2FibGUiLCJlbWFpbCI6InBhdWxAZXhhbXBsZS5jb20iLCJleHAiOjQxMDI0NDQ4MDB9.sig";

/// An isolated storage file for one test.
pub struct Sandbox {
    _dir: TempDir,
    storage: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let storage = dir.path().join("storage.json");
        Self { _dir: dir, storage }
    }

    pub fn storage(&self) -> &Path {
        &self.storage
    }

    /// Run the CLI against this sandbox and the given API base.
    pub fn run(&self, args: &[&str], api_url: &str) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_adopti"));
        cmd.args(args);
        cmd.env("ADOPTI_STORAGE", &self.storage);
        cmd.env("ADOPTI_API_URL", api_url);
        cmd.env("ADOPTI_SITE_URL", "http://localhost:3000");
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("RUST_LOG");
        cmd.output().expect("Failed to execute CLI")
    }

    /// Run the CLI and expect success, returning stdout.
    pub fn run_success(&self, args: &[&str], api_url: &str) -> String {
        let output = self.run(args, api_url);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Raw contents of the storage file.
    #[allow(dead_code)]
    pub fn document(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(&self.storage).expect("Failed to read storage file");
        serde_json::from_str(&raw).expect("Storage file is not JSON")
    }
}

/// API base for a mock server.
pub fn api_url(server: &wiremock::MockServer) -> String {
    format!("http://127.0.0.1:{}/api", server.address().port())
}
