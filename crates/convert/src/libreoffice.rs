//! PDF conversion through a headless LibreOffice.
//!
//! Each call stages the input into a fresh temporary workspace, runs
//! `soffice --headless --convert-to pdf` against it with an isolated user
//! profile, and moves the result to the requested destination. The
//! workspace, profile included, is removed when the call returns, whether
//! it succeeded or not, so concurrent or repeated runs never see each
//! other's files.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use log::debug;
use tempfile::TempDir;
use wait_timeout::ChildExt;

use crate::{ConvertError, Converter};

const STAGED_INPUT: &str = "certificate.pptx";
const STAGED_OUTPUT: &str = "certificate.pdf";

/// LibreOffice usually converts a single slide in a few seconds; a minute
/// covers cold starts on slow machines.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[cfg(target_os = "windows")]
const CANDIDATES: &[&str] = &[
    "C:\\Program Files\\LibreOffice\\program\\soffice.exe",
    "C:\\Program Files (x86)\\LibreOffice\\program\\soffice.exe",
    "soffice",
];

#[cfg(target_os = "macos")]
const CANDIDATES: &[&str] = &[
    "/Applications/LibreOffice.app/Contents/MacOS/soffice",
    "soffice",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const CANDIDATES: &[&str] = &[
    "/usr/bin/soffice",
    "/usr/local/bin/soffice",
    "/opt/libreoffice/program/soffice",
    "/usr/bin/libreoffice",
    "soffice",
];

/// Converts presentations to PDF by driving a LibreOffice install.
#[derive(Debug)]
pub struct LibreOfficeConverter {
    binary: Option<PathBuf>,
    timeout: Duration,
}

impl LibreOfficeConverter {
    /// Probes the usual install locations and the PATH.
    pub fn new() -> Self {
        Self {
            binary: discover(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            binary: discover(),
            timeout,
        }
    }

    /// Uses an explicit binary instead of probing. Intended for nonstandard
    /// installs and for tests.
    pub fn with_binary(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: Some(binary.into()),
            timeout,
        }
    }

    /// The binary that will be invoked, if one was found.
    pub fn binary(&self) -> Option<&Path> {
        self.binary.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.binary.is_some()
    }
}

impl Default for LibreOfficeConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for LibreOfficeConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        let binary = self.binary.as_deref().ok_or(ConvertError::RendererNotFound)?;
        let started = Instant::now();

        let workspace = TempDir::new()?;
        let staged = workspace.path().join(STAGED_INPUT);
        fs::copy(input, &staged)?;

        let profile = profile_url(&workspace.path().join("profile"));
        let mut child = Command::new(binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(workspace.path())
            .arg(format!("-env:UserInstallation={profile}"))
            .arg(&staged)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    ConvertError::RendererNotFound
                } else {
                    ConvertError::Io(e)
                }
            })?;

        // soffice prints at most a few lines, far below the pipe buffer, so
        // the streams can be drained after the wait.
        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                child.kill().ok();
                child.wait().ok();
                return Err(ConvertError::Timeout(self.timeout));
            }
        };

        let stdout = read_stream(child.stdout.take());
        let stderr = read_stream(child.stderr.take());

        if !status.success() {
            return Err(ConvertError::Failed {
                status,
                stdout,
                stderr,
            });
        }

        let produced = workspace.path().join(STAGED_OUTPUT);
        if !produced.is_file() {
            return Err(ConvertError::MissingOutput { stdout, stderr });
        }

        replace_file(&produced, output)?;
        debug!(
            "[CONVERT] {} -> {} in {:.2?}",
            input.display(),
            output.display(),
            started.elapsed()
        );
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn name(&self) -> &'static str {
        "LibreOfficeConverter"
    }
}

fn discover() -> Option<PathBuf> {
    for candidate in CANDIDATES {
        let path = Path::new(candidate);
        if path.is_absolute() {
            if path.is_file() {
                return Some(path.to_path_buf());
            }
        } else if let Some(found) = search_path(candidate) {
            return Some(found);
        }
    }
    None
}

fn search_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(format!("{name}{}", std::env::consts::EXE_SUFFIX));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// LibreOffice expects the profile as a file URL; forward slashes are
/// accepted on every OS.
fn profile_url(path: &Path) -> String {
    let text = path.display().to_string().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{text}")
    } else {
        format!("file:///{text}")
    }
}

fn read_stream<R: Read>(stream: Option<R>) -> String {
    let mut buf = String::new();
    if let Some(mut stream) = stream {
        stream.read_to_string(&mut buf).ok();
    }
    buf.trim().to_string()
}

/// Moves `from` onto `to`, replacing any existing file. The plain rename is
/// tried first; when the OS refuses it (existing target on Windows, or a
/// workspace on another filesystem) the target is removed and the file
/// copied in.
fn replace_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    match fs::remove_file(to) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    if fs::rename(from, to).is_err() {
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(())
}
