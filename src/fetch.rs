//! Download zipped cases from a CKAN data portal
//!
//! [`ArchiveFetcher::fetch`] looks a package up through the CKAN action API, downloads one
//! of its resources and unpacks it. The extracted files belong to the returned
//! [`Download`], which removes them again when dropped unless [`Download::persist`] is
//! called.

use crate::prelude::*;
use crate::UnsupportedArchiveFormat;

use serde::Deserialize;
use std::fs;
use std::io::Cursor;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Display, Debug, Clone, PartialEq, Eq, Constructor)]
#[display(fmt = "resource `{resource}` of package `{package}` not found: {reason}")]
pub struct ResourceNotFound {
    pub package: String,
    pub resource: String,
    pub reason: String,
}

impl std::error::Error for ResourceNotFound {}

#[derive(Debug, Deserialize)]
struct ActionResponse {
    success: bool,
    result: Option<Package>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Package {
    name: String,
    id: String,
    organization: Option<Organization>,
    #[serde(default)]
    resources: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
struct Organization {
    name: String,
    id: String,
}

#[derive(Debug, Deserialize)]
struct Resource {
    #[serde(default)]
    name: Option<String>,
    url: String,
}

/// Fetches resources of one organization from a CKAN portal
#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
    base_url: String,
    organization: String,
    target_dir: Option<PathBuf>,
    timeout: Duration,
}

impl ArchiveFetcher {
    /// `base_url` is the root of the portal, for example `https://ckan.example.org`.
    /// `organization` is matched against the name or id of a package's owner.
    pub fn new(base_url: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            organization: organization.into(),
            target_dir: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Extract into `dir` instead of the working directory.
    pub fn with_target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target_dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn package_show_url(&self) -> String {
        format!(
            "{}/api/3/action/package_show",
            self.base_url.trim_end_matches('/')
        )
    }

    /// Download `resource` of `package_id` and extract it.
    ///
    /// `resource` is matched against the resource names and the file names of the
    /// resource urls. The payload has to be a zip archive.
    pub fn fetch(&self, package_id: &str, resource: &str) -> Result<Download, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        tracing::debug!(package = package_id, url = %self.package_show_url(), "looking up package");

        let response: ActionResponse = client
            .get(self.package_show_url())
            .query(&[("id", package_id)])
            .send()?
            .error_for_status()?
            .json()?;

        let url = resource_url(response, &self.organization, package_id, resource)?;

        tracing::info!(%url, "downloading resource");
        let bytes = client.get(&url).send()?.error_for_status()?.bytes()?;

        let dir = match &self.target_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        extract_archive(&bytes, &dir)
    }
}

fn resource_url(
    response: ActionResponse,
    organization: &str,
    package_id: &str,
    resource: &str,
) -> Result<String, ResourceNotFound> {
    let not_found =
        |reason: String| ResourceNotFound::new(package_id.into(), resource.into(), reason);

    let package = match response.result {
        Some(package) if response.success => package,
        _ => {
            let reason = response
                .error
                .map(|error| error.to_string())
                .unwrap_or_else(|| "the portal reported a failure".into());
            return Err(not_found(reason));
        }
    };

    let owner = package.organization.as_ref();
    if !owner.map_or(false, |org| org.name == organization || org.id == organization) {
        let reason = format!(
            "package `{}` ({}) is not owned by organization `{organization}`",
            package.name, package.id
        );
        return Err(not_found(reason));
    }

    package
        .resources
        .into_iter()
        .find(|candidate| {
            candidate.name.as_deref() == Some(resource) || url_file_name(&candidate.url) == resource
        })
        .map(|candidate| candidate.url)
        .ok_or_else(|| not_found("no resource with that name".into()))
}

fn url_file_name(url: &str) -> &str {
    let path = url.split(&['?', '#'][..]).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

/// Extract a zip archive held in memory into `dir`.
///
/// Entries whose names would escape `dir` are skipped. An entry whose file already exists
/// fails the extraction with an [`AlreadyExists`](std::io::ErrorKind::AlreadyExists) io
/// error, and the files extracted up to that point are removed again. The returned
/// [`Download`] points at the first entry of the archive.
pub fn extract_archive(bytes: &[u8], dir: &Path) -> Result<Download, Error> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| UnsupportedArchiveFormat::new(e.to_string()))?;

    let mut download = Download {
        path: PathBuf::new(),
        files: Vec::new(),
        dirs: Vec::new(),
        persist: false,
    };

    let mut first = None;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;

        let output_path = match entry.enclosed_name() {
            Some(name) => dir.join(name),
            None => {
                tracing::warn!(entry = entry.name(), "skipping archive entry outside of target");
                continue;
            }
        };

        if first.is_none() {
            first = Some(output_path.clone());
        }

        if entry.is_dir() {
            download.create_dirs(&output_path)?;
        } else {
            if let Some(parent) = output_path.parent() {
                download.create_dirs(parent)?;
            }
            // existing files are never overwritten, so the guard only removes what it created
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&output_path)
                .map_err(|e| {
                    if e.kind() == std::io::ErrorKind::AlreadyExists {
                        tracing::warn!(path = %output_path.display(), "archive entry already exists");
                    }
                    e
                })?;
            download.files.push(output_path);
            std::io::copy(&mut entry, &mut file)?;
        }
    }

    download.path = first.ok_or_else(|| UnsupportedArchiveFormat::new("archive is empty".into()))?;

    tracing::info!(
        path = %download.path.display(),
        files = download.files.len(),
        "extracted archive"
    );

    Ok(download)
}

/// Files extracted from an archive, removed again when dropped
#[derive(Debug)]
pub struct Download {
    path: PathBuf,
    files: Vec<PathBuf>,
    /// directories created during extraction, parents first
    dirs: Vec<PathBuf>,
    persist: bool,
}

impl Download {
    /// path of the first entry of the archive
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// every file that was extracted and not deleted yet
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Remove the extracted files and the directories extraction created.
    ///
    /// Calling this again, or after the files were removed by someone else, does nothing.
    pub fn delete(&mut self) -> Result<(), Error> {
        for file in self.files.drain(..) {
            match fs::remove_file(&file) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
                _ => tracing::trace!(path = %file.display(), "removed"),
            }
        }

        for dir in self.dirs.drain(..).rev() {
            // directories that gained foreign files are left alone
            if let Err(e) = fs::remove_dir(&dir) {
                tracing::debug!(path = %dir.display(), error = %e, "keeping directory");
            }
        }

        Ok(())
    }

    /// Keep the files on disk after the guard is dropped and return the path of the
    /// first entry.
    pub fn persist(mut self) -> PathBuf {
        self.persist = true;
        std::mem::take(&mut self.path)
    }

    fn create_dirs(&mut self, path: &Path) -> Result<(), Error> {
        let missing: Vec<&Path> = path.ancestors().take_while(|p| !p.exists()).collect();

        for dir in missing.into_iter().rev() {
            fs::create_dir(dir)?;
            self.dirs.push(dir.to_path_buf());
        }

        Ok(())
    }
}

impl Drop for Download {
    fn drop(&mut self) {
        if self.persist {
            return;
        }

        if let Err(e) = self.delete() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to clean up download");
        }
    }
}
