use std::{
    io,
    path::{Path, PathBuf},
    pin::Pin,
    task::{Context, Poll},
};

use async_trait::async_trait;
use futures::TryStreamExt;
use log::debug;
use reqwest::Url;
use tokio::{
    fs::{create_dir_all, File, OpenOptions},
    io::{stdout, AsyncWrite, AsyncWriteExt, Stdout},
};

use crate::{
    config::OutputConfig, error::TargetError, retriever::Body, urls::file_name,
};

/// Decides where an emitted body goes.
#[async_trait]
pub trait OutputResolver {
    type Writer: AsyncWrite + Send + Unpin;

    async fn resolve(&self, output_to_file: bool, uri: &Url) -> Result<Self::Writer, TargetError>;
}

/// Either the process-wide standard output or a file opened for this emission.
#[derive(Debug)]
pub enum Destination {
    Stdout(Stdout),
    File { path: PathBuf, file: File },
}

impl Destination {
    pub fn stdout() -> Self {
        Self::Stdout(stdout())
    }

    pub fn is_stdout(&self) -> bool {
        matches!(self, Self::Stdout(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdout(_) => None,
            Self::File { path, .. } => Some(path),
        }
    }
}

impl AsyncWrite for Destination {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Stdout(stdout) => Pin::new(stdout).poll_write(cx, buf),
            Self::File { file, .. } => Pin::new(file).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Stdout(stdout) => Pin::new(stdout).poll_flush(cx),
            Self::File { file, .. } => Pin::new(file).poll_flush(cx),
        }
    }

    /// Standard output is only flushed, never shut down.
    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Stdout(stdout) => Pin::new(stdout).poll_flush(cx),
            Self::File { file, .. } => Pin::new(file).poll_shutdown(cx),
        }
    }
}

/// Standard output, or a file named after the URI's last path segment
/// inside `dir`.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    pub dir: PathBuf,
    pub overwrite: bool,
}

impl Default for FileSystemResolver {
    fn default() -> Self {
        Self::new(&OutputConfig::default())
    }
}

impl FileSystemResolver {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            overwrite: config.overwrite,
        }
    }

    /// No `index.html` or similar fallback: a URI without a file name
    /// cannot be written to a file.
    pub fn file_path(&self, uri: &Url) -> Result<PathBuf, TargetError> {
        match file_name(uri) {
            Some(name) => Ok(self.dir.join(&*name)),
            None => Err(TargetError::NoFilename { uri: uri.clone() }),
        }
    }
}

#[async_trait]
impl OutputResolver for FileSystemResolver {
    type Writer = Destination;

    async fn resolve(&self, output_to_file: bool, uri: &Url) -> Result<Destination, TargetError> {
        if !output_to_file {
            return Ok(Destination::stdout());
        }
        let path = self.file_path(uri)?;
        let file = create_file(&path, self.overwrite).await?;
        debug!("Writing {uri} to {}.", path.display());
        Ok(Destination::File { path, file })
    }
}

async fn create_parent_dirs_for(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => create_dir_all(parent).await,
        _ => Ok(()),
    }
}

/// Truncates an existing file when `overwrite`, fails with
/// [`io::ErrorKind::AlreadyExists`] otherwise.
pub async fn create_file<P>(name: P, overwrite: bool) -> io::Result<File>
where
    P: AsRef<Path>,
{
    let name = name.as_ref();
    create_parent_dirs_for(name).await?;
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    options.open(name).await
}

/// Stream `body` into `output` chunk by chunk, then flush.
///
/// `output` is flushed even when the body fails midway, so whatever was
/// written before the failure is on disk once this returns.
pub async fn copy_to_output<W>(mut body: Body, output: &mut W) -> io::Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut written = 0;
    let copied = async {
        while let Some(chunk) = body.try_next().await? {
            output.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        Ok::<_, io::Error>(())
    }
    .await;
    let flushed = output.flush().await;
    copied?;
    flushed?;
    Ok(written)
}
