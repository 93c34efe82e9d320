use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use cubeview_common::generate_id;

use crate::{AssetError, TextureImage};

type LoadResult = Result<TextureImage, AssetError>;

/// Starts texture loads off the calling thread.
#[derive(Debug, Default)]
pub struct TextureLoader;

impl TextureLoader {
    pub fn new() -> Self {
        Self
    }

    /// Begin loading `path` and return immediately.
    ///
    /// The image is read and decoded on a worker thread; the returned handle
    /// completes exactly once.
    pub fn load(&self, path: impl AsRef<Path>, id: Option<String>) -> PendingTexture {
        let path = path.as_ref().to_path_buf();
        let id = id.unwrap_or_else(generate_id);
        let (tx, rx) = mpsc::channel();

        let worker_path = path.clone();
        let worker_id = id.clone();
        let spawned = thread::Builder::new()
            .name(format!("texture-loader-{id}"))
            .spawn(move || {
                let result = read_and_decode(&worker_id, &worker_path);
                match &result {
                    Ok(img) => tracing::debug!(
                        id = %worker_id,
                        width = img.width,
                        height = img.height,
                        "texture decoded"
                    ),
                    Err(e) => tracing::warn!(id = %worker_id, "texture load failed: {e}"),
                }
                // The receiver may already be gone if the caller gave up.
                let _ = tx.send(result);
            });

        let rx = match spawned {
            Ok(_) => rx,
            Err(e) => {
                let (tx, rx) = mpsc::channel();
                let _ = tx.send(Err(AssetError::Io(e)));
                rx
            }
        };

        tracing::info!(id = %id, path = %path.display(), "texture load started");
        PendingTexture {
            id,
            path: Some(path),
            rx,
        }
    }
}

fn read_and_decode(id: &str, path: &Path) -> LoadResult {
    let bytes = std::fs::read(path)?;
    TextureImage::decode(id, &bytes)
}

/// Completion handle for a texture load.
#[derive(Debug)]
pub struct PendingTexture {
    id: String,
    path: Option<PathBuf>,
    rx: Receiver<LoadResult>,
}

impl PendingTexture {
    /// A handle that is already complete with the given image.
    pub fn ready(image: TextureImage) -> Self {
        let (tx, rx) = mpsc::channel();
        let id = image.id.clone();
        let _ = tx.send(Ok(image));
        Self { id, path: None, rx }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Source file, if this handle came from disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Non-blocking poll. `None` while the worker is still decoding.
    ///
    /// Once a result has been returned the handle is spent and later polls
    /// report [`AssetError::LoaderGone`].
    pub fn try_take(&mut self) -> Option<LoadResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(AssetError::LoaderGone(self.id.clone()))),
        }
    }

    /// Block until the load completes.
    pub fn wait(self) -> LoadResult {
        self.rx
            .recv()
            .unwrap_or_else(|_| Err(AssetError::LoaderGone(self.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(3, 2, image::Rgba([200, 10, 20, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn ready_handle_completes_immediately() {
        let mut pending = PendingTexture::ready(TextureImage::checkerboard("c", 8, 2));
        assert_eq!(pending.id(), "c");
        assert!(pending.path().is_none());
        let img = pending.try_take().unwrap().unwrap();
        assert_eq!(img.width, 8);
        // Spent after the first take.
        assert!(matches!(
            pending.try_take(),
            Some(Err(AssetError::LoaderGone(_)))
        ));
    }

    #[test]
    fn load_decodes_png_on_worker() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "texture.png");

        let pending = TextureLoader::new().load(&path, Some("crate".into()));
        assert_eq!(pending.id(), "crate");
        assert_eq!(pending.path(), Some(path.as_path()));

        let img = pending.wait().unwrap();
        assert_eq!(img.id, "crate");
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(&img.rgba[..4], &[200, 10, 20, 255]);
        assert_eq!(img.rgba.len(), 3 * 2 * 4);
    }

    #[test]
    fn load_generates_id_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "t.png");
        let pending = TextureLoader::new().load(&path, None);
        assert!(pending.id().starts_with("id-"));
        assert!(pending.wait().is_ok());
    }

    #[test]
    fn missing_file_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let pending = TextureLoader::new().load(dir.path().join("nope.png"), None);
        assert!(matches!(pending.wait(), Err(AssetError::Io(_))));
    }

    #[test]
    fn try_take_eventually_completes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "poll.png");
        let mut pending = TextureLoader::new().load(&path, None);
        let result = loop {
            if let Some(r) = pending.try_take() {
                break r;
            }
            thread::yield_now();
        };
        assert!(result.is_ok());
    }

    fn pending_from(rx: Receiver<LoadResult>) -> PendingTexture {
        PendingTexture {
            id: "t".into(),
            path: None,
            rx,
        }
    }

    #[test]
    fn try_take_is_none_until_sent() {
        let (tx, rx) = mpsc::channel();
        let mut pending = pending_from(rx);
        assert!(pending.try_take().is_none());
        assert!(pending.try_take().is_none());

        tx.send(Ok(TextureImage::checkerboard("t", 4, 2))).unwrap();
        let image = pending.try_take().unwrap().unwrap();
        assert_eq!((image.width, image.height), (4, 4));
    }

    #[test]
    fn dropped_sender_reports_loader_gone() {
        let (tx, rx) = mpsc::channel::<LoadResult>();
        let mut pending = pending_from(rx);
        assert!(pending.try_take().is_none());
        drop(tx);
        match pending.try_take() {
            Some(Err(AssetError::LoaderGone(id))) => assert_eq!(id, "t"),
            other => panic!("expected LoaderGone, got {other:?}"),
        }

        let (tx, rx) = mpsc::channel::<LoadResult>();
        drop(tx);
        assert!(matches!(
            pending_from(rx).wait(),
            Err(AssetError::LoaderGone(_))
        ));
    }
}
