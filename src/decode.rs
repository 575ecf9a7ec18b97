//! Image decoding off the interaction thread.
//!
//! Requests decode on worker threads; the scene is only touched when completions
//! are drained back on the interaction thread, so an object does not exist until
//! its pixels do.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::editor::scene::{create_image, RasterHandle, Scene};
use crate::geometry::{CanvasPoint, ClipShape};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("image has no pixels")]
    Empty,
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

pub fn decode_raster(bytes: &[u8]) -> DecodeResult<RasterHandle> {
    let pixels = image::load_from_memory(bytes)?.to_rgba8();
    if pixels.width() == 0 || pixels.height() == 0 {
        return Err(DecodeError::Empty);
    }
    Ok(RasterHandle::new(pixels))
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodeSource {
    Bytes(Vec<u8>),
    File(PathBuf),
}

impl DecodeSource {
    fn decode(self) -> DecodeResult<RasterHandle> {
        match self {
            Self::Bytes(bytes) => decode_raster(&bytes),
            Self::File(path) => {
                let bytes = std::fs::read(&path).map_err(|source| DecodeError::Read {
                    path: path.clone(),
                    source,
                })?;
                decode_raster(&bytes)
            }
        }
    }
}

/// Where a decoded raster lands in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodeTarget {
    Background,
    Image { at: CanvasPoint, shape: ClipShape },
    Avatar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeApplied {
    Background,
    ImageAdded(usize),
    Avatar,
    Failed { request: u64 },
}

struct DecodeCompletion {
    request: u64,
    target: DecodeTarget,
    result: DecodeResult<RasterHandle>,
}

pub struct DecodeQueue {
    sender: mpsc::Sender<DecodeCompletion>,
    receiver: mpsc::Receiver<DecodeCompletion>,
    next_request: u64,
    pending: usize,
}

impl DecodeQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            next_request: 1,
            pending: 0,
        }
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn request(&mut self, source: DecodeSource, target: DecodeTarget) -> u64 {
        let request = self.next_request;
        self.next_request += 1;
        self.pending += 1;

        let sender = self.sender.clone();
        std::thread::spawn(move || {
            let result = source.decode();
            let _ = sender.send(DecodeCompletion {
                request,
                target,
                result,
            });
        });
        tracing::debug!(request, ?target, "image decode requested");
        request
    }

    /// Applies every completion that has already arrived, without blocking.
    pub fn drain(&mut self, scene: &mut Scene) -> Vec<DecodeApplied> {
        let mut applied = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(completion) => applied.push(self.apply(scene, completion)),
                Err(mpsc::TryRecvError::Empty | mpsc::TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Blocks until every pending decode has completed or the timeout elapses.
    pub fn wait_all(&mut self, scene: &mut Scene, timeout: Duration) -> Vec<DecodeApplied> {
        let deadline = Instant::now() + timeout;
        let mut applied = Vec::new();
        while self.pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(completion) => applied.push(self.apply(scene, completion)),
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    tracing::warn!(pending = self.pending, "timed out waiting for image decodes");
                    break;
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        applied
    }

    fn apply(&mut self, scene: &mut Scene, completion: DecodeCompletion) -> DecodeApplied {
        self.pending = self.pending.saturating_sub(1);
        let DecodeCompletion {
            request,
            target,
            result,
        } = completion;

        let raster = match result {
            Ok(raster) => raster,
            Err(err) => {
                tracing::warn!(request, ?target, %err, "image decode failed; scene unchanged");
                return DecodeApplied::Failed { request };
            }
        };

        match target {
            DecodeTarget::Background => {
                scene.set_background_image(Some(raster));
                DecodeApplied::Background
            }
            DecodeTarget::Image { at, shape } => {
                let index = scene.push(create_image(raster, at).with_shape(shape));
                DecodeApplied::ImageAdded(index)
            }
            DecodeTarget::Avatar => {
                scene.set_avatar_raster(raster);
                DecodeApplied::Avatar
            }
        }
    }
}

impl Default for DecodeQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DecodeQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeQueue")
            .field("next_request", &self.next_request)
            .field("pending", &self.pending)
            .finish()
    }
}
