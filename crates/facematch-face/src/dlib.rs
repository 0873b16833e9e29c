//! dlib-backed [`FaceEncoder`].
//!
//! Uses the HOG face detector, the 68-point landmark predictor and the
//! ResNet face encoder, which emits 128-dimensional encodings. The two model
//! files are located through `DLIB_LANDMARK_MODEL` and `DLIB_ENCODER_MODEL`.
//!
//! Each worker thread owns its own copy of the native models and pulls jobs
//! from a shared queue, so up to `workers` encodes run at once. Callers
//! block on the reply channel. `DLIB_WORKERS` sets the pool size; it
//! defaults to the available parallelism.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use parking_lot::Mutex;

use dlib_face_recognition::{
    FaceDetector, FaceDetectorTrait, FaceEncoderNetwork, FaceEncoderTrait, ImageMatrix,
    LandmarkPredictor, LandmarkPredictorTrait,
};
use facematch_core::FaceEncoding;
use image::RgbImage;

use crate::encoder::FaceEncoder;
use crate::error::FaceError;

/// Environment variable holding the landmark predictor model path.
pub const LANDMARK_ENV: &str = "DLIB_LANDMARK_MODEL";
/// Environment variable holding the face encoder network model path.
pub const ENCODER_ENV: &str = "DLIB_ENCODER_MODEL";

/// Errors raised while loading the dlib models.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("{kind} model path not set; export {env}")]
    MissingPath {
        kind: &'static str,
        env: &'static str,
    },
    #[error("failed to load model {}: {message}", path.display())]
    Load { path: PathBuf, message: String },
    #[error("failed to start the encoder thread: {0}")]
    Worker(String),
    #[error("invalid DLIB_WORKERS value {0:?}; expected a positive integer")]
    InvalidWorkers(String),
}

/// Filesystem locations of the two dlib models.
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub landmark: PathBuf,
    pub encoder: PathBuf,
}

impl ModelPaths {
    /// Read both model paths from the environment.
    pub fn from_env() -> Result<Self, ModelLoadError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read both model paths through `lookup`. Empty values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ModelLoadError> {
        let get = |env: &'static str, kind: &'static str| {
            lookup(env)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .ok_or(ModelLoadError::MissingPath { kind, env })
        };
        Ok(Self {
            landmark: get(LANDMARK_ENV, "landmark predictor")?,
            encoder: get(ENCODER_ENV, "face encoder network")?,
        })
    }
}

/// Number of encoder threads: `DLIB_WORKERS` through `lookup`, else the
/// available parallelism, else one.
pub fn worker_count(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<NonZeroUsize, ModelLoadError> {
    match lookup(WORKERS_ENV).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<NonZeroUsize>()
            .map_err(|_| ModelLoadError::InvalidWorkers(raw)),
        None => Ok(std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)),
    }
}

type Reply = mpsc::SyncSender<Result<Vec<FaceEncoding>, FaceError>>;
type Job = (RgbImage, Reply);

/// Handle to the pool of dlib worker threads.
pub struct DlibEncoder {
    jobs: mpsc::Sender<Job>,
    workers: usize,
    jitters: u32,
}

impl std::fmt::Debug for DlibEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DlibEncoder")
            .field("workers", &self.workers)
            .field("jitters", &self.jitters)
            .finish_non_exhaustive()
    }
}

impl DlibEncoder {
    /// Start `workers` threads, each loading its own copy of the models.
    /// Returns once every thread has loaded, or with the first load error.
    pub fn load(
        models: &ModelPaths,
        jitters: u32,
        workers: NonZeroUsize,
    ) -> Result<Self, ModelLoadError> {
        let workers = workers.get();
        let (ready_tx, ready_rx) = mpsc::sync_channel(workers);
        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>();
        let jobs_rx = Arc::new(Mutex::new(jobs_rx));

        for index in 0..workers {
            let models = models.clone();
            let ready_tx = ready_tx.clone();
            let jobs_rx = Arc::clone(&jobs_rx);
            std::thread::Builder::new()
                .name(format!("dlib-encoder-{index}"))
                .spawn(move || {
                    let backend = match Models::open(&models) {
                        Ok(backend) => {
                            let _ = ready_tx.send(Ok(()));
                            backend
                        }
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };
                    drop(ready_tx);
                    loop {
                        // The guard is released before the encode runs.
                        let job = jobs_rx.lock().recv();
                        match job {
                            Ok((image, reply)) => {
                                let _ = reply.send(Ok(backend.encode(&image, jitters)));
                            }
                            Err(_) => break,
                        }
                    }
                    tracing::debug!(worker = index, "dlib encoder thread exiting");
                })
                .map_err(|e| ModelLoadError::Worker(e.to_string()))?;
        }
        drop(ready_tx);

        for _ in 0..workers {
            ready_rx.recv().map_err(|_| {
                ModelLoadError::Worker("encoder thread exited during load".into())
            })??;
        }
        tracing::info!(workers, "dlib face models loaded");

        Ok(Self {
            jobs: jobs_tx,
            workers,
            jitters,
        })
    }

    /// Number of encoder threads.
    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl FaceEncoder for DlibEncoder {
    fn encode(&self, image: &RgbImage) -> Result<Vec<FaceEncoding>, FaceError> {
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.jobs
            .send((image.clone(), reply_tx))
            .map_err(|_| FaceError::Processing("face encoder is not running".into()))?;
        reply_rx
            .recv()
            .map_err(|_| FaceError::Processing("face encoder stopped mid-request".into()))?
    }
}

struct Models {
    detector: FaceDetector,
    predictor: LandmarkPredictor,
    encoder: FaceEncoderNetwork,
}

impl Models {
    fn open(paths: &ModelPaths) -> Result<Self, ModelLoadError> {
        tracing::debug!(path = %paths.landmark.display(), "loading landmark model");
        let predictor =
            LandmarkPredictor::open(&paths.landmark).map_err(|message| ModelLoadError::Load {
                path: paths.landmark.clone(),
                message,
            })?;
        tracing::debug!(path = %paths.encoder.display(), "loading encoder model");
        let encoder =
            FaceEncoderNetwork::open(&paths.encoder).map_err(|message| ModelLoadError::Load {
                path: paths.encoder.clone(),
                message,
            })?;

        Ok(Self {
            detector: FaceDetector::new(),
            predictor,
            encoder,
        })
    }

    fn encode(&self, image: &RgbImage, jitters: u32) -> Vec<FaceEncoding> {
        let matrix = ImageMatrix::from_image(image);
        let locations = self.detector.face_locations(&matrix);

        let landmarks: Vec<_> = locations
            .iter()
            .map(|rect| self.predictor.face_landmarks(&matrix, rect))
            .collect();

        self.encoder
            .get_face_encodings(&matrix, &landmarks, jitters)
            .iter()
            .map(|encoding| FaceEncoding::new(encoding.as_ref().to_vec()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_paths_require_both_vars() {
        let err = ModelPaths::from_vars(|k| (k == LANDMARK_ENV).then(|| "/m/lm.dat".into()))
            .unwrap_err();
        assert!(matches!(err, ModelLoadError::MissingPath { env: ENCODER_ENV, .. }));

        let paths = ModelPaths::from_vars(|_| Some("/m/x.dat".into())).unwrap();
        assert_eq!(paths.landmark, PathBuf::from("/m/x.dat"));
    }

    #[test]
    fn missing_model_file_is_a_load_error() {
        let paths = ModelPaths {
            landmark: "/nonexistent/landmarks.dat".into(),
            encoder: "/nonexistent/encoder.dat".into(),
        };
        assert!(DlibEncoder::load(&paths, 0, NonZeroUsize::MIN).is_err());
    }

    #[test]
    fn worker_count_reads_override() {
        let n = worker_count(|k| (k == WORKERS_ENV).then(|| "3".into())).unwrap();
        assert_eq!(n.get(), 3);
        assert!(worker_count(|_| None).unwrap().get() >= 1);
        assert!(matches!(
            worker_count(|_| Some("0".into())),
            Err(ModelLoadError::InvalidWorkers(_))
        ));
        assert!(worker_count(|_| Some("many".into())).is_err());
    }
}
