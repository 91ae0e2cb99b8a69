//! The selfie capture-and-match flow.
//!
//! The flow is a tagged state machine owning the camera for its whole life:
//! once the stream is up it is reused across retakes and released when the
//! flow is dropped. States that a given operation does not apply to reject
//! it with a typed [`FlowError`], so a submit can never race a submit and a
//! capture can never happen without a live camera.

use snapmatch_capture::{FrameSource, Snapshot};

use crate::api::{ApiError, MatchResult, PhotoEventApi, PhotoRef};
use thiserror::Error;

pub const CAMERA_UNAVAILABLE: &str =
    "Could not access the camera. Please ensure you've granted permission and that your camera is working.";
pub const NAME_REQUIRED: &str = "Please enter your name";
pub const EVENT_REQUIRED: &str = "No event selected. Please access this page with a valid event.";
pub const MATCH_NETWORK_ERROR: &str =
    "An error occurred while processing your selfie. Please try again.";
pub const GALLERY_NETWORK_ERROR: &str =
    "An error occurred while loading images. Please try again.";

/// User-facing surface the flow reports through: blocking alerts and the
/// loading indicator. The indicator is shown and hidden exactly once per
/// submission attempt, on every exit path.
pub trait FlowUi {
    fn alert(&mut self, message: &str);
    fn loading(&mut self, visible: bool);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("camera is already active")]
    CameraAlreadyActive,
    #[error("camera is not active")]
    CameraNotActive,
    #[error("no captured frame")]
    NothingCaptured,
    #[error("capture failed: {0}")]
    Capture(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Idle,
    CameraActive,
    FrameCaptured,
    ResultsShown,
    GalleryShown,
}

enum State<S> {
    Idle,
    CameraActive {
        source: S,
    },
    FrameCaptured {
        source: S,
        shot: Snapshot,
    },
    ResultsShown {
        source: S,
        shot: Snapshot,
        matches: Vec<MatchResult>,
    },
    // The gallery can be opened from any point on the page, camera or not,
    // so the stream and preview are carried along when they exist.
    GalleryShown {
        source: Option<S>,
        shot: Option<Snapshot>,
        photos: Vec<PhotoRef>,
    },
}

pub struct CaptureFlow<S> {
    state: State<S>,
    width: u32,
    height: u32,
}

impl<S: FrameSource> CaptureFlow<S> {
    /// `width` x `height` is the fixed raster size captured stills are
    /// scaled into before upload.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: State::Idle,
            width,
            height,
        }
    }

    pub fn stage(&self) -> FlowStage {
        match self.state {
            State::Idle => FlowStage::Idle,
            State::CameraActive { .. } => FlowStage::CameraActive,
            State::FrameCaptured { .. } => FlowStage::FrameCaptured,
            State::ResultsShown { .. } => FlowStage::ResultsShown,
            State::GalleryShown { .. } => FlowStage::GalleryShown,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match &self.state {
            State::FrameCaptured { shot, .. } | State::ResultsShown { shot, .. } => Some(shot),
            State::GalleryShown { shot, .. } => shot.as_ref(),
            _ => None,
        }
    }

    pub fn matches(&self) -> Option<&[MatchResult]> {
        match &self.state {
            State::ResultsShown { matches, .. } => Some(matches),
            _ => None,
        }
    }

    pub fn photos(&self) -> Option<&[PhotoRef]> {
        match &self.state {
            State::GalleryShown { photos, .. } => Some(photos),
            _ => None,
        }
    }

    /// Acquire the camera through `open`. Denied access is not a transition
    /// error: the user is alerted and the flow stays idle.
    pub fn start_camera(
        &mut self,
        ui: &mut dyn FlowUi,
        open: impl FnOnce() -> anyhow::Result<S>,
    ) -> Result<(), FlowError> {
        if !matches!(self.state, State::Idle) {
            return Err(FlowError::CameraAlreadyActive);
        }
        match open() {
            Ok(source) => {
                self.state = State::CameraActive { source };
            }
            Err(err) => {
                log::error!("camera access failed: {err:#}");
                ui.alert(CAMERA_UNAVAILABLE);
            }
        }
        Ok(())
    }

    /// Rasterize the current frame into the fixed-size still and hold it as
    /// the pending selfie. The camera stays open for retakes.
    pub fn capture_photo(&mut self) -> Result<(), FlowError> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::CameraActive { mut source } => {
                let shot = source
                    .grab()
                    .and_then(|frame| Snapshot::from_frame(&frame, self.width, self.height));
                match shot {
                    Ok(shot) => {
                        self.state = State::FrameCaptured { source, shot };
                        Ok(())
                    }
                    Err(err) => {
                        self.state = State::CameraActive { source };
                        Err(FlowError::Capture(format!("{err:#}")))
                    }
                }
            }
            other => {
                self.state = other;
                Err(FlowError::CameraNotActive)
            }
        }
    }

    /// Discard the pending still and any shown results, returning to the
    /// live view. The existing stream is reused, never re-acquired.
    pub fn retake_photo(&mut self) -> Result<(), FlowError> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::FrameCaptured { source, .. } | State::ResultsShown { source, .. } => {
                self.state = State::CameraActive { source };
                Ok(())
            }
            State::GalleryShown {
                source: Some(source),
                ..
            } => {
                self.state = State::CameraActive { source };
                Ok(())
            }
            other => {
                self.state = other;
                Err(FlowError::NothingCaptured)
            }
        }
    }

    /// Upload the pending still for matching. Validation failures alert and
    /// leave the state untouched without touching the network.
    pub fn submit_selfie(
        &mut self,
        api: &impl PhotoEventApi,
        ui: &mut dyn FlowUi,
        person_name: &str,
        event_id: Option<&str>,
    ) -> Result<(), FlowError> {
        if !matches!(self.state, State::FrameCaptured { .. }) {
            return Err(FlowError::NothingCaptured);
        }
        let name = person_name.trim();
        if name.is_empty() {
            ui.alert(NAME_REQUIRED);
            return Ok(());
        }
        ui.loading(true);
        let event_id = match event_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => {
                ui.loading(false);
                ui.alert(EVENT_REQUIRED);
                return Ok(());
            }
        };
        let (source, shot) = match std::mem::replace(&mut self.state, State::Idle) {
            State::FrameCaptured { source, shot } => (source, shot),
            other => {
                self.state = other;
                ui.loading(false);
                return Err(FlowError::NothingCaptured);
            }
        };
        let result = api.selfie_match(shot.data_uri(), name, event_id);
        ui.loading(false);
        match result {
            Ok(matches) => {
                self.state = State::ResultsShown {
                    source,
                    shot,
                    matches,
                };
            }
            Err(ApiError::Server(error)) => {
                self.state = State::FrameCaptured { source, shot };
                ui.alert(&format!("Error: {error}"));
            }
            Err(err) => {
                self.state = State::FrameCaptured { source, shot };
                log::error!("selfie match request failed: {err}");
                ui.alert(MATCH_NETWORK_ERROR);
            }
        }
        Ok(())
    }

    /// Fetch every photo reference for the event and show the gallery.
    /// Valid from any state; the camera and pending still survive.
    pub fn load_gallery(
        &mut self,
        api: &impl PhotoEventApi,
        ui: &mut dyn FlowUi,
        event_id: Option<&str>,
    ) -> Result<(), FlowError> {
        let event_id = match event_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                ui.alert(EVENT_REQUIRED);
                return Ok(());
            }
        };
        ui.loading(true);
        let result = api.all_images(&event_id);
        ui.loading(false);
        match result {
            Ok(photos) => {
                let (source, shot) = match std::mem::replace(&mut self.state, State::Idle) {
                    State::Idle => (None, None),
                    State::CameraActive { source } => (Some(source), None),
                    State::FrameCaptured { source, shot }
                    | State::ResultsShown { source, shot, .. } => (Some(source), Some(shot)),
                    State::GalleryShown { source, shot, .. } => (source, shot),
                };
                self.state = State::GalleryShown {
                    source,
                    shot,
                    photos,
                };
            }
            Err(ApiError::Server(error)) => {
                ui.alert(&format!("Error: {error}"));
            }
            Err(err) => {
                log::error!("gallery request failed: {err}");
                ui.alert(GALLERY_NETWORK_ERROR);
            }
        }
        Ok(())
    }
}
