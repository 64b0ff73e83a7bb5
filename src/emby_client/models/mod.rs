mod playback;
mod snapshot;

pub use playback::PlaybackProgress;
pub use snapshot::Snapshot;
