//! The device-backed audio system used by the real server.

use playd_audio::{Audio, AudioSystem, DeviceSink, NullAudio, PipeAudio, Result};

use crate::load_source;

/// Builds pipelines that decode real files onto a real output device.
pub struct PipeAudioSystem {
    device_id: usize,
}

impl PipeAudioSystem {
    /// Creates a system that opens every sink on output device
    /// `device_id`. The ID is validated at startup, not here.
    pub fn new(device_id: usize) -> Self {
        PipeAudioSystem { device_id }
    }
}

impl AudioSystem for PipeAudioSystem {
    fn null(&self) -> Box<dyn Audio> {
        Box::new(NullAudio)
    }

    fn load(&self, path: &str) -> Result<Box<dyn Audio>> {
        let source = load_source(path)?;
        let sink = DeviceSink::new(source.as_ref(), self.device_id)?;
        Ok(Box::new(PipeAudio::new(source, Box::new(sink))))
    }
}
