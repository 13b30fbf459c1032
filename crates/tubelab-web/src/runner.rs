use tubelab_engine::{
    ConfigError, EffectSignal, FrameClock, Lab, LabCommand, LabConfig, SignalBuffer,
};

/// Reason string returned when a command fails to parse.
pub const INVALID_COMMAND: &str = "invalid_command";

/// Wires the lab to the browser frame loop.
///
/// `lib.rs` keeps one of these in a `thread_local!` and exports free
/// functions via `#[wasm_bindgen]`.
pub struct LabRunner {
    lab: Lab,
    clock: FrameClock,
    /// Signals emitted since the last tick, including those from commands.
    pending: Vec<EffectSignal>,
    /// Flat buffer the presentation layer reads after each tick.
    buffer: SignalBuffer,
}

impl LabRunner {
    pub fn new(lab: Lab, config: &LabConfig) -> Self {
        Self {
            lab,
            clock: FrameClock::new(config.max_frame_ms),
            pending: Vec::new(),
            buffer: SignalBuffer::with_capacity(16),
        }
    }

    /// Build a runner on the built-in catalog. `config_json` may be partial;
    /// it is validated before the lab is created.
    pub fn from_config_json(config_json: Option<&str>) -> Result<Self, ConfigError> {
        let config = match config_json {
            Some(json) if !json.trim().is_empty() => LabConfig::from_json(json)?,
            _ => LabConfig::default(),
        };
        let lab = Lab::with_config(config.clone())?;
        Ok(Self::new(lab, &config))
    }

    pub fn lab(&self) -> &Lab {
        &self.lab
    }

    /// Run one frame: advance the clock, then publish signals.
    pub fn tick(&mut self, dt: f32) {
        let ms = self.clock.accumulate(dt);
        if ms > 0 {
            self.lab.advance(ms);
        }
        self.flush();
    }

    fn collect(&mut self) {
        self.pending.extend(self.lab.drain_signals());
    }

    fn flush(&mut self) {
        self.collect();
        self.buffer
            .write(self.lab.state(), self.lab.pour_progress(), &self.pending);
        self.pending.clear();
    }

    /// Apply a JSON command. Returns an empty string on success, otherwise
    /// the rejection reason.
    pub fn command(&mut self, json: &str) -> String {
        let command = match LabCommand::from_json(json) {
            Ok(command) => command,
            Err(err) => {
                log::warn!("lab: bad command {}: {}", json, err);
                return INVALID_COMMAND.to_string();
            }
        };
        let outcome = self.lab.dispatch(command);
        self.collect();
        match outcome {
            Ok(()) => String::new(),
            Err(rejection) => rejection.reason().to_string(),
        }
    }

    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.lab.snapshot()).unwrap_or_default()
    }

    /// Catalog entries for the chemical picker, sorted by id.
    pub fn chemicals_json(&self) -> String {
        serde_json::to_string(&self.lab.session().catalog().chemicals()).unwrap_or_default()
    }

    // ---- Buffer accessors ----

    pub fn signals(&self) -> &[f32] {
        self.buffer.as_slice()
    }

    pub fn signals_ptr(&self) -> *const f32 {
        self.buffer.as_slice().as_ptr()
    }

    pub fn signals_len(&self) -> u32 {
        self.buffer.as_slice().len() as u32
    }

    /// Cancel timers and stop effects; the final stop signals are published.
    pub fn dispose(&mut self) {
        self.lab.teardown();
        self.flush();
    }
}
