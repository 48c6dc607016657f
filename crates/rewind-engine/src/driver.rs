//! Per-step rewind driver.
//!
//! A host calls [`Rewinder::step()`] once per simulated step with whether
//! the rewind input is held. The driver either records the core's state or
//! restores an earlier one, so the host loop stays a single call.

use std::error::Error;
use std::fmt;

use tracing::debug;

use crate::config::RewindConfig;
use crate::error::RewindError;
use crate::session::RewindSession;

// ── StateCore ──────────────────────────────────────────────────────

/// Errors reported by a [`StateCore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// The core's serialized size changed after the session was created.
    SizeChanged {
        /// Size the session was created for.
        expected: usize,
        /// Size the core reports now.
        actual: usize,
    },
    /// The core could not serialize or restore its state.
    Failed {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeChanged { expected, actual } => {
                write!(f, "state size changed from {expected} to {actual} bytes")
            }
            Self::Failed { reason } => write!(f, "{reason}"),
        }
    }
}

impl Error for CoreError {}

/// A simulation whose whole state can be saved to and restored from a
/// fixed-size byte buffer.
pub trait StateCore {
    /// Size of the serialized state in bytes.
    fn serialize_size(&self) -> usize;

    /// Write the full state into `out`, which is exactly
    /// [`serialize_size()`](Self::serialize_size) bytes.
    fn serialize(&self, out: &mut [u8]) -> Result<(), CoreError>;

    /// Replace the state with one previously produced by
    /// [`serialize()`](Self::serialize).
    fn deserialize(&mut self, state: &[u8]) -> Result<(), CoreError>;
}

// ── StepOutcome ────────────────────────────────────────────────────

/// What [`Rewinder::step()`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// The state was recorded.
    Recorded,
    /// Not a recording step under the configured granularity.
    Skipped,
    /// The core was restored one recorded state back.
    ///
    /// Hosts typically play audio reversed on these steps.
    Rewound,
    /// History ran out; the core was held at the oldest reachable state.
    Exhausted,
}

// ── Rewinder ───────────────────────────────────────────────────────

/// Drives a [`RewindSession`] from a [`StateCore`], one call per step.
pub struct Rewinder {
    session: RewindSession,
    granularity: u32,
    counter: u32,
}

impl Rewinder {
    /// Create a session sized for `core` and seed it with the core's
    /// current state.
    ///
    /// `config.state_size` is ignored; the core's
    /// [`serialize_size()`](StateCore::serialize_size) is used instead.
    pub fn new<C: StateCore + ?Sized>(config: RewindConfig, core: &C) -> Result<Self, RewindError> {
        let config = RewindConfig {
            state_size: core.serialize_size(),
            ..config
        };
        let granularity = config.granularity;
        let mut session = RewindSession::new(config)?;
        core.serialize(session.push_where())?;
        session.push_do()?;
        Ok(Self {
            session,
            granularity,
            counter: 0,
        })
    }

    /// Run the rewind logic for one step.
    ///
    /// With `rewind_held`, pops one state and restores it into `core`; when
    /// nothing is left, restores the oldest reachable state instead. If the
    /// core rejects the state, it stays in the history and the error is
    /// returned. Otherwise records the core's state every `granularity`
    /// steps, counting from the last rewind.
    pub fn step<C: StateCore + ?Sized>(
        &mut self,
        core: &mut C,
        rewind_held: bool,
    ) -> Result<StepOutcome, RewindError> {
        if rewind_held {
            return self.rewind(core);
        }

        self.counter = (self.counter + 1) % self.granularity;
        if self.counter != 0 {
            return Ok(StepOutcome::Skipped);
        }

        let expected = self.session.state_size();
        let actual = core.serialize_size();
        if actual != expected {
            return Err(CoreError::SizeChanged { expected, actual }.into());
        }
        core.serialize(self.session.push_where())?;
        self.session.push_do()?;
        Ok(StepOutcome::Recorded)
    }

    fn rewind<C: StateCore + ?Sized>(&mut self, core: &mut C) -> Result<StepOutcome, RewindError> {
        self.counter = 0;
        match self.session.pop() {
            Ok(state) => {
                if let Err(e) = core.deserialize(state) {
                    self.session.unpop();
                    return Err(e.into());
                }
                Ok(StepOutcome::Rewound)
            }
            Err(RewindError::Empty) => {
                if let Some(oldest) = self.session.current() {
                    core.deserialize(oldest)?;
                }
                debug!("rewind reached the oldest recorded state");
                Ok(StepOutcome::Exhausted)
            }
            Err(e) => Err(e),
        }
    }

    /// The underlying session.
    pub fn session(&self) -> &RewindSession {
        &self.session
    }

    /// Consume the driver, returning the session.
    pub fn into_session(self) -> RewindSession {
        self.session
    }
}
