//! Chat command parsing and dispatch
//!
//! Lines starting with the configured prefix are commands (`?p never gonna`);
//! anything else is ordinary chat and ignored. Replies are plain text.

use crate::error::ParseError;
use melody_core::{GuildId, Track};
use melody_playback::{
    format::EMPTY_QUEUE, PlayOutcome, PlaybackState, SessionError, SessionEvent, SessionRegistry,
};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::debug;

/// Sign-offs used when leaving a voice channel
pub const LEAVE_MESSAGES: [&str; 4] = [
    "Adios amigos :wave:",
    "Hasta la vista :spy:",
    "Bye :wave:",
    "See you later!",
];

/// A parsed chat command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Join,
    Leave,
    Play(String),
    /// `None` lists the queue
    Queue(Option<String>),
    Skip,
    /// 1-based position
    Jump(usize),
    ClearQueue,
    Shuffle,
    Pause,
    Resume,
    LoopTrack,
    LoopQueue,
    Stop,
    NowPlaying,
    Help,
}

impl Command {
    /// Parse one chat line
    ///
    /// # Returns
    /// * `Ok(None)` - Not a command (no prefix)
    /// * `Ok(Some(command))` - Recognised command
    /// * `Err(_)` - Prefixed but not understood
    pub fn parse(line: &str, prefix: &str) -> Result<Option<Self>, ParseError> {
        let Some(body) = line.trim().strip_prefix(prefix) else {
            return Ok(None);
        };

        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };
        let argument = (!rest.is_empty()).then(|| rest.to_string());
        let name = name.to_lowercase();

        let command = match name.as_str() {
            "join" => Command::Join,
            "leave" | "disconnect" => Command::Leave,
            "play" | "p" => Command::Play(argument.ok_or(ParseError::MissingArgument {
                command: name.clone(),
            })?),
            "queue" | "q" => Command::Queue(argument),
            "skip" | "s" | "next" | "n" => Command::Skip,
            "jump" | "j" => {
                let position = argument.ok_or(ParseError::MissingArgument {
                    command: name.clone(),
                })?;
                let position = position
                    .parse()
                    .map_err(|_| ParseError::NotANumber(position.clone()))?;
                Command::Jump(position)
            }
            "clearqueue" | "cq" => Command::ClearQueue,
            "shuffle" => Command::Shuffle,
            "pause" => Command::Pause,
            "resume" => Command::Resume,
            "looptrack" | "lt" => Command::LoopTrack,
            "loop" | "l" | "loopqueue" | "lq" => Command::LoopQueue,
            "stop" => Command::Stop,
            "np" => Command::NowPlaying,
            "help" => Command::Help,
            _ => return Err(ParseError::UnknownCommand(name.clone())),
        };

        Ok(Some(command))
    }
}

/// Executes commands for one guild on behalf of one user
pub struct Console {
    registry: Arc<SessionRegistry>,
    guild: GuildId,
    requester: String,
    prefix: String,
}

impl Console {
    pub fn new(
        registry: Arc<SessionRegistry>,
        guild: GuildId,
        requester: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            guild,
            requester: requester.into(),
            prefix: prefix.into(),
        }
    }

    pub fn guild(&self) -> GuildId {
        self.guild
    }

    /// Parse and execute one chat line, returning the reply if any
    pub fn handle_line(&self, line: &str) -> Option<String> {
        match Command::parse(line, &self.prefix) {
            Ok(Some(command)) => self.execute(command),
            Ok(None) => None,
            Err(e) => Some(e.to_string()),
        }
    }

    /// Execute a command
    ///
    /// Returns `None` when the outcome is announced through session events
    /// instead (a track starting, the queue running out).
    pub fn execute(&self, command: Command) -> Option<String> {
        debug!(guild = %self.guild, ?command, "Executing command");

        let result = match command {
            Command::Join => self.registry.join(self.guild).map(|_| Some("Joined!".to_string())),
            Command::Leave => self.registry.leave(self.guild).map(|()| {
                let farewell = LEAVE_MESSAGES
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .unwrap_or("Bye :wave:");
                Some(farewell.to_string())
            }),
            Command::Play(query) => self
                .registry
                .play(self.guild, &query, &self.requester)
                .map(|outcome| match outcome {
                    PlayOutcome::NowPlaying(_) => None,
                    PlayOutcome::Queued(track) => Some(added_message(&track)),
                    PlayOutcome::Resumed => Some(RESUMED.to_string()),
                }),
            Command::Queue(None) => Ok(Some(match self.registry.get(self.guild) {
                Some(session) => session.format_queue(),
                None => EMPTY_QUEUE.to_string(),
            })),
            Command::Queue(Some(query)) => self
                .registry
                .session(self.guild)
                .and_then(|session| session.enqueue(&query, &self.requester))
                .map(|track| Some(added_message(&track))),
            Command::Skip => self
                .registry
                .session(self.guild)
                .and_then(|session| session.skip())
                .map(|_| None),
            Command::Jump(position) => self
                .registry
                .session(self.guild)
                .and_then(|session| session.jump(position))
                .map(|_| None),
            Command::ClearQueue => self.registry.session(self.guild).map(|session| {
                session.clear_queue();
                Some("Queue cleared".to_string())
            }),
            Command::Shuffle => self
                .registry
                .session(self.guild)
                .and_then(|session| session.shuffle())
                .map(|_| Some("Queue shuffled :twisted_rightwards_arrows:".to_string())),
            Command::Pause => self
                .registry
                .session(self.guild)
                .and_then(|session| session.pause())
                .map(|()| Some(PAUSED.to_string())),
            Command::Resume => self
                .registry
                .session(self.guild)
                .and_then(|session| session.resume())
                .map(|()| Some(RESUMED.to_string())),
            Command::LoopTrack => self.registry.session(self.guild).map(|session| {
                let on = session.toggle_loop_track();
                Some(format!("Looping track: {}", melody_playback::format::bool_glyph(on)))
            }),
            Command::LoopQueue => self.registry.session(self.guild).map(|session| {
                let on = session.toggle_loop_queue();
                Some(format!("Queue loop: {}", melody_playback::format::bool_glyph(on)))
            }),
            Command::Stop => self.registry.session(self.guild).map(|session| {
                session.stop();
                Some("Playback stopped :stop_button:".to_string())
            }),
            Command::NowPlaying => Ok(Some(
                self.registry
                    .get(self.guild)
                    .and_then(|session| session.now_playing())
                    .map_or_else(|| "Nothing is playing".to_string(), |t| now_playing_message(&t)),
            )),
            Command::Help => Ok(Some(self.help())),
        };

        match result {
            Ok(reply) => reply,
            Err(e) => Some(describe_error(&e)),
        }
    }

    fn help(&self) -> String {
        let p = &self.prefix;
        [
            format!("{p}join | {p}leave"),
            format!("{p}play <query> | {p}queue [query] | {p}np"),
            format!("{p}skip | {p}jump <n> | {p}shuffle | {p}clearqueue"),
            format!("{p}pause | {p}resume | {p}stop"),
            format!("{p}looptrack | {p}loopqueue"),
        ]
        .join("\n")
    }
}

const PAUSED: &str = "**Playing paused** :pause_button:";
const RESUMED: &str = "**Playing resumed** :arrow_forward:";

/// `Now Playing: <title> <url> [<requester>]`
pub fn now_playing_message(track: &Track) -> String {
    format!(
        "Now Playing: {} {} [{}]",
        track.title, track.canonical_url, track.requester
    )
}

/// `Added to queue: <title> <url> [<requester>]`
pub fn added_message(track: &Track) -> String {
    format!(
        "Added to queue: {} {} [{}]",
        track.title, track.canonical_url, track.requester
    )
}

/// Render a session event as a chat announcement
pub fn render_event(event: &SessionEvent) -> String {
    match event {
        SessionEvent::NowPlaying { track, .. } => now_playing_message(track),
        SessionEvent::QueueFinished { .. } => "Reached the end of the queue".to_string(),
        SessionEvent::PlaybackFailed { message, .. } => {
            format!("Couldn't play that track: {message}")
        }
    }
}

/// User-facing text for a session error
pub fn describe_error(error: &SessionError) -> String {
    match error {
        SessionError::NotFound { query } => format!("Couldn't find anything for `{query}`"),
        SessionError::ResolverUnavailable(reason) => {
            format!("Search is unavailable right now ({reason})")
        }
        SessionError::OutOfRange { position, .. } => format!("{position} is not a valid index"),
        SessionError::EmptyQueue => "The queue is empty!".to_string(),
        SessionError::AlreadyActive(_) => "This bot is already in use!".to_string(),
        SessionError::NoActiveSession(_) => "I'm not in a voice channel!".to_string(),
        SessionError::NotInSession { state } => match state {
            PlaybackState::Idle => "I don't think I was playing anything".to_string(),
            PlaybackState::Playing => "Already playing!".to_string(),
            PlaybackState::Paused => "Playback is paused".to_string(),
        },
        SessionError::Backend(e) => format!("Playback failed: {e}"),
    }
}
