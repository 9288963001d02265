//! One-way command channel to the host application.
//!
//! The web view talks to its host by navigating to `<scheme>://<verb>?<arg>...`
//! URLs that the host intercepts. Nothing ever comes back on this channel.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, warn};


/// A command for the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verb", rename_all = "kebab-case")]
pub enum HostCommand {
    /// Assign a colour to a key
    SetKey {
        /// Matrix row
        row: u16,
        /// Matrix column
        col: u16,
        /// CSS colour string
        color: String,
    },
    /// Remove a key's colour
    ClearKey {
        /// Matrix row
        row: u16,
        /// Matrix column
        col: u16,
    },
    /// Create a profile
    ProfileNew {
        /// Profile name
        name: String,
    },
    /// Open a profile in the editor
    ProfileEdit {
        /// Profile name
        name: String,
    },
    /// Delete a profile
    ProfileDel {
        /// Profile name
        name: String,
    },
    /// Apply a profile to the device
    ProfileActivate {
        /// Profile name
        name: String,
    },
    /// Change a boolean preference
    PrefSet {
        /// Preference group
        group: String,
        /// Setting name within the group
        setting: String,
        /// New value
        value: bool,
    },
    /// Reset every preference
    PrefResetAll,
    /// Set the backlight brightness (0-255)
    Brightness {
        /// Raw brightness
        value: u8,
    },
    /// Select the device to configure
    SetDevice {
        /// Device serial
        serial: String,
    },
}

impl HostCommand {
    /// The verb that starts the wire form.
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::SetKey { .. } => "set-key",
            Self::ClearKey { .. } => "clear-key",
            Self::ProfileNew { .. } => "profile-new",
            Self::ProfileEdit { .. } => "profile-edit",
            Self::ProfileDel { .. } => "profile-del",
            Self::ProfileActivate { .. } => "profile-activate",
            Self::PrefSet { .. } => "pref-set",
            Self::PrefResetAll => "pref-reset-all",
            Self::Brightness { .. } => "brightness",
            Self::SetDevice { .. } => "set-device",
        }
    }

    /// The full URL the host intercepts, e.g. `cmd://clear-key?1?2`.
    pub fn to_url(&self, scheme: &str) -> String {
        format!("{scheme}://{self}")
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = self.verb();
        match self {
            Self::SetKey { row, col, color } => write!(f, "{verb}?{row}?{col}?{color}"),
            Self::ClearKey { row, col } => write!(f, "{verb}?{row}?{col}"),
            Self::ProfileNew { name }
            | Self::ProfileEdit { name }
            | Self::ProfileDel { name }
            | Self::ProfileActivate { name } => write!(f, "{verb}?{name}"),
            Self::PrefSet {
                group,
                setting,
                value,
            } => write!(f, "{verb}?{group}?{setting}?{value}"),
            Self::PrefResetAll => f.write_str(verb),
            Self::Brightness { value } => write!(f, "{verb}?{value}"),
            Self::SetDevice { serial } => write!(f, "{verb}?{serial}"),
        }
    }
}

impl FromStr for HostCommand {
    type Err = anyhow::Error;

    /// Parses the wire form, with or without a `scheme://` prefix.
    ///
    /// Name arguments take the rest of the string, so profile names may
    /// themselves contain `?`.
    fn from_str(s: &str) -> Result<Self> {
        let wire = s.split_once("://").map_or(s, |(_, rest)| rest);
        let (verb, args) = wire.split_once('?').unwrap_or((wire, ""));

        let name = |what: &str| -> Result<String> {
            if args.is_empty() {
                bail!("'{verb}' needs a {what}");
            }
            Ok(args.to_string())
        };
        let position = |row: &str, col: &str| -> Result<(u16, u16)> {
            Ok((
                row.parse().context(format!("Invalid row '{row}' in '{wire}'"))?,
                col.parse().context(format!("Invalid column '{col}' in '{wire}'"))?,
            ))
        };

        let command = match verb {
            "set-key" => {
                let mut parts = args.splitn(3, '?');
                let (Some(row), Some(col), Some(color)) = (parts.next(), parts.next(), parts.next())
                else {
                    bail!("'set-key' expects set-key?<row>?<col>?<color>, got '{wire}'");
                };
                let (row, col) = position(row, col)?;
                Self::SetKey {
                    row,
                    col,
                    color: color.to_string(),
                }
            }
            "clear-key" => {
                let Some((row, col)) = args.split_once('?') else {
                    bail!("'clear-key' expects clear-key?<row>?<col>, got '{wire}'");
                };
                let (row, col) = position(row, col)?;
                Self::ClearKey { row, col }
            }
            "profile-new" => Self::ProfileNew {
                name: name("profile name")?,
            },
            "profile-edit" => Self::ProfileEdit {
                name: name("profile name")?,
            },
            "profile-del" => Self::ProfileDel {
                name: name("profile name")?,
            },
            "profile-activate" => Self::ProfileActivate {
                name: name("profile name")?,
            },
            "pref-set" => {
                let mut parts = args.splitn(3, '?');
                let (Some(group), Some(setting), Some(value)) =
                    (parts.next(), parts.next(), parts.next())
                else {
                    bail!("'pref-set' expects pref-set?<group>?<setting>?<bool>, got '{wire}'");
                };
                Self::PrefSet {
                    group: group.to_string(),
                    setting: setting.to_string(),
                    value: value
                        .parse()
                        .context(format!("Invalid preference value '{value}'"))?,
                }
            }
            "pref-reset-all" => Self::PrefResetAll,
            "brightness" => Self::Brightness {
                value: args
                    .parse()
                    .context(format!("Brightness must be 0-255, got '{args}'"))?,
            },
            "set-device" => Self::SetDevice {
                serial: name("device serial")?,
            },
            other => bail!("Unknown host command '{other}'"),
        };
        Ok(command)
    }
}

/// Fire-and-forget receiver of host commands.
pub trait HostBridge {
    /// Delivers one command. Never blocks on, or waits for, a reply.
    fn send(&mut self, command: HostCommand);
}

/// Bridge that keeps every command in memory until it is drained.
#[derive(Debug, Clone, Default)]
pub struct MemoryBridge {
    sent: Vec<HostCommand>,
}

impl MemoryBridge {
    /// Creates an empty bridge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands sent since the last [`MemoryBridge::take`].
    pub fn sent(&self) -> &[HostCommand] {
        &self.sent
    }

    /// Removes and returns the pending commands.
    pub fn take(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.sent)
    }
}

impl HostBridge for MemoryBridge {
    fn send(&mut self, command: HostCommand) {
        debug!(command = %command, "Queued host command");
        self.sent.push(command);
    }
}

/// Bridge that writes each command as a `scheme://...` URL line.
pub struct UrlBridge<W: Write> {
    scheme: String,
    writer: W,
}

impl<W: Write> UrlBridge<W> {
    /// Creates a bridge writing URLs with `scheme` to `writer`.
    pub fn new(scheme: impl Into<String>, writer: W) -> Self {
        Self {
            scheme: scheme.into(),
            writer,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> HostBridge for UrlBridge<W> {
    fn send(&mut self, command: HostCommand) {
        let url = command.to_url(&self.scheme);
        if let Err(e) = writeln!(self.writer, "{url}").and_then(|()| self.writer.flush()) {
            warn!(%url, error = %e, "Failed to deliver host command");
        }
    }
}
