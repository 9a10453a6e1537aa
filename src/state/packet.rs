//! Wire packet model.
//!
//! Every message on the overlay socket is a JSON envelope whose `Type` tag
//! selects the shape of `SpecificPacket`. Decoding turns that loose pairing
//! into a closed sum type: each handled kind gets its own variant, and any tag
//! this client does not act on lands in [`PacketBody::Unhandled`] instead of
//! failing.
//!
//! Tags are accepted either as their numeric wire code or as the variant
//! name. Outbound packets always use the numeric code.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::error::SyncError;

/// Identity used for packets that do not originate from a real client.
pub const ZERO_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Suggested interval between keepalive packets.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);

/// Command sub-code for a heartbeat.
pub const HEARTBEAT_COMMAND: u64 = 0;

macro_rules! wire_tag {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $code:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Numeric wire code.
            pub fn code(&self) -> u64 {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }

            /// Parse a tag given either as a number or as a variant name.
            pub fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Number(n) => {
                        let code = n.as_u64()?;
                        Self::ALL.iter().copied().find(|t| t.code() == code)
                    }
                    Value::String(s) => Self::ALL.iter().copied().find(|t| t.as_str() == s),
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_tag! {
    /// Top-level packet kinds.
    PacketType {
        Acknowledgement = 0,
        Command = 1,
        Connect = 2,
        ConnectResponse = 3,
        Event = 4,
        File = 5,
        ForwardingPacket = 6,
        LoadedSong = 7,
        LoadSong = 8,
        PlaySong = 9,
        Response = 10,
        ScoreRequest = 11,
        ScoreRequestResponse = 12,
        SongFinished = 13,
        SongList = 14,
        SubmitScore = 15,
    }
}

wire_tag! {
    /// Kinds of roster/match change carried by an Event packet.
    EventType {
        None = 0,
        CoordinatorAdded = 1,
        CoordinatorLeft = 2,
        MatchCreated = 4,
        MatchUpdated = 8,
        MatchDeleted = 16,
        PlayerAdded = 32,
        PlayerUpdated = 64,
        PlayerLeft = 128,
    }
}

wire_tag! {
    /// Role a client declares when it connects.
    ClientType {
        Player = 0,
        Coordinator = 1,
        TemporaryConnection = 2,
    }
}

/// A connected player.
///
/// Only the identity is interpreted; score and gameplay fields are carried
/// through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Player {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra: Map::new(),
        }
    }

    /// Attach an opaque field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// An event operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Coordinator {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Coordinator {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// A match led by a coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Match {
    pub leader: Coordinator,

    /// Player slots; a slot may be empty.
    #[serde(default)]
    pub players: Vec<Option<Player>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Match {
    pub fn new(leader: Coordinator, players: Vec<Option<Player>>) -> Self {
        Self {
            leader,
            players,
            extra: Map::new(),
        }
    }

    /// Check if this match is led by the given coordinator.
    pub fn is_led_by(&self, coordinator_id: &str) -> bool {
        self.leader.id == coordinator_id
    }
}

/// A roster or match change.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PlayerAdded(Player),
    PlayerUpdated(Player),
    PlayerLeft(Player),
    CoordinatorAdded(Coordinator),
    CoordinatorLeft(Coordinator),
    MatchCreated(Match),
    MatchUpdated(Match),
    MatchDeleted(Match),
    /// Any event kind this client ignores, with its raw tag.
    Other(Value),
}

impl Event {
    pub fn event_type(&self) -> Option<EventType> {
        match self {
            Self::PlayerAdded(_) => Some(EventType::PlayerAdded),
            Self::PlayerUpdated(_) => Some(EventType::PlayerUpdated),
            Self::PlayerLeft(_) => Some(EventType::PlayerLeft),
            Self::CoordinatorAdded(_) => Some(EventType::CoordinatorAdded),
            Self::CoordinatorLeft(_) => Some(EventType::CoordinatorLeft),
            Self::MatchCreated(_) => Some(EventType::MatchCreated),
            Self::MatchUpdated(_) => Some(EventType::MatchUpdated),
            Self::MatchDeleted(_) => Some(EventType::MatchDeleted),
            Self::Other(tag) => EventType::from_value(tag),
        }
    }

    fn decode(payload: Value) -> Result<Self, SyncError> {
        let raw: RawEvent = serde_json::from_value(payload)?;
        let object = raw.changed_object;

        let Some(kind) = EventType::from_value(&raw.kind) else {
            return Ok(Self::Other(raw.kind));
        };

        Ok(match kind {
            EventType::PlayerAdded => Self::PlayerAdded(serde_json::from_value(object)?),
            EventType::PlayerUpdated => Self::PlayerUpdated(serde_json::from_value(object)?),
            EventType::PlayerLeft => Self::PlayerLeft(serde_json::from_value(object)?),
            EventType::CoordinatorAdded => {
                Self::CoordinatorAdded(serde_json::from_value(object)?)
            }
            EventType::CoordinatorLeft => Self::CoordinatorLeft(serde_json::from_value(object)?),
            EventType::MatchCreated => Self::MatchCreated(serde_json::from_value(object)?),
            EventType::MatchUpdated => Self::MatchUpdated(serde_json::from_value(object)?),
            EventType::MatchDeleted => Self::MatchDeleted(serde_json::from_value(object)?),
            EventType::None => Self::Other(raw.kind),
        })
    }

    fn to_json(&self) -> Value {
        let kind = match self.event_type() {
            Some(kind) => json!(kind.code()),
            None => match self {
                Self::Other(tag) => tag.clone(),
                _ => Value::Null,
            },
        };
        let object = match self {
            Self::PlayerAdded(p) | Self::PlayerUpdated(p) | Self::PlayerLeft(p) => json!(p),
            Self::CoordinatorAdded(c) | Self::CoordinatorLeft(c) => json!(c),
            Self::MatchCreated(m) | Self::MatchUpdated(m) | Self::MatchDeleted(m) => json!(m),
            Self::Other(_) => Value::Null,
        };
        json!({ "Type": kind, "ChangedObject": object })
    }
}

/// A packet re-wrapped for a list of recipients.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardingPacket {
    pub forward_to: Vec<String>,
    pub body: Box<PacketBody>,
}

/// Connection handshake.
#[derive(Debug, Clone, PartialEq)]
pub struct Connect {
    /// `None` when the declared client type is not one we know.
    pub client_type: Option<ClientType>,
    pub password: String,
    pub name: String,
}

/// The variant part of a packet.
#[derive(Debug, Clone, PartialEq)]
pub enum PacketBody {
    Event(Event),
    Forwarding(ForwardingPacket),
    /// The player snapshot taken when a song ends.
    SongFinished(Player),
    Connect(Connect),
    Command(Value),
    /// A packet kind this client does not act on.
    Unhandled { tag: Value, payload: Value },
}

impl PacketBody {
    pub fn packet_type(&self) -> Option<PacketType> {
        match self {
            Self::Event(_) => Some(PacketType::Event),
            Self::Forwarding(_) => Some(PacketType::ForwardingPacket),
            Self::SongFinished(_) => Some(PacketType::SongFinished),
            Self::Connect(_) => Some(PacketType::Connect),
            Self::Command(_) => Some(PacketType::Command),
            Self::Unhandled { tag, .. } => PacketType::from_value(tag),
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, Self::Command(_))
    }

    /// Tag as it appears on the wire.
    pub fn tag(&self) -> Value {
        match (self, self.packet_type()) {
            (Self::Unhandled { tag, .. }, _) => tag.clone(),
            (_, Some(kind)) => json!(kind.code()),
            (_, None) => Value::Null,
        }
    }

    fn decode(tag: Value, payload: Value) -> Result<Self, SyncError> {
        let Some(kind) = PacketType::from_value(&tag) else {
            return Ok(Self::Unhandled { tag, payload });
        };

        match kind {
            PacketType::Event => Ok(Self::Event(Event::decode(payload)?)),
            PacketType::ForwardingPacket => {
                let raw: RawForwarding = serde_json::from_value(payload)?;
                let body = Self::decode(raw.kind, raw.specific_packet)?;
                Ok(Self::Forwarding(ForwardingPacket {
                    forward_to: raw.forward_to,
                    body: Box::new(body),
                }))
            }
            PacketType::SongFinished => {
                let raw: RawSongFinished = serde_json::from_value(payload)?;
                Ok(Self::SongFinished(raw.user))
            }
            PacketType::Connect => {
                let raw: RawConnect = serde_json::from_value(payload)?;
                Ok(Self::Connect(Connect {
                    client_type: ClientType::from_value(&raw.client_type),
                    password: raw.password,
                    name: raw.name,
                }))
            }
            PacketType::Command => Ok(Self::Command(payload)),
            _ => Ok(Self::Unhandled { tag, payload }),
        }
    }

    /// The `SpecificPacket` object.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Event(event) => event.to_json(),
            Self::Forwarding(fwd) => json!({
                "Type": fwd.body.tag(),
                "ForwardTo": fwd.forward_to,
                "SpecificPacket": fwd.body.to_json()
            }),
            Self::SongFinished(user) => json!({ "User": user }),
            Self::Connect(connect) => json!({
                "ClientType": connect.client_type.map(|t| t.code()),
                "Password": connect.password,
                "Name": connect.name
            }),
            Self::Command(payload) => payload.clone(),
            Self::Unhandled { payload, .. } => payload.clone(),
        }
    }
}

/// A full packet envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub id: String,
    pub from: String,
    pub size: u64,
    pub specific_packet_size: u64,
    pub body: PacketBody,
}

impl Packet {
    /// Wrap a body in an envelope with zeroed identity.
    pub fn new(body: PacketBody) -> Self {
        Self {
            id: ZERO_ID.to_string(),
            from: ZERO_ID.to_string(),
            size: 0,
            specific_packet_size: 0,
            body,
        }
    }

    /// The keepalive command packet.
    pub fn heartbeat() -> Self {
        Self::new(PacketBody::Command(json!({ "CommandType": HEARTBEAT_COMMAND })))
    }

    /// Decode a text message.
    pub fn decode(text: &str) -> Result<Self, SyncError> {
        let raw: RawPacket = serde_json::from_str(text)?;
        Ok(Self {
            id: raw.id,
            from: raw.from,
            size: raw.size,
            specific_packet_size: raw.specific_packet_size,
            body: PacketBody::decode(raw.kind, raw.specific_packet)?,
        })
    }

    pub fn packet_type(&self) -> Option<PacketType> {
        self.body.packet_type()
    }

    /// Convert to the JSON wire form.
    pub fn to_json(&self) -> Value {
        json!({
            "Id": self.id,
            "From": self.from,
            "Size": self.size,
            "SpecificPacketSize": self.specific_packet_size,
            "Type": self.body.tag(),
            "SpecificPacket": self.body.to_json()
        })
    }

    pub fn encode(&self) -> String {
        self.to_json().to_string()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawPacket {
    #[serde(default)]
    id: String,
    #[serde(default)]
    from: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    specific_packet_size: u64,
    #[serde(rename = "Type")]
    kind: Value,
    #[serde(default)]
    specific_packet: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawEvent {
    #[serde(rename = "Type")]
    kind: Value,
    #[serde(default)]
    changed_object: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawForwarding {
    #[serde(rename = "Type")]
    kind: Value,
    #[serde(default)]
    forward_to: Vec<String>,
    #[serde(default)]
    specific_packet: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSongFinished {
    user: Player,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawConnect {
    #[serde(default)]
    client_type: Value,
    #[serde(default)]
    password: String,
    #[serde(default)]
    name: String,
}
