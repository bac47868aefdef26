//! Destination, MessageType dan dispatch ke target scope
//!
//! Nilai-nilai di sini adalah wire contract dengan peer, tidak boleh
//! di-renumber.
//!
//! Mask scope:
//! ┌──────────────┬─────────────┐
//! │ Session      │ 0x0001_0000 │
//! │ RunspacePool │ 0x0002_1000 │
//! │ Pipeline     │ 0x0004_1000 │
//! └──────────────┴─────────────┘
//!
//! Mask pool dan pipeline berbagi bit `0x1000`, jadi urutan evaluasi
//! menentukan hasil. Urutannya ada di [`DISPATCH_ORDER`].

use std::fmt;

pub const SESSION_MASK: u32 = 0x0001_0000;
pub const RUNSPACE_POOL_MASK: u32 = 0x0002_1000;
pub const PIPELINE_MASK: u32 = 0x0004_1000;

/// Arah logis sebuah message (flag set).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Destination(u32);

impl Destination {
    pub const INVALID: Destination = Destination(0);
    pub const CLIENT: Destination = Destination(0x0000_0001);
    pub const SERVER: Destination = Destination(0x0000_0002);
    pub const LISTENER: Destination = Destination(0x8000_0000);

    #[inline(always)]
    pub const fn from_u32(v: u32) -> Self {
        Destination(v)
    }

    #[inline(always)]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// True jika semua bit `other` ter-set.
    #[inline(always)]
    pub const fn contains(self, other: Destination) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Destination) -> Destination {
        Destination(self.0 | other.0)
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        for (flag, name) in [
            (Destination::CLIENT, "Client"),
            (Destination::SERVER, "Server"),
            (Destination::LISTENER, "Listener"),
        ] {
            if self.contains(flag) {
                names.push(name);
            }
        }
        let known = Destination::CLIENT.0 | Destination::SERVER.0 | Destination::LISTENER.0;
        if names.is_empty() || self.0 & !known != 0 {
            write!(f, "Destination({:#010x})", self.0)
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

impl From<u32> for Destination {
    fn from(v: u32) -> Self {
        Destination(v)
    }
}

impl From<Destination> for u32 {
    fn from(d: Destination) -> Self {
        d.0
    }
}

macro_rules! message_types {
    ($( $(#[$doc:meta])* $name:ident = $value:literal, )*) => {
        /// Jenis message PSRP. Nilai yang tidak dikenal dipertahankan di
        /// `Unknown` supaya re-encode tetap byte-exact.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MessageType {
            $( $(#[$doc])* $name, )*
            Unknown(u32),
        }

        impl MessageType {
            #[inline(always)]
            pub fn from_u32(v: u32) -> Self {
                match v {
                    $( $value => Self::$name, )*
                    other => Self::Unknown(other),
                }
            }

            #[inline(always)]
            pub fn as_u32(self) -> u32 {
                match self {
                    $( Self::$name => $value, )*
                    Self::Unknown(v) => v,
                }
            }
        }
    };
}

message_types! {
    SessionCapability = 0x0001_0002,
    CloseSession = 0x0001_0003,
    InitRunspacePool = 0x0001_0004,
    PublicKey = 0x0001_0005,
    EncryptedSessionKey = 0x0001_0006,
    PublicKeyRequest = 0x0001_0007,
    ConnectRunspacePool = 0x0001_0008,

    SetMaxRunspaces = 0x0002_1002,
    SetMinRunspaces = 0x0002_1003,
    RunspaceAvailability = 0x0002_1004,
    RunspacePoolState = 0x0002_1005,
    CreatePipeline = 0x0002_1006,
    GetAvailableRunspaces = 0x0002_1007,
    UserEvent = 0x0002_1008,
    ApplicationPrivateData = 0x0002_1009,
    GetCommandMetadata = 0x0002_100A,
    /// Carries [`PoolInitInfo`](crate::payload::PoolInitInfo).
    RunspacePoolInitData = 0x0002_100B,
    ResetRunspaceState = 0x0002_100C,
    RunspacePoolHostCall = 0x0002_1100,
    RunspacePoolHostResponse = 0x0002_1101,

    PipelineInput = 0x0004_1002,
    EndOfPipelineInput = 0x0004_1003,
    PipelineOutput = 0x0004_1004,
    ErrorRecord = 0x0004_1005,
    PipelineState = 0x0004_1006,
    DebugRecord = 0x0004_1007,
    VerboseRecord = 0x0004_1008,
    WarningRecord = 0x0004_1009,
    ProgressRecord = 0x0004_1010,
    InformationRecord = 0x0004_1011,
    StopPowerShell = 0x0004_1012,
    PipelineHostCall = 0x0004_1100,
    PipelineHostResponse = 0x0004_1101,
}

impl MessageType {
    /// Target scope untuk message ini.
    #[inline(always)]
    pub fn target(self) -> TargetScope {
        resolve(self.as_u32())
    }
}

impl From<u32> for MessageType {
    fn from(v: u32) -> Self {
        MessageType::from_u32(v)
    }
}

impl From<MessageType> for u32 {
    fn from(t: MessageType) -> Self {
        t.as_u32()
    }
}

/// Scope tujuan sebuah message. Selalu diturunkan, tidak pernah disimpan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetScope {
    Session,
    RunspacePool,
    Pipeline,
    Invalid,
}

/// Urutan evaluasi mask. Entry pertama yang match menang.
///
/// Pipeline harus dicek sebelum RunspacePool: keduanya berbagi bit
/// `0x1000`, dan nilai yang memenuhi keduanya adalah milik pipeline.
pub const DISPATCH_ORDER: [(u32, TargetScope); 3] = [
    (PIPELINE_MASK, TargetScope::Pipeline),
    (RUNSPACE_POOL_MASK, TargetScope::RunspacePool),
    (SESSION_MASK, TargetScope::Session),
];

/// Resolve raw message type ke target scope.
///
/// Tidak ada yang match berarti `Invalid`; caller yang menentukan policy.
#[inline(always)]
pub fn resolve(message_type: u32) -> TargetScope {
    DISPATCH_ORDER
        .iter()
        .find(|(mask, _)| message_type & mask == *mask)
        .map(|(_, scope)| *scope)
        .unwrap_or(TargetScope::Invalid)
}
