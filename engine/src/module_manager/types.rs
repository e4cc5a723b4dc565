use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Handle of a module owned by the [`ModuleManager`](super::ModuleManager).
///
/// Handles are never reused: once a module is finalized its handle stays
/// invalid and every operation on it reports
/// [`ModuleError::UnknownModule`](super::ModuleError::UnknownModule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) u64);

/// Handle of a view owned by one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub(crate) u64);

/// Handle of an item living in the navigation stack.
///
/// Items are allocated by the [`NavigationStack`](crate::navigation::NavigationStack)
/// implementation, so the raw value is public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Screen family a module belongs to. The registry allocates modules by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Mailbox,
    Viewer,
    Composer,
    Account,
    Setting,
    Filter,
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModuleType::Mailbox => "mailbox",
            ModuleType::Viewer => "viewer",
            ModuleType::Composer => "composer",
            ModuleType::Account => "account",
            ModuleType::Setting => "setting",
            ModuleType::Filter => "filter",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Running,
    Paused,
    Destroying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Created,
    Active,
    NotActive,
    Destroying,
}

/// Window rotation, in degrees clockwise from portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
    PortraitUpsideDown,
    LandscapeUpsideDown,
}

impl Orientation {
    pub fn degrees(self) -> u16 {
        match self {
            Orientation::Portrait => 0,
            Orientation::Landscape => 90,
            Orientation::PortraitUpsideDown => 180,
            Orientation::LandscapeUpsideDown => 270,
        }
    }

    pub fn is_landscape(self) -> bool {
        matches!(
            self,
            Orientation::Landscape | Orientation::LandscapeUpsideDown
        )
    }
}

/// Structural events forwarded to the whole module tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleEvent {
    LowMemorySoft,
    LowMemoryHard,
    LowBattery,
    LanguageChanged,
    RotatePortrait,
    RotatePortraitUpsideDown,
    RotateLandscape,
    RotateLandscapeUpsideDown,
    RegionFormatChanged,
}

impl ModuleEvent {
    /// View update flag raised by this event, empty for events views never see.
    pub fn update_flags(self) -> UpdateFlags {
        match self {
            ModuleEvent::RotatePortrait
            | ModuleEvent::RotatePortraitUpsideDown
            | ModuleEvent::RotateLandscape
            | ModuleEvent::RotateLandscapeUpsideDown => UpdateFlags::ORIENTATION_CHANGED,
            ModuleEvent::LanguageChanged => UpdateFlags::LANGUAGE_CHANGED,
            ModuleEvent::RegionFormatChanged => UpdateFlags::REGION_FMT_CHANGED,
            ModuleEvent::LowMemorySoft | ModuleEvent::LowMemoryHard | ModuleEvent::LowBattery => {
                UpdateFlags::NONE
            }
        }
    }

    pub fn orientation(self) -> Option<Orientation> {
        match self {
            ModuleEvent::RotatePortrait => Some(Orientation::Portrait),
            ModuleEvent::RotatePortraitUpsideDown => Some(Orientation::PortraitUpsideDown),
            ModuleEvent::RotateLandscape => Some(Orientation::Landscape),
            ModuleEvent::RotateLandscapeUpsideDown => Some(Orientation::LandscapeUpsideDown),
            _ => None,
        }
    }
}

/// Pending reasons for a view to refresh itself, delivered through
/// [`View::update`](super::View::update).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct UpdateFlags(u8);

impl UpdateFlags {
    pub const NONE: UpdateFlags = UpdateFlags(0);
    pub const ORIENTATION_CHANGED: UpdateFlags = UpdateFlags(1);
    pub const LANGUAGE_CHANGED: UpdateFlags = UpdateFlags(1 << 1);
    pub const REGION_FMT_CHANGED: UpdateFlags = UpdateFlags(1 << 2);
    pub const WAS_PAUSED: UpdateFlags = UpdateFlags(1 << 3);
    /// The view became the top of the stack again after a pop.
    pub const POPPING: UpdateFlags = UpdateFlags(1 << 4);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: UpdateFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn remove(&mut self, other: UpdateFlags) {
        self.0 &= !other.0;
    }
}

impl BitOr for UpdateFlags {
    type Output = UpdateFlags;

    fn bitor(self, rhs: UpdateFlags) -> UpdateFlags {
        UpdateFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for UpdateFlags {
    fn bitor_assign(&mut self, rhs: UpdateFlags) {
        self.0 |= rhs.0;
    }
}

/// Options for [`ModuleManager::push_view`](super::ModuleManager::push_view).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PushFlags(u8);

impl PushFlags {
    pub const NONE: PushFlags = PushFlags(0);
    pub const NO_TRANSITION: PushFlags = PushFlags(1);
    pub const NO_BACK_BUTTON: PushFlags = PushFlags(1 << 1);
    pub const NO_TITLE: PushFlags = PushFlags(1 << 2);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: PushFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: PushFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: PushFlags) {
        self.0 &= !other.0;
    }
}

impl BitOr for PushFlags {
    type Output = PushFlags;

    fn bitor(self, rhs: PushFlags) -> PushFlags {
        PushFlags(self.0 | rhs.0)
    }
}

/// Observable phase of the pop scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopPhase {
    /// No pop pending and no transition running.
    Idle,
    /// A pop target is recorded; the job runs on the next tick or after the
    /// running transition finishes.
    PendingPop,
    /// The stack is animating.
    Transitioning,
}
