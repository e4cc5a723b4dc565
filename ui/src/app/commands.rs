use crate::error::{AppError, AppResult};
use engine::module_manager::{ModuleEvent, Orientation};
use engine::params::Params;

/// Screen actions, sent as messages to whichever screen is on top.
/// The flag tells whether the action takes a numeric argument.
pub const SCREEN_ACTIONS: [(&str, bool); 10] = [
    ("open", true),
    ("reply", false),
    ("compose", false),
    ("attach", false),
    ("send", false),
    ("settings", false),
    ("account", true),
    ("filter", false),
    ("add", false),
    ("save", false),
];

pub const HELP: &str = "\
Screen actions (sent to the screen on top):
  open <n>      open message n from the inbox
  reply         reply to the open message
  compose       write a new message
  attach        add an attachment page to the composer
  send          send the message being composed
  settings      open account settings
  account [n]   show account n
  filter        open the filter list
  add           start a new filter
  save          save the filter being edited
Navigation:
  back          hardware back
  wait          let every running animation finish
Application:
  pause | resume
  rotate <portrait|landscape|portrait-flipped|landscape-flipped>
  language | region | lowmem | lowmem-hard | battery
  status | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Message for the topmost screen
    Action(Params),
    Back,
    Wait,
    Pause,
    Resume,
    Rotate(Orientation),
    Event(ModuleEvent),
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> AppResult<Option<Command>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default().to_lowercase();
        let argument = words.next();
        if let Some(extra) = words.next() {
            return Err(AppError::Command(format!(
                "unexpected '{extra}' after '{name}'"
            )));
        }

        let command = match name.as_str() {
            "back" => Command::Back,
            "wait" => Command::Wait,
            "pause" => Command::Pause,
            "resume" => Command::Resume,
            "rotate" => Command::Rotate(parse_orientation(argument)?),
            "language" => Command::Event(ModuleEvent::LanguageChanged),
            "region" => Command::Event(ModuleEvent::RegionFormatChanged),
            "lowmem" => Command::Event(ModuleEvent::LowMemorySoft),
            "lowmem-hard" => Command::Event(ModuleEvent::LowMemoryHard),
            "battery" => Command::Event(ModuleEvent::LowBattery),
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return screen_action(&name, argument).map(Some),
        };

        if argument.is_some() && !matches!(command, Command::Rotate(_)) {
            return Err(AppError::Command(format!("'{name}' takes no argument")));
        }
        Ok(Some(command))
    }
}

fn screen_action(name: &str, argument: Option<&str>) -> AppResult<Command> {
    let Some(&(_, takes_number)) = SCREEN_ACTIONS.iter().find(|(action, _)| *action == name)
    else {
        return Err(AppError::Command(format!(
            "unknown command '{name}', type 'help' for the list"
        )));
    };

    let mut message = Params::new().with("action", name);
    match (argument, takes_number) {
        (None, _) if name == "open" => {
            return Err(AppError::Command("'open' needs a message number".to_string()));
        }
        (None, _) => {}
        (Some(value), true) => {
            let number: i64 = value
                .parse()
                .map_err(|_| AppError::Command(format!("'{value}' is not a number")))?;
            message.insert("id", number);
        }
        (Some(_), false) => {
            return Err(AppError::Command(format!("'{name}' takes no argument")));
        }
    }
    Ok(Command::Action(message))
}

fn parse_orientation(argument: Option<&str>) -> AppResult<Orientation> {
    match argument.map(str::to_lowercase).as_deref() {
        Some("portrait") => Ok(Orientation::Portrait),
        Some("landscape") => Ok(Orientation::Landscape),
        Some("portrait-flipped") => Ok(Orientation::PortraitUpsideDown),
        Some("landscape-flipped") => Ok(Orientation::LandscapeUpsideDown),
        Some(other) => Err(AppError::Command(format!("unknown orientation '{other}'"))),
        None => Err(AppError::Command("'rotate' needs an orientation".to_string())),
    }
}

/// Module event announcing a rotation to `orientation`.
pub fn rotation_event(orientation: Orientation) -> ModuleEvent {
    match orientation {
        Orientation::Portrait => ModuleEvent::RotatePortrait,
        Orientation::Landscape => ModuleEvent::RotateLandscape,
        Orientation::PortraitUpsideDown => ModuleEvent::RotatePortraitUpsideDown,
        Orientation::LandscapeUpsideDown => ModuleEvent::RotateLandscapeUpsideDown,
    }
}
