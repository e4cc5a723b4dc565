use super::commands::{Command, HELP, rotation_event};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::screens::{self, Outbox, Surface};
use engine::module_manager::{ModuleId, ModuleListener, ModuleManager, ModuleType};
use engine::navigation::{AppWindow, SimulatedStack, SimulatedWindow, StackHandle};
use engine::params::Params;
use log::{debug, info, warn};
use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Upper bound of manager ticks run per frame or per settle round.
const MAX_TICKS_PER_FRAME: usize = 64;

/// Upper bound of animations completed by [`Shell::settle`].
const MAX_SETTLE_ROUNDS: usize = 64;

/// Listener of the mailbox. Closing the root ends the session.
struct RootListener {
    quit: Rc<Cell<bool>>,
}

impl ModuleListener for RootListener {
    fn on_destroy_request(&self, manager: &mut ModuleManager, module: ModuleId) {
        info!("Mailbox {module} asked to close, ending the session");
        if let Err(e) = manager.destroy_module(module) {
            warn!("Failed to close the mailbox: {e}");
            self.quit.set(true);
        }
    }

    fn on_destroy_completed(&self, _manager: &mut ModuleManager, _module: ModuleId) {
        self.quit.set(true);
    }
}

/// Hosts the module manager on a simulated stack and window and turns
/// commands into manager calls.
///
/// The shell is clock driven: [`advance`](Shell::advance) ticks the manager
/// and ends stack animations once they ran for the configured transition
/// time. Scripts use [`settle`](Shell::settle) instead, which finishes every
/// animation at once.
pub struct Shell {
    manager: ModuleManager,
    stack: StackHandle,
    window: SimulatedWindow,
    outbox: Outbox,
    quit: Rc<Cell<bool>>,
    transition: Duration,
    tick_interval: Duration,
    animation_started: Option<Instant>,
}

impl Shell {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let navigation = config.navigation();
        let stack = SimulatedStack::new()
            .with_destroy_order(navigation.destroy_order())
            .with_compressed(navigation.compressed());
        let handle = stack.handle();
        let window = SimulatedWindow::new();
        let outbox = Outbox::new();

        let mut manager = ModuleManager::new(screens::registry(&outbox));
        manager.initialize(Box::new(window.clone()), Box::new(stack))?;
        manager.resume()?;

        let quit = Rc::new(Cell::new(false));
        let listener = Rc::new(RootListener {
            quit: Rc::clone(&quit),
        });
        let root = manager.create_root_module(
            ModuleType::Mailbox,
            Params::new().with("folder", "Inbox"),
            listener,
        )?;
        info!(
            "Shell started with mailbox {root} (transition {}ms, tick {}ms, {:?})",
            navigation.transition_ms(),
            navigation.tick_interval_ms(),
            navigation.destroy_order()
        );

        let mut shell = Self {
            manager,
            stack: handle,
            window,
            outbox,
            quit,
            transition: navigation.transition(),
            tick_interval: navigation.tick_interval(),
            animation_started: None,
        };
        shell.settle();
        Ok(shell)
    }

    pub fn manager(&self) -> &ModuleManager {
        &self.manager
    }

    pub fn stack(&self) -> &StackHandle {
        &self.stack
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Subjects sent during the session, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.outbox.sent()
    }

    pub fn should_quit(&self) -> bool {
        self.quit.get() || self.manager.root_module().is_none()
    }

    /// One frame of the event loop: ends the running animation once it has
    /// lasted the transition time, then ticks the manager until idle.
    pub fn advance(&mut self, now: Instant) {
        if self.stack.is_animating() {
            let started = *self.animation_started.get_or_insert(now);
            if now.duration_since(started) >= self.transition {
                debug!("Animation finished after {:?}", now.duration_since(started));
                self.stack.complete_transition();
                self.animation_started = None;
            }
        } else {
            self.animation_started = None;
        }
        self.manager.run_until_idle(MAX_TICKS_PER_FRAME);
    }

    /// Ticks and finishes animations until nothing is left to do.
    pub fn settle(&mut self) {
        for _ in 0..MAX_SETTLE_ROUNDS {
            self.manager.run_until_idle(MAX_TICKS_PER_FRAME);
            if !self.stack.complete_transition() {
                break;
            }
        }
        self.animation_started = None;
    }

    /// Parses and runs one input line. Command and navigation failures are
    /// reported to `out` and the session goes on; only output failures end it.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> AppResult<()> {
        let outcome = Command::parse(line).and_then(|command| match command {
            Some(command) => self.execute(command, out),
            None => Ok(()),
        });

        match outcome {
            Err(AppError::Io(e)) => Err(AppError::Io(e)),
            Err(e) => {
                warn!("{e}");
                writeln!(out, "error: {e}")?;
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> AppResult<()> {
        debug!("Executing {command:?}");
        match command {
            Command::Action(message) => {
                let Some(top) = self.manager.top_module() else {
                    return Err(AppError::Navigation("no screen is open".to_string()));
                };
                self.manager.send_message(top, &message)?;
            }
            Command::Back => self.stack.press_back(),
            Command::Wait => self.settle(),
            Command::Pause => self.manager.pause()?,
            Command::Resume => self.manager.resume()?,
            Command::Rotate(orientation) => {
                self.window.set_rotation(orientation);
                self.manager.send_event(rotation_event(orientation))?;
            }
            Command::Event(event) => self.manager.send_event(event)?,
            Command::Status => self.write_status(out)?,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => {
                info!("Quit requested");
                self.quit.set(true);
            }
        }
        Ok(())
    }

    /// Runs every line of `script`, letting animations finish after each one.
    pub fn run_script(&mut self, script: &str, out: &mut impl Write) -> AppResult<()> {
        for line in script.lines() {
            if self.should_quit() {
                break;
            }
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            writeln!(out, "> {line}")?;
            self.handle_line(line, out)?;
            self.settle();
        }
        Ok(())
    }

    /// Titles of the stacked pages, bottom first.
    pub fn breadcrumb(&self) -> String {
        self.stack
            .titles()
            .into_iter()
            .map(|title| if title.is_empty() { "...".to_string() } else { title })
            .collect::<Vec<_>>()
            .join(" > ")
    }

    /// What the top page shows, if anything is on the stack.
    pub fn top_surface(&self) -> Option<Surface> {
        let item = self.manager.top_view().and_then(|view| self.manager.view_item(view))?;
        self.stack
            .content(item)
            .and_then(|content| content.downcast_ref::<Surface>().cloned())
    }

    pub fn write_status(&self, out: &mut impl Write) -> AppResult<()> {
        writeln!(out, "Screens: {}", self.breadcrumb())?;

        if let Some(top) = self.manager.top_module() {
            let module_type = self
                .manager
                .module_type(top)
                .map(|module_type| module_type.to_string())
                .unwrap_or_default();
            let page = self
                .manager
                .top_view()
                .and_then(|view| self.manager.view_state(view).map(|state| (view, state)));
            match page {
                Some((view, state)) => writeln!(out, "Top: {module_type} {top}, {view} {state:?}")?,
                None => writeln!(out, "Top: {module_type} {top}")?,
            }
        }

        writeln!(
            out,
            "Mode: {}, {:?}{}{}",
            if self.manager.is_paused() {
                "background"
            } else {
                "foreground"
            },
            self.window.rotation(),
            if self.stack.is_animating() {
                ", animating"
            } else {
                ""
            },
            if self.manager.is_in_compressed_mode() {
                ", compressed"
            } else {
                ""
            }
        )?;

        let sent = self.outbox.sent();
        if !sent.is_empty() {
            writeln!(out, "Sent: {}", sent.join(", "))?;
        }
        if let Some(surface) = self.top_surface() {
            writeln!(out, "{}", surface.render())?;
        }
        Ok(())
    }

    /// Tears every screen down and releases the stack.
    pub fn shutdown(&mut self) -> AppResult<()> {
        if self.manager.is_initialized() {
            self.manager.finalize()?;
        }
        info!("Shell shut down, {} message(s) sent", self.outbox.sent().len());
        Ok(())
    }
}
