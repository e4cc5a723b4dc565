use super::types::{ModuleId, ModuleType, ViewId, ViewState};
use thiserror::Error;

/// Errors reported by every module manager operation.
///
/// Failures are synchronous and never fatal: a caller receiving one of these
/// should treat the requested screen transition as "did not happen". The
/// manager leaves its state as it was before the call, rolling back
/// half-built modules where needed.
///
/// # Error Categories
///
/// ## Precondition Violations
/// - [`NotInitialized`] / [`AlreadyInitialized`] - manager lifecycle misuse
/// - [`UnknownModule`] / [`UnknownView`] - stale or foreign handles
/// - [`NotTopmost`] - a non-topmost module tried a topmost-only operation
///
/// ## State Violations
/// - [`ModuleDestroying`] / [`ViewDestroying`] - operating on something going away
/// - [`LiveChildExists`] / [`RootExists`] - module tree shape violations
/// - [`AlreadyPushed`] / [`InvalidViewState`] - view push protocol violations
///
/// ## Allocation and Platform Failures
/// - [`AllocationFailed`] - no constructor registered for a module type
/// - [`StackOperationFailed`] - the navigation stack refused an operation
///
/// # Examples
///
/// ```no_run
/// use engine::module_manager::{ModuleError, ModuleManager};
///
/// fn close_top(manager: &mut ModuleManager) {
///     let Some(top) = manager.top_module() else { return };
///     match manager.destroy_module(top) {
///         Ok(()) => {}
///         Err(ModuleError::ModuleDestroying(_)) => {
///             // Already closing, nothing to do
///         }
///         Err(e) => log::error!("Failed to close screen: {e}"),
///     }
/// }
/// ```
///
/// [`NotInitialized`]: ModuleError::NotInitialized
/// [`AlreadyInitialized`]: ModuleError::AlreadyInitialized
/// [`UnknownModule`]: ModuleError::UnknownModule
/// [`UnknownView`]: ModuleError::UnknownView
/// [`NotTopmost`]: ModuleError::NotTopmost
/// [`ModuleDestroying`]: ModuleError::ModuleDestroying
/// [`ViewDestroying`]: ModuleError::ViewDestroying
/// [`LiveChildExists`]: ModuleError::LiveChildExists
/// [`RootExists`]: ModuleError::RootExists
/// [`AlreadyPushed`]: ModuleError::AlreadyPushed
/// [`InvalidViewState`]: ModuleError::InvalidViewState
/// [`AllocationFailed`]: ModuleError::AllocationFailed
/// [`StackOperationFailed`]: ModuleError::StackOperationFailed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("Module manager is not initialized")]
    NotInitialized,

    #[error("Module manager is already initialized")]
    AlreadyInitialized,

    #[error("Unknown module: {0}")]
    UnknownModule(ModuleId),

    #[error("Unknown view: {0}")]
    UnknownView(ViewId),

    /// Only the topmost module may create views or child modules.
    #[error("{0} is not the topmost module")]
    NotTopmost(ModuleId),

    #[error("{0} is being destroyed")]
    ModuleDestroying(ModuleId),

    #[error("{0} is being destroyed")]
    ViewDestroying(ViewId),

    #[error("{0} has no views")]
    NoViews(ModuleId),

    /// A parent may hold a second child only while the first one is destroying.
    #[error("{parent} already has a live child {child}")]
    LiveChildExists { parent: ModuleId, child: ModuleId },

    #[error("Root module already exists: {0}")]
    RootExists(ModuleId),

    #[error("No module registered for type '{0}'")]
    AllocationFailed(ModuleType),

    #[error("Failed to create {module_type} module: {reason}")]
    CreateFailed {
        module_type: ModuleType,
        reason: String,
    },

    #[error("Failed to create {view}: {reason}")]
    ViewCreateFailed { view: ViewId, reason: String },

    #[error("{0} has no content")]
    NoContent(ViewId),

    #[error("{0} was not pushed to the navigation stack")]
    NotPushed(ViewId),

    #[error("{0} is already pushed")]
    AlreadyPushed(ViewId),

    #[error("{view} cannot be pushed in state {state:?}")]
    InvalidViewState { view: ViewId, state: ViewState },

    #[error("{0} has no listener for this request")]
    NoListener(ModuleId),

    #[error("{0} does not handle messages")]
    MessageNotSupported(ModuleId),

    #[error("Navigation stack is empty")]
    EmptyStack,

    #[error("Navigation stack operation failed: {0}")]
    StackOperationFailed(String),

    /// Raised by screen hooks to refuse a request.
    #[error("{0}")]
    Rejected(String),
}

pub type ModuleResult<T> = Result<T, ModuleError>;

/// Logs a rejected operation and returns it as an error.
pub(crate) fn reject<T>(error: ModuleError) -> ModuleResult<T> {
    log::error!("{error}");
    Err(error)
}
