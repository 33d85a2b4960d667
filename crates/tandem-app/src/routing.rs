//! Notification routing decisions.
//!
//! Pure function of (device mode, category, action). The companion screen
//! applies the result; nothing here touches state.
//!
//! | Mode      | Category      | Action               | Route             |
//! |-----------|---------------|----------------------|-------------------|
//! | primary   | primaryMode   | call                 | `Ignore`          |
//! | primary   | primaryMode   | modal, textInput     | `PresentModal`    |
//! | primary   | primaryMode   | none, background     | `PushDetail`      |
//! | secondary | secondaryMode | any                  | `UpdateSecondary` |
//! | undefined | any           | any                  | `Defer`           |
//! | otherwise |               |                      | `Unhandled`       |

use tandem_proto::Mode;

use crate::notification::{Action, Category};

/// What to do with a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Leave it to the platform's own handling
    Ignore,
    /// Present details modally, replacing any current modal
    PresentModal,
    /// Push a detail screen onto the navigation stack
    PushDetail,
    /// Refresh the secondary display with body and timestamp
    UpdateSecondary,
    /// Not handleable in the current mode
    Unhandled,
    /// Hold until a mode is configured
    Defer,
}

/// Route a notification.
///
/// `category` is `None` for identifiers outside the known set.
pub fn route(mode: Mode, category: Option<Category>, action: Option<Action>) -> Route {
    match (mode, category) {
        (Mode::Undefined, _) => Route::Defer,
        (Mode::Primary, Some(Category::PrimaryMode)) => match action {
            Some(Action::Call) => Route::Ignore,
            Some(Action::Modal | Action::TextInput) => Route::PresentModal,
            Some(Action::Background) | None => Route::PushDetail,
        },
        (Mode::Secondary, Some(Category::SecondaryMode)) => Route::UpdateSecondary,
        _ => Route::Unhandled,
    }
}

/// Whether a notification can be handled directly by the active root screen.
///
/// Narrower than [`route`]: only modal presentation and secondary display
/// updates are handled directly.
pub fn can_handle(mode: Mode, category: Option<Category>, action: Option<Action>) -> bool {
    matches!(route(mode, category, action), Route::PresentModal | Route::UpdateSecondary)
}
