//! Built-in widgets: theming and media inherited widgets, layout boxes,
//! inputs, gestures, navigation, async builders and the scaffold overlay.

pub mod builder;
pub mod button;
pub mod chip;
pub mod container;
pub mod gesture;
pub mod input;
pub mod media;
pub mod messenger;
pub mod navigator;
pub mod promise;
pub mod scaffold;
pub mod text;
pub mod theme;

pub use builder::Builder;
pub use button::{Button, Callback, InkWell};
pub use chip::Chip;
pub use container::{Center, Container, Positioned};
pub use gesture::GestureDetector;
pub use input::TextField;
pub use media::{MediaQuery, MediaQueryData};
pub use messenger::{
    show_dialog, show_snack_bar, AlertDialog, Dialog, ScaffoldMessenger, ScaffoldMessengerState,
    SnackBar,
};
pub use navigator::{mount_navigator, Navigator, Route, RouteAnimation};
pub use promise::{ConnectionState, PromiseBuilder, Snapshot};
pub use scaffold::{AppBar, Scaffold};
pub use text::Text;
pub use theme::{BoxDecoration, ColorScheme, TextStyle, Theme, ThemeData};
