//! Widget system: trait, build context, inherited and stateful widgets.

pub mod context;
pub mod inherited;
pub mod stateful;
pub mod traits;

pub use context::{BuildContext, Child, WeakBuildContext};
pub use inherited::{inherited_of, Dependent, InheritedState, InheritedWidget};
pub use stateful::{State, StateHandle, StatefulWidget};
pub use traits::{downcast_rc, rebuild, AsAny, StateHost, Widget, WidgetExt, WidgetRef};
