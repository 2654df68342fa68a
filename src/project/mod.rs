// project/ - create-project pipeline
//
// raw request -> validation -> reconcile (resolve, name, apply) -> outcome
//
// Nothing in here talks to the network directly; downstream access goes
// through the traits in `traits.rs` so every piece can run against fakes.

pub mod memory;
pub mod model;
pub mod naming;
pub mod reconcile;
pub mod traits;
pub mod validation;

pub use model::{
    CreateProjectRequest, Identifier, ManifestObject, Project, Role, RoleBinding, UserGroup,
    UserHandle, ValidatedGroup, ValidatedRequest,
};
pub use reconcile::{Reconciled, ReconcileError, Reconciler};
pub use traits::{
    Applier, ApplyError, Clock, FixedClock, IdentityLookup, LookupError, Session, SessionError,
    SessionProvider, SystemClock,
};
pub use validation::{validate, ValidationError};
