pub mod manage;
pub mod package;
pub mod sync;

pub use manage::{ManageNodesUseCase, NodeOverview};
pub use package::GenerateSecondaryPackageUseCase;
pub use sync::{
    BlocklistSummary, ForwardZoneView, NodeConfigBundle, NodeSyncUseCase, RpzFileView,
};
